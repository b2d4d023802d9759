//! Record Lifecycle State Machine
//!
//! `SUBMITTED -> GOV_VERIFIED -> OFFICIAL`. Every transition is a pure
//! function of the stored record, a directory snapshot, the caller, and the
//! transaction timestamp, so any validator replaying the same inputs reaches
//! the same record and the same endorsement set.
//!
//! Identity decisions (who submitted, who may vote, who already voted, who
//! endorses the final record) use organization ids. Labels are carried for
//! display only.

use crate::{ContractError, ContractResult};
use disclosure_types::{
    EndorsementPolicy, OrgDirectory, OrgId, Record, RecordDraft, RecordId, RecordState, Timestamp,
};
use tracing::{debug, warn};

/// Approvals needed out of `eligible` banks: `ceil(percent% * eligible)`.
///
/// Integer arithmetic, so every validator computes the same value.
pub fn required_approvals(eligible: u32, percent: u8) -> u32 {
    let scaled = u64::from(eligible) * u64::from(percent);
    ((scaled + 99) / 100) as u32
}

/// Network parameters the transitions depend on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRules {
    pub government: OrgId,
    pub approval_percent: u8,
    /// Ledger key of the org directory, never usable as a record id
    pub reserved_key: String,
}

impl LifecycleRules {
    pub fn new(government: OrgId, approval_percent: u8, reserved_key: impl Into<String>) -> Self {
        Self {
            government,
            approval_percent,
            reserved_key: reserved_key.into(),
        }
    }

    pub fn is_government(&self, org: &OrgId) -> bool {
        org == &self.government
    }
}

/// Outcome of a successful transition: the record to persist and, when the
/// transition changes who may write the record, the new endorsement set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub record: Record,
    pub endorsement: Option<EndorsementPolicy>,
}

impl Transition {
    fn new(record: Record, endorsement: Option<EndorsementPolicy>) -> Self {
        Self {
            record,
            endorsement,
        }
    }
}

/// Create a record in `SUBMITTED`. Only the submitter may endorse it next.
/// `exists` reports whether anything is already stored under the draft's id.
pub fn submit(
    rules: &LifecycleRules,
    exists: bool,
    draft: RecordDraft,
    submitter: &OrgId,
    directory: &OrgDirectory,
    now: Timestamp,
) -> ContractResult<Transition> {
    if draft.id.as_str().is_empty() {
        return Err(ContractError::InvalidArgument(
            "record id cannot be empty".to_string(),
        ));
    }
    if draft.id.as_str() == rules.reserved_key {
        return Err(ContractError::InvalidArgument(format!(
            "record id {} is reserved",
            draft.id
        )));
    }
    if exists {
        return Err(ContractError::AlreadyExists(format!("record {}", draft.id)));
    }

    let label = directory.resolve_label(submitter);
    let record = Record::submitted(draft, submitter.clone(), label, now);
    Ok(Transition::new(
        record,
        Some(EndorsementPolicy::single(submitter.clone())),
    ))
}

/// Government review: `SUBMITTED -> GOV_VERIFIED`. Write authority over the
/// record moves to the government alone.
pub fn gov_verify(
    rules: &LifecycleRules,
    record: Option<Record>,
    id: &RecordId,
    caller: &OrgId,
    directory: &OrgDirectory,
    now: Timestamp,
) -> ContractResult<Transition> {
    if !rules.is_government(caller) {
        warn!(caller = %caller, record_id = %id, "Non-government organization attempted verification");
        return Err(ContractError::Unauthorized {
            org: caller.clone(),
            operation: "verify records",
        });
    }
    let mut record = record.ok_or_else(|| ContractError::NotFound(id.clone()))?;
    ensure_mutable(&record)?;
    ensure_state(&record, RecordState::Submitted)?;

    record.state = RecordState::GovVerified;
    record.govt_reviewed_by = Some(directory.resolve_label(caller));
    record.govt_reviewed_at = Some(now);

    Ok(Transition::new(
        record,
        Some(EndorsementPolicy::single(rules.government.clone())),
    ))
}

/// Bank vote on a `GOV_VERIFIED` record.
///
/// The first accepted vote freezes `required_approval` from the directory as
/// it stands at that moment. Once the approval count reaches it the record
/// becomes `OFFICIAL` and only the approving banks may endorse it.
pub fn vote(
    rules: &LifecycleRules,
    record: Option<Record>,
    id: &RecordId,
    voter: &OrgId,
    directory: &OrgDirectory,
    now: Timestamp,
) -> ContractResult<Transition> {
    let mut record = record.ok_or_else(|| ContractError::NotFound(id.clone()))?;
    ensure_mutable(&record)?;
    ensure_state(&record, RecordState::GovVerified)?;

    if voter == &record.submitter_org_id {
        warn!(voter = %voter, record_id = %record.id, "Submitter attempted to vote");
        return Err(ContractError::Ineligible {
            org: voter.clone(),
            reason: "submitter cannot approve its own record",
        });
    }
    if rules.is_government(voter) {
        warn!(voter = %voter, record_id = %record.id, "Government attempted to vote");
        return Err(ContractError::Ineligible {
            org: voter.clone(),
            reason: "government does not vote",
        });
    }

    if !record.push_approval(voter.clone(), directory.resolve_label(voter)) {
        return Err(ContractError::AlreadyVoted {
            id: record.id.clone(),
            org: voter.clone(),
        });
    }

    if !record.threshold_frozen() {
        let eligible = directory.eligible_voter_count(&rules.government, &record.submitter_org_id);
        record.required_approval = required_approvals(eligible, rules.approval_percent);
        debug!(
            record_id = %record.id,
            eligible,
            required = record.required_approval,
            "Approval threshold computed"
        );
        if eligible == 0 {
            warn!(
                record_id = %record.id,
                "No eligible banks in directory; first vote finalizes the record"
            );
        }
    }

    if !record.threshold_reached() {
        return Ok(Transition::new(record, None));
    }

    record.state = RecordState::Official;
    record.finalized_at = Some(now);
    let endorsers = EndorsementPolicy::for_orgs(record.approved_org_ids.iter().cloned());
    Ok(Transition::new(record, Some(endorsers)))
}

fn ensure_mutable(record: &Record) -> ContractResult<()> {
    if record.is_official() {
        return Err(ContractError::Immutable(record.id.clone()));
    }
    Ok(())
}

fn ensure_state(record: &Record, expected: RecordState) -> ContractResult<()> {
    if record.state != expected {
        return Err(ContractError::InvalidState {
            id: record.id.clone(),
            actual: record.state,
            expected,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use chrono::{Duration, TimeZone, Utc};
    use disclosure_types::OrgLabel;
    use proptest::prelude::*;

    const GOV: &str = "OrgGovMSP";
    const SUBMITTER: &str = "Bank1MSP";

    fn rules() -> LifecycleRules {
        LifecycleRules::new(OrgId::new(GOV), 51, "ORG_DIRECTORY")
    }

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    /// Government, the submitter, and `banks` other registered banks
    fn directory(banks: usize) -> OrgDirectory {
        let mut dir = OrgDirectory::new();
        dir.insert(OrgId::new(GOV), OrgLabel::new("Government"));
        dir.insert(OrgId::new(SUBMITTER), OrgLabel::new("First Bank"));
        for i in 0..banks {
            dir.insert(
                OrgId::new(format!("Voter{}MSP", i)),
                OrgLabel::new(format!("Voter Bank {}", i)),
            );
        }
        dir
    }

    fn verified(dir: &OrgDirectory) -> Record {
        let submitted = submit(&rules(), false, RecordDraft::new("case-1"), &OrgId::new(SUBMITTER), dir, t0())
            .unwrap()
            .record;
        gov_verify(
            &rules(),
            Some(submitted),
            &RecordId::new("case-1"),
            &OrgId::new(GOV),
            dir,
            t0() + Duration::minutes(5),
        )
        .unwrap()
        .record
    }

    fn cast(record: Record, voter: &str, dir: &OrgDirectory) -> ContractResult<Transition> {
        let id = record.id.clone();
        vote(&rules(), Some(record), &id, &OrgId::new(voter), dir, t0() + Duration::hours(1))
    }

    #[test]
    fn test_required_approvals_rounds_up() {
        assert_eq!(required_approvals(0, 51), 0);
        assert_eq!(required_approvals(1, 51), 1);
        assert_eq!(required_approvals(2, 51), 2);
        assert_eq!(required_approvals(4, 51), 3);
        assert_eq!(required_approvals(10, 51), 6);
        assert_eq!(required_approvals(100, 51), 51);
        assert_eq!(required_approvals(7, 100), 7);
    }

    #[test]
    fn test_submit_sets_submitter_policy() {
        let dir = directory(2);
        let t = submit(&rules(), false, RecordDraft::new("case-1"), &OrgId::new(SUBMITTER), &dir, t0()).unwrap();
        assert_eq!(t.record.state, RecordState::Submitted);
        assert_eq!(t.record.submitted_by.as_str(), "First Bank");
        assert_eq!(t.record.submitted_at, t0());
        assert_eq!(t.endorsement, Some(EndorsementPolicy::single(OrgId::new(SUBMITTER))));
    }

    #[test]
    fn test_submit_unregistered_uses_raw_id_as_label() {
        let t = submit(
            &rules(),
            false,
            RecordDraft::new("case-1"),
            &OrgId::new("NewBankMSP"),
            &OrgDirectory::new(),
            t0(),
        )
        .unwrap();
        assert_eq!(t.record.submitted_by.as_str(), "NewBankMSP");
    }

    #[test]
    fn test_submit_rejects_empty_or_reserved_id() {
        for id in ["", "ORG_DIRECTORY"] {
            // reported before the existence check
            for exists in [false, true] {
                let submitter = OrgId::new(SUBMITTER);
                let err = submit(&rules(), exists, RecordDraft::new(id), &submitter, &directory(0), t0())
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            }
        }
    }

    #[test]
    fn test_gov_verify_transfers_write_authority() {
        let dir = directory(2);
        let record = submit(&rules(), false, RecordDraft::new("case-1"), &OrgId::new(SUBMITTER), &dir, t0())
            .unwrap()
            .record;
        let t = gov_verify(&rules(), Some(record), &"case-1".into(), &OrgId::new(GOV), &dir, t0())
            .unwrap();
        assert_eq!(t.record.state, RecordState::GovVerified);
        assert_eq!(t.record.govt_reviewed_by, Some(OrgLabel::new("Government")));
        assert_eq!(t.record.govt_reviewed_at, Some(t0()));
        assert_eq!(t.endorsement, Some(EndorsementPolicy::single(OrgId::new(GOV))));
    }

    #[test]
    fn test_gov_verify_error_order() {
        let dir = directory(2);
        let id = RecordId::new("case-1");

        let err = gov_verify(&rules(), None, &id, &OrgId::new(SUBMITTER), &dir, t0()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = gov_verify(&rules(), None, &id, &OrgId::new(GOV), &dir, t0()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let record = verified(&dir);
        let err = gov_verify(&rules(), Some(record), &id, &OrgId::new(GOV), &dir, t0()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_vote_before_verification_is_invalid_state() {
        let dir = directory(2);
        let record = submit(&rules(), false, RecordDraft::new("case-1"), &OrgId::new(SUBMITTER), &dir, t0())
            .unwrap()
            .record;
        let err = cast(record, "Voter0MSP", &dir).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_submitter_and_government_ineligible() {
        let dir = directory(2);
        let record = verified(&dir);
        assert_eq!(cast(record.clone(), SUBMITTER, &dir).unwrap_err().kind(), ErrorKind::Ineligible);
        assert_eq!(cast(record, GOV, &dir).unwrap_err().kind(), ErrorKind::Ineligible);
    }

    #[test]
    fn test_submitter_ineligible_after_relabel() {
        let dir = directory(2);
        let record = verified(&dir);
        // a directory that no longer labels the submitter the way the record does
        let mut relabeled = OrgDirectory::new();
        relabeled.insert(OrgId::new(SUBMITTER), OrgLabel::new("Voter Bank 0"));
        let err = cast(record, SUBMITTER, &relabeled).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ineligible);
    }

    #[test]
    fn test_double_vote_rejected() {
        let dir = directory(4);
        let record = cast(verified(&dir), "Voter0MSP", &dir).unwrap().record;
        let err = cast(record, "Voter0MSP", &dir).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyVoted);
    }

    #[test]
    fn test_shared_label_orgs_vote_separately() {
        let mut dir = directory(3);
        dir.insert(OrgId::new("TwinMSP"), OrgLabel::new("Voter Bank 0"));
        let record = cast(verified(&dir), "Voter0MSP", &dir).unwrap().record;
        let record = cast(record, "TwinMSP", &dir).unwrap().record;
        assert_eq!(record.approval_count, 2);
        assert_eq!(record.approved_banks[0], record.approved_banks[1]);
    }

    #[test]
    fn test_four_eligible_banks_need_three_votes() {
        let dir = directory(4);
        let t = cast(verified(&dir), "Voter0MSP", &dir).unwrap();
        assert_eq!(t.record.required_approval, 3);
        assert_eq!(t.endorsement, None);

        let t = cast(t.record, "Voter1MSP", &dir).unwrap();
        assert_eq!(t.record.state, RecordState::GovVerified);
        assert_eq!(t.record.approval_count, 2);
        assert!(t.record.finalized_at.is_none());

        let t = cast(t.record, "Voter2MSP", &dir).unwrap();
        assert_eq!(t.record.state, RecordState::Official);
        assert_eq!(t.record.finalized_at, Some(t0() + Duration::hours(1)));
        let endorsers = t.endorsement.unwrap();
        let orgs: Vec<&str> = endorsers.orgs.iter().map(OrgId::as_str).collect();
        assert_eq!(orgs, vec!["Voter0MSP", "Voter1MSP", "Voter2MSP"]);
    }

    #[test]
    fn test_threshold_frozen_after_first_vote() {
        let dir = directory(4);
        let record = cast(verified(&dir), "Voter0MSP", &dir).unwrap().record;
        assert_eq!(record.required_approval, 3);

        let grown = directory(20);
        let record = cast(record, "Voter1MSP", &grown).unwrap().record;
        assert_eq!(record.required_approval, 3);
        assert_eq!(record.state, RecordState::GovVerified);
    }

    #[test]
    fn test_zero_eligible_first_vote_finalizes() {
        let dir = directory(0);
        let t = cast(verified(&dir), "OutsiderMSP", &dir).unwrap();
        assert_eq!(t.record.required_approval, 0);
        assert_eq!(t.record.state, RecordState::Official);
        assert_eq!(t.record.approved_banks, vec![OrgLabel::new("OutsiderMSP")]);
        assert_eq!(t.endorsement, Some(EndorsementPolicy::single(OrgId::new("OutsiderMSP"))));
    }

    #[test]
    fn test_official_record_is_immutable() {
        let dir = directory(1);
        let record = cast(verified(&dir), "Voter0MSP", &dir).unwrap().record;
        assert_eq!(record.state, RecordState::Official);

        let id = record.id.clone();
        let err = cast(record.clone(), "Voter1MSP", &dir).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Immutable);
        let err = gov_verify(&rules(), Some(record), &id, &OrgId::new(GOV), &dir, t0()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Immutable);
    }

    proptest! {
        #[test]
        fn prop_required_approvals_is_ceiling(eligible in 0u32..10_000, percent in 1u8..=100) {
            let required = required_approvals(eligible, percent);
            let scaled = u64::from(eligible) * u64::from(percent);
            prop_assert!(u64::from(required) * 100 >= scaled);
            prop_assert!(required == 0 || (u64::from(required) - 1) * 100 < scaled);
            prop_assert!(required <= eligible);
        }

        #[test]
        fn prop_resubmit_always_already_exists(hash in ".*", summary in ".*", url in ".*") {
            let dir = directory(1);
            let submitter = OrgId::new(SUBMITTER);
            prop_assert!(submit(&rules(), false, RecordDraft::new("case-1"), &submitter, &dir, t0()).is_ok());
            let draft = RecordDraft::new("case-1")
                .with_data_hash(hash)
                .with_summary(summary)
                .with_network_diagram_url(url);
            let err = submit(&rules(), true, draft, &submitter, &dir, t0()).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        }
    }
}
