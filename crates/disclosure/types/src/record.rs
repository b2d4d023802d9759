//! Disclosure records and their lifecycle state

use crate::{OrgId, OrgLabel, Timestamp};
use serde::{Deserialize, Serialize};

/// Externally supplied unique identifier of a record
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lifecycle state of a record. Only ever advances, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordState {
    /// Created by a submitting bank, awaiting government review
    Submitted,
    /// Reviewed by the government, collecting bank votes
    GovVerified,
    /// Approved by the required share of banks; immutable
    Official,
}

impl RecordState {
    /// Wire name as stored in the record document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::GovVerified => "GOV_VERIFIED",
            Self::Official => "OFFICIAL",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Official)
    }
}

impl std::fmt::Display for RecordState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "SUBMITTED" => Ok(Self::Submitted),
            "GOV_VERIFIED" => Ok(Self::GovVerified),
            "OFFICIAL" => Ok(Self::Official),
            other => Err(format!("unknown record state: {}", other)),
        }
    }
}

/// Content supplied by the submitter
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    pub id: RecordId,
    pub data_hash: String,
    pub explanation_text: String,
    pub summary_text: String,
    #[serde(rename = "offshoreDiagramURL")]
    pub offshore_diagram_url: String,
    #[serde(rename = "networkDiagramURL")]
    pub network_diagram_url: String,
}

impl RecordDraft {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_data_hash(mut self, hash: impl Into<String>) -> Self {
        self.data_hash = hash.into();
        self
    }

    pub fn with_explanation(mut self, text: impl Into<String>) -> Self {
        self.explanation_text = text.into();
        self
    }

    pub fn with_summary(mut self, text: impl Into<String>) -> Self {
        self.summary_text = text.into();
        self
    }

    pub fn with_offshore_diagram_url(mut self, url: impl Into<String>) -> Self {
        self.offshore_diagram_url = url.into();
        self
    }

    pub fn with_network_diagram_url(mut self, url: impl Into<String>) -> Self {
        self.network_diagram_url = url.into();
        self
    }
}

/// A disclosure record as stored on the ledger.
///
/// `approved_banks` holds display labels in vote order; `approved_org_ids`
/// holds the voting org ids at the same positions and is what identity
/// checks use. `approval_count` always equals the length of both lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub data_hash: String,
    pub explanation_text: String,
    pub summary_text: String,
    #[serde(rename = "offshoreDiagramURL")]
    pub offshore_diagram_url: String,
    #[serde(rename = "networkDiagramURL")]
    pub network_diagram_url: String,

    pub submitted_by: OrgLabel,
    pub submitter_org_id: OrgId,
    pub submitted_at: Timestamp,

    pub state: RecordState,

    #[serde(default)]
    pub approved_banks: Vec<OrgLabel>,
    #[serde(default)]
    pub approved_org_ids: Vec<OrgId>,
    #[serde(default)]
    pub approval_count: u32,
    #[serde(default)]
    pub required_approval: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub govt_reviewed_by: Option<OrgLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub govt_reviewed_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<Timestamp>,
}

impl Record {
    /// A freshly submitted record with no approvals
    pub fn submitted(
        draft: RecordDraft,
        submitter: OrgId,
        submitter_label: OrgLabel,
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            id: draft.id,
            data_hash: draft.data_hash,
            explanation_text: draft.explanation_text,
            summary_text: draft.summary_text,
            offshore_diagram_url: draft.offshore_diagram_url,
            network_diagram_url: draft.network_diagram_url,
            submitted_by: submitter_label,
            submitter_org_id: submitter,
            submitted_at,
            state: RecordState::Submitted,
            approved_banks: Vec::new(),
            approved_org_ids: Vec::new(),
            approval_count: 0,
            required_approval: 0,
            govt_reviewed_by: None,
            govt_reviewed_at: None,
            finalized_at: None,
        }
    }

    pub fn is_official(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whether `org` has already cast a vote on this record
    pub fn has_voted(&self, org: &OrgId) -> bool {
        self.approved_org_ids.iter().any(|o| o == org)
    }

    /// Append a vote and refresh the denormalized count. Returns `false`
    /// without modifying the record if `org` already voted.
    pub fn push_approval(&mut self, org: OrgId, label: OrgLabel) -> bool {
        if self.has_voted(&org) {
            return false;
        }
        self.approved_org_ids.push(org);
        self.approved_banks.push(label);
        self.approval_count = self.approved_org_ids.len() as u32;
        true
    }

    /// Whether the approval threshold has been computed yet
    pub fn threshold_frozen(&self) -> bool {
        self.required_approval > 0
    }

    pub fn threshold_reached(&self) -> bool {
        self.approval_count >= self.required_approval
    }
}
