//! The exposed contract operations.
//!
//! Each operation runs inside one platform transaction and follows the same
//! shape: resolve the caller and timestamp, read the record and directory,
//! compute the transition, compile the endorsement policy, and only then
//! stage the record write and the policy write. A failure at any step
//! returns before anything is staged, so the caller's transaction carries
//! either both writes or neither.

use crate::codec::{decode, encode};
use crate::lifecycle::{self, LifecycleRules, Transition};
use crate::policy::EndorsementPolicyBuilder;
use crate::query::query_by_state;
use crate::{ContractConfig, ContractError, ContractResult, OrgRegistry};
use disclosure_ledger::{ChaincodeStub, JsonPolicyCompiler, PolicyCompiler, TransactionContext};
use disclosure_types::{OrgDirectory, OrgId, Record, RecordDraft, RecordId, RecordState, Timestamp};
use tracing::info;

/// The disclosure approval contract
pub struct DisclosureContract {
    config: ContractConfig,
    registry: OrgRegistry,
    rules: LifecycleRules,
    compiler: Box<dyn PolicyCompiler>,
}

impl DisclosureContract {
    /// Contract using the reference JSON policy compiler
    pub fn new(config: ContractConfig) -> ContractResult<Self> {
        Self::with_compiler(config, Box::new(JsonPolicyCompiler::new()))
    }

    pub fn with_compiler(
        config: ContractConfig,
        compiler: Box<dyn PolicyCompiler>,
    ) -> ContractResult<Self> {
        config.validate()?;
        let registry = OrgRegistry::new(config.org_directory_key.clone(), config.government_org.clone());
        let rules = LifecycleRules::new(
            config.government_org.clone(),
            config.approval_threshold_percent,
            config.org_directory_key.clone(),
        );
        Ok(Self {
            config,
            registry,
            rules,
            compiler,
        })
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub fn registry(&self) -> &OrgRegistry {
        &self.registry
    }

    // =========================================================================
    // DIRECTORY
    // =========================================================================

    /// Register a bank in the org directory. Government only.
    pub fn register_bank<C: TransactionContext + ?Sized>(
        &self,
        ctx: &mut C,
        org: OrgId,
        display_name: &str,
    ) -> ContractResult<OrgDirectory> {
        let caller = caller(&*ctx)?;
        self.registry.register(ctx, &caller, org, display_name)
    }

    /// Current org directory
    pub fn read_org_directory<C: TransactionContext + ?Sized>(
        &self,
        ctx: &C,
    ) -> ContractResult<OrgDirectory> {
        self.registry.snapshot(ctx)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Create a new record in `SUBMITTED` on behalf of the calling bank
    pub fn submit<C: TransactionContext + ?Sized>(
        &self,
        ctx: &mut C,
        draft: RecordDraft,
    ) -> ContractResult<Record> {
        let submitter = caller(&*ctx)?;
        let now = timestamp(&*ctx)?;

        let exists = ctx
            .get_state(draft.id.as_str())
            .map_err(ContractError::ledger("read record"))?
            .is_some();
        let directory = self.registry.snapshot(&*ctx)?;

        let transition = lifecycle::submit(&self.rules, exists, draft, &submitter, &directory, now)?;
        let record = self.stage(ctx, transition)?;

        info!(
            record_id = %record.id,
            submitter = %submitter,
            state = %record.state,
            "Record submitted"
        );
        Ok(record)
    }

    /// Government verification: `SUBMITTED -> GOV_VERIFIED`
    pub fn gov_verify<C: TransactionContext + ?Sized>(
        &self,
        ctx: &mut C,
        id: &RecordId,
    ) -> ContractResult<Record> {
        let verifier = caller(&*ctx)?;
        let now = timestamp(&*ctx)?;
        let stored = if self.rules.is_government(&verifier) {
            self.load_record(&*ctx, id)?
        } else {
            None
        };
        let directory = self.registry.snapshot(&*ctx)?;

        let transition = lifecycle::gov_verify(&self.rules, stored, id, &verifier, &directory, now)?;
        let record = self.stage(ctx, transition)?;

        info!(record_id = %record.id, verifier = %verifier, state = %record.state, "Record verified");
        Ok(record)
    }

    /// Bank vote on a `GOV_VERIFIED` record; finalizes it once the frozen
    /// threshold is reached
    pub fn vote<C: TransactionContext + ?Sized>(
        &self,
        ctx: &mut C,
        id: &RecordId,
    ) -> ContractResult<Record> {
        let voter = caller(&*ctx)?;
        let now = timestamp(&*ctx)?;
        let stored = self.load_record(&*ctx, id)?;
        let directory = self.registry.snapshot(&*ctx)?;

        let transition = lifecycle::vote(&self.rules, stored, id, &voter, &directory, now)?;
        let record = self.stage(ctx, transition)?;

        info!(
            record_id = %record.id,
            voter = %voter,
            approvals = record.approval_count,
            required = record.required_approval,
            state = %record.state,
            "Vote recorded"
        );
        if record.is_official() {
            info!(record_id = %record.id, approvers = ?record.approved_banks, "Record finalized");
        }
        Ok(record)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn query_submitted<C: TransactionContext + ?Sized>(&self, ctx: &C) -> ContractResult<Vec<Record>> {
        query_by_state(ctx, RecordState::Submitted)
    }

    pub fn query_gov_verified<C: TransactionContext + ?Sized>(
        &self,
        ctx: &C,
    ) -> ContractResult<Vec<Record>> {
        query_by_state(ctx, RecordState::GovVerified)
    }

    pub fn query_official<C: TransactionContext + ?Sized>(&self, ctx: &C) -> ContractResult<Vec<Record>> {
        query_by_state(ctx, RecordState::Official)
    }

    /// Stored record under `id`
    pub fn read_record<C: TransactionContext + ?Sized>(
        &self,
        ctx: &C,
        id: &RecordId,
    ) -> ContractResult<Record> {
        self.load_record(ctx, id)?
            .ok_or_else(|| ContractError::NotFound(id.clone()))
    }

    /// Stored record under `id`, if any. The directory document lives in the
    /// same key space but is never a record.
    fn load_record<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &S,
        id: &RecordId,
    ) -> ContractResult<Option<Record>> {
        if id.as_str() == self.registry.key() {
            return Ok(None);
        }
        let bytes = stub
            .get_state(id.as_str())
            .map_err(ContractError::ledger("read record"))?;
        bytes.map(|b| decode("decode record", &b)).transpose()
    }

    /// Compile the transition's endorsement policy, then stage the record and
    /// the policy. Compilation happens first so that a compiler failure leaves
    /// nothing staged.
    fn stage<S: ChaincodeStub + ?Sized>(
        &self,
        stub: &mut S,
        transition: Transition,
    ) -> ContractResult<Record> {
        let Transition {
            record,
            endorsement,
        } = transition;

        let compiled = endorsement
            .map(|policy| EndorsementPolicyBuilder::from_policy(policy).build(self.compiler.as_ref()))
            .transpose()?;
        let bytes = encode("encode record", &record)?;

        stub.put_state(record.id.as_str(), bytes)
            .map_err(ContractError::ledger("write record"))?;
        if let Some(compiled) = compiled {
            compiled.apply(stub, record.id.as_str())?;
        }
        Ok(record)
    }
}

fn caller<C: TransactionContext + ?Sized>(ctx: &C) -> ContractResult<OrgId> {
    ctx.org_id()
        .map_err(ContractError::ledger("resolve caller organization"))
}

fn timestamp<C: TransactionContext + ?Sized>(ctx: &C) -> ContractResult<Timestamp> {
    ctx.tx_timestamp()
        .map_err(ContractError::ledger("read transaction timestamp"))
}
