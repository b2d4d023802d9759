//! State Query Projection: read-only filtering of records by lifecycle state

use crate::codec::decode;
use crate::{ContractError, ContractResult};
use disclosure_ledger::{ChaincodeStub, Selector};
use disclosure_types::{Record, RecordState};
use tracing::debug;

/// Selector matching record documents in `state`
pub fn state_selector(state: RecordState) -> Selector {
    Selector::field_eq("state", state.as_str())
}

/// All records currently in `state`, in whatever order the platform returns
/// them. A failing query, iteration step, or document aborts the whole read.
pub fn query_by_state<S: ChaincodeStub + ?Sized>(
    stub: &S,
    state: RecordState,
) -> ContractResult<Vec<Record>> {
    let selector = state_selector(state);
    let results = stub
        .get_query_result(&selector)
        .map_err(ContractError::ledger("run state query"))?;

    let mut records = Vec::new();
    for entry in results {
        let entry = entry.map_err(ContractError::ledger("iterate state query"))?;
        let record: Record = decode("decode queried record", &entry.value)?;
        records.push(record);
    }

    debug!(state = %state, count = records.len(), "State query completed");
    Ok(records)
}
