use crate::{ContractError, ContractResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub(crate) fn encode<T: Serialize>(step: &'static str, value: &T) -> ContractResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|source| ContractError::Codec { step, source })
}

pub(crate) fn decode<T: DeserializeOwned>(step: &'static str, bytes: &[u8]) -> ContractResult<T> {
    serde_json::from_slice(bytes).map_err(|source| ContractError::Codec { step, source })
}
