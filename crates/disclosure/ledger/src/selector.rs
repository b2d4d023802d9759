use crate::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A rich-query selector matching documents whose fields equal the given
/// values. Serializes to `{"selector": {...}}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    pub selector: Map<String, Value>,
}

impl Selector {
    /// Selector matching documents where `field == value`
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.selector.insert(field.into(), value.into());
        self
    }

    /// Whether a JSON document satisfies every field of this selector
    pub fn matches(&self, document: &Value) -> bool {
        self.selector
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// Query string in the form accepted by the platform's query engine
    pub fn to_query_string(&self) -> LedgerResult<String> {
        serde_json::to_string(self).map_err(|e| LedgerError::Query(e.to_string()))
    }
}
