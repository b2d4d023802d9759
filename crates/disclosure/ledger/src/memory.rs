//! In-memory reference ledger.
//!
//! Every committed key carries a version. A [`LedgerTransaction`] reads
//! committed state, remembers the version of every key it read, and buffers
//! its writes. [`LedgerTransaction::commit`] applies the whole write set under
//! one lock, or nothing at all if any key it read has moved on since.
//! Dropping a transaction without committing discards it.
//!
//! Reads inside a transaction do not observe that transaction's own staged
//! writes, matching the platform this stands in for.

use crate::{
    ChaincodeStub, ClientIdentity, LedgerError, LedgerResult, QueryEntry, QueryIterator, Selector,
};
use disclosure_types::{OrgId, Timestamp};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    version: u64,
    validation_parameter: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct WorldState {
    entries: BTreeMap<String, Entry>,
    sequence: u64,
}

/// In-memory ledger world state.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: RwLock<WorldState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transaction on behalf of `caller` at the agreed `timestamp`.
    pub fn begin(&self, caller: OrgId, timestamp: Timestamp) -> LedgerTransaction<'_> {
        LedgerTransaction {
            ledger: self,
            caller,
            timestamp,
            read_set: RefCell::new(BTreeMap::new()),
            writes: BTreeMap::new(),
            validation_writes: BTreeMap::new(),
        }
    }

    /// Committed value of `key`
    pub fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let guard = self.read_guard()?;
        Ok(guard
            .entries
            .get(key)
            .filter(|e| !e.value.is_empty())
            .map(|e| e.value.clone()))
    }

    /// Committed endorsement policy artifact of `key`
    pub fn validation_parameter(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let guard = self.read_guard()?;
        Ok(guard
            .entries
            .get(key)
            .and_then(|e| e.validation_parameter.clone()))
    }

    /// Number of commits applied so far
    pub fn sequence(&self) -> LedgerResult<u64> {
        Ok(self.read_guard()?.sequence)
    }

    /// Export the committed state. Values must be UTF-8 (the contract only
    /// stores JSON documents).
    pub fn snapshot(&self) -> LedgerResult<LedgerSnapshot> {
        let guard = self.read_guard()?;
        let mut entries = BTreeMap::new();
        for (key, entry) in &guard.entries {
            let value = String::from_utf8(entry.value.clone())
                .map_err(|e| LedgerError::Snapshot(format!("value of {}: {}", key, e)))?;
            let validation_parameter = entry
                .validation_parameter
                .clone()
                .map(String::from_utf8)
                .transpose()
                .map_err(|e| LedgerError::Snapshot(format!("policy of {}: {}", key, e)))?;
            entries.insert(
                key.clone(),
                SnapshotEntry {
                    value,
                    version: entry.version,
                    validation_parameter,
                },
            );
        }
        Ok(LedgerSnapshot {
            sequence: guard.sequence,
            entries,
        })
    }

    /// Rebuild a ledger from an exported snapshot.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let entries = snapshot
            .entries
            .into_iter()
            .map(|(key, e)| {
                (
                    key,
                    Entry {
                        value: e.value.into_bytes(),
                        version: e.version,
                        validation_parameter: e.validation_parameter.map(String::into_bytes),
                    },
                )
            })
            .collect();
        Self {
            state: RwLock::new(WorldState {
                entries,
                sequence: snapshot.sequence,
            }),
        }
    }

    fn read_guard(&self) -> LedgerResult<std::sync::RwLockReadGuard<'_, WorldState>> {
        self.state
            .read()
            .map_err(|_| LedgerError::Backend("world state lock poisoned".to_string()))
    }
}

/// Serializable copy of the committed world state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub sequence: u64,
    #[serde(default)]
    pub entries: BTreeMap<String, SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub value: String,
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_parameter: Option<String>,
}

/// One buffered transaction against a [`MemoryLedger`].
pub struct LedgerTransaction<'a> {
    ledger: &'a MemoryLedger,
    caller: OrgId,
    timestamp: Timestamp,
    /// Version observed for each key read; `None` means the key was absent.
    read_set: RefCell<BTreeMap<String, Option<u64>>>,
    writes: BTreeMap<String, Vec<u8>>,
    validation_writes: BTreeMap<String, Vec<u8>>,
}

impl LedgerTransaction<'_> {
    /// Keys staged for writing, state and validation parameters combined
    pub fn pending_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .writes
            .keys()
            .chain(self.validation_writes.keys())
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Apply the write set atomically. Returns the new ledger sequence.
    pub fn commit(self) -> LedgerResult<u64> {
        let mut guard = self
            .ledger
            .state
            .write()
            .map_err(|_| LedgerError::Backend("world state lock poisoned".to_string()))?;

        for (key, observed) in self.read_set.borrow().iter() {
            let current = guard.entries.get(key).map(|e| e.version);
            if current != *observed {
                return Err(LedgerError::MvccConflict(key.clone()));
            }
        }

        if self.writes.is_empty() && self.validation_writes.is_empty() {
            return Ok(guard.sequence);
        }

        guard.sequence += 1;
        let version = guard.sequence;

        for (key, value) in self.writes {
            let entry = guard.entries.entry(key).or_insert_with(|| Entry {
                value: Vec::new(),
                version,
                validation_parameter: None,
            });
            entry.value = value;
            entry.version = version;
        }

        for (key, policy) in self.validation_writes {
            let entry = guard.entries.entry(key).or_insert_with(|| Entry {
                value: Vec::new(),
                version,
                validation_parameter: None,
            });
            entry.validation_parameter = Some(policy);
            entry.version = version;
        }

        debug!(sequence = version, caller = %self.caller, "Transaction committed");
        Ok(version)
    }
}

impl ChaincodeStub for LedgerTransaction<'_> {
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let guard = self.ledger.read_guard()?;
        let entry = guard.entries.get(key);
        self.read_set
            .borrow_mut()
            .entry(key.to_string())
            .or_insert_with(|| entry.map(|e| e.version));
        Ok(entry
            .filter(|e| !e.value.is_empty())
            .map(|e| e.value.clone()))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        if key.is_empty() {
            return Err(LedgerError::Backend("key must not be empty".to_string()));
        }
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn get_query_result(&self, selector: &Selector) -> LedgerResult<QueryIterator<'_>> {
        let guard = self.ledger.read_guard()?;
        let matches: Vec<LedgerResult<QueryEntry>> = guard
            .entries
            .iter()
            .filter(|(_, e)| !e.value.is_empty())
            .filter_map(|(key, e)| {
                // only JSON documents are indexed
                let document: serde_json::Value = serde_json::from_slice(&e.value).ok()?;
                selector.matches(&document).then(|| {
                    Ok(QueryEntry {
                        key: key.clone(),
                        value: e.value.clone(),
                    })
                })
            })
            .collect();
        Ok(Box::new(matches.into_iter()))
    }

    fn tx_timestamp(&self) -> LedgerResult<Timestamp> {
        Ok(self.timestamp)
    }

    fn set_state_validation_parameter(&mut self, key: &str, policy: Vec<u8>) -> LedgerResult<()> {
        if key.is_empty() {
            return Err(LedgerError::Backend("key must not be empty".to_string()));
        }
        self.validation_writes.insert(key.to_string(), policy);
        Ok(())
    }
}

impl ClientIdentity for LedgerTransaction<'_> {
    fn org_id(&self) -> LedgerResult<OrgId> {
        if self.caller.is_empty() {
            return Err(LedgerError::Identity(
                "client identity has no organization".to_string(),
            ));
        }
        Ok(self.caller.clone())
    }
}
