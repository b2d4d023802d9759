use crate::{LedgerResult, Selector};
use disclosure_types::{EndorsementPolicy, OrgId, Timestamp};

/// One document returned by a rich query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEntry {
    pub key: String,
    pub value: Vec<u8>,
}

/// Lazily evaluated rich-query results. Each item may fail independently.
pub type QueryIterator<'a> = Box<dyn Iterator<Item = LedgerResult<QueryEntry>> + 'a>;

/// Per-transaction handle onto the ledger world state.
pub trait ChaincodeStub {
    /// Read the committed value of `key`.
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Stage a write of `key`. Visible to other transactions only after commit.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> LedgerResult<()>;

    /// Run a selector query over committed JSON documents.
    fn get_query_result(&self, selector: &Selector) -> LedgerResult<QueryIterator<'_>>;

    /// Ledger-agreed timestamp of the current transaction.
    fn tx_timestamp(&self) -> LedgerResult<Timestamp>;

    /// Stage a key-level endorsement policy restricting future writers of `key`.
    fn set_state_validation_parameter(&mut self, key: &str, policy: Vec<u8>) -> LedgerResult<()>;
}

/// Identity of the client that submitted the current transaction.
pub trait ClientIdentity {
    fn org_id(&self) -> LedgerResult<OrgId>;
}

/// Compiles an endorsement policy into the platform's artifact bytes.
pub trait PolicyCompiler: Send + Sync {
    fn compile(&self, policy: &EndorsementPolicy) -> LedgerResult<Vec<u8>>;
}

/// Everything one contract invocation needs from the platform.
pub trait TransactionContext: ChaincodeStub + ClientIdentity {}

impl<T: ChaincodeStub + ClientIdentity + ?Sized> TransactionContext for T {}
