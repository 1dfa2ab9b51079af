//! Store contracts consumed by the ledger engine
//!
//! The engine owns no state; everything durable lives behind these traits.
//! [`LedgerStore::commit`] is the transactional boundary: a record change and
//! every balance leg it implies are applied as one unit or not at all.

use crate::types::{
    Account, AccountDraft, AccountId, BalanceLeg, Decision, StaffId, StoreError,
    TransactionDraft, TransactionId, TransactionRecord,
};
use rust_decimal::Decimal;

/// Durable keyed storage of accounts
pub trait AccountStore: Send + Sync {
    /// Open a new account from a draft
    fn open(&self, draft: AccountDraft) -> Result<Account, StoreError>;

    /// Read one account
    fn get(&self, id: AccountId) -> Result<Account, StoreError>;

    /// Read every account, ordered by account number
    fn get_all(&self) -> Result<Vec<Account>, StoreError>;

    /// Atomically apply a signed delta to one account
    ///
    /// Debits that would take the balance below the account's floor are
    /// rejected with [`StoreError::FloorViolation`].
    fn apply_delta(&self, id: AccountId, delta: Decimal) -> Result<Account, StoreError>;
}

/// Durable storage of transaction records
pub trait TransactionStore: Send + Sync {
    /// Persist a new record, assigning its id and creation time
    ///
    /// Fails with [`StoreError::DuplicateReference`] if the reference is taken.
    fn create(&self, draft: TransactionDraft) -> Result<TransactionRecord, StoreError>;

    /// Read one record
    fn get_transaction(&self, id: TransactionId) -> Result<TransactionRecord, StoreError>;

    /// Records debiting or crediting `account`, oldest first
    fn list_by_account(&self, account: AccountId) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Records awaiting review, oldest first
    fn list_pending(&self) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Compare-and-swap a pending record to the status `decision` leads to
    ///
    /// Fails with [`StoreError::StatusConflict`] if the record is no longer
    /// pending.
    fn set_status(
        &self,
        id: TransactionId,
        decision: Decision,
        resolver: StaffId,
    ) -> Result<TransactionRecord, StoreError>;
}

/// The record half of a [`LedgerBatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
    /// Create a new transaction record
    Create(TransactionDraft),
    /// Resolve a pending record
    Resolve {
        id: TransactionId,
        decision: Decision,
        resolver: StaffId,
    },
}

/// One atomic unit of ledger work
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerBatch {
    pub change: RecordChange,
    pub legs: Vec<BalanceLeg>,
}

impl LedgerBatch {
    /// Create a record, applying `legs` in the same unit
    pub fn create(draft: TransactionDraft, legs: Vec<BalanceLeg>) -> Self {
        LedgerBatch {
            change: RecordChange::Create(draft),
            legs,
        }
    }

    /// Resolve a record, applying `legs` in the same unit
    pub fn resolve(
        id: TransactionId,
        decision: Decision,
        resolver: StaffId,
        legs: Vec<BalanceLeg>,
    ) -> Self {
        LedgerBatch {
            change: RecordChange::Resolve {
                id,
                decision,
                resolver,
            },
            legs,
        }
    }
}

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReceipt {
    /// The record as stored after the commit
    pub record: TransactionRecord,
    /// Post-commit state of every account a leg touched
    pub accounts: Vec<Account>,
}

/// A store able to apply a record change and its balance legs atomically
pub trait LedgerStore: AccountStore + TransactionStore {
    /// Apply `batch` as a single unit
    ///
    /// Either the record change and every leg are applied, or nothing is.
    /// An implementation that cannot guarantee this after a failure must
    /// report [`StoreError::PartialCommit`].
    fn commit(&self, batch: LedgerBatch) -> Result<CommitReceipt, StoreError>;
}
