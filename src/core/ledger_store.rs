//! In-memory ledger: accounts and transaction records behind one commit
//!
//! `InMemoryLedger` composes [`InMemoryAccountStore`] and
//! [`InMemoryTransactionStore`] and implements [`LedgerStore::commit`] on top
//! of them. The record change runs while the accounts named by the batch's
//! legs are locked and after every leg has been validated, and balances are
//! only written once the record change has succeeded. A failed commit leaves
//! both stores exactly as they were.

use crate::config::EngineConfig;
use crate::core::account_store::InMemoryAccountStore;
use crate::core::traits::{
    AccountStore, CommitReceipt, LedgerBatch, LedgerStore, RecordChange, TransactionStore,
};
use crate::core::transaction_store::InMemoryTransactionStore;
use crate::types::{
    Account, AccountDraft, AccountId, Decision, StaffId, StoreError, TransactionDraft,
    TransactionId, TransactionRecord,
};
use rust_decimal::Decimal;

/// Thread-safe in-memory [`LedgerStore`]
#[derive(Debug)]
pub struct InMemoryLedger {
    accounts: InMemoryAccountStore,
    transactions: InMemoryTransactionStore,
}

impl InMemoryLedger {
    /// Create an empty ledger using the routing default and lock timeout
    /// from `config`
    pub fn new(config: &EngineConfig) -> Self {
        InMemoryLedger {
            accounts: InMemoryAccountStore::new(
                config.default_routing_code,
                config.lock_timeout(),
            ),
            transactions: InMemoryTransactionStore::new(),
        }
    }

    /// Every transaction record, oldest first
    pub fn journal(&self) -> Vec<TransactionRecord> {
        self.transactions.all()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl AccountStore for InMemoryLedger {
    fn open(&self, draft: AccountDraft) -> Result<Account, StoreError> {
        self.accounts.open(draft)
    }

    fn get(&self, id: AccountId) -> Result<Account, StoreError> {
        self.accounts.get(id)
    }

    fn get_all(&self) -> Result<Vec<Account>, StoreError> {
        self.accounts.get_all()
    }

    fn apply_delta(&self, id: AccountId, delta: Decimal) -> Result<Account, StoreError> {
        self.accounts.apply_delta(id, delta)
    }
}

impl TransactionStore for InMemoryLedger {
    fn create(&self, draft: TransactionDraft) -> Result<TransactionRecord, StoreError> {
        self.transactions.create(draft)
    }

    fn get_transaction(&self, id: TransactionId) -> Result<TransactionRecord, StoreError> {
        self.transactions.get_transaction(id)
    }

    fn list_by_account(&self, account: AccountId) -> Result<Vec<TransactionRecord>, StoreError> {
        self.transactions.list_by_account(account)
    }

    fn list_pending(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        self.transactions.list_pending()
    }

    fn set_status(
        &self,
        id: TransactionId,
        decision: Decision,
        resolver: StaffId,
    ) -> Result<TransactionRecord, StoreError> {
        self.transactions.set_status(id, decision, resolver)
    }
}

impl LedgerStore for InMemoryLedger {
    fn commit(&self, batch: LedgerBatch) -> Result<CommitReceipt, StoreError> {
        let LedgerBatch { change, legs } = batch;

        // Report a lost race before taking any account locks
        if let RecordChange::Resolve { id, .. } = &change {
            self.transactions.check_resolvable(*id)?;
        }

        let (record, accounts) = self.accounts.apply_legs(&legs, || match change {
            RecordChange::Create(draft) => self.transactions.create(draft),
            RecordChange::Resolve {
                id,
                decision,
                resolver,
            } => self.transactions.set_status(id, decision, resolver),
        })?;

        Ok(CommitReceipt { record, accounts })
    }
}
