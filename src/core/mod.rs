//! Core business logic module
//!
//! This module contains the ledger components:
//! - `traits` - Store contracts and the atomic commit batch
//! - `account_store` / `transaction_store` - In-memory store halves
//! - `ledger_store` - In-memory ledger with the atomic commit
//! - `authorization` - Role-to-capability checks
//! - `reference` - Transaction reference generation
//! - `engine` - Deposits, withdrawals, transfers and account opening
//! - `approval` - Resolution of held transactions

pub mod account_store;
pub mod approval;
pub mod authorization;
pub mod engine;
pub mod ledger_store;
pub mod reference;
pub mod traits;
pub mod transaction_store;

pub use account_store::InMemoryAccountStore;
pub use approval::ApprovalResolver;
pub use authorization::AuthorizationGuard;
pub use engine::LedgerEngine;
pub use ledger_store::InMemoryLedger;
pub use reference::{ReferenceSource, UuidReferences};
pub use traits::{
    AccountStore, CommitReceipt, LedgerBatch, LedgerStore, RecordChange, TransactionStore,
};
pub use transaction_store::InMemoryTransactionStore;
