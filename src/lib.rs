//! Bank Ledger Engine Library
//! # Overview
//!
//! This library provides a staff-operated bank ledger: accounts, deposits,
//! withdrawals and transfers, with a dual-control rule that holds a teller's
//! high-value actions until a manager approves them.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, TransactionRecord, Principal, errors)
//! - [`config`] - Engine configuration (threshold, funds policy, timeouts)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Validation, approval decision and record creation
//!   - [`core::approval`] - Resolution of held transactions
//!   - [`core::authorization`] - Role-to-capability checks
//!   - [`core::ledger_store`] - In-memory store with an atomic commit
//! - [`io`] - CSV row formats, streaming reader and output
//! - [`replay`] - Drives the engine from CSV files
//! - [`cli`] - CLI arguments parsing
//!
//! # Operations
//!
//! - **Deposit**: Credit funds to an account
//! - **Withdraw**: Debit funds, down to the overdraft floor of a Current account
//! - **Transfer**: Debit a source and credit a local account, or send funds
//!   to another bank by routing code (Current accounts only)
//! - **Approve / Reject**: Resolve a held transaction exactly once
//!
//! # Atomicity
//!
//! Every operation reaches the store as one [`core::LedgerBatch`]: the record
//! change and all balance legs are applied together or not at all.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod replay;
pub mod types;

pub use config::{EngineConfig, InsufficientFundsPolicy};
pub use core::{
    AccountStore, ApprovalResolver, AuthorizationGuard, InMemoryLedger, LedgerEngine,
    LedgerStore, TransactionStore,
};
pub use io::{write_accounts_csv, write_journal_csv};
pub use types::{
    Account, AccountDraft, AccountId, AccountKind, ApprovalStatus, Capability, Decision,
    ErrorKind, LedgerError, Principal, Role, RoutingCode, StaffId, StoreError, TransactionId,
    TransactionKind, TransactionRecord,
};
