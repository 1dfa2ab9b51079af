//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account-related types
//! - `transaction`: Transaction records and the approval state machine
//! - `principal`: Staff principals, roles and capabilities
//! - `error`: Error types for stores and the engine

pub mod account;
pub mod error;
pub mod principal;
pub mod transaction;

pub use account::{Account, AccountDraft, AccountId, AccountKind, RoutingCode, MAX_ROUTING_CODE};
pub use error::{ErrorKind, LedgerError, StoreError};
pub use principal::{Capability, Principal, Role, StaffId};
pub use transaction::{
    ApprovalStatus, BalanceLeg, Decision, TransactionDraft, TransactionId, TransactionKind,
    TransactionRecord,
};
