//! Error types for the bank ledger
//!
//! Two layers of errors live here:
//!
//! - [`StoreError`] - what an account or transaction store reports
//! - [`LedgerError`] - what the engine returns to its callers
//!
//! # Error Categories
//!
//! - **Caller errors**: validation failures, permission denials, missing
//!   accounts or transactions, insufficient funds, rule violations
//! - **Approval races**: already processed, conflicting resolution
//! - **Store errors**: timeouts and unavailability (retryable)
//! - **Consistency failures**: a ledger record and its balance change diverged
//!   (critical, never retried automatically)

use super::account::AccountId;
use super::principal::{Capability, StaffId};
use super::transaction::{ApprovalStatus, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors reported by store implementations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Account {0} does not exist")]
    AccountNotFound(AccountId),

    #[error("Account number {0} is already in use")]
    DuplicateAccount(AccountId),

    #[error("Transaction {0} does not exist")]
    TransactionNotFound(TransactionId),

    /// A debit would take the account below its overdraft floor
    #[error("Debit of {requested} rejected for account {account}: available {available}")]
    FloorViolation {
        account: AccountId,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Arithmetic overflow applying balance change to account {0}")]
    ArithmeticOverflow(AccountId),

    /// The reference index already holds this token
    #[error("Reference '{0}' is already in use")]
    DuplicateReference(String),

    /// Compare-and-swap on a pending record lost
    #[error("Transaction {id} is {current}, not pending")]
    StatusConflict {
        id: TransactionId,
        current: ApprovalStatus,
    },

    #[error("Timed out waiting for {resource}")]
    Timeout { resource: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store applied part of a batch and could not undo it
    #[error("Commit partially applied ({applied} of {total} changes): {reason}")]
    PartialCommit {
        applied: usize,
        total: usize,
        reason: String,
    },
}

impl StoreError {
    pub fn timeout(resource: impl Into<String>) -> Self {
        StoreError::Timeout {
            resource: resource.into(),
        }
    }
}

/// Coarse category of a [`LedgerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationError,
    PermissionDenied,
    NotFound,
    InsufficientFunds,
    InsufficientFundsAtApproval,
    RuleViolation,
    AlreadyProcessed,
    Conflict,
    PersistenceFailure,
    ConsistencyFailure,
}

/// Errors returned by the ledger engine and approval resolver
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Malformed or out-of-range input
    #[error("Invalid request: {message}")]
    Validation { message: String },

    /// The principal does not hold the required capability
    #[error("{} is not permitted to perform {capability}", .principal.map(|p| format!("Staff {}", p)).unwrap_or_else(|| "Anonymous caller".to_string()))]
    PermissionDenied {
        principal: Option<StaffId>,
        capability: Capability,
    },

    #[error("Account {account} not found")]
    AccountNotFound { account: AccountId },

    #[error("Transaction {tx} not found")]
    TransactionNotFound { tx: TransactionId },

    #[error("Insufficient funds in account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Insufficient funds to approve transaction {tx}: account {account} has {available} available, {requested} required")]
    InsufficientFundsAtApproval {
        tx: TransactionId,
        account: AccountId,
        available: Decimal,
        requested: Decimal,
    },

    /// A business rule forbids the request
    #[error("Rule violation: {message}")]
    RuleViolation { message: String },

    #[error("Transaction {tx} was already {status}")]
    AlreadyProcessed {
        tx: TransactionId,
        status: ApprovalStatus,
    },

    /// Another resolver won the race for this transaction
    #[error("Transaction {tx} was resolved concurrently (now {status})")]
    Conflict {
        tx: TransactionId,
        status: ApprovalStatus,
    },

    /// Store call failed or timed out
    #[error("Persistence failure: {message}")]
    Persistence { message: String },

    /// A record and its balance change diverged
    #[error("CONSISTENCY FAILURE: {message}")]
    Consistency { message: String },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation { .. } => ErrorKind::ValidationError,
            LedgerError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            LedgerError::AccountNotFound { .. } | LedgerError::TransactionNotFound { .. } => {
                ErrorKind::NotFound
            }
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::InsufficientFundsAtApproval { .. } => {
                ErrorKind::InsufficientFundsAtApproval
            }
            LedgerError::RuleViolation { .. } => ErrorKind::RuleViolation,
            LedgerError::AlreadyProcessed { .. } => ErrorKind::AlreadyProcessed,
            LedgerError::Conflict { .. } => ErrorKind::Conflict,
            LedgerError::Persistence { .. } => ErrorKind::PersistenceFailure,
            LedgerError::Consistency { .. } => ErrorKind::ConsistencyFailure,
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::PersistenceFailure | ErrorKind::Conflict
        )
    }

    /// Whether the error signals money out of sync with the ledger
    pub fn is_critical(&self) -> bool {
        self.kind() == ErrorKind::ConsistencyFailure
    }

    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation {
            message: message.into(),
        }
    }

    /// Create a RuleViolation error
    pub fn rule_violation(message: impl Into<String>) -> Self {
        LedgerError::RuleViolation {
            message: message.into(),
        }
    }

    /// Create a PermissionDenied error
    pub fn permission_denied(principal: Option<StaffId>, capability: Capability) -> Self {
        LedgerError::PermissionDenied {
            principal,
            capability,
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create an AlreadyProcessed error
    pub fn already_processed(tx: TransactionId, status: ApprovalStatus) -> Self {
        LedgerError::AlreadyProcessed { tx, status }
    }

    /// Create a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        LedgerError::Persistence {
            message: message.into(),
        }
    }

    /// Create a Consistency error
    pub fn consistency(message: impl Into<String>) -> Self {
        LedgerError::Consistency {
            message: message.into(),
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::AccountNotFound(account) => LedgerError::AccountNotFound { account },
            StoreError::TransactionNotFound(tx) => LedgerError::TransactionNotFound { tx },
            StoreError::DuplicateAccount(number) => {
                LedgerError::validation(format!("account number {} is already in use", number))
            }
            StoreError::FloorViolation {
                account,
                available,
                requested,
            } => LedgerError::insufficient_funds(account, available, requested),
            StoreError::ArithmeticOverflow(account) => LedgerError::validation(format!(
                "amount out of range for account {}",
                account
            )),
            StoreError::StatusConflict { id, current } => LedgerError::Conflict {
                tx: id,
                status: current,
            },
            StoreError::PartialCommit { .. } => LedgerError::consistency(error.to_string()),
            StoreError::DuplicateReference(_)
            | StoreError::Timeout { .. }
            | StoreError::Unavailable(_) => LedgerError::persistence(error.to_string()),
        }
    }
}
