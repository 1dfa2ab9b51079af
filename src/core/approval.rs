//! Resolution of held transactions
//!
//! `ApprovalResolver` moves a `Pending` record to `Approved` or `Rejected`.
//! Approval applies the balance changes that were deferred at creation; the
//! status change and those changes are committed as one [`LedgerBatch`], and
//! the store refuses the batch if another resolver got there first.
//!
//! # Funds at approval time
//!
//! The source account is re-read and re-checked before approving. When it can
//! no longer fund the transaction, [`InsufficientFundsPolicy`] decides:
//!
//! - `Fail`: the approval is refused with `InsufficientFundsAtApproval` and the
//!   record stays pending, so it can be approved later or rejected
//! - `Reject`: the record is resolved as rejected and no money moves

use crate::config::{EngineConfig, InsufficientFundsPolicy};
use crate::core::engine::{admit, escalate};
use crate::core::traits::{LedgerBatch, LedgerStore};
use crate::types::{
    AccountId, ApprovalStatus, Capability, Decision, LedgerError, Principal, StoreError,
    TransactionId, TransactionRecord,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Resolves pending transactions on behalf of managers and admins
pub struct ApprovalResolver<S: LedgerStore> {
    store: Arc<S>,
    config: Arc<EngineConfig>,
}

impl<S: LedgerStore> Clone for ApprovalResolver<S> {
    fn clone(&self) -> Self {
        ApprovalResolver {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: LedgerStore> ApprovalResolver<S> {
    pub fn new(store: Arc<S>, config: Arc<EngineConfig>) -> Self {
        ApprovalResolver { store, config }
    }

    /// Transactions awaiting review, oldest first
    ///
    /// Requires `ApprovalResolve`.
    pub fn pending(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        admit(principal, Capability::ApprovalResolve)?;
        Ok(self.store.list_pending()?)
    }

    /// Approve a pending transaction
    pub fn approve(
        &self,
        tx: TransactionId,
        principal: Option<&Principal>,
    ) -> Result<TransactionRecord, LedgerError> {
        self.resolve(tx, Decision::Approve, principal)
    }

    /// Reject a pending transaction
    pub fn reject(
        &self,
        tx: TransactionId,
        principal: Option<&Principal>,
    ) -> Result<TransactionRecord, LedgerError> {
        self.resolve(tx, Decision::Reject, principal)
    }

    /// Resolve a pending transaction
    ///
    /// # Arguments
    ///
    /// * `tx` - The transaction to resolve
    /// * `decision` - Approve or reject
    /// * `principal` - The reviewer
    ///
    /// # Returns
    ///
    /// The record in its terminal state. Under the `Reject` funds policy an
    /// approval the source cannot fund comes back `Rejected`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The principal lacks `ApprovalResolve`
    /// - The transaction does not exist (`NotFound`)
    /// - The transaction is not pending (`AlreadyProcessed`)
    /// - Another resolver won the race (`Conflict`)
    /// - Funds are short and the policy is `Fail` (`InsufficientFundsAtApproval`)
    /// - The store fails
    pub fn resolve(
        &self,
        tx: TransactionId,
        decision: Decision,
        principal: Option<&Principal>,
    ) -> Result<TransactionRecord, LedgerError> {
        let principal = admit(principal, Capability::ApprovalResolve)?;

        let record = self.store.get_transaction(tx)?;
        if record.status != ApprovalStatus::Pending {
            return Err(LedgerError::already_processed(tx, record.status));
        }

        match decision {
            Decision::Reject => self.commit(&record, Decision::Reject, principal),
            Decision::Approve => self.approve_funded(&record, principal),
        }
    }

    fn approve_funded(
        &self,
        record: &TransactionRecord,
        principal: &Principal,
    ) -> Result<TransactionRecord, LedgerError> {
        if let Some(source) = record.source {
            let live = self.store.get(source)?;
            if !live.can_fund(record.amount) {
                return self.short_of_funds(record, source, live.available_balance(), principal);
            }
        }

        match self.commit(record, Decision::Approve, principal) {
            // The source was drained between the check above and the commit
            Err(LedgerError::InsufficientFunds {
                account, available, ..
            }) => {
                let current = self.store.get_transaction(record.id)?;
                if current.status.is_terminal() {
                    return Err(LedgerError::Conflict {
                        tx: record.id,
                        status: current.status,
                    });
                }
                self.short_of_funds(record, account, available, principal)
            }
            other => other,
        }
    }

    fn short_of_funds(
        &self,
        record: &TransactionRecord,
        account: AccountId,
        available: Decimal,
        principal: &Principal,
    ) -> Result<TransactionRecord, LedgerError> {
        match self.config.insufficient_funds_at_approval {
            InsufficientFundsPolicy::Fail => {
                warn!(
                    tx = record.id,
                    account,
                    available = %available,
                    requested = %record.amount,
                    "approval refused, insufficient funds"
                );
                Err(LedgerError::InsufficientFundsAtApproval {
                    tx: record.id,
                    account,
                    available,
                    requested: record.amount,
                })
            }
            InsufficientFundsPolicy::Reject => {
                warn!(
                    tx = record.id,
                    account,
                    available = %available,
                    requested = %record.amount,
                    "insufficient funds at approval, rejecting"
                );
                self.commit(record, Decision::Reject, principal)
            }
        }
    }

    fn commit(
        &self,
        record: &TransactionRecord,
        decision: Decision,
        principal: &Principal,
    ) -> Result<TransactionRecord, LedgerError> {
        let legs = match decision {
            Decision::Approve => record.balance_legs(),
            Decision::Reject => Vec::new(),
        };

        let receipt = self
            .store
            .commit(LedgerBatch::resolve(record.id, decision, principal.id, legs))
            .map_err(|err| match err {
                StoreError::StatusConflict { id, current } => {
                    warn!(tx = id, %current, "lost approval race");
                    LedgerError::Conflict {
                        tx: id,
                        status: current,
                    }
                }
                other => escalate(other.into()),
            })?;

        info!(
            tx = receipt.record.id,
            status = %receipt.record.status,
            resolved_by = principal.id,
            accounts = receipt.accounts.len(),
            "transaction resolved"
        );
        Ok(receipt.record)
    }
}
