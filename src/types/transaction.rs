//! Transaction-related types for the bank ledger
//!
//! This module defines the transaction kinds, the approval state machine, the
//! durable transaction record and the draft a record is created from.

use super::account::{AccountId, RoutingCode};
use super::principal::StaffId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier, allocated by the transaction store
pub type TransactionId = u32;

/// Kinds of funds movement the ledger records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Credit funds to an account
    Deposit,

    /// Debit funds from an account
    Withdrawal,

    /// Debit a source account and credit a local account or an external bank
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "deposit"),
            TransactionKind::Withdrawal => write!(f, "withdrawal"),
            TransactionKind::Transfer => write!(f, "transfer"),
        }
    }
}

/// Approval state of a transaction
///
/// ```text
/// Pending ──approve──▶ Approved (terminal)
///    └────reject────▶ Rejected (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// The terminal state `decision` leads to, if this state can be resolved
    pub fn resolve(self, decision: Decision) -> Option<ApprovalStatus> {
        match self {
            ApprovalStatus::Pending => Some(decision.outcome()),
            ApprovalStatus::Approved | ApprovalStatus::Rejected => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// A reviewer's decision on a pending transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Terminal status this decision produces
    pub fn outcome(self) -> ApprovalStatus {
        match self {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// One side of a balance change: a signed delta against one account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceLeg {
    pub account: AccountId,
    pub delta: Decimal,
}

impl BalanceLeg {
    pub fn credit(account: AccountId, amount: Decimal) -> Self {
        BalanceLeg {
            account,
            delta: amount,
        }
    }

    pub fn debit(account: AccountId, amount: Decimal) -> Self {
        BalanceLeg {
            account,
            delta: -amount,
        }
    }
}

fn legs_for(
    source: Option<AccountId>,
    destination: Option<AccountId>,
    amount: Decimal,
) -> Vec<BalanceLeg> {
    let mut legs = Vec::with_capacity(2);
    if let Some(source) = source {
        legs.push(BalanceLeg::debit(source, amount));
    }
    if let Some(destination) = destination {
        legs.push(BalanceLeg::credit(destination, amount));
    }
    legs
}

/// A transaction as submitted, before the store assigns identity and time
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub source: Option<AccountId>,
    pub destination: Option<AccountId>,
    pub destination_routing: Option<RoutingCode>,
    pub destination_account_routing: Option<RoutingCode>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub requires_approval: bool,
    pub created_by: StaffId,
    pub reference: String,
}

impl TransactionDraft {
    fn new(kind: TransactionKind, amount: Decimal, description: &str, created_by: StaffId) -> Self {
        TransactionDraft {
            source: None,
            destination: None,
            destination_routing: None,
            destination_account_routing: None,
            kind,
            amount,
            description: description.trim().to_string(),
            requires_approval: false,
            created_by,
            reference: String::new(),
        }
    }

    /// Deposit into `account`
    pub fn deposit(account: AccountId, amount: Decimal, description: &str, created_by: StaffId) -> Self {
        TransactionDraft {
            destination: Some(account),
            ..Self::new(TransactionKind::Deposit, amount, description, created_by)
        }
    }

    /// Withdrawal from `account`
    pub fn withdrawal(account: AccountId, amount: Decimal, description: &str, created_by: StaffId) -> Self {
        TransactionDraft {
            source: Some(account),
            ..Self::new(TransactionKind::Withdrawal, amount, description, created_by)
        }
    }

    /// Transfer to another account held in this ledger
    pub fn internal_transfer(
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        description: &str,
        created_by: StaffId,
    ) -> Self {
        TransactionDraft {
            source: Some(source),
            destination: Some(destination),
            ..Self::new(TransactionKind::Transfer, amount, description, created_by)
        }
    }

    /// Transfer leaving the ledger for another bank
    pub fn external_transfer(
        source: AccountId,
        destination_routing: RoutingCode,
        amount: Decimal,
        description: &str,
        created_by: StaffId,
    ) -> Self {
        TransactionDraft {
            source: Some(source),
            destination_routing: Some(destination_routing),
            ..Self::new(TransactionKind::Transfer, amount, description, created_by)
        }
    }

    /// Record the routing code of a local destination account
    pub fn with_destination_account_routing(mut self, routing: RoutingCode) -> Self {
        self.destination_account_routing = Some(routing);
        self
    }

    pub fn held_for_approval(mut self, requires_approval: bool) -> Self {
        self.requires_approval = requires_approval;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// Balance changes a record created from this draft implies
    pub fn balance_legs(&self) -> Vec<BalanceLeg> {
        legs_for(self.source, self.destination, self.amount)
    }

    /// Status a record created from this draft starts in
    pub fn initial_status(&self) -> ApprovalStatus {
        if self.requires_approval {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::Approved
        }
    }

    /// Give the draft its identity
    pub fn into_record(self, id: TransactionId, created_at: DateTime<Utc>) -> TransactionRecord {
        let status = self.initial_status();
        TransactionRecord {
            id,
            source: self.source,
            destination: self.destination,
            destination_routing: self.destination_routing,
            destination_account_routing: self.destination_account_routing,
            kind: self.kind,
            amount: self.amount,
            description: self.description,
            requires_approval: self.requires_approval,
            status,
            created_by: self.created_by,
            resolved_by: None,
            reference: self.reference,
            created_at,
            resolved_at: None,
        }
    }
}

/// Durable, auditable record of one funds movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,

    /// Debited account (withdrawals and transfers)
    pub source: Option<AccountId>,

    /// Credited local account (deposits and internal transfers)
    pub destination: Option<AccountId>,

    /// Routing code of the external bank (external transfers only)
    pub destination_routing: Option<RoutingCode>,

    /// Routing code of the local destination at creation (internal transfers only)
    pub destination_account_routing: Option<RoutingCode>,

    pub kind: TransactionKind,

    /// Always strictly positive
    pub amount: Decimal,

    pub description: String,

    /// Whether the record was held for manager review at creation
    pub requires_approval: bool,

    pub status: ApprovalStatus,

    /// Staff member who submitted the transaction
    pub created_by: StaffId,

    /// Staff member who resolved a held transaction
    pub resolved_by: Option<StaffId>,

    /// Short opaque token, unique across the ledger
    pub reference: String,

    pub created_at: DateTime<Utc>,

    pub resolved_at: Option<DateTime<Utc>>,
}

impl TransactionRecord {
    /// Balance changes this transaction implies
    ///
    /// The source (if any) is debited and the local destination (if any) is
    /// credited. External transfers only debit: the money leaves the ledger.
    pub fn balance_legs(&self) -> Vec<BalanceLeg> {
        legs_for(self.source, self.destination, self.amount)
    }

    /// Whether this is a transfer leaving the ledger
    pub fn is_external(&self) -> bool {
        self.kind == TransactionKind::Transfer && self.destination.is_none()
    }

    /// Whether the record touches `account` on either side
    pub fn involves(&self, account: AccountId) -> bool {
        self.source == Some(account) || self.destination == Some(account)
    }

    /// Check the per-kind shape of source and destination fields
    pub fn is_well_formed(&self) -> bool {
        let shape = match self.kind {
            TransactionKind::Deposit => {
                self.source.is_none()
                    && self.destination.is_some()
                    && self.destination_routing.is_none()
            }
            TransactionKind::Withdrawal => {
                self.source.is_some()
                    && self.destination.is_none()
                    && self.destination_routing.is_none()
            }
            TransactionKind::Transfer => {
                self.source.is_some()
                    && (self.destination.is_some() != self.destination_routing.is_some())
            }
        };
        let status = self.requires_approval || self.status == ApprovalStatus::Approved;
        shape && status && self.amount > Decimal::ZERO
    }

    /// Move a pending record into the terminal state `decision` leads to
    ///
    /// Returns the status the record was in when the transition is refused.
    pub fn resolve(
        &mut self,
        decision: Decision,
        resolver: StaffId,
        at: DateTime<Utc>,
    ) -> Result<ApprovalStatus, ApprovalStatus> {
        let next = self.status.resolve(decision).ok_or(self.status)?;
        self.status = next;
        self.resolved_by = Some(resolver);
        self.resolved_at = Some(at);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn amount(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    #[rstest]
    #[case::deposit(TransactionDraft::deposit(2, amount(10), "cash", 1), vec![BalanceLeg::credit(2, amount(10))])]
    #[case::withdrawal(TransactionDraft::withdrawal(1, amount(10), "cash", 1), vec![BalanceLeg::debit(1, amount(10))])]
    #[case::internal(
        TransactionDraft::internal_transfer(1, 2, amount(10), "rent", 1),
        vec![BalanceLeg::debit(1, amount(10)), BalanceLeg::credit(2, amount(10))]
    )]
    #[case::external(TransactionDraft::external_transfer(1, 202020, amount(10), "rent", 1), vec![BalanceLeg::debit(1, amount(10))])]
    fn test_balance_legs(#[case] draft: TransactionDraft, #[case] expected: Vec<BalanceLeg>) {
        assert_eq!(draft.balance_legs(), expected);
        let record = draft.into_record(1, Utc::now());
        assert!(record.is_well_formed());
        assert_eq!(record.balance_legs(), expected);
    }

    #[test]
    fn test_initial_status_follows_approval_flag() {
        let held = TransactionDraft::deposit(1, amount(15_000), "", 1).held_for_approval(true);
        assert_eq!(held.initial_status(), ApprovalStatus::Pending);

        let immediate = TransactionDraft::deposit(1, amount(15), "", 1);
        assert_eq!(immediate.initial_status(), ApprovalStatus::Approved);
    }

    #[test]
    fn test_description_is_trimmed() {
        let draft = TransactionDraft::deposit(1, amount(1), "  salary  ", 1);
        assert_eq!(draft.description, "salary");
    }

    #[rstest]
    #[case(ApprovalStatus::Pending, Decision::Approve, Some(ApprovalStatus::Approved))]
    #[case(ApprovalStatus::Pending, Decision::Reject, Some(ApprovalStatus::Rejected))]
    #[case(ApprovalStatus::Approved, Decision::Reject, None)]
    #[case(ApprovalStatus::Rejected, Decision::Approve, None)]
    fn test_status_transitions(
        #[case] from: ApprovalStatus,
        #[case] decision: Decision,
        #[case] expected: Option<ApprovalStatus>,
    ) {
        assert_eq!(from.resolve(decision), expected);
    }

    #[test]
    fn test_record_resolves_once() {
        let mut record = TransactionDraft::withdrawal(1, amount(20_000), "", 3)
            .held_for_approval(true)
            .into_record(1, Utc::now());

        assert_eq!(
            record.resolve(Decision::Approve, 9, Utc::now()),
            Ok(ApprovalStatus::Approved)
        );
        assert_eq!(record.resolved_by, Some(9));
        assert!(record.resolved_at.is_some());

        assert_eq!(
            record.resolve(Decision::Reject, 10, Utc::now()),
            Err(ApprovalStatus::Approved)
        );
        assert_eq!(record.resolved_by, Some(9));
    }

    #[rstest]
    #[case::both(Some(2), Some(202020))]
    #[case::neither(None, None)]
    fn test_transfer_needs_exactly_one_destination(
        #[case] destination: Option<AccountId>,
        #[case] routing: Option<RoutingCode>,
    ) {
        let mut record = TransactionDraft::internal_transfer(1, 2, amount(10), "", 1)
            .into_record(1, Utc::now());
        record.destination = destination;
        record.destination_routing = routing;
        assert!(!record.is_well_formed());
    }

    #[test]
    fn test_internal_transfer_carries_no_routing_code() {
        let record = TransactionDraft::internal_transfer(1, 2, amount(10), "", 1)
            .into_record(1, Utc::now());
        assert_eq!(record.destination, Some(2));
        assert_eq!(record.destination_routing, None);
        assert_eq!(record.destination_account_routing, None);
        assert!(!record.is_external());
    }

    #[test]
    fn test_external_transfer_detection() {
        let ext = TransactionDraft::external_transfer(1, 202020, amount(5), "", 1).into_record(1, Utc::now());
        assert!(ext.is_external());
        assert!(ext.involves(1));
        assert!(!ext.involves(2));
    }
}
