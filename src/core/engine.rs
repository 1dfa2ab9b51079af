//! Funds-movement engine
//!
//! This module provides the `LedgerEngine` that validates staff requests,
//! decides whether they must be held for approval, and commits the resulting
//! transaction record through a [`LedgerStore`].
//!
//! The engine enforces business rules such as:
//! - Capability checks for every call (explicit principal, no session state)
//! - Strictly positive amounts and exactly one transfer destination
//! - Teller actions at or above the approval threshold are held as `Pending`
//! - Funds checks on the immediate-apply path only; held requests defer them
//! - Savings accounts never send money outside the ledger
//!
//! A record and the balance changes it implies are handed to the store as one
//! [`LedgerBatch`], so they land together or not at all.

use crate::config::EngineConfig;
use crate::core::authorization::AuthorizationGuard;
use crate::core::reference::{ReferenceSource, UuidReferences};
use crate::core::traits::{LedgerBatch, LedgerStore};
use crate::types::{
    Account, AccountDraft, AccountId, AccountKind, Capability, LedgerError, Principal,
    RoutingCode, StoreError, TransactionDraft, TransactionRecord, MAX_ROUTING_CODE,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Check a capability, logging denials
pub(crate) fn admit<'p>(
    principal: Option<&'p Principal>,
    capability: Capability,
) -> Result<&'p Principal, LedgerError> {
    AuthorizationGuard::require(principal, capability).inspect_err(|err| {
        warn!(
            principal = ?principal.map(|p| p.id),
            %capability,
            "{}", err
        );
    })
}

/// Raise a critical alert for errors signalling diverged ledger state
///
/// Returns the error unchanged so callers can `map_err(escalate)`.
pub(crate) fn escalate(err: LedgerError) -> LedgerError {
    if err.is_critical() {
        error!(
            target: "ledger::alert",
            severity = "critical",
            kind = ?err.kind(),
            "{}", err
        );
    }
    err
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

fn validate_routing(routing: RoutingCode) -> Result<(), LedgerError> {
    if routing == 0 || routing > MAX_ROUTING_CODE {
        return Err(LedgerError::validation(format!(
            "routing code {} is outside 1..={}",
            routing, MAX_ROUTING_CODE
        )));
    }
    Ok(())
}

/// Where a transfer sends its money
enum Destination {
    Local(AccountId),
    External(RoutingCode),
}

impl Destination {
    fn select(
        source: AccountId,
        destination: Option<AccountId>,
        routing: Option<RoutingCode>,
    ) -> Result<Self, LedgerError> {
        match (destination, routing) {
            (Some(dest), None) if dest == source => Err(LedgerError::validation(format!(
                "cannot transfer from account {} to itself",
                source
            ))),
            (Some(dest), None) => Ok(Destination::Local(dest)),
            (None, Some(code)) => {
                validate_routing(code)?;
                Ok(Destination::External(code))
            }
            _ => Err(LedgerError::validation(
                "transfer needs exactly one of destination account or routing code",
            )),
        }
    }
}

/// Funds-movement engine over a [`LedgerStore`]
///
/// Holds no ledger state of its own; cloning it is cheap and every clone
/// works against the same store.
pub struct LedgerEngine<S: LedgerStore> {
    store: Arc<S>,
    config: Arc<EngineConfig>,
    references: Arc<dyn ReferenceSource>,
}

impl<S: LedgerStore> Clone for LedgerEngine<S> {
    fn clone(&self) -> Self {
        LedgerEngine {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            references: Arc::clone(&self.references),
        }
    }
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Create a new engine
    ///
    /// # Arguments
    ///
    /// * `store` - Shared ledger store
    /// * `config` - Threshold, reference and policy settings
    ///
    /// # Returns
    ///
    /// An engine allocating references from random UUIDs of the configured
    /// length
    pub fn new(store: Arc<S>, config: Arc<EngineConfig>) -> Self {
        let references = Arc::new(UuidReferences::new(config.reference_length));
        LedgerEngine {
            store,
            config,
            references,
        }
    }

    /// Replace the reference source
    pub fn with_references(mut self, references: Arc<dyn ReferenceSource>) -> Self {
        self.references = references;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a request by `principal` for `amount` must be held for review
    ///
    /// Only tellers are subject to the threshold; the comparison is inclusive.
    pub fn requires_approval(&self, principal: &Principal, amount: Decimal) -> bool {
        principal.is_teller() && amount >= self.config.approval_threshold
    }

    /// Deposit funds into an account
    ///
    /// # Arguments
    ///
    /// * `account` - The account to credit
    /// * `amount` - Strictly positive amount
    /// * `description` - Free text, stored trimmed
    /// * `principal` - The caller
    ///
    /// # Returns
    ///
    /// The created record, `Approved` with the balance already credited or
    /// `Pending` with the balance untouched
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The principal lacks `LedgerWrite`
    /// - The amount is not positive
    /// - The account does not exist
    /// - The store fails
    pub fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        description: &str,
        principal: Option<&Principal>,
    ) -> Result<TransactionRecord, LedgerError> {
        let principal = admit(principal, Capability::LedgerWrite)?;
        validate_amount(amount)?;
        self.store.get(account)?;

        let held = self.requires_approval(principal, amount);
        let draft = TransactionDraft::deposit(account, amount, description, principal.id)
            .held_for_approval(held);
        self.submit(draft)
    }

    /// Withdraw funds from an account
    ///
    /// # Arguments
    ///
    /// * `account` - The account to debit
    /// * `amount` - Strictly positive amount
    /// * `description` - Free text, stored trimmed
    /// * `principal` - The caller
    ///
    /// # Returns
    ///
    /// The created record (see [`deposit`](Self::deposit))
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The principal lacks `LedgerWrite`
    /// - The amount is not positive
    /// - The account does not exist
    /// - The request is applied immediately and the available balance is
    ///   below `amount` (no record is created)
    /// - The store fails
    pub fn withdraw(
        &self,
        account: AccountId,
        amount: Decimal,
        description: &str,
        principal: Option<&Principal>,
    ) -> Result<TransactionRecord, LedgerError> {
        let principal = admit(principal, Capability::LedgerWrite)?;
        validate_amount(amount)?;
        let source = self.store.get(account)?;

        let held = self.requires_approval(principal, amount);
        if !held {
            Self::check_funds(&source, amount)?;
        }

        let draft = TransactionDraft::withdrawal(account, amount, description, principal.id)
            .held_for_approval(held);
        self.submit(draft)
    }

    /// Transfer funds to a local account or to another bank
    ///
    /// Exactly one of `destination` (local account) and `routing` (external
    /// bank) must be given.
    ///
    /// # Arguments
    ///
    /// * `source` - The account to debit
    /// * `destination` - Local account to credit
    /// * `routing` - Routing code of an external bank
    /// * `amount` - Strictly positive amount
    /// * `description` - Free text, stored trimmed
    /// * `principal` - The caller
    ///
    /// # Returns
    ///
    /// The created record (see [`deposit`](Self::deposit)). A record names
    /// either the local destination or the external routing code, never both.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The principal lacks `LedgerWrite`
    /// - The amount is not positive, both or neither destination is given,
    ///   the destination is the source, or the routing code is out of range
    /// - The source or destination account does not exist
    /// - An external transfer is requested from a Savings account
    /// - The request is applied immediately and funds are insufficient
    /// - The store fails
    pub fn transfer(
        &self,
        source: AccountId,
        destination: Option<AccountId>,
        routing: Option<RoutingCode>,
        amount: Decimal,
        description: &str,
        principal: Option<&Principal>,
    ) -> Result<TransactionRecord, LedgerError> {
        let principal = admit(principal, Capability::LedgerWrite)?;
        validate_amount(amount)?;

        let target = Destination::select(source, destination, routing)?;
        let from = self.store.get(source)?;

        let draft = match target {
            Destination::Local(dest) => {
                let to = self.store.get(dest)?;
                TransactionDraft::internal_transfer(
                    source,
                    to.number,
                    amount,
                    description,
                    principal.id,
                )
                .with_destination_account_routing(to.routing_code)
            }
            Destination::External(code) => {
                if from.kind == AccountKind::Savings {
                    return Err(LedgerError::rule_violation(format!(
                        "savings account {} cannot transfer outside the ledger",
                        source
                    )));
                }
                TransactionDraft::external_transfer(source, code, amount, description, principal.id)
            }
        };

        let held = self.requires_approval(principal, amount);
        if !held {
            Self::check_funds(&from, amount)?;
        }

        self.submit(draft.held_for_approval(held))
    }

    /// Open a new account
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The principal lacks `LedgerWrite`
    /// - The holder name is empty
    /// - The opening balance or overdraft is negative
    /// - The routing code is out of range
    /// - An explicit account number is already taken
    pub fn open_account(
        &self,
        draft: AccountDraft,
        principal: Option<&Principal>,
    ) -> Result<Account, LedgerError> {
        let principal = admit(principal, Capability::LedgerWrite)?;

        let holder = draft.holder.trim();
        if holder.is_empty() {
            return Err(LedgerError::validation("holder name is required"));
        }
        if draft.opening_balance.is_sign_negative() {
            return Err(LedgerError::validation("opening balance cannot be negative"));
        }
        if draft.kind == AccountKind::Current && draft.overdraft_limit.is_sign_negative() {
            return Err(LedgerError::validation("overdraft limit cannot be negative"));
        }
        if let Some(code) = draft.routing_code {
            validate_routing(code)?;
        }

        let draft = AccountDraft {
            holder: holder.to_string(),
            ..draft
        };
        let account = self.store.open(draft)?;

        info!(
            account = account.number,
            kind = %account.kind,
            routing = account.routing_code,
            opened_by = principal.id,
            "account opened"
        );
        Ok(account)
    }

    /// Read one account
    pub fn account(
        &self,
        id: AccountId,
        principal: Option<&Principal>,
    ) -> Result<Account, LedgerError> {
        admit(principal, Capability::LedgerWrite)?;
        Ok(self.store.get(id)?)
    }

    /// Read every account, ordered by account number
    pub fn accounts(&self, principal: Option<&Principal>) -> Result<Vec<Account>, LedgerError> {
        admit(principal, Capability::LedgerWrite)?;
        Ok(self.store.get_all()?)
    }

    /// History of one account, oldest first
    pub fn transactions_for_account(
        &self,
        id: AccountId,
        principal: Option<&Principal>,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        admit(principal, Capability::LedgerWrite)?;
        self.store.get(id)?;
        Ok(self.store.list_by_account(id)?)
    }

    fn check_funds(account: &Account, amount: Decimal) -> Result<(), LedgerError> {
        if account.can_fund(amount) {
            return Ok(());
        }
        warn!(
            account = account.number,
            available = %account.available_balance(),
            requested = %amount,
            "insufficient funds"
        );
        Err(LedgerError::insufficient_funds(
            account.number,
            account.available_balance(),
            amount,
        ))
    }

    /// Commit a draft, with its legs unless it is held
    ///
    /// A reference the store rejects as taken is replaced with a fresh one,
    /// up to `reference_attempts` tries.
    fn submit(&self, draft: TransactionDraft) -> Result<TransactionRecord, LedgerError> {
        let legs = if draft.requires_approval {
            Vec::new()
        } else {
            draft.balance_legs()
        };

        let attempts = self.config.reference_attempts.max(1);
        for attempt in 1..=attempts {
            let candidate = draft
                .clone()
                .with_reference(self.references.next_reference());

            match self.store.commit(LedgerBatch::create(candidate, legs.clone())) {
                Ok(receipt) => {
                    let record = receipt.record;
                    info!(
                        tx = record.id,
                        kind = %record.kind,
                        amount = %record.amount,
                        status = %record.status,
                        reference = %record.reference,
                        created_by = record.created_by,
                        "transaction committed"
                    );
                    return Ok(record);
                }
                Err(StoreError::DuplicateReference(reference)) => {
                    debug!(attempt, %reference, "reference collision");
                }
                Err(err) => return Err(escalate(err.into())),
            }
        }

        Err(LedgerError::persistence(format!(
            "no unique reference after {} attempts",
            attempts
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger_store::InMemoryLedger;
    use crate::core::traits::{AccountStore, TransactionStore};
    use crate::types::{ApprovalStatus, ErrorKind, Role, TransactionKind};
    use parking_lot::Mutex;
    use rstest::rstest;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    fn teller() -> Principal {
        Principal::new(1, "tina", Role::Teller)
    }

    fn manager() -> Principal {
        Principal::new(2, "mark", Role::Manager)
    }

    fn admin() -> Principal {
        Principal::new(3, "ada", Role::Admin)
    }

    /// Engine over a ledger with account 1 (Current, 500, overdraft 200),
    /// account 2 (Savings, 1000) and account 3 (Current, 0, routing 202020)
    fn setup() -> (LedgerEngine<InMemoryLedger>, Arc<InMemoryLedger>) {
        let config = Arc::new(EngineConfig::default());
        let store = Arc::new(InMemoryLedger::new(&config));
        store
            .open(
                AccountDraft::new("Alice", AccountKind::Current)
                    .with_opening_balance(dec(500))
                    .with_overdraft(dec(200)),
            )
            .unwrap();
        store
            .open(AccountDraft::new("Bob", AccountKind::Savings).with_opening_balance(dec(1000)))
            .unwrap();
        store
            .open(AccountDraft::new("Carol", AccountKind::Current).with_routing_code(202020))
            .unwrap();
        (LedgerEngine::new(Arc::clone(&store), config), store)
    }

    fn balance(store: &InMemoryLedger, id: AccountId) -> Decimal {
        store.get(id).unwrap().balance()
    }

    /// Hands out a fixed sequence of references
    struct ScriptedReferences(Mutex<Vec<&'static str>>);

    impl ReferenceSource for ScriptedReferences {
        fn next_reference(&self) -> String {
            let mut queue = self.0.lock();
            if queue.is_empty() {
                "EXHAUSTED".to_string()
            } else {
                queue.remove(0).to_string()
            }
        }
    }

    #[rstest]
    #[case::teller_at_threshold(teller(), Decimal::new(10_000, 0), true)]
    #[case::teller_just_below(teller(), Decimal::new(999_999, 2), false)]
    #[case::teller_above(teller(), Decimal::new(25_000, 0), true)]
    #[case::manager_at_threshold(manager(), Decimal::new(10_000, 0), false)]
    #[case::admin_above(admin(), Decimal::new(50_000, 0), false)]
    fn test_requires_approval(
        #[case] principal: Principal,
        #[case] amount: Decimal,
        #[case] expected: bool,
    ) {
        let (engine, _) = setup();
        assert_eq!(engine.requires_approval(&principal, amount), expected);
    }

    #[test]
    fn test_immediate_deposit_credits_exactly() {
        let (engine, store) = setup();

        let record = engine
            .deposit(1, dec(250), "  salary ", Some(&teller()))
            .unwrap();

        assert_eq!(record.status, ApprovalStatus::Approved);
        assert_eq!(record.kind, TransactionKind::Deposit);
        assert_eq!(record.description, "salary");
        assert_eq!(record.created_by, 1);
        assert_eq!(record.reference.len(), 16);
        assert!(record.is_well_formed());
        assert_eq!(balance(&store, 1), dec(750));
    }

    #[test]
    fn test_withdraw_into_overdraft() {
        let (engine, store) = setup();

        let record = engine.withdraw(1, dec(650), "rent", Some(&teller())).unwrap();

        assert_eq!(record.status, ApprovalStatus::Approved);
        let account = store.get(1).unwrap();
        assert_eq!(account.balance(), dec(-150));
        assert_eq!(account.available_balance(), dec(50));
    }

    #[test]
    fn test_withdraw_beyond_overdraft_creates_no_record() {
        let (engine, store) = setup();

        let err = engine
            .withdraw(1, dec(750), "rent", Some(&teller()))
            .unwrap_err();

        assert_eq!(err, LedgerError::insufficient_funds(1, dec(700), dec(750)));
        assert_eq!(balance(&store, 1), dec(500));
        assert!(store.journal().is_empty());
    }

    #[test]
    fn test_held_withdrawal_defers_funds_check() {
        let (engine, store) = setup();

        let record = engine
            .withdraw(1, dec(20_000), "car", Some(&teller()))
            .unwrap();

        assert_eq!(record.status, ApprovalStatus::Pending);
        assert!(record.requires_approval);
        assert_eq!(balance(&store, 1), dec(500));
    }

    #[test]
    fn test_teller_large_deposit_is_held() {
        let (engine, store) = setup();

        let record = engine
            .deposit(3, dec(15_000), "cheque", Some(&teller()))
            .unwrap();

        assert_eq!(record.status, ApprovalStatus::Pending);
        assert_eq!(balance(&store, 3), dec(0));
        assert_eq!(store.list_pending().unwrap().len(), 1);
    }

    #[test]
    fn test_manager_large_deposit_is_immediate() {
        let (engine, store) = setup();

        let record = engine
            .deposit(3, dec(15_000), "cheque", Some(&manager()))
            .unwrap();

        assert_eq!(record.status, ApprovalStatus::Approved);
        assert_eq!(balance(&store, 3), dec(15_000));
    }

    #[rstest]
    #[case::zero(Decimal::ZERO)]
    #[case::negative(Decimal::new(-5, 0))]
    fn test_non_positive_amounts_rejected(#[case] amount: Decimal) {
        let (engine, store) = setup();
        let p = teller();

        for err in [
            engine.deposit(1, amount, "", Some(&p)).unwrap_err(),
            engine.withdraw(1, amount, "", Some(&p)).unwrap_err(),
            engine
                .transfer(1, Some(3), None, amount, "", Some(&p))
                .unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::ValidationError);
        }
        assert!(store.journal().is_empty());
    }

    #[test]
    fn test_missing_account_is_not_found() {
        let (engine, _) = setup();
        let err = engine.deposit(99, dec(10), "", Some(&teller())).unwrap_err();
        assert_eq!(err, LedgerError::AccountNotFound { account: 99 });
    }

    #[test]
    fn test_internal_transfer_moves_both_legs() {
        let (engine, store) = setup();

        let record = engine
            .transfer(1, Some(3), None, dec(300), "loan", Some(&teller()))
            .unwrap();

        assert_eq!(record.destination, Some(3));
        assert_eq!(record.destination_routing, None);
        assert_eq!(record.destination_account_routing, Some(202020));
        assert!(record.is_well_formed());
        assert_eq!(balance(&store, 1), dec(200));
        assert_eq!(balance(&store, 3), dec(300));
    }

    #[test]
    fn test_external_transfer_from_current_debits_only() {
        let (engine, store) = setup();
        let before: Decimal = store.get_all().unwrap().iter().map(|a| a.balance()).sum();

        let record = engine
            .transfer(1, None, Some(303030), dec(100), "invoice", Some(&teller()))
            .unwrap();

        assert!(record.is_external());
        assert_eq!(balance(&store, 1), dec(400));
        let after: Decimal = store.get_all().unwrap().iter().map(|a| a.balance()).sum();
        assert_eq!(before - after, dec(100));
    }

    #[test]
    fn test_external_transfer_from_savings_is_rule_violation() {
        let (engine, store) = setup();

        let err = engine
            .transfer(2, None, Some(303030), dec(100), "", Some(&teller()))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RuleViolation);
        assert_eq!(balance(&store, 2), dec(1000));
    }

    #[test]
    fn test_savings_may_transfer_internally() {
        let (engine, store) = setup();
        engine
            .transfer(2, Some(1), None, dec(1000), "", Some(&teller()))
            .unwrap();
        assert_eq!(balance(&store, 2), dec(0));
        assert_eq!(balance(&store, 1), dec(1500));
    }

    #[rstest]
    #[case::self_transfer(Some(1), None)]
    #[case::both_destinations(Some(3), Some(303030))]
    #[case::no_destination(None, None)]
    #[case::zero_routing(None, Some(0))]
    #[case::routing_too_long(None, Some(1_000_000))]
    fn test_transfer_destination_validation(
        #[case] destination: Option<AccountId>,
        #[case] routing: Option<RoutingCode>,
    ) {
        let (engine, store) = setup();

        let err = engine
            .transfer(1, destination, routing, dec(10), "", Some(&teller()))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(store.journal().is_empty());
    }

    #[test]
    fn test_transfer_insufficient_funds_leaves_both_accounts() {
        let (engine, store) = setup();

        let err = engine
            .transfer(2, Some(3), None, dec(1001), "", Some(&teller()))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(balance(&store, 2), dec(1000));
        assert_eq!(balance(&store, 3), dec(0));
        assert!(store.journal().is_empty());
    }

    #[test]
    fn test_unauthorized_callers_are_denied() {
        let (engine, store) = setup();
        let suspended = manager().suspended();

        let denied = [
            engine.deposit(1, dec(10), "", None).unwrap_err(),
            engine.withdraw(1, dec(10), "", Some(&suspended)).unwrap_err(),
            engine.accounts(None).unwrap_err(),
        ];
        for err in denied {
            assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        }
        assert!(store.journal().is_empty());
    }

    #[test]
    fn test_reference_collision_is_retried() {
        let (engine, store) = setup();
        let engine = engine.with_references(Arc::new(ScriptedReferences(Mutex::new(vec![
            "AAAA", "AAAA", "BBBB",
        ]))));

        let first = engine.deposit(1, dec(1), "", Some(&teller())).unwrap();
        let second = engine.deposit(1, dec(1), "", Some(&teller())).unwrap();

        assert_eq!(first.reference, "AAAA");
        assert_eq!(second.reference, "BBBB");
        assert_eq!(balance(&store, 1), dec(502));
    }

    #[test]
    fn test_reference_exhaustion_is_persistence_failure() {
        let (engine, store) = setup();
        let engine = engine.with_references(Arc::new(ScriptedReferences(Mutex::new(vec![
            "SAME", "SAME", "SAME", "SAME",
        ]))));

        engine.deposit(1, dec(1), "", Some(&teller())).unwrap();
        let err = engine.deposit(1, dec(1), "", Some(&teller())).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(err.is_retryable());
        assert_eq!(balance(&store, 1), dec(501));
        assert_eq!(store.journal().len(), 1);
    }

    #[test]
    fn test_open_account_rules() {
        let (engine, _) = setup();
        let p = teller();

        let savings = engine
            .open_account(
                AccountDraft::new("  Dan ", AccountKind::Savings).with_overdraft(dec(300)),
                Some(&p),
            )
            .unwrap();
        assert_eq!(savings.holder, "Dan");
        assert_eq!(savings.overdraft_limit(), Decimal::ZERO);
        assert_eq!(savings.routing_code, 101_010);

        let invalid = [
            AccountDraft::new(" ", AccountKind::Current),
            AccountDraft::new("Eve", AccountKind::Current).with_opening_balance(dec(-1)),
            AccountDraft::new("Eve", AccountKind::Current).with_overdraft(dec(-1)),
            AccountDraft::new("Eve", AccountKind::Current).with_routing_code(0),
            AccountDraft::new("Eve", AccountKind::Current).with_number(1),
        ];
        for draft in invalid {
            let err = engine.open_account(draft, Some(&p)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationError);
        }
    }

    #[test]
    fn test_transactions_for_account() {
        let (engine, _) = setup();
        let p = teller();
        engine.deposit(1, dec(10), "", Some(&p)).unwrap();
        engine.transfer(1, Some(3), None, dec(5), "", Some(&p)).unwrap();
        engine.deposit(2, dec(10), "", Some(&p)).unwrap();

        let history = engine.transactions_for_account(1, Some(&p)).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.windows(2).all(|w| w[0].id < w[1].id));

        assert_eq!(engine.transactions_for_account(3, Some(&p)).unwrap().len(), 1);
        assert_eq!(
            engine.transactions_for_account(42, Some(&p)).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
