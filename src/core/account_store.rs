//! In-memory account storage
//!
//! This module provides `InMemoryAccountStore`, a thread-safe implementation
//! of [`AccountStore`].
//!
//! # Design
//!
//! Accounts live in a `DashMap` of `Arc<Mutex<Account>>`. The map only hands
//! out handles; balance changes happen under the per-account mutex. A change
//! touching several accounts locks them in ascending account-number order, so
//! two transfers in opposite directions cannot deadlock, and waits are bounded
//! by the configured lock timeout.
//!
//! Validation (floor and overflow checks for every leg) happens while all
//! locks are held and before anything is written. The write itself cannot
//! fail, which is what makes a multi-leg change atomic.

use crate::core::traits::AccountStore;
use crate::types::{Account, AccountDraft, AccountId, BalanceLeg, RoutingCode, StoreError};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Thread-safe account store backed by `DashMap`
#[derive(Debug)]
pub struct InMemoryAccountStore {
    accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
    next_number: AtomicU32,
    default_routing: RoutingCode,
    lock_timeout: Duration,
}

impl InMemoryAccountStore {
    /// Create an empty store
    ///
    /// # Arguments
    ///
    /// * `default_routing` - Routing code for drafts that do not name one
    /// * `lock_timeout` - Upper bound on waiting for an account lock
    pub fn new(default_routing: RoutingCode, lock_timeout: Duration) -> Self {
        Self {
            accounts: DashMap::new(),
            next_number: AtomicU32::new(1),
            default_routing,
            lock_timeout,
        }
    }

    fn handle(&self, id: AccountId) -> Result<Arc<Mutex<Account>>, StoreError> {
        self.accounts
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(StoreError::AccountNotFound(id))
    }

    fn lock<'a>(
        &self,
        id: AccountId,
        handle: &'a Mutex<Account>,
    ) -> Result<MutexGuard<'a, Account>, StoreError> {
        handle
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| StoreError::timeout(format!("lock on account {}", id)))
    }

    /// Claim `number` for a new account; false if it is taken
    fn claim(&self, number: AccountId, draft: &AccountDraft) -> Option<Account> {
        let mut created = None;
        self.accounts.entry(number).or_insert_with(|| {
            let account = draft
                .clone()
                .into_account(number, self.default_routing, Utc::now());
            created = Some(account.clone());
            Arc::new(Mutex::new(account))
        });
        created
    }

    /// Apply `legs` atomically, running `write` between validation and apply
    ///
    /// Every account named by a leg is locked (ascending order) for the whole
    /// call. If any leg fails its floor or overflow check, or `write` fails,
    /// no balance changes. Otherwise the staged balances are written and the
    /// post-change accounts are returned alongside `write`'s result.
    pub(crate) fn apply_legs<R>(
        &self,
        legs: &[BalanceLeg],
        write: impl FnOnce() -> Result<R, StoreError>,
    ) -> Result<(R, Vec<Account>), StoreError> {
        // BTreeMap gives the ascending lock order
        let mut handles = BTreeMap::new();
        for leg in legs {
            if !handles.contains_key(&leg.account) {
                handles.insert(leg.account, self.handle(leg.account)?);
            }
        }

        let mut guards = BTreeMap::new();
        for (id, handle) in &handles {
            guards.insert(*id, self.lock(*id, handle)?);
        }

        let mut staged: BTreeMap<AccountId, Account> = guards
            .iter()
            .map(|(id, guard)| (*id, (**guard).clone()))
            .collect();

        for leg in legs {
            if let Some(account) = staged.get_mut(&leg.account) {
                let next = account.balance_after(leg.delta)?;
                account.set_balance(next);
            }
        }

        let result = write()?;

        let mut touched = Vec::with_capacity(guards.len());
        for (id, guard) in guards.iter_mut() {
            if let Some(account) = staged.remove(id) {
                guard.set_balance(account.balance());
            }
            touched.push(guard.clone());
        }

        Ok((result, touched))
    }
}

impl AccountStore for InMemoryAccountStore {
    fn open(&self, draft: AccountDraft) -> Result<Account, StoreError> {
        if let Some(number) = draft.number {
            let account = self
                .claim(number, &draft)
                .ok_or(StoreError::DuplicateAccount(number))?;
            self.next_number
                .fetch_max(number.saturating_add(1), Ordering::SeqCst);
            return Ok(account);
        }

        loop {
            let number = self.next_number.fetch_add(1, Ordering::SeqCst);
            if let Some(account) = self.claim(number, &draft) {
                return Ok(account);
            }
        }
    }

    fn get(&self, id: AccountId) -> Result<Account, StoreError> {
        let handle = self.handle(id)?;
        let guard = self.lock(id, &handle)?;
        Ok(guard.clone())
    }

    fn get_all(&self) -> Result<Vec<Account>, StoreError> {
        let mut handles: Vec<(AccountId, Arc<Mutex<Account>>)> = self
            .accounts
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        handles.sort_by_key(|(id, _)| *id);

        handles
            .iter()
            .map(|(id, handle)| self.lock(*id, handle).map(|guard| guard.clone()))
            .collect()
    }

    fn apply_delta(&self, id: AccountId, delta: Decimal) -> Result<Account, StoreError> {
        let leg = BalanceLeg { account: id, delta };
        let ((), mut touched) = self.apply_legs(&[leg], || Ok(()))?;
        touched
            .pop()
            .ok_or_else(|| StoreError::Unavailable(format!("account {} vanished", id)))
    }
}
