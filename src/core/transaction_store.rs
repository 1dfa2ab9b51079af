//! In-memory transaction record storage
//!
//! This module provides `InMemoryTransactionStore`, a thread-safe
//! implementation of [`TransactionStore`].
//!
//! # Uniqueness and single resolution
//!
//! - A second `DashMap` indexes records by reference. A record is only created
//!   when its reference can be claimed in that index, so duplicate references
//!   are rejected at creation instead of coexisting.
//! - Status changes run under the record's map entry and go through
//!   [`TransactionRecord::resolve`], which only leaves `Pending`. Two resolvers
//!   racing on one record are serialized and the second one observes
//!   [`StoreError::StatusConflict`].

use crate::core::traits::TransactionStore;
use crate::types::{
    AccountId, ApprovalStatus, Decision, StaffId, StoreError, TransactionDraft, TransactionId,
    TransactionRecord,
};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Thread-safe transaction store backed by `DashMap`
#[derive(Debug)]
pub struct InMemoryTransactionStore {
    records: DashMap<TransactionId, TransactionRecord>,
    references: DashMap<String, TransactionId>,
    next_id: AtomicU32,
}

impl InMemoryTransactionStore {
    /// Create an empty store; ids start at 1
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            references: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Every record, oldest first
    pub fn all(&self) -> Vec<TransactionRecord> {
        self.collect_sorted(|_| true)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn collect_sorted(&self, keep: impl Fn(&TransactionRecord) -> bool) -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = self
            .records
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// Check that `id` can be resolved, without changing it
    pub(crate) fn check_resolvable(&self, id: TransactionId) -> Result<(), StoreError> {
        let record = self
            .records
            .get(&id)
            .ok_or(StoreError::TransactionNotFound(id))?;
        match record.status {
            ApprovalStatus::Pending => Ok(()),
            current => Err(StoreError::StatusConflict { id, current }),
        }
    }
}

impl Default for InMemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn create(&self, draft: TransactionDraft) -> Result<TransactionRecord, StoreError> {
        let mut assigned = None;
        self.references
            .entry(draft.reference.clone())
            .or_insert_with(|| {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                assigned = Some(id);
                id
            });

        let id = assigned.ok_or_else(|| StoreError::DuplicateReference(draft.reference.clone()))?;
        let record = draft.into_record(id, Utc::now());
        self.records.insert(id, record.clone());
        Ok(record)
    }

    fn get_transaction(&self, id: TransactionId) -> Result<TransactionRecord, StoreError> {
        self.records
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::TransactionNotFound(id))
    }

    fn list_by_account(&self, account: AccountId) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(self.collect_sorted(|record| record.involves(account)))
    }

    fn list_pending(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(self.collect_sorted(|record| record.status == ApprovalStatus::Pending))
    }

    fn set_status(
        &self,
        id: TransactionId,
        decision: Decision,
        resolver: StaffId,
    ) -> Result<TransactionRecord, StoreError> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or(StoreError::TransactionNotFound(id))?;

        entry
            .resolve(decision, resolver, Utc::now())
            .map_err(|current| StoreError::StatusConflict { id, current })?;

        Ok(entry.value().clone())
    }
}
