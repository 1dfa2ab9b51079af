//! Replay of ledger operations from CSV files
//!
//! `Replay` wires an [`InMemoryLedger`] to a [`LedgerEngine`] and an
//! [`ApprovalResolver`], seeds staff and accounts, then applies operations in
//! file order. A failed operation is logged and skipped; it never stops the
//! replay.
//!
//! # Flow
//!
//! ```text
//! staff.csv ──▶ principals        accounts.csv ──▶ open_account
//!                    │
//! operations.csv ──▶ Command ──▶ LedgerEngine / ApprovalResolver
//!                                        │
//!                     accounts CSV (stdout), journal CSV (optional)
//! ```

use crate::config::EngineConfig;
use crate::core::{ApprovalResolver, InMemoryLedger, LedgerEngine};
use crate::io::{reader, write_accounts_csv, write_journal_csv, Command, Operation};
use crate::types::{
    AccountDraft, ErrorKind, LedgerError, Principal, Role, StaffId, TransactionRecord,
};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Principal used to open seeded accounts
const LOADER_ID: StaffId = 0;

/// Counts reported at the end of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Operations that produced a record
    pub applied: usize,
    /// Of the applied operations, those left pending
    pub held: usize,
    /// Operations the engine refused
    pub failed: usize,
    /// Operation rows that could not be parsed
    pub malformed: usize,
    /// Staff rows that could not be parsed
    pub skipped_staff: usize,
    /// Account rows that were malformed or refused
    pub skipped_accounts: usize,
}

impl ReplaySummary {
    /// Input rows of any file that never reached the ledger
    pub fn skipped_rows(&self) -> usize {
        self.malformed + self.skipped_staff + self.skipped_accounts
    }
}

/// Drives the ledger from decoded operations
pub struct Replay {
    store: Arc<InMemoryLedger>,
    engine: LedgerEngine<InMemoryLedger>,
    resolver: ApprovalResolver<InMemoryLedger>,
    staff: HashMap<StaffId, Principal>,
    loader: Principal,
}

impl Replay {
    /// Create a replay over an empty in-memory ledger
    pub fn new(config: EngineConfig) -> Self {
        let config = Arc::new(config);
        let store = Arc::new(InMemoryLedger::new(&config));
        Replay {
            engine: LedgerEngine::new(Arc::clone(&store), Arc::clone(&config)),
            resolver: ApprovalResolver::new(Arc::clone(&store), config),
            store,
            staff: HashMap::new(),
            loader: Principal::new(LOADER_ID, "loader", Role::Admin),
        }
    }

    pub fn engine(&self) -> &LedgerEngine<InMemoryLedger> {
        &self.engine
    }

    pub fn resolver(&self) -> &ApprovalResolver<InMemoryLedger> {
        &self.resolver
    }

    /// Register staff members; a later row for the same id replaces the earlier one
    ///
    /// Returns the number of rows that could not be parsed.
    pub fn seed_staff(&mut self, rows: impl IntoIterator<Item = Result<Principal, String>>) -> usize {
        let mut malformed = 0;
        for row in rows {
            match row {
                Ok(principal) => {
                    self.staff.insert(principal.id, principal);
                }
                Err(e) => {
                    warn!("skipping staff row: {}", e);
                    malformed += 1;
                }
            }
        }
        info!(staff = self.staff.len(), "staff loaded");
        malformed
    }

    /// Open the given accounts
    ///
    /// Returns the number of rows that were malformed or refused.
    pub fn seed_accounts(
        &self,
        rows: impl IntoIterator<Item = Result<AccountDraft, String>>,
    ) -> usize {
        let mut skipped = 0;
        for row in rows {
            let result = row.map_err(LedgerError::validation).and_then(|draft| {
                self.engine.open_account(draft, Some(&self.loader))
            });
            if let Err(e) = result {
                warn!("skipping account row: {}", e);
                skipped += 1;
            }
        }
        skipped
    }

    /// Apply one command on behalf of its staff member
    ///
    /// Unknown staff ids run as an absent principal and are denied.
    pub fn apply(&self, command: &Command) -> Result<TransactionRecord, LedgerError> {
        let principal = command.staff.and_then(|id| self.staff.get(&id));

        match &command.operation {
            Operation::Deposit {
                account,
                amount,
                description,
            } => self.engine.deposit(*account, *amount, description, principal),
            Operation::Withdraw {
                account,
                amount,
                description,
            } => self.engine.withdraw(*account, *amount, description, principal),
            Operation::Transfer {
                source,
                destination,
                routing,
                amount,
                description,
            } => self.engine.transfer(
                *source,
                *destination,
                *routing,
                *amount,
                description,
                principal,
            ),
            Operation::Approve { tx } => self.resolver.approve(*tx, principal),
            Operation::Reject { tx } => self.resolver.reject(*tx, principal),
        }
    }

    /// Apply every command in order, skipping failures
    pub fn run(
        &self,
        commands: impl IntoIterator<Item = Result<Command, String>>,
    ) -> ReplaySummary {
        let mut summary = ReplaySummary::default();

        for command in commands {
            let command = match command {
                Ok(command) => command,
                Err(e) => {
                    warn!("skipping operation row: {}", e);
                    summary.malformed += 1;
                    continue;
                }
            };

            match self.apply(&command) {
                Ok(record) => {
                    summary.applied += 1;
                    if record.status.is_terminal() {
                        continue;
                    }
                    summary.held += 1;
                }
                Err(e) => {
                    summary.failed += 1;
                    // Critical failures were already escalated by the engine
                    if e.kind() != ErrorKind::ConsistencyFailure {
                        warn!(kind = ?e.kind(), staff = ?command.staff, "operation failed: {}", e);
                    }
                }
            }
        }

        info!(
            applied = summary.applied,
            held = summary.held,
            failed = summary.failed,
            malformed = summary.malformed,
            "replay finished"
        );
        summary
    }

    /// Seed from the optional staff and accounts files, then replay `operations`
    ///
    /// The returned summary includes the seed rows that were skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the files cannot be opened.
    pub fn load_and_run(
        &mut self,
        staff: Option<&Path>,
        accounts: Option<&Path>,
        operations: &Path,
    ) -> Result<ReplaySummary, String> {
        let skipped_staff = match staff {
            Some(path) => self.seed_staff(reader::staff(path)?),
            None => 0,
        };
        if skipped_staff > 0 {
            warn!(skipped = skipped_staff, "staff rows skipped");
        }

        let skipped_accounts = match accounts {
            Some(path) => self.seed_accounts(reader::accounts(path)?),
            None => 0,
        };
        if skipped_accounts > 0 {
            warn!(skipped = skipped_accounts, "account rows skipped");
        }

        let summary = self.run(reader::operations(operations)?);
        Ok(ReplaySummary {
            skipped_staff,
            skipped_accounts,
            ..summary
        })
    }

    /// Write final account states as CSV
    pub fn write_accounts(&self, output: &mut dyn Write) -> Result<(), String> {
        let accounts = self
            .engine
            .accounts(Some(&self.loader))
            .map_err(|e| format!("Failed to read accounts: {}", e))?;
        write_accounts_csv(&accounts, output)
    }

    /// Write every transaction record as CSV
    pub fn write_journal(&self, output: &mut dyn Write) -> Result<(), String> {
        write_journal_csv(&self.store.journal(), output)
    }
}
