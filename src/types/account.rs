//! Account-related types for the bank ledger
//!
//! This module defines the Account structure, the two account kinds and the
//! draft used when opening a new account.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use super::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account number (primary key of an account)
pub type AccountId = u32;

/// Bank sort identifier used to address accounts, including ones at other banks
pub type RoutingCode = u32;

/// Highest routing code accepted (six-digit sort code)
pub const MAX_ROUTING_CODE: RoutingCode = 999_999;

/// The kind of a customer account
///
/// Only `Current` accounts may carry an overdraft, and only `Current`
/// accounts may send money outside the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Everyday account with an optional overdraft
    Current,
    /// Internal-only account that can never go below zero
    Savings,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Current => write!(f, "current"),
            AccountKind::Savings => write!(f, "savings"),
        }
    }
}

impl FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(AccountKind::Current),
            "savings" => Ok(AccountKind::Savings),
            other => Err(format!("Invalid account kind '{}'", other)),
        }
    }
}

/// Customer account state
///
/// Balance and overdraft are only reachable through accessors so that the
/// Savings invariant (overdraft limit is always zero) holds for every value
/// of this type, whichever store produced it. Deserialization goes through
/// [`Account::new`] as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AccountFields")]
pub struct Account {
    /// Account number
    pub number: AccountId,

    /// Name of the account holder
    pub holder: String,

    /// Current or Savings
    pub kind: AccountKind,

    /// Sort code of the branch holding the account
    pub routing_code: RoutingCode,

    balance: Decimal,

    overdraft_limit: Decimal,

    /// When the account was opened
    pub opened_at: DateTime<Utc>,
}

/// Serialized shape of an [`Account`]
#[derive(Deserialize)]
struct AccountFields {
    number: AccountId,
    holder: String,
    kind: AccountKind,
    routing_code: RoutingCode,
    balance: Decimal,
    overdraft_limit: Decimal,
    opened_at: DateTime<Utc>,
}

impl From<AccountFields> for Account {
    fn from(fields: AccountFields) -> Self {
        Account::new(
            fields.number,
            fields.holder,
            fields.kind,
            fields.routing_code,
            fields.balance,
            fields.overdraft_limit,
            fields.opened_at,
        )
    }
}

impl Account {
    /// Build an account, normalizing the overdraft for its kind
    ///
    /// A Savings account always ends up with an overdraft limit of zero, and a
    /// negative overdraft is clamped to zero for any kind.
    pub fn new(
        number: AccountId,
        holder: impl Into<String>,
        kind: AccountKind,
        routing_code: RoutingCode,
        balance: Decimal,
        overdraft_limit: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Self {
        let overdraft_limit = match kind {
            AccountKind::Savings => Decimal::ZERO,
            AccountKind::Current => overdraft_limit.max(Decimal::ZERO),
        };

        Account {
            number,
            holder: holder.into(),
            kind,
            routing_code,
            balance,
            overdraft_limit,
            opened_at,
        }
    }

    /// Signed ledger balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Overdraft limit (always zero for Savings)
    pub fn overdraft_limit(&self) -> Decimal {
        self.overdraft_limit
    }

    /// Spending capacity: balance plus the overdraft for Current accounts
    pub fn available_balance(&self) -> Decimal {
        self.balance + self.floor()
    }

    /// How far below zero the balance may go
    pub fn floor(&self) -> Decimal {
        match self.kind {
            AccountKind::Current => self.overdraft_limit,
            AccountKind::Savings => Decimal::ZERO,
        }
    }

    /// Whether the account can fund a debit of `amount`
    pub fn can_fund(&self, amount: Decimal) -> bool {
        self.available_balance() >= amount
    }

    /// Compute the balance after applying `delta`, without mutating
    ///
    /// Debits that would take the balance below the floor fail with
    /// [`StoreError::FloorViolation`]. Credits are never floor-checked.
    pub fn balance_after(&self, delta: Decimal) -> Result<Decimal, StoreError> {
        let next = self
            .balance
            .checked_add(delta)
            .ok_or(StoreError::ArithmeticOverflow(self.number))?;
        if delta.is_sign_negative() && next + self.floor() < Decimal::ZERO {
            return Err(StoreError::FloorViolation {
                account: self.number,
                available: self.available_balance(),
                requested: -delta,
            });
        }
        Ok(next)
    }

    pub(crate) fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}

/// Input for opening a new account
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDraft {
    /// Requested account number; the store allocates one when absent
    pub number: Option<AccountId>,

    /// Name of the account holder
    pub holder: String,

    /// Current or Savings
    pub kind: AccountKind,

    /// Sort code; the configured default applies when absent
    pub routing_code: Option<RoutingCode>,

    /// Opening balance (must not be negative)
    pub opening_balance: Decimal,

    /// Requested overdraft (ignored for Savings)
    pub overdraft_limit: Decimal,
}

impl AccountDraft {
    /// Draft with zero opening balance and no overdraft
    pub fn new(holder: impl Into<String>, kind: AccountKind) -> Self {
        AccountDraft {
            number: None,
            holder: holder.into(),
            kind,
            routing_code: None,
            opening_balance: Decimal::ZERO,
            overdraft_limit: Decimal::ZERO,
        }
    }

    pub fn with_number(mut self, number: AccountId) -> Self {
        self.number = Some(number);
        self
    }

    pub fn with_routing_code(mut self, routing_code: RoutingCode) -> Self {
        self.routing_code = Some(routing_code);
        self
    }

    pub fn with_opening_balance(mut self, balance: Decimal) -> Self {
        self.opening_balance = balance;
        self
    }

    pub fn with_overdraft(mut self, overdraft_limit: Decimal) -> Self {
        self.overdraft_limit = overdraft_limit;
        self
    }

    /// Materialize the draft into an account
    pub fn into_account(
        self,
        number: AccountId,
        default_routing: RoutingCode,
        opened_at: DateTime<Utc>,
    ) -> Account {
        Account::new(
            number,
            self.holder,
            self.kind,
            self.routing_code.unwrap_or(default_routing),
            self.opening_balance,
            self.overdraft_limit,
            opened_at,
        )
    }
}
