//! Engine configuration
//!
//! Every field has a default, so an empty configuration is valid. Values can
//! come from a TOML file and from `LEDGER__*` environment variables, e.g.
//! `LEDGER__APPROVAL_THRESHOLD=5000` or
//! `LEDGER__INSUFFICIENT_FUNDS_AT_APPROVAL=reject`.

use crate::types::RoutingCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// What to do when a held transaction is approved but its source account can
/// no longer fund it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsufficientFundsPolicy {
    /// Refuse the approval; the transaction stays pending
    #[default]
    Fail,
    /// Resolve the transaction as rejected without moving money
    Reject,
}

impl std::str::FromStr for InsufficientFundsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(InsufficientFundsPolicy::Fail),
            "reject" => Ok(InsufficientFundsPolicy::Reject),
            other => Err(format!("Invalid insufficient-funds policy '{}'", other)),
        }
    }
}

/// Tunables shared by the ledger engine and the approval resolver
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Teller actions at or above this amount are held for approval
    pub approval_threshold: Decimal,

    /// Policy when funds are short at approval time
    pub insufficient_funds_at_approval: InsufficientFundsPolicy,

    /// Routing code given to new accounts that do not name one
    pub default_routing_code: RoutingCode,

    /// Length of generated transaction references
    pub reference_length: usize,

    /// How many fresh references to try when the store reports a duplicate
    pub reference_attempts: u32,

    /// Upper bound on waiting for an account lock, in milliseconds
    pub lock_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            approval_threshold: Decimal::new(10_000, 0),
            insufficient_funds_at_approval: InsufficientFundsPolicy::default(),
            default_routing_code: 101_010,
            reference_length: 16,
            reference_attempts: 3,
            lock_timeout_ms: 2_000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Environment variables prefixed with `LEDGER__` override file values.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(config::Environment::with_prefix("LEDGER").prefix_separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}
