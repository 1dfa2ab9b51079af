use crate::config::{EngineConfig, InsufficientFundsPolicy};
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Replay staff ledger operations against a fresh in-memory ledger
#[derive(Parser, Debug)]
#[command(name = "bank-ledger")]
#[command(
    about = "Replay staff ledger operations with dual-control approval",
    long_about = None
)]
pub struct CliArgs {
    /// Operations CSV file
    #[arg(value_name = "OPERATIONS", help = "Path to the operations CSV file")]
    pub operations_file: PathBuf,

    /// Engine configuration file (TOML)
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Accounts to open before replaying
    #[arg(
        long = "accounts",
        value_name = "FILE",
        help = "CSV with columns account,holder,kind,routing,balance,overdraft"
    )]
    pub accounts_file: Option<PathBuf>,

    /// Staff members allowed to act
    #[arg(
        long = "staff",
        value_name = "FILE",
        help = "CSV with columns staff,username,role,suspended"
    )]
    pub staff_file: Option<PathBuf>,

    /// Where to write every transaction record
    #[arg(long = "journal", value_name = "FILE")]
    pub journal_file: Option<PathBuf>,

    /// Override the approval threshold
    #[arg(long = "threshold", value_name = "AMOUNT")]
    pub threshold: Option<Decimal>,

    /// Override what approval does when funds are short
    #[arg(
        long = "on-insufficient-funds",
        value_name = "POLICY",
        help = "'fail' keeps the transaction pending, 'reject' rejects it"
    )]
    pub on_insufficient_funds: Option<InsufficientFundsPolicy>,
}

impl CliArgs {
    /// Load the engine configuration and apply command-line overrides
    ///
    /// # Returns
    ///
    /// * `Ok(EngineConfig)` with file, environment and flag values merged
    /// * `Err(String)` if the configuration file cannot be loaded
    pub fn engine_config(&self) -> Result<EngineConfig, String> {
        let mut config = EngineConfig::load(self.config_file.as_deref())
            .map_err(|e| format!("Failed to load configuration: {}", e))?;

        if let Some(threshold) = self.threshold {
            config.approval_threshold = threshold;
        }
        if let Some(policy) = self.on_insufficient_funds {
            config.insufficient_funds_at_approval = policy;
        }
        Ok(config)
    }
}
