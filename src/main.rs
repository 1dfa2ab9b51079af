//! Bank ledger replay CLI
//!
//! Replays staff operations from a CSV file against a fresh in-memory ledger
//! and prints the final account states.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --staff staff.csv --accounts accounts.csv operations.csv > accounts.out.csv
//! cargo run -- --config ledger.toml --journal journal.csv operations.csv
//! cargo run -- --threshold 5000 --on-insufficient-funds reject operations.csv
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` (e.g. `RUST_LOG=debug`) to change the level.
//!
//! # Exit Codes
//!
//! - 0: Success (individual operations may still have been refused)
//! - 1: Error (bad configuration, file not found, output not writable, etc.)

use bank_ledger_engine::cli::{self, CliArgs};
use bank_ledger_engine::replay::Replay;
use std::fs::File;
use std::io::BufWriter;
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), String> {
    let mut replay = Replay::new(args.engine_config()?);

    let summary = replay.load_and_run(
        args.staff_file.as_deref(),
        args.accounts_file.as_deref(),
        &args.operations_file,
    )?;
    if summary.skipped_rows() > 0 {
        warn!(
            staff = summary.skipped_staff,
            accounts = summary.skipped_accounts,
            operations = summary.malformed,
            "input rows were skipped"
        );
    }

    let mut output = std::io::stdout();
    replay.write_accounts(&mut output)?;

    if let Some(path) = &args.journal_file {
        let file = File::create(path)
            .map_err(|e| format!("Failed to create journal '{}': {}", path.display(), e))?;
        replay.write_journal(&mut BufWriter::new(file))?;
    }

    Ok(())
}
