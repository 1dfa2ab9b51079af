//! CSV format handling for replay input and ledger output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for deserialization (operations, accounts, staff)
//! - Conversion from rows to domain types
//! - Account and journal output serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{
    Account, AccountDraft, AccountId, AccountKind, Principal, Role, RoutingCode, StaffId,
    TransactionId, TransactionRecord,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// One row of the operations file
///
/// Columns: `op, staff, account, destination, routing, amount, tx, description`.
/// Which columns are needed depends on `op`; the rest may be left empty.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct OperationRow {
    pub op: String,
    pub staff: Option<StaffId>,
    pub account: Option<AccountId>,
    pub destination: Option<AccountId>,
    pub routing: Option<RoutingCode>,
    pub amount: Option<String>,
    pub tx: Option<TransactionId>,
    pub description: Option<String>,
}

/// A ledger operation decoded from an [`OperationRow`]
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Deposit {
        account: AccountId,
        amount: Decimal,
        description: String,
    },
    Withdraw {
        account: AccountId,
        amount: Decimal,
        description: String,
    },
    Transfer {
        source: AccountId,
        destination: Option<AccountId>,
        routing: Option<RoutingCode>,
        amount: Decimal,
        description: String,
    },
    Approve {
        tx: TransactionId,
    },
    Reject {
        tx: TransactionId,
    },
}

/// An operation and the staff member who issued it
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Issuing staff id; `None` when the row leaves it blank
    pub staff: Option<StaffId>,
    pub operation: Operation,
}

fn parse_amount(raw: Option<&str>, op: &str) -> Result<Decimal, String> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Decimal::from_str(value)
            .map_err(|_| format!("Invalid amount '{}' for {}", value, op)),
        _ => Err(format!("{} requires an amount", op)),
    }
}

fn require<T>(value: Option<T>, column: &str, op: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("{} requires the '{}' column", op, column))
}

/// Convert an [`OperationRow`] to a [`Command`]
///
/// Checks that the columns each operation needs are present and that amounts
/// parse. Business rules (positive amounts, a single transfer destination)
/// are left to the engine so that they are reported the same way for every
/// caller.
///
/// # Arguments
///
/// * `row` - The deserialized CSV row
///
/// # Returns
///
/// * `Ok(Command)` - Successfully converted row
/// * `Err(String)` - Error message describing the conversion failure
pub fn convert_operation_row(row: OperationRow) -> Result<Command, String> {
    let op = row.op.trim().to_lowercase();
    let description = row.description.unwrap_or_default();

    let operation = match op.as_str() {
        "deposit" => Operation::Deposit {
            account: require(row.account, "account", &op)?,
            amount: parse_amount(row.amount.as_deref(), &op)?,
            description,
        },
        "withdraw" | "withdrawal" => Operation::Withdraw {
            account: require(row.account, "account", &op)?,
            amount: parse_amount(row.amount.as_deref(), &op)?,
            description,
        },
        "transfer" => Operation::Transfer {
            source: require(row.account, "account", &op)?,
            destination: row.destination,
            routing: row.routing,
            amount: parse_amount(row.amount.as_deref(), &op)?,
            description,
        },
        "approve" => Operation::Approve {
            tx: require(row.tx, "tx", &op)?,
        },
        "reject" => Operation::Reject {
            tx: require(row.tx, "tx", &op)?,
        },
        _ => return Err(format!("Invalid operation: '{}'", row.op)),
    };

    Ok(Command {
        staff: row.staff,
        operation,
    })
}

/// One row of the accounts seed file
///
/// Columns: `account, holder, kind, routing, balance, overdraft`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountRow {
    pub account: Option<AccountId>,
    pub holder: String,
    pub kind: String,
    pub routing: Option<RoutingCode>,
    pub balance: Option<String>,
    pub overdraft: Option<String>,
}

fn parse_optional_amount(raw: Option<&str>, column: &str) -> Result<Decimal, String> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => {
            Decimal::from_str(value).map_err(|_| format!("Invalid {} '{}'", column, value))
        }
        _ => Ok(Decimal::ZERO),
    }
}

/// Convert an [`AccountRow`] to an [`AccountDraft`]
///
/// Blank balance and overdraft columns mean zero.
pub fn convert_account_row(row: AccountRow) -> Result<AccountDraft, String> {
    let kind = AccountKind::from_str(&row.kind)?;
    let mut draft = AccountDraft::new(row.holder, kind)
        .with_opening_balance(parse_optional_amount(row.balance.as_deref(), "balance")?)
        .with_overdraft(parse_optional_amount(row.overdraft.as_deref(), "overdraft")?);

    if let Some(number) = row.account {
        draft = draft.with_number(number);
    }
    if let Some(routing) = row.routing {
        draft = draft.with_routing_code(routing);
    }
    Ok(draft)
}

/// One row of the staff file
///
/// Columns: `staff, username, role, suspended`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StaffRow {
    pub staff: StaffId,
    pub username: String,
    pub role: String,
    pub suspended: Option<String>,
}

/// Convert a [`StaffRow`] to a [`Principal`]
pub fn convert_staff_row(row: StaffRow) -> Result<Principal, String> {
    let role = Role::from_str(&row.role)?;
    let suspended = match row.suspended.as_deref().map(|s| s.trim().to_lowercase()) {
        None => false,
        Some(flag) => match flag.as_str() {
            "" | "false" | "no" | "0" => false,
            "true" | "yes" | "1" => true,
            _ => return Err(format!("Invalid suspended flag '{}' for staff {}", flag, row.staff)),
        },
    };

    let principal = Principal::new(row.staff, row.username.trim(), role);
    Ok(if suspended {
        principal.suspended()
    } else {
        principal
    })
}

/// Write account states to CSV format
///
/// Writes accounts with columns: account, holder, kind, routing, balance,
/// overdraft, available. Amounts have two decimal places and accounts are
/// sorted by number for deterministic output.
///
/// # Arguments
///
/// * `accounts` - Slice of account states to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "account",
            "holder",
            "kind",
            "routing",
            "balance",
            "overdraft",
            "available",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by_key(|account| account.number);

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.number.to_string(),
                account.holder.clone(),
                account.kind.to_string(),
                account.routing_code.to_string(),
                format!("{:.2}", account.balance()),
                format!("{:.2}", account.overdraft_limit()),
                format!("{:.2}", account.available_balance()),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write transaction records to CSV format, in the order given
pub fn write_journal_csv(
    records: &[TransactionRecord],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "tx",
            "reference",
            "kind",
            "source",
            "destination",
            "routing",
            "amount",
            "status",
            "created_by",
            "resolved_by",
            "created_at",
            "resolved_at",
            "description",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for record in records {
        writer
            .write_record(&[
                record.id.to_string(),
                record.reference.clone(),
                record.kind.to_string(),
                optional(record.source),
                optional(record.destination),
                optional(record.destination_routing),
                format!("{:.2}", record.amount),
                record.status.to_string(),
                record.created_by.to_string(),
                optional(record.resolved_by),
                record.created_at.to_rfc3339(),
                optional(record.resolved_at.map(|at| at.to_rfc3339())),
                record.description.clone(),
            ])
            .map_err(|e| format!("Failed to write journal record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionDraft;
    use chrono::Utc;
    use rstest::rstest;

    fn row(op: &str) -> OperationRow {
        OperationRow {
            op: op.to_string(),
            staff: Some(1),
            account: Some(10),
            destination: None,
            routing: None,
            amount: Some("100.50".to_string()),
            tx: Some(3),
            description: Some("note".to_string()),
        }
    }

    #[rstest]
    #[case::deposit("deposit", Operation::Deposit { account: 10, amount: Decimal::new(10050, 2), description: "note".into() })]
    #[case::withdraw("withdraw", Operation::Withdraw { account: 10, amount: Decimal::new(10050, 2), description: "note".into() })]
    #[case::withdrawal_alias("Withdrawal", Operation::Withdraw { account: 10, amount: Decimal::new(10050, 2), description: "note".into() })]
    #[case::approve("APPROVE", Operation::Approve { tx: 3 })]
    #[case::reject("reject", Operation::Reject { tx: 3 })]
    fn test_convert_operation_row(#[case] op: &str, #[case] expected: Operation) {
        let command = convert_operation_row(row(op)).unwrap();
        assert_eq!(command.staff, Some(1));
        assert_eq!(command.operation, expected);
    }

    #[test]
    fn test_convert_transfer_keeps_both_destination_columns() {
        let command = convert_operation_row(OperationRow {
            destination: Some(11),
            routing: Some(202020),
            ..row("transfer")
        })
        .unwrap();

        // Exactly-one-destination is the engine's call
        assert_eq!(
            command.operation,
            Operation::Transfer {
                source: 10,
                destination: Some(11),
                routing: Some(202020),
                amount: Decimal::new(10050, 2),
                description: "note".into(),
            }
        );
    }

    #[rstest]
    #[case::invalid_op(OperationRow { op: "chargeback".into(), ..row("") }, "Invalid operation")]
    #[case::missing_amount(OperationRow { amount: None, ..row("deposit") }, "requires an amount")]
    #[case::blank_amount(OperationRow { amount: Some("  ".into()), ..row("withdraw") }, "requires an amount")]
    #[case::bad_amount(OperationRow { amount: Some("lots".into()), ..row("deposit") }, "Invalid amount")]
    #[case::missing_account(OperationRow { account: None, ..row("transfer") }, "'account'")]
    #[case::missing_tx(OperationRow { tx: None, ..row("approve") }, "'tx'")]
    fn test_convert_operation_row_errors(#[case] input: OperationRow, #[case] expected: &str) {
        let err = convert_operation_row(input).unwrap_err();
        assert!(err.contains(expected), "unexpected error: {}", err);
    }

    #[test]
    fn test_convert_account_row() {
        let draft = convert_account_row(AccountRow {
            account: Some(4),
            holder: "Alice".into(),
            kind: "current".into(),
            routing: Some(202020),
            balance: Some("500.00".into()),
            overdraft: Some("200".into()),
        })
        .unwrap();

        assert_eq!(draft.number, Some(4));
        assert_eq!(draft.kind, AccountKind::Current);
        assert_eq!(draft.routing_code, Some(202020));
        assert_eq!(draft.opening_balance, Decimal::new(50000, 2));
        assert_eq!(draft.overdraft_limit, Decimal::new(200, 0));
    }

    #[test]
    fn test_convert_account_row_defaults_and_errors() {
        let draft = convert_account_row(AccountRow {
            account: None,
            holder: "Bob".into(),
            kind: "Savings".into(),
            routing: None,
            balance: None,
            overdraft: Some("".into()),
        })
        .unwrap();
        assert_eq!(draft.number, None);
        assert_eq!(draft.opening_balance, Decimal::ZERO);

        let bad_kind = AccountRow {
            kind: "checking".into(),
            ..AccountRow {
                account: None,
                holder: "Bob".into(),
                kind: String::new(),
                routing: None,
                balance: None,
                overdraft: None,
            }
        };
        assert!(convert_account_row(bad_kind).is_err());
    }

    #[rstest]
    #[case::active(None, false)]
    #[case::blank(Some(""), false)]
    #[case::no(Some("false"), false)]
    #[case::yes(Some("TRUE"), true)]
    #[case::one(Some("1"), true)]
    fn test_convert_staff_row(#[case] flag: Option<&str>, #[case] suspended: bool) {
        let principal = convert_staff_row(StaffRow {
            staff: 5,
            username: " mark ".into(),
            role: "manager".into(),
            suspended: flag.map(str::to_string),
        })
        .unwrap();

        assert_eq!(principal.id, 5);
        assert_eq!(principal.username, "mark");
        assert_eq!(principal.role, Role::Manager);
        assert_eq!(principal.suspended, suspended);
    }

    #[test]
    fn test_convert_staff_row_rejects_unknown_role_and_flag() {
        let base = StaffRow {
            staff: 5,
            username: "x".into(),
            role: "auditor".into(),
            suspended: None,
        };
        assert!(convert_staff_row(base.clone()).is_err());
        assert!(convert_staff_row(StaffRow {
            role: "teller".into(),
            suspended: Some("maybe".into()),
            ..base
        })
        .is_err());
    }

    fn account(number: AccountId, kind: AccountKind, balance: i64, overdraft: i64) -> Account {
        Account::new(
            number,
            "Holder",
            kind,
            101010,
            Decimal::new(balance, 2),
            Decimal::new(overdraft, 2),
            Utc::now(),
        )
    }

    #[rstest]
    #[case::single_account(
        vec![account(1, AccountKind::Current, 50000, 20000)],
        "account,holder,kind,routing,balance,overdraft,available\n1,Holder,current,101010,500.00,200.00,700.00\n"
    )]
    #[case::overdrawn(
        vec![account(1, AccountKind::Current, -15000, 20000)],
        "account,holder,kind,routing,balance,overdraft,available\n1,Holder,current,101010,-150.00,200.00,50.00\n"
    )]
    #[case::sorted_by_number(
        vec![
            account(3, AccountKind::Savings, 0, 0),
            account(1, AccountKind::Savings, 0, 0),
            account(2, AccountKind::Savings, 0, 0),
        ],
        "account,holder,kind,routing,balance,overdraft,available\n1,Holder,savings,101010,0.00,0.00,0.00\n2,Holder,savings,101010,0.00,0.00,0.00\n3,Holder,savings,101010,0.00,0.00,0.00\n"
    )]
    #[case::empty_accounts(vec![], "account,holder,kind,routing,balance,overdraft,available\n")]
    fn test_write_accounts_csv(#[case] accounts: Vec<Account>, #[case] expected_output: &str) {
        let mut output = Vec::new();
        write_accounts_csv(&accounts, &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }

    #[test]
    fn test_write_journal_csv() {
        let external = TransactionDraft::external_transfer(1, 303030, Decimal::new(2500, 2), "rent, march", 7)
            .with_reference("ABCD")
            .into_record(1, Utc::now());

        let mut output = Vec::new();
        write_journal_csv(&[external], &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "tx,reference,kind,source,destination,routing,amount,status,created_by,resolved_by,created_at,resolved_at,description"
        );
        let line = lines.next().unwrap();
        assert!(line.starts_with("1,ABCD,transfer,1,,303030,25.00,approved,7,,"));
        assert!(line.ends_with(",,\"rent, march\""));
        assert!(lines.next().is_none());
    }
}
