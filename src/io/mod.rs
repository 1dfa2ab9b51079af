//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV row formats, row conversion and output serialization
//! - `reader` - Streaming CSV reader with iterator interface

pub mod csv_format;
pub mod reader;

pub use csv_format::{
    convert_account_row, convert_operation_row, convert_staff_row, write_accounts_csv,
    write_journal_csv, AccountRow, Command, Operation, OperationRow, StaffRow,
};
pub use reader::CsvReader;
