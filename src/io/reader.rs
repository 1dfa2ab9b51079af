//! Streaming CSV reader with iterator interface
//!
//! Provides a streaming iterator over typed rows from a CSV file. Each row is
//! deserialized into its raw row type and then converted with one of the
//! functions in [`csv_format`](crate::io::csv_format).
//!
//! # Iterator Interface
//!
//! `CsvReader` implements the Iterator trait, yielding `Result<T, String>`
//! for each CSV row:
//!
//! ```no_run
//! use bank_ledger_engine::io::reader;
//! use std::path::Path;
//!
//! let operations = reader::operations(Path::new("operations.csv")).unwrap();
//! for result in operations {
//!     match result {
//!         Ok(command) => println!("Replaying: {:?}", command),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging

use crate::io::csv_format::{
    convert_account_row, convert_operation_row, convert_staff_row, AccountRow, Command,
    OperationRow, StaffRow,
};
use crate::types::{AccountDraft, Principal};
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;

/// Streaming CSV reader converting rows of type `R` into values of type `T`
#[derive(Debug)]
pub struct CsvReader<R, T> {
    reader: csv::Reader<File>,
    convert: fn(R) -> Result<T, String>,
    line_num: usize,
    _row: PhantomData<R>,
}

impl<R: DeserializeOwned, T> CsvReader<R, T> {
    /// Open a CSV file for streaming iteration
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (trailing optional columns may be omitted)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    /// * `convert` - Conversion applied to every deserialized row
    ///
    /// # Returns
    ///
    /// * `Ok(CsvReader)` if file opened successfully
    /// * `Err(String)` if file could not be opened
    pub fn new(path: &Path, convert: fn(R) -> Result<T, String>) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            convert,
            line_num: 0,
            _row: PhantomData,
        })
    }
}

impl<R: DeserializeOwned, T> Iterator for CsvReader<R, T> {
    type Item = Result<T, String>;

    /// Get the next converted row
    ///
    /// # Returns
    ///
    /// * `Some(Ok(T))` - Successfully parsed and converted row
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<R>();
        let next = deserializer.next()?;

        self.line_num += 1;
        // +1 for the header row
        let line = self.line_num + 1;
        Some(match next {
            Ok(row) => (self.convert)(row).map_err(|e| format!("Line {}: {}", line, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}

/// Reader over an operations file
pub fn operations(path: &Path) -> Result<CsvReader<OperationRow, Command>, String> {
    CsvReader::new(path, convert_operation_row)
}

/// Reader over an accounts seed file
pub fn accounts(path: &Path) -> Result<CsvReader<AccountRow, AccountDraft>, String> {
    CsvReader::new(path, convert_account_row)
}

/// Reader over a staff file
pub fn staff(path: &Path) -> Result<CsvReader<StaffRow, Principal>, String> {
    CsvReader::new(path, convert_staff_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_format::Operation;
    use crate::types::{AccountKind, Role};
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    const HEADER: &str = "op,staff,account,destination,routing,amount,tx,description\n";

    #[test]
    fn test_reader_fails_on_missing_file() {
        let result = operations(Path::new("nonexistent.csv"));
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_operations_reader_iterates_rows() {
        let file = create_temp_csv(&format!(
            "{}deposit,1,1,,,100.0,,salary\ntransfer,1,1,,202020,5,,\napprove,2,,,,,1,\n",
            HEADER
        ));

        let commands: Vec<_> = operations(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0].operation,
            Operation::Deposit {
                account: 1,
                amount: Decimal::new(1000, 1),
                description: "salary".into()
            }
        );
        assert!(matches!(
            commands[1].operation,
            Operation::Transfer {
                destination: None,
                routing: Some(202020),
                ..
            }
        ));
        assert_eq!(commands[2].staff, Some(2));
        assert_eq!(commands[2].operation, Operation::Approve { tx: 1 });
    }

    #[test]
    fn test_reader_includes_line_numbers_and_continues() {
        let file = create_temp_csv(&format!(
            "{}deposit,1,1,,,100.0,,\ndeposit,1,1,,,invalid,,\ndeposit,1,notanumber,,,1,,\ndeposit,1,1,,,50.0,,\n",
            HEADER
        ));

        let records: Vec<_> = operations(file.path()).unwrap().collect();

        assert_eq!(records.len(), 4);
        assert!(records[0].is_ok());
        let conversion = records[1].as_ref().unwrap_err();
        assert!(conversion.contains("Line 3"));
        assert!(conversion.contains("Invalid amount"));
        let parse = records[2].as_ref().unwrap_err();
        assert!(parse.contains("Line 4"));
        assert!(parse.contains("CSV parse error"));
        assert!(records[3].is_ok());
    }

    #[test]
    fn test_reader_handles_whitespace_and_short_rows() {
        let file = create_temp_csv(&format!("{}  approve , 2 ,,,, , 7\n", HEADER));

        let records: Vec<_> = operations(file.path()).unwrap().collect();

        assert_eq!(records.len(), 1);
        let command = records[0].as_ref().unwrap();
        assert_eq!(command.staff, Some(2));
        assert_eq!(command.operation, Operation::Approve { tx: 7 });
    }

    #[test]
    fn test_reader_handles_empty_file_after_header() {
        let file = create_temp_csv(HEADER);
        assert_eq!(operations(file.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_accounts_and_staff_readers() {
        let accounts_file = create_temp_csv(
            "account,holder,kind,routing,balance,overdraft\n1,Alice,current,,500.00,200.00\n2,Bob,savings,202020,1000,\n",
        );
        let drafts: Vec<_> = accounts(accounts_file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].kind, AccountKind::Current);
        assert_eq!(drafts[1].routing_code, Some(202020));

        let staff_file =
            create_temp_csv("staff,username,role,suspended\n1,tina,teller,\n2,mark,manager,true\n");
        let principals: Vec<_> = staff(staff_file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(principals[0].role, Role::Teller);
        assert!(!principals[0].suspended);
        assert!(principals[1].suspended);
    }
}
