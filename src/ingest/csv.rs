//! Decodes CSV bank statements into ingest rows.
//!
//! The expected header is `account_no,date,category,amount,description` with
//! dates formatted as `YYYY-MM-DD`. Decoding mirrors the ingest pipeline's
//! per-row error policy: a malformed row is reported alongside the rows that
//! parsed, instead of failing the whole file.

use std::io::Read;

use csv::StringRecord;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, ingest::IngestRow};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

const EXPECTED_HEADER: [&str; 5] = ["account_no", "date", "category", "amount", "description"];

/// One CSV line and the outcome of parsing it.
#[derive(Debug, PartialEq)]
pub struct RowRecord {
    /// The 1-based line the row came from, counting the header as line 1.
    pub line: usize,
    /// The parsed row, or why the line could not be parsed.
    pub parsed: Result<IngestRow, Error>,
}

/// Decode statement rows from the CSV in `reader`.
///
/// Rows come back in file order with per-row parse outcomes; a malformed row
/// never hides the rows around it.
///
/// # Errors
/// This function will return [Error::InvalidCSV] if the header is missing or
/// wrong, or if the stream itself cannot be read.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RowRecord>, Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let header = csv_reader
        .headers()
        .map_err(|error| Error::InvalidCSV(error.to_string()))?;

    if *header != EXPECTED_HEADER[..] {
        return Err(Error::InvalidCSV(format!(
            "expected header {:?} but got {header:?}",
            EXPECTED_HEADER.join(",")
        )));
    }

    let mut rows = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        // Line 1 is the header, so data rows start at line 2.
        let line = index + 2;

        let parsed = record
            .map_err(|error| Error::InvalidCSV(error.to_string()))
            .and_then(|record| parse_record(&record));

        rows.push(RowRecord { line, parsed });
    }

    Ok(rows)
}

fn parse_record(record: &StringRecord) -> Result<IngestRow, Error> {
    if record.len() != EXPECTED_HEADER.len() {
        return Err(Error::InvalidCSV(format!(
            "expected {} fields but got {}",
            EXPECTED_HEADER.len(),
            record.len()
        )));
    }

    let date = Date::parse(&record[1], DATE_FORMAT)
        .map_err(|error| Error::InvalidCSV(format!("invalid date {:?}: {error}", &record[1])))?;

    let amount: f64 = record[3]
        .parse()
        .map_err(|_| Error::InvalidCSV(format!("invalid amount {:?}", &record[3])))?;

    let category = match record[2].trim() {
        "" => None,
        name => Some(name.to_string()),
    };

    Ok(IngestRow {
        account_no: record[0].to_string(),
        timestamp: date.midnight().assume_utc(),
        amount,
        description: record[4].to_string(),
        category,
    })
}
