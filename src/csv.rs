use serde::Serialize;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::{AccountId, Amount, Invocation, LedgerRecord};

/// Errors that can occur when reading invocation rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: u64, source: csv::Error },

    #[error("line {line}: missing operation")]
    MissingOperation { line: u64 },
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    account: &'a AccountId,
    balance: Amount,
    last_operation: &'static str,
    last_amount: Amount,
    timestamp: &'a str,
    counterparty: &'a AccountId,
}

/// Read invocations from a csv file.
///
/// Each row is `operation,arg1,arg2,...` with no header; rows may have any width.
///
/// The returned iterator captures the type of `path`: pass an owned path when
/// the iterator must be `'static`, e.g. to move it into a spawned task.
pub fn read_invocations(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Invocation, CsvError>>, CsvError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;

    Ok(reader.into_records().map(|result| {
        let record = result.map_err(|source| CsvError::Parse {
            line: source.position().map_or(0, |pos| pos.line()),
            source,
        })?;
        let line = record.position().map_or(0, |pos| pos.line());

        let mut fields = record.iter();
        let operation = fields
            .next()
            .filter(|op| !op.is_empty())
            .ok_or(CsvError::MissingOperation { line })?;

        Ok(Invocation::new(operation, fields))
    }))
}

/// Write account records to `writer` in csv format
pub fn write_records<'a, W: io::Write>(
    writer: W,
    records: impl IntoIterator<Item = &'a LedgerRecord>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for record in records {
        writer.serialize(OutputRow {
            account: &record.account,
            balance: record.balance,
            last_operation: record.last_operation.name(),
            last_amount: record.last_amount,
            timestamp: &record.timestamp,
            counterparty: &record.counterparty,
        })?;
    }

    writer.flush()?;
    Ok(())
}
