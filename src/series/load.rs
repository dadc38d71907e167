//! Load a logger CSV into a cleaned, time-sorted table.

use std::{io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::LoadError;

use super::{timestamp::parse_timestamp, Row, TimeSeriesTable, STATION, TIMESTAMP};

/// Reads the file at `path`. Rows with an unreadable timestamp or without
/// any numeric value are dropped; the rest are sorted by time. Short rows
/// are padded with missing values, rows longer than the header are an error.
pub fn load(path: &Path) -> Result<TimeSeriesTable, LoadError> {
    let reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| read_error(path, source))?;

    load_from_reader(reader, path)
}

fn load_from_reader<R: Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
) -> Result<TimeSeriesTable, LoadError> {
    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| read_error(path, source))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let time_idx = headers
        .iter()
        .position(|h| h == TIMESTAMP)
        .ok_or(LoadError::MissingTimestamp(TIMESTAMP))?;

    let value_idx: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| *h != TIMESTAMP && *h != STATION)
        .map(|(i, _)| i)
        .collect();

    if value_idx.is_empty() {
        return Err(LoadError::NoValueColumns(TIMESTAMP));
    }

    let columns = value_idx.iter().map(|&i| headers[i].clone()).collect();

    let mut rows = Vec::new();
    let mut bad_time = 0;
    let mut empty = 0;

    for record in reader.records() {
        let record = record.map_err(|source| read_error(path, source))?;
        if record.len() > headers.len() {
            return Err(LoadError::TooManyFields {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                fields: record.len(),
                expected: headers.len(),
            });
        }

        let Some(timestamp) = record.get(time_idx).and_then(parse_timestamp) else {
            bad_time += 1;
            continue;
        };

        let row = Row {
            timestamp,
            values: parse_values(&record, &value_idx),
        };

        if row.is_empty() {
            empty += 1;
            continue;
        }

        rows.push(row);
    }

    debug!(
        path = %path.display(),
        kept = rows.len(),
        bad_time,
        empty,
        "Loaded table"
    );

    rows.sort_by_key(|r| r.timestamp);

    Ok(TimeSeriesTable::new(columns, rows))
}

fn parse_values(record: &StringRecord, value_idx: &[usize]) -> Vec<Option<f64>> {
    value_idx
        .iter()
        .map(|&i| record.get(i).and_then(parse_number))
        .collect()
}

// Anything that is not a number, including the loggers' "NAN", is missing.
fn parse_number(cell: &str) -> Option<f64> {
    cell.trim()
        .trim_matches('"')
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
}

fn read_error(path: &Path, source: csv::Error) -> LoadError {
    LoadError::Read {
        path: path.to_path_buf(),
        source,
    }
}

// -- Tests -------------------------------------------------------------------
