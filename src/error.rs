//! Errors raised while converting a logger file between intervals. Each
//! variant of [`ConvertError`] names the stage that failed.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("line {line} has {fields} fields, but the header has {expected}")]
    TooManyFields {
        line: u64,
        fields: usize,
        expected: usize,
    },
    #[error("missing {0} column")]
    MissingTimestamp(&'static str),
    #[error("no value columns besides {0}")]
    NoValueColumns(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum IntervalError {
    #[error("cannot infer an interval from {0} row(s)")]
    TooFewRows(usize),
    #[error("unsupported interval: {0} minutes")]
    Unsupported(i64),
    #[error("cannot convert a {current}-min file to a shorter {target}-min interval")]
    ShorterTarget { current: u32, target: u32 },
}

#[derive(Debug, Error, PartialEq)]
pub enum ResampleError {
    #[error("timestamps out of order at row {0}")]
    OutOfOrder(usize),
    #[error("no such column `{0}`")]
    UnknownColumn(String),
}

#[derive(Debug, Error)]
#[error("cannot write `{}`: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: csv::Error,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("load failed: {0}")]
    Load(#[from] LoadError),
    #[error("interval check failed: {0}")]
    Interval(#[from] IntervalError),
    #[error("resample failed: {0}")]
    Resample(#[from] ResampleError),
    #[error("write failed: {0}")]
    Write(#[from] WriteError),
    #[error("cannot list `{}`: {}", .0.display(), .1)]
    Listing(PathBuf, #[source] std::io::Error),
    #[error("no CSV files found in `{}`", .0.display())]
    NoFiles(PathBuf),
    #[error("selection failed: {0}")]
    Selection(#[source] std::io::Error),
    #[error("cancelled")]
    Cancelled,
}

impl ConvertError {
    /// Cancellation is a clean exit, everything else a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ConvertError::Cancelled)
    }
}

// -- Tests -------------------------------------------------------------------
