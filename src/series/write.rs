//! Save a resampled table to disk.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::WriterBuilder;
use tracing::info;

use crate::error::WriteError;

use super::{timestamp::OUTPUT_FORMAT, IntervalMinutes, TimeSeriesTable, TIMESTAMP};

/// `<YYYYMMDD>-<minutes>-min_<source file name>` inside `output_dir`.
pub fn make_output_file_name(
    output_dir: &Path,
    today: NaiveDate,
    target: IntervalMinutes,
    source: &Path,
) -> PathBuf {
    let base = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = format!("{}-{}-min_{}", today.format("%Y%m%d"), target.minutes(), base);

    output_dir.join(file_name)
}

/// Writes `table` with a header row, timestamp first.
pub fn write(table: &TimeSeriesTable, file_path: &Path) -> Result<PathBuf, WriteError> {
    let err = |source| WriteError {
        path: file_path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new().from_path(file_path).map_err(err)?;

    let mut header = vec![TIMESTAMP.to_string()];
    header.extend(table.columns().iter().cloned());
    writer.write_record(&header).map_err(err)?;

    for row in table.rows() {
        let mut record = vec![row.timestamp.format(OUTPUT_FORMAT).to_string()];
        record.extend(row.values.iter().map(|v| v.map(format_value).unwrap_or_default()));
        writer.write_record(&record).map_err(err)?;
    }

    writer.flush().map_err(|e| err(e.into()))?;
    info!(path = %file_path.display(), rows = table.len(), "Wrote table");

    Ok(file_path.to_path_buf())
}

/// Whole numbers keep a trailing `.0` so columns read back as floats.
pub fn format_value(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

// -- Tests -------------------------------------------------------------------
