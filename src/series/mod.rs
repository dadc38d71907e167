//! Timestamped logger tables and the operations that convert them between
//! sampling intervals.

pub mod aggregation;
pub mod interval;
pub mod load;
pub mod resample;
pub mod timestamp;
pub mod write;

use chrono::NaiveDateTime;

pub use aggregation::{build_aggregation_policy, AggregationPolicy};
pub use interval::{detect_interval, IntervalMinutes};
pub use load::load;
pub use resample::resample;
pub use write::{make_output_file_name, write};

/// Name of the column holding the sample time.
pub const TIMESTAMP: &str = "TIMESTAMP";

/// Name of the station identifier column, dropped on load.
pub const STATION: &str = "STATION";

/// One sample: a wall-clock time and one value per value column.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub timestamp: NaiveDateTime,
    pub values: Vec<Option<f64>>,
}

impl Row {
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A table of samples. `columns` names the value columns in file order; the
/// timestamp column is implicit and always first when written.
pub struct TimeSeriesTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TimeSeriesTable {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        TimeSeriesTable { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Values of a single column, in row order.
    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }
}

// -- Test fixtures -----------------------------------------------------------


#[cfg(test)]
mod test {
    use super::fixture::*;

    #[test]
    fn should_get_column_values() {
        let t = table("TempAvg", &[("2024-01-01 00:00:00", 1.0), ("2024-01-01 00:05:00", 2.0)]);

        assert_eq!(t.column("TempAvg"), Some(vec![Some(1.0), Some(2.0)]));
        assert_eq!(t.column("RainTot"), None);
        assert_eq!(t.len(), 2);
    }
}
