//! Downsampling to a coarser interval.
//!
//! Windows are right-closed and right-labelled with edges counted from
//! midnight of the first sample's day: a sample at `t` falls in the window
//! `(e - width, e]` for the first edge `e >= t`, and the window is stamped
//! `e`. A sample exactly on an edge therefore closes that window.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::error::ResampleError;

use super::{AggregationPolicy, IntervalMinutes, Row, TimeSeriesTable};

/// Aggregates `table` into `target` windows using `policy` per column. Every
/// window between the first and last occupied one is emitted; columns with
/// no samples in a window are missing there.
pub fn resample(
    table: &TimeSeriesTable,
    target: IntervalMinutes,
    policy: &AggregationPolicy,
) -> Result<TimeSeriesTable, ResampleError> {
    let columns = table.columns();
    let aggregations = columns
        .iter()
        .map(|c| policy.get(c).ok_or_else(|| ResampleError::UnknownColumn(c.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let unknown = policy
        .iter()
        .map(|(name, _)| name)
        .find(|name| !columns.iter().any(|c| c == name));
    if let Some(name) = unknown {
        return Err(ResampleError::UnknownColumn(name.to_string()));
    }

    let rows = table.rows();
    if let Some(i) = rows.windows(2).position(|p| p[1].timestamp < p[0].timestamp) {
        return Err(ResampleError::OutOfOrder(i + 1));
    }

    let Some(first) = rows.first() else {
        return Ok(TimeSeriesTable::new(columns.to_vec(), Vec::new()));
    };

    let width = target.duration();
    let anchor = first.timestamp.date().and_time(NaiveTime::MIN);

    // Present values per column, for occupied windows only.
    let mut buckets: BTreeMap<i64, Vec<Vec<f64>>> = BTreeMap::new();
    for row in rows {
        let bucket = buckets
            .entry(window_index(row.timestamp, anchor, width))
            .or_insert_with(|| vec![Vec::new(); aggregations.len()]);
        for (col, value) in row.values.iter().enumerate() {
            if let Some(v) = value {
                bucket[col].push(*v);
            }
        }
    }

    let mut resampled = Vec::new();
    let mut next = None;
    for (idx, bucket) in &buckets {
        // Gaps between occupied windows become all-missing rows.
        for gap in next.unwrap_or(*idx)..*idx {
            resampled.push(Row {
                timestamp: window_label(anchor, width, gap),
                values: vec![None; aggregations.len()],
            });
        }
        resampled.push(Row {
            timestamp: window_label(anchor, width, *idx),
            values: bucket
                .iter()
                .zip(&aggregations)
                .map(|(values, agg)| agg.apply(values).map(round3))
                .collect(),
        });
        next = Some(idx + 1);
    }

    debug!(
        input = rows.len(),
        occupied = buckets.len(),
        output = resampled.len(),
        target = target.minutes(),
        "Resampled table"
    );

    Ok(TimeSeriesTable::new(columns.to_vec(), resampled))
}

/// Index of the window holding `t`: the number of window widths from
/// `anchor` to the first edge at or after `t`.
fn window_index(t: NaiveDateTime, anchor: NaiveDateTime, width: Duration) -> i64 {
    let offset = (t - anchor).num_milliseconds();
    let step = width.num_milliseconds();

    offset.div_euclid(step) + i64::from(offset.rem_euclid(step) != 0)
}

/// Right edge of window `idx`, which is also its label.
fn window_label(anchor: NaiveDateTime, width: Duration, idx: i64) -> NaiveDateTime {
    anchor + Duration::milliseconds(idx * width.num_milliseconds())
}

/// Rounds to 3 decimal places, ties to even.
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round_ties_even() / 1000.0
}

// -- Tests -------------------------------------------------------------------
