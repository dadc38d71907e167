//! Sampling interval detection.

use std::collections::HashMap;
use std::fmt;

use chrono::Duration;
use tracing::debug;

use crate::error::IntervalError;

use super::TimeSeriesTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// The sampling intervals loggers are configured with.
pub enum IntervalMinutes {
    Five,
    Fifteen,
    Thirty,
    Sixty,
    Daily,
}

impl IntervalMinutes {
    pub const ALL: [IntervalMinutes; 5] = [
        IntervalMinutes::Five,
        IntervalMinutes::Fifteen,
        IntervalMinutes::Thirty,
        IntervalMinutes::Sixty,
        IntervalMinutes::Daily,
    ];

    pub fn minutes(&self) -> u32 {
        match self {
            IntervalMinutes::Five => 5,
            IntervalMinutes::Fifteen => 15,
            IntervalMinutes::Thirty => 30,
            IntervalMinutes::Sixty => 60,
            IntervalMinutes::Daily => 1440,
        }
    }

    pub fn from_minutes(minutes: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i64::from(i.minutes()) == minutes)
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }

    /// One-line description shown after detection.
    pub fn describe(&self) -> &'static str {
        match self {
            IntervalMinutes::Five => "This is a five-min file",
            IntervalMinutes::Fifteen => "This is a 15-min file",
            IntervalMinutes::Thirty => "This is a 30-min file",
            IntervalMinutes::Sixty => "This is a 60-min file",
            IntervalMinutes::Daily => "This is a Daily file",
        }
    }
}

impl fmt::Display for IntervalMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.minutes())
    }
}

/// Finds the sampling interval by majority vote over the gaps between
/// consecutive rows. Ties go to the shortest gap.
pub fn detect_interval(table: &TimeSeriesTable) -> Result<IntervalMinutes, IntervalError> {
    let rows = table.rows();
    if rows.len() < 2 {
        return Err(IntervalError::TooFewRows(rows.len()));
    }

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for pair in rows.windows(2) {
        let delta = pair[1].timestamp - pair[0].timestamp;
        *counts.entry(round_minutes(delta)).or_default() += 1;
    }

    let (mode, votes) = counts
        .into_iter()
        .max_by(|(a_min, a_n), (b_min, b_n)| a_n.cmp(b_n).then(b_min.cmp(a_min)))
        .ok_or(IntervalError::TooFewRows(rows.len()))?;
    debug!(mode, votes, "Detected modal interval");

    IntervalMinutes::from_minutes(mode).ok_or(IntervalError::Unsupported(mode))
}

fn round_minutes(delta: Duration) -> i64 {
    let seconds = delta.num_milliseconds() as f64 / 1000.0;
    (seconds / 60.0).round_ties_even() as i64
}

// -- Tests -------------------------------------------------------------------
