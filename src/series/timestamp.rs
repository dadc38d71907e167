//! Timestamp parsing.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Layout written to every output file.
pub const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Month-first layouts come before `%Y/%m/%d`, and two-digit years before
// four-digit ones: `%Y` also accepts "06" or "24".
const DATETIME_FORMATS: [&str; 12] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d"];

// Anything earlier came from a short year token read by `%Y`.
const MIN_YEAR: i32 = 1000;

/// Parses the timestamp layouts loggers are known to emit. Offsets are
/// dropped and the wall-clock time kept. Returns `None` for anything else.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .filter(|t| t.year() >= MIN_YEAR)
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| {
                    NaiveDate::parse_from_str(s, fmt)
                        .ok()
                        .filter(|d| d.year() >= MIN_YEAR)
                })
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Datetime layouts of raw logger exports.
pub enum RawLayout {
    /// Meteorological loggers, e.g. `2024-06-01 13:05:00`.
    Met,
    /// Beta attenuation monitors, e.g. `06/01/24 13:05`.
    Bam,
}

impl RawLayout {
    pub fn format(&self) -> &'static str {
        match self {
            RawLayout::Met => "%Y-%m-%d %H:%M:%S",
            RawLayout::Bam => "%m/%d/%y %H:%M",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RawLayout::Met => "met_fmt",
            RawLayout::Bam => "bam_fmt",
        }
    }

    /// Tries the known layouts in order against a sample cell.
    pub fn detect(sample: &str) -> Option<(RawLayout, NaiveDateTime)> {
        [RawLayout::Met, RawLayout::Bam].into_iter().find_map(|layout| {
            NaiveDateTime::parse_from_str(sample, layout.format())
                .ok()
                .map(|t| (layout, t))
        })
    }

    /// Strict parse with this layout, re-rendered as [`OUTPUT_FORMAT`].
    pub fn normalise(&self, cell: &str) -> Option<String> {
        NaiveDateTime::parse_from_str(cell, self.format())
            .ok()
            .map(|t| t.format(OUTPUT_FORMAT).to_string())
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, OUTPUT_FORMAT).unwrap()
    }

    #[test]
    fn should_parse_common_layouts() {
        let expected = at("2024-01-01 00:15:00");

        for s in [
            "2024-01-01 00:15:00",
            "2024-01-01T00:15:00",
            "2024-01-01 00:15",
            "\"2024-01-01 00:15:00\"",
            " 2024-01-01 00:15:00.000 ",
            "2024/01/01 00:15",
            "01/01/2024 00:15",
            "01/01/24 00:15",
            "2024-01-01T00:15:00+10:00",
        ] {
            assert_eq!(parse_timestamp(s), Some(expected), "{s}");
        }
    }

    #[test]
    fn should_read_month_first_two_digit_years() {
        for (s, expected) in [
            ("06/01/24 23:55", "2024-06-01 23:55:00"),
            ("06/02/24 00:00", "2024-06-02 00:00:00"),
            ("06/30/24 00:05", "2024-06-30 00:05:00"),
            ("12/31/99 12:00:30", "1999-12-31 12:00:30"),
        ] {
            assert_eq!(parse_timestamp(s), Some(at(expected)), "{s}");
        }
        assert_eq!(parse_timestamp("06/01/24"), Some(at("2024-06-01 00:00:00")));
    }

    #[test]
    fn should_reject_short_four_digit_year() {
        assert_eq!(parse_timestamp("24-01-01 00:00:00"), None);
    }

    #[test]
    fn should_parse_bare_date_as_midnight() {
        assert_eq!(parse_timestamp("2024-03-02"), Some(at("2024-03-02 00:00:00")));
    }

    #[test]
    fn should_reject_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("NAN"), None);
        assert_eq!(parse_timestamp("2024-13-01 00:00:00"), None);
    }

    #[test]
    fn should_detect_raw_layout() {
        let (layout, _) = RawLayout::detect("2024-06-01 13:05:00").unwrap();
        assert_eq!(layout, RawLayout::Met);

        let (layout, t) = RawLayout::detect("06/01/24 13:05").unwrap();
        assert_eq!(layout, RawLayout::Bam);
        assert_eq!(t, at("2024-06-01 13:05:00"));

        assert!(RawLayout::detect("1 June 2024").is_none());
    }

    #[test]
    fn should_normalise_strictly() {
        assert_eq!(
            RawLayout::Bam.normalise("06/01/24 13:05"),
            Some("2024-06-01 13:05:00".to_string())
        );
        assert_eq!(RawLayout::Bam.normalise("2024-06-01 13:05:00"), None);
    }
}
