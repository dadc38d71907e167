//! Per-column aggregation, chosen from the logger's column naming scheme.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Mean,
    Max,
    Min,
    Sum,
}

impl Aggregation {
    /// Applies the operator to the present values. `None` when there are none.
    pub fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }

        let result = match self {
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Sum => values.iter().sum(),
        };

        Some(result)
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregation::Mean => "mean",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
            Aggregation::Sum => "sum",
        };
        f.write_str(name)
    }
}

type Rule = (fn(&str) -> bool, Aggregation);

// First match wins. The wind and sigma rules exclude names ending in the
// trailing characters of their companion columns.
const RULES: [Rule; 6] = [
    (|c: &str| c.ends_with("Avg"), Aggregation::Mean),
    (|c: &str| c.ends_with("Max"), Aggregation::Max),
    (|c: &str| c.ends_with("Min"), Aggregation::Min),
    (|c: &str| c.ends_with("Tot"), Aggregation::Sum),
    (|c: &str| c.starts_with('W') && !c.ends_with(['n', 'x']), Aggregation::Mean),
    (|c: &str| c.starts_with('S') && !c.ends_with(['n', 'x', 'g']), Aggregation::Mean),
];

/// Picks the operator for a single column name.
pub fn aggregation_for(column: &str) -> Aggregation {
    RULES
        .iter()
        .find(|(matches, _)| matches(column))
        .map(|(_, agg)| *agg)
        .unwrap_or(Aggregation::Mean)
}

#[derive(Debug, Clone, PartialEq)]
/// Column name to operator, in column order.
pub struct AggregationPolicy {
    entries: Vec<(String, Aggregation)>,
}

impl AggregationPolicy {
    pub fn get(&self, column: &str) -> Option<Aggregation> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, agg)| *agg)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Aggregation)> {
        self.entries.iter().map(|(name, agg)| (name.as_str(), *agg))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn build_aggregation_policy<S: AsRef<str>>(columns: &[S]) -> AggregationPolicy {
    let entries = columns
        .iter()
        .map(|c| (c.as_ref().to_string(), aggregation_for(c.as_ref())))
        .collect();

    AggregationPolicy { entries }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_build_policy_from_suffixes() {
        let policy = build_aggregation_policy(&["WindAvg", "GustMax", "RainTot", "SigmaTheta"]);

        assert_eq!(policy.len(), 4);
        assert_eq!(policy.get("WindAvg"), Some(Aggregation::Mean));
        assert_eq!(policy.get("GustMax"), Some(Aggregation::Max));
        assert_eq!(policy.get("RainTot"), Some(Aggregation::Sum));
        assert_eq!(policy.get("SigmaTheta"), Some(Aggregation::Mean));
        assert_eq!(policy.get("Missing"), None);
    }

    #[test]
    fn should_apply_suffix_rules_before_prefix_rules() {
        assert_eq!(aggregation_for("WS_Max"), Aggregation::Max);
        assert_eq!(aggregation_for("SolarMin"), Aggregation::Min);
        assert_eq!(aggregation_for("WRainTot"), Aggregation::Sum);
        assert_eq!(aggregation_for("AirTC_Avg"), Aggregation::Mean);
    }

    #[test]
    fn should_default_to_mean() {
        for name in ["WD_Std", "Wn", "Wx", "Sn", "Sx", "Sg", "BattV", "W", "S", ""] {
            assert_eq!(aggregation_for(name), Aggregation::Mean, "{name}");
        }
    }

    #[test]
    fn should_keep_column_order() {
        let policy = build_aggregation_policy(&["b", "a"]);
        let names: Vec<&str> = policy.iter().map(|(n, _)| n).collect();

        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn should_apply_operators() {
        let v = [3.0, 1.0, 2.0];

        assert_eq!(Aggregation::Mean.apply(&v), Some(2.0));
        assert_eq!(Aggregation::Max.apply(&v), Some(3.0));
        assert_eq!(Aggregation::Min.apply(&v), Some(1.0));
        assert_eq!(Aggregation::Sum.apply(&v), Some(6.0));
    }

    #[test]
    fn should_not_sum_empty_window_to_zero() {
        assert_eq!(Aggregation::Sum.apply(&[]), None);
        assert_eq!(Aggregation::Mean.apply(&[]), None);
    }
}
