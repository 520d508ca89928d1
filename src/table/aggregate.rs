//! Reductions applied when rows are grouped together.

/// How a metric column is reduced when several rows collapse into one
///
/// **Public** - passed to GraphFrame::drop_index_levels
#[derive(Debug, Clone, Copy, Default)]
pub enum Aggregation {
    Sum,
    #[default]
    Mean,
    Min,
    Max,
    /// Keep the first value seen
    First,
    Custom(fn(&[f64]) -> f64),
}

impl Aggregation {
    /// Reduce a non-empty slice of values
    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Mean => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::First => values.first().copied().unwrap_or(0.0),
            Aggregation::Custom(f) => f(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_aggregations() {
        let values = [4.0, 1.0, 7.0];
        assert_eq!(Aggregation::Sum.apply(&values), 12.0);
        assert_eq!(Aggregation::Mean.apply(&values), 4.0);
        assert_eq!(Aggregation::Min.apply(&values), 1.0);
        assert_eq!(Aggregation::Max.apply(&values), 7.0);
        assert_eq!(Aggregation::First.apply(&values), 4.0);
    }

    #[test]
    fn test_custom_aggregation() {
        fn count(values: &[f64]) -> f64 {
            values.len() as f64
        }
        assert_eq!(Aggregation::Custom(count).apply(&[1.0, 2.0]), 2.0);
    }
}
