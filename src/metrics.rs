//! Load balance metrics.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Max / Min | Heaviest and lightest SAC load |
//! | Range | max - min |
//! | Mean | Average load |
//! | Disparity | (max - min) / max(max, 1) |

use std::collections::BTreeMap;

/// Normalized spread between the heaviest and lightest load.
///
/// The denominator is guarded with `max(max_load, 1)`.
pub fn disparity(max_load: f64, min_load: f64) -> f64 {
    (max_load - min_load) / max_load.max(1.0)
}

/// Load indicators over a set of SACs.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadKpi {
    /// Heaviest load.
    pub max: f64,
    /// Lightest load.
    pub min: f64,
    /// `max - min`.
    pub range: f64,
    /// Mean load.
    pub mean: f64,
    /// `(max - min) / max(max, 1)`.
    pub disparity: f64,
}

impl LoadKpi {
    /// Computes indicators from per-SAC loads. All zero for an empty map.
    pub fn calculate<V: Copy + Into<f64>>(loads: &BTreeMap<String, V>) -> Self {
        Self::from_values(loads.values().map(|&v| v.into()))
    }

    /// Computes indicators from raw load values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        for v in values {
            count += 1;
            sum += v;
            max = max.max(v);
            min = min.min(v);
        }
        if count == 0 {
            return Self {
                max: 0.0,
                min: 0.0,
                range: 0.0,
                mean: 0.0,
                disparity: 0.0,
            };
        }
        Self {
            max,
            min,
            range: max - min,
            mean: sum / count as f64,
            disparity: disparity(max, min),
        }
    }

    /// Whether the spread is within `threshold`.
    pub fn is_balanced(&self, threshold: f64) -> bool {
        self.disparity <= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disparity_guard() {
        assert!((disparity(10.0, 5.0) - 0.5).abs() < 1e-10);
        // Sub-unit max is guarded by the floor of 1.
        assert!((disparity(0.5, 0.0) - 0.5).abs() < 1e-10);
        assert!((disparity(0.0, 0.0) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_basic() {
        let loads: BTreeMap<String, u32> =
            BTreeMap::from([("s1".into(), 40), ("s2".into(), 20), ("s3".into(), 30)]);
        let kpi = LoadKpi::calculate(&loads);
        assert!((kpi.max - 40.0).abs() < 1e-10);
        assert!((kpi.min - 20.0).abs() < 1e-10);
        assert!((kpi.range - 20.0).abs() < 1e-10);
        assert!((kpi.mean - 30.0).abs() < 1e-10);
        assert!((kpi.disparity - 0.5).abs() < 1e-10);
        assert!(kpi.is_balanced(0.5));
        assert!(!kpi.is_balanced(0.49));
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = LoadKpi::calculate(&BTreeMap::<String, f64>::new());
        assert_eq!(kpi.range, 0.0);
        assert_eq!(kpi.disparity, 0.0);
        assert!(kpi.is_balanced(0.0));
    }
}
