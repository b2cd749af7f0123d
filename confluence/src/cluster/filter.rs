use crate::cluster::curve::ClusterCurve;
use serde::{Deserialize, Serialize};

/// Default magnitude a [`ClusterCurve`] value must reach to survive [`filter_curve`].
pub const DEFAULT_THRESHOLD: f64 = 7.0;

/// [`ClusterCurve`] with every value inside `(-threshold, threshold)` zeroed.
#[derive(Debug, Clone, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
pub struct FilteredCurve(pub Vec<f64>);

impl FilteredCurve {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Iterator over `(period_index, score)` of every non-zero period, in period order.
    pub fn non_zero(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, score)| *score != 0.0)
    }

    /// Re-apply filtering with the provided threshold.
    pub fn refilter(&self, threshold: f64) -> Self {
        Self(filtered_values(&self.0, threshold))
    }
}

impl From<FilteredCurve> for ClusterCurve {
    fn from(value: FilteredCurve) -> Self {
        ClusterCurve(value.0)
    }
}

/// Zeroes every curve value whose absolute magnitude is below `threshold`, leaving a sparse
/// trend signal. Values exactly at `±threshold` survive.
pub fn filter_curve(curve: &ClusterCurve, threshold: f64) -> FilteredCurve {
    FilteredCurve(filtered_values(curve.values(), threshold))
}

fn filtered_values(values: &[f64], threshold: f64) -> Vec<f64> {
    values
        .iter()
        .map(|value| {
            if *value > -threshold && *value < threshold {
                0.0
            } else {
                *value
            }
        })
        .collect()
}
