use crate::{
    composite::{CompositeInputs, series::CompositeSeries},
    error::ConfluenceError,
};
use serde::{Deserialize, Serialize};

/// Correlation Composite Index: net rolling correlation of every tracked security against the
/// benchmark.
///
/// Values near `1.0` indicate a systemic co-movement regime, values near `0.0` a dispersed one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CorrelationCompositeIndex {
    pub net_correlation: CompositeSeries,
    /// Most recent defined net correlation.
    pub latest: f64,
}

impl CorrelationCompositeIndex {
    pub fn compute(inputs: CompositeInputs<'_>) -> Result<Self, ConfluenceError> {
        let net_correlation = inputs.net_correlation("correlation", inputs.universe.iter())?;

        let latest = net_correlation
            .latest()
            .map(|point| point.value)
            .ok_or_else(|| ConfluenceError::UndefinedComposite("correlation".to_string()))?;

        Ok(Self {
            net_correlation,
            latest,
        })
    }
}
