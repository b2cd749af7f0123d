use crate::{
    cluster::{
        curve::{ClusterCurve, SpreadPolicy},
        dates::{ClusterDate, extract_cluster_dates},
        filter::{DEFAULT_THRESHOLD, FilteredCurve, filter_curve},
    },
    error::ConfluenceError,
    signal::{IndicatorName, IndicatorSignals},
};
use confluence_instrument::security::Security;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Spreads weighted signal influence onto a per-period [`ClusterCurve`].
pub mod curve;

/// Thresholds a [`ClusterCurve`] into a sparse [`FilteredCurve`].
pub mod filter;

/// Projects a [`FilteredCurve`] onto dated [`ClusterDate`] trend markers.
pub mod dates;

/// Configuration of the per-security clustering pass.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Weight applied to indicators without an entry in `indicator_weights`.
    pub weight: f64,
    /// Minimum absolute score a period must reach to survive filtering.
    pub threshold: f64,
    pub policy: SpreadPolicy,
    pub indicator_weights: BTreeMap<IndicatorName, f64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            weight: 1.0,
            threshold: DEFAULT_THRESHOLD,
            policy: SpreadPolicy::default(),
            indicator_weights: BTreeMap::new(),
        }
    }
}

impl ClusterConfig {
    /// Weights must be positive so bullish signals always pull the score negative, and the
    /// threshold must be a non-negative number.
    pub fn validate(&self) -> Result<(), ConfluenceError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfluenceError::Config(format!(
                "cluster threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }

        if !is_positive_weight(self.weight) {
            return Err(ConfluenceError::Config(format!(
                "cluster weight must be a positive number, got {}",
                self.weight
            )));
        }

        if let Some((indicator, weight)) = self
            .indicator_weights
            .iter()
            .find(|(_, weight)| !is_positive_weight(**weight))
        {
            return Err(ConfluenceError::Config(format!(
                "indicator {indicator} weight must be a positive number, got {weight}"
            )));
        }

        Ok(())
    }

    pub fn weight_of(&self, indicator: &IndicatorName) -> f64 {
        self.indicator_weights
            .get(indicator)
            .copied()
            .unwrap_or(self.weight)
    }
}

fn is_positive_weight(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

/// Clustered oscillator output of a single security.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ClusteredOscillator {
    pub curve: ClusterCurve,
    pub filtered: FilteredCurve,
    pub dates: Vec<ClusterDate>,
}

/// Runs the full clustering pass for one [`Security`]: build the curve from every indicator's
/// signals, filter it, then extract the dated trend markers.
///
/// Indicators are folded in ascending name order, each with its configured weight, and each
/// indicator's events in `(period_index, indicator)` order, so the result does not depend on
/// the order the signals were supplied in.
///
/// Any event addressing a period outside the security's history aborts the security with
/// [`ConfluenceError::MalformedSignal`]. An invalid [`ClusterConfig`] is rejected with
/// [`ConfluenceError::Config`].
pub fn cluster_security(
    security: &Security,
    indicators: &[IndicatorSignals],
    config: &ClusterConfig,
) -> Result<ClusteredOscillator, ConfluenceError> {
    config.validate()?;

    let length = security.len();

    let mut ordered = indicators.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| a.indicator.cmp(&b.indicator));

    let curve = ordered.into_iter().try_fold(
        ClusterCurve::zeroed(length),
        |mut curve, signals| {
            signals.events.validate(length)?;
            curve.accumulate(
                &signals.events.sorted(),
                config.weight_of(&signals.indicator),
                config.policy,
            );
            Ok::<_, ConfluenceError>(curve)
        },
    )?;

    let filtered = filter_curve(&curve, config.threshold);
    let dates = extract_cluster_dates(&filtered, security)?;

    debug!(
        security = %security.name,
        periods = length,
        indicators = indicators.len(),
        cluster_dates = dates.len(),
        "clustered security signals"
    );

    Ok(ClusteredOscillator {
        curve,
        filtered,
        dates,
    })
}
