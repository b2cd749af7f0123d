use crate::{
    error::ConfluenceError,
    statistic::{regression::Regression, returns::PairedReturns},
};
use chrono::NaiveDate;
use confluence_instrument::security::name::SecurityName;
use derive_more::{Constructor, From};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use itertools::Itertools;
use tracing::{debug, warn};

/// Trailing span of return periods a beta / R-Squared is computed over.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct LookbackWindow {
    /// Human readable label reported alongside the result (eg/ "50").
    pub label: String,
    pub periods: usize,
}

impl LookbackWindow {
    /// Construct a `LookbackWindow` labelled with its number of periods.
    pub fn new(periods: usize) -> Self {
        Self {
            label: periods.to_string(),
            periods,
        }
    }
}

/// Beta and coefficient of determination of a security regressed on a benchmark.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
pub struct BetaRSquared {
    pub beta: f64,
    pub r_squared: f64,
}

/// [`BetaRSquared`] of one lookback window, as reported in the correlation table.
#[derive(Debug, Clone, PartialEq, PartialOrd, Deserialize, Serialize, Constructor)]
pub struct CorrelationResult {
    #[serde(rename = "period")]
    pub period_label: String,
    pub beta: f64,
    pub r_squared: f64,
}

/// Regresses the trailing `window` security returns on the same benchmark returns.
///
/// `beta` is the regression slope and `r_squared` its coefficient of determination.
///
/// # Errors
/// * [`ConfluenceError::MisalignedReturns`] - return series of differing length.
/// * [`ConfluenceError::InsufficientWindow`] - `window` spans fewer than 2 periods or exceeds the
///   available history.
/// * [`ConfluenceError::ZeroVariance`] - the benchmark returns are constant over the window, so
///   beta is undefined.
pub fn beta_and_r_squared(
    security_returns: &[f64],
    benchmark_returns: &[f64],
    window: usize,
) -> Result<BetaRSquared, ConfluenceError> {
    if security_returns.len() != benchmark_returns.len() {
        return Err(ConfluenceError::MisalignedReturns {
            security: security_returns.len(),
            benchmark: benchmark_returns.len(),
        });
    }

    let available = security_returns.len();
    if window < 2 || window > available {
        return Err(ConfluenceError::InsufficientWindow { window, available });
    }

    let start = available - window;
    let benchmark_returns = &benchmark_returns[start..];
    if benchmark_returns.iter().all_equal() {
        return Err(ConfluenceError::ZeroVariance { window });
    }

    let regression = Regression::ols(benchmark_returns, &security_returns[start..]);

    Ok(BetaRSquared {
        beta: regression.slope,
        r_squared: regression.r_squared,
    })
}

/// Computes a [`CorrelationResult`] for every lookback window, in the order provided.
///
/// Windows longer than the available history, or with a constant benchmark, are omitted rather
/// than reported as zero.
pub fn correlation_results(
    security: &SecurityName,
    returns: &PairedReturns,
    windows: &[LookbackWindow],
) -> Vec<CorrelationResult> {
    windows
        .iter()
        .filter_map(|window| {
            match beta_and_r_squared(&returns.security, &returns.benchmark, window.periods) {
                Ok(BetaRSquared { beta, r_squared }) => Some(CorrelationResult::new(
                    window.label.clone(),
                    beta,
                    r_squared,
                )),
                Err(error) if error.is_absent_data() => {
                    debug!(
                        %security,
                        window = %window.label,
                        %error,
                        "omitting correlation window"
                    );
                    None
                }
                Err(error) => {
                    warn!(
                        %security,
                        window = %window.label,
                        %error,
                        "omitting correlation window"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Pearson correlation coefficient of `x` and `y`, pairing samples by position.
///
/// Constant inputs follow the [`Regression::ols`] conventions.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    Regression::ols(x, y).correlation
}

/// Trailing `window` Pearson correlation of the security and benchmark returns, dated by the
/// last return period of each window.
///
/// Periods before the first full window are not produced.
pub fn rolling_correlation(returns: &PairedReturns, window: usize) -> Vec<(NaiveDate, f64)> {
    if window == 0 || window > returns.len() {
        return Vec::new();
    }

    (window..=returns.len())
        .map(|end| {
            let start = end - window;
            let correlation = pearson(
                &returns.benchmark[start..end],
                &returns.security[start..end],
            );
            (returns.dates[end - 1], correlation)
        })
        .collect()
}

/// Fund -> per window [`CorrelationResult`]s against the benchmark.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize, From)]
pub struct CorrelationTable(pub BTreeMap<SecurityName, Vec<CorrelationResult>>);

impl CorrelationTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, security: &SecurityName) -> Option<&[CorrelationResult]> {
        self.0.get(security).map(Vec::as_slice)
    }

    /// Window labels in the order they are reported, taken from the first fund with the most
    /// windows.
    pub fn period_labels(&self) -> Vec<String> {
        self.0
            .values()
            .rev()
            .max_by_key(|results| results.len())
            .map(|results| {
                results
                    .iter()
                    .map(|result| result.period_label.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}
