use crate::{cluster::filter::FilteredCurve, error::ConfluenceError};
use chrono::NaiveDate;
use confluence_instrument::{Dated, security::Security};
use serde::{Deserialize, Serialize};

/// Actionable trend marker: a non-zero [`FilteredCurve`] period projected onto the security's
/// date and close price.
#[derive(Debug, Clone, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct ClusterDate {
    pub date: NaiveDate,
    pub price: f64,
    pub score: f64,
    pub period_index: usize,
}

impl Dated for ClusterDate {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Projects every non-zero period of the [`FilteredCurve`] onto the [`Security`] bar at the same
/// period, in ascending period order.
///
/// Fails with [`ConfluenceError::MisalignedLength`] if the curve and the security do not have the
/// same number of periods.
pub fn extract_cluster_dates(
    curve: &FilteredCurve,
    security: &Security,
) -> Result<Vec<ClusterDate>, ConfluenceError> {
    if curve.len() != security.len() {
        return Err(ConfluenceError::MisalignedLength {
            security: security.name.clone(),
            expected: security.len(),
            actual: curve.len(),
        });
    }

    Ok(curve
        .non_zero()
        .filter_map(|(period_index, score)| {
            security.bar(period_index).map(|bar| ClusterDate {
                date: bar.date,
                price: bar.close,
                score,
                period_index,
            })
        })
        .collect())
}
