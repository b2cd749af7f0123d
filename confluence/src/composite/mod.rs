use crate::{
    align::Alignment,
    cluster::ClusteredOscillator,
    composite::series::{CompositeSeries, Contribution, SecuritySeries, aggregate},
    error::ConfluenceError,
    statistic::{
        correlation::{CorrelationTable, rolling_correlation},
        returns::paired_returns,
    },
};
use confluence_instrument::{
    security::{Security, name::SecurityName},
    universe::Universe,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Calendar keyed [`SecuritySeries`] and the mean based [`aggregate`] combination policy.
pub mod series;

/// Market Composite Index (MCI) over the equity population.
pub mod market;

/// Bond Composite Index (BCI) per [`BondCategory`](confluence_instrument::security::BondCategory)
/// and combined.
pub mod bond;

/// Correlation Composite Index (CCI) of net correlation against the benchmark.
pub mod correlation;

/// Type Composite Index (TCI) over security cohorts.
pub mod cohort;

/// [`CompositeMetrics`](metrics::CompositeMetrics) of every composite index, with undefined
/// composites marked explicitly.
pub mod metrics;

/// Per-security value fed into the trend composites.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    /// Thresholded cluster score, where periods without consensus contribute `0.0`.
    #[default]
    FilteredCluster,
    /// Cluster score before thresholding.
    RawCluster,
}

impl TrendMetric {
    pub fn values<'a>(&self, oscillator: &'a ClusteredOscillator) -> &'a [f64] {
        match self {
            TrendMetric::FilteredCluster => oscillator.filtered.values(),
            TrendMetric::RawCluster => oscillator.curve.values(),
        }
    }
}

/// Configuration of the composite index stage.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CompositeConfig {
    pub metric: TrendMetric,
    /// Weight applied per security category (eg/ "equity", "bond_treasury", "cohort_growth").
    /// Categories without an entry are weighted `1.0`.
    pub category_weights: BTreeMap<String, f64>,
}

/// Read-only inputs shared by every composite index builder.
///
/// Only securities present in `oscillators` (ie/ those whose per-security stage succeeded)
/// contribute to any composite.
#[derive(Debug, Clone, Copy)]
pub struct CompositeInputs<'a> {
    pub universe: &'a Universe,
    pub alignment: &'a Alignment,
    pub oscillators: &'a BTreeMap<SecurityName, ClusteredOscillator>,
    pub correlations: &'a CorrelationTable,
    pub benchmark: Option<&'a Security>,
    pub rolling_window: usize,
    pub config: &'a CompositeConfig,
}

impl<'a> CompositeInputs<'a> {
    /// Filters the provided securities down to those with a [`ClusteredOscillator`].
    pub fn analysed<Iter>(self, securities: Iter) -> impl Iterator<Item = &'a Security>
    where
        Iter: IntoIterator<Item = &'a Security>,
    {
        securities
            .into_iter()
            .filter(move |security| self.oscillators.contains_key(&security.name))
    }

    /// Projects the configured [`TrendMetric`] of each analysed security onto the composite
    /// calendar.
    pub fn trend_contributions<Iter>(
        &self,
        securities: Iter,
    ) -> Result<BTreeMap<SecurityName, Contribution>, ConfluenceError>
    where
        Iter: IntoIterator<Item = &'a Security>,
    {
        securities
            .into_iter()
            .filter_map(|security| {
                self.oscillators
                    .get(&security.name)
                    .map(|oscillator| (security, oscillator))
            })
            .map(|(security, oscillator)| {
                let series = self
                    .alignment
                    .project(&security.name, self.config.metric.values(oscillator))?;

                Ok::<_, ConfluenceError>((
                    security.name.clone(),
                    Contribution {
                        category: security.kind.to_string(),
                        series,
                    },
                ))
            })
            .collect()
    }

    /// Category weighted mean of the analysed securities' trend metric.
    pub fn trend_index<Iter>(
        &self,
        name: &str,
        securities: Iter,
    ) -> Result<CompositeSeries, ConfluenceError>
    where
        Iter: IntoIterator<Item = &'a Security>,
    {
        let contributions = self.trend_contributions(securities)?;
        aggregate(
            name,
            &self.alignment.calendar,
            &contributions,
            &self.config.category_weights,
        )
    }

    /// Mean rolling correlation of the analysed securities' returns against the benchmark.
    ///
    /// Each security contributes from the end of its first full `rolling_window` onwards. The
    /// benchmark itself never contributes.
    pub fn net_correlation<Iter>(
        &self,
        name: &str,
        securities: Iter,
    ) -> Result<CompositeSeries, ConfluenceError>
    where
        Iter: IntoIterator<Item = &'a Security>,
    {
        let benchmark = self.benchmark.ok_or_else(|| {
            ConfluenceError::EmptyInput(format!("composite {name} requires a benchmark security"))
        })?;

        let contributions = self
            .analysed(securities)
            .filter(|security| security.name != benchmark.name)
            .map(|security| {
                let series = rolling_correlation(
                    &paired_returns(security, benchmark),
                    self.rolling_window,
                )
                .into_iter()
                .filter_map(|(date, correlation)| {
                    self.alignment
                        .calendar
                        .position(date)
                        .map(|composite_index| (composite_index, correlation))
                })
                .collect::<SecuritySeries>();

                (
                    security.name.clone(),
                    Contribution {
                        category: security.kind.to_string(),
                        series,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        aggregate(name, &self.alignment.calendar, &contributions, &BTreeMap::new())
    }
}


#[cfg(test)]
mod tests {
    use super::{test_utils::Fixture, *};
    use crate::signal::{IndicatorSignals, test_utils::bullish};
    use approx::assert_relative_eq;
    use confluence_instrument::test_utils::{benchmark, date, equity, flat_closes};

    #[test]
    fn test_trend_contributions_skip_failed_securities() {
        let mut fixture = Fixture::new(
            vec![
                equity("XLK", date(2020, 1, 1), &flat_closes(6)),
                equity("XLE", date(2020, 1, 3), &flat_closes(4)),
            ],
            BTreeMap::from([("XLE", vec![IndicatorSignals::new("rsi", [bullish("rsi", 1)])])]),
            2,
        );
        fixture.oscillators.remove(&SecurityName::new("XLK"));

        let inputs = fixture.inputs();
        let actual = inputs.trend_contributions(fixture.universe.equities()).unwrap();

        assert_eq!(actual.len(), 1);
        let contribution = &actual[&SecurityName::new("XLE")];
        assert_eq!(contribution.category, "equity");
        // XLE listed 2 days after XLK, so local index 1 is composite index 3
        assert_eq!(
            contribution.series,
            SecuritySeries::from_iter([(2, 0.0), (3, -8.0), (4, 0.0), (5, 0.0)])
        );
    }

    #[test]
    fn test_trend_contributions_raw_cluster_metric() {
        let mut fixture = Fixture::new(
            vec![equity("XLK", date(2020, 1, 1), &flat_closes(3))],
            BTreeMap::from([(
                "XLK",
                vec![IndicatorSignals::new("rsi", [bullish("rsi", 0)])],
            )]),
            2,
        );
        fixture.config.metric = TrendMetric::RawCluster;
        fixture.oscillators.get_mut(&SecurityName::new("XLK")).unwrap().curve.0[1] = -4.0;

        let inputs = fixture.inputs();
        let actual = inputs.trend_contributions(fixture.universe.equities()).unwrap();

        assert_eq!(
            actual[&SecurityName::new("XLK")].series,
            SecuritySeries::from_iter([(0, -8.0), (1, -4.0), (2, 0.0)])
        );
    }

    #[test]
    fn test_net_correlation_excludes_benchmark() {
        let closes = [100.0, 101.0, 99.0, 102.0, 104.0, 103.0];
        let fixture = Fixture::new(
            vec![
                benchmark("^GSPC", date(2020, 1, 1), &closes),
                equity("SPY", date(2020, 1, 1), &closes),
            ],
            BTreeMap::new(),
            3,
        );

        let inputs = fixture.inputs();
        let actual = inputs
            .net_correlation("cci", fixture.universe.iter())
            .unwrap();

        // 5 returns, first full window of 3 ends at composite index 3
        assert_eq!(actual.points.keys().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        for (_, value) in actual.values() {
            assert_relative_eq!(value, 1.0, epsilon = 1e-12);
        }
        assert!(
            actual
                .points
                .values()
                .all(|point| point.contributors == vec![SecurityName::new("SPY")])
        );
    }

    #[test]
    fn test_net_correlation_requires_benchmark() {
        let fixture = Fixture::new(
            vec![equity("SPY", date(2020, 1, 1), &flat_closes(5))],
            BTreeMap::new(),
            2,
        );

        let inputs = fixture.inputs();
        assert!(matches!(
            inputs.net_correlation("cci", fixture.universe.iter()),
            Err(ConfluenceError::EmptyInput(_))
        ));
    }
}
