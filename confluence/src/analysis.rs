use crate::{
    align::align,
    cluster::{ClusteredOscillator, cluster_security},
    composite::{CompositeInputs, metrics::CompositeMetrics},
    config::ConfluenceConfig,
    error::ConfluenceError,
    signal::{IndicatorSignals, RecentSignal, recent_signals},
    statistic::{
        correlation::{CorrelationResult, CorrelationTable, correlation_results},
        returns::paired_returns,
    },
};
use confluence_instrument::{
    security::{DatesCovered, Security, SecurityKind, name::SecurityName},
    universe::Universe,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Per-security output of an analysis run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SecurityAnalysis {
    pub name: SecurityName,
    pub kind: SecurityKind,
    pub dates_covered: Option<DatesCovered>,
    pub clustered_osc: ClusteredOscillator,
    pub recent_signals: Vec<RecentSignal>,
    /// Beta and R-Squared against the benchmark for every lookback window with enough history.
    /// Empty for the benchmark itself.
    pub correlations: Vec<CorrelationResult>,
}

/// Output of an [`Analyser::run`].
///
/// A security appears in exactly one of `securities` or `failures`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Analysis {
    pub securities: BTreeMap<SecurityName, SecurityAnalysis>,
    pub failures: BTreeMap<SecurityName, ConfluenceError>,
    pub metrics: CompositeMetrics,
}

impl Analysis {
    /// [`CorrelationTable`] of every successfully analysed, non-benchmark security.
    pub fn correlation_table(&self) -> CorrelationTable {
        CorrelationTable(
            self.securities
                .iter()
                .filter(|(_, analysis)| analysis.kind != SecurityKind::Benchmark)
                .map(|(name, analysis)| (name.clone(), analysis.correlations.clone()))
                .collect(),
        )
    }
}

/// Runs the clustering, correlation and composite stages over a [`Universe`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Analyser {
    config: ConfluenceConfig,
}

impl Analyser {
    pub fn new(config: ConfluenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConfluenceConfig {
        &self.config
    }

    /// Resolves the configured benchmark, falling back to the first
    /// [`SecurityKind::Benchmark`] security of the [`Universe`].
    pub fn benchmark<'a>(&self, universe: &'a Universe) -> Option<&'a Security> {
        universe
            .find(&self.config.correlation.benchmark)
            .ok()
            .or_else(|| universe.benchmark())
    }

    /// Clusters one security's signals and computes its correlations against the benchmark.
    ///
    /// # Errors
    /// * [`ConfluenceError::EmptyInput`] - the security has no bars.
    /// * [`ConfluenceError::MalformedSignal`] - a signal addresses a period outside the bars.
    pub fn analyse_security(
        &self,
        security: &Security,
        indicators: &[IndicatorSignals],
        benchmark: Option<&Security>,
    ) -> Result<SecurityAnalysis, ConfluenceError> {
        if security.is_empty() {
            return Err(ConfluenceError::EmptyInput(format!(
                "security {} has no bars",
                security.name
            )));
        }

        let clustered_osc = cluster_security(security, indicators, &self.config.cluster)?;

        let correlations = match benchmark {
            Some(benchmark) if benchmark.name != security.name => correlation_results(
                &security.name,
                &paired_returns(security, benchmark),
                &self.config.correlation.windows,
            ),
            _ => Vec::new(),
        };

        Ok(SecurityAnalysis {
            name: security.name.clone(),
            kind: security.kind.clone(),
            dates_covered: security.dates_covered(),
            clustered_osc,
            recent_signals: recent_signals(indicators, security.len(), self.config.recent_lookback),
            correlations,
        })
    }

    /// Analyses every security of the [`Universe`] in parallel, then builds the composite
    /// indices from the securities that succeeded.
    ///
    /// Per-security failures are logged and reported in [`Analysis::failures`] without
    /// aborting the run. Signals keyed by a security outside the universe are reported as
    /// [`ConfluenceError::UnknownSecurity`].
    pub fn run(
        &self,
        universe: &Universe,
        signals: &BTreeMap<SecurityName, Vec<IndicatorSignals>>,
    ) -> Analysis {
        info!(
            securities = universe.len(),
            with_signals = signals.len(),
            "starting confluence analysis"
        );

        let benchmark = self.benchmark(universe);
        if benchmark.is_none() {
            warn!(
                benchmark = %self.config.correlation.benchmark,
                "benchmark security not found, correlations will be empty"
            );
        }

        let results = universe
            .securities()
            .par_iter()
            .map(|keyed| {
                let security = &keyed.value;
                let indicators = signals
                    .get(&security.name)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                (
                    security.name.clone(),
                    self.analyse_security(security, indicators, benchmark),
                )
            })
            .collect::<Vec<_>>();

        let mut securities = BTreeMap::new();
        let mut failures = BTreeMap::new();
        for (name, result) in results {
            match result {
                Ok(analysis) => {
                    securities.insert(name, analysis);
                }
                Err(error) => {
                    warn!(security = %name, %error, "excluding security from analysis");
                    failures.insert(name, error);
                }
            }
        }

        for name in signals.keys() {
            if universe.find_security_index(name).is_err() {
                warn!(security = %name, "signals provided for a security outside the universe");
                failures.insert(name.clone(), ConfluenceError::UnknownSecurity(name.clone()));
            }
        }

        let metrics = self.composite_metrics(universe, &securities, benchmark);

        info!(
            analysed = securities.len(),
            failed = failures.len(),
            "finished confluence analysis"
        );

        Analysis {
            securities,
            failures,
            metrics,
        }
    }

    fn composite_metrics(
        &self,
        universe: &Universe,
        securities: &BTreeMap<SecurityName, SecurityAnalysis>,
        benchmark: Option<&Security>,
    ) -> CompositeMetrics {
        let alignment = align(
            &universe
                .iter()
                .filter(|security| {
                    securities.contains_key(&security.name)
                        || benchmark.is_some_and(|benchmark| benchmark.name == security.name)
                })
                .map(|security| (security.name.clone(), security.dates().collect::<Vec<_>>()))
                .collect(),
        );

        let oscillators = securities
            .iter()
            .map(|(name, analysis)| (name.clone(), analysis.clustered_osc.clone()))
            .collect::<BTreeMap<_, _>>();

        let correlations = CorrelationTable(
            securities
                .iter()
                .map(|(name, analysis)| (name.clone(), analysis.correlations.clone()))
                .collect(),
        );

        CompositeMetrics::compute(CompositeInputs {
            universe,
            alignment: &alignment,
            oscillators: &oscillators,
            correlations: &correlations,
            benchmark,
            rolling_window: self.config.correlation.rolling_window,
            config: &self.config.composite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::test_utils::{bearish, bullish};
    use confluence_instrument::test_utils::{benchmark, date, equity, flat_closes};

    fn closes(len: usize) -> Vec<f64> {
        (0..len)
            .map(|index| 100.0 + ((index * 7 % 11) as f64))
            .collect()
    }

    #[test]
    fn test_analyse_security() {
        let analyser = Analyser::default();
        let benchmark = benchmark("^GSPC", date(2020, 1, 1), &closes(60));
        let security = equity("SPY", date(2020, 1, 1), &closes(60));
        let indicators = vec![IndicatorSignals::new(
            "rsi",
            [bullish("rsi", 55), bearish("rsi", 20)],
        )];

        let actual = analyser
            .analyse_security(&security, &indicators, Some(&benchmark))
            .unwrap();

        assert_eq!(actual.clustered_osc.dates.len(), 2);
        // only the 50 period window fits within 59 returns
        assert_eq!(actual.correlations.len(), 1);
        assert_eq!(actual.correlations[0].period_label, "50");
        assert_eq!(actual.correlations[0].beta, 1.0);
        assert_eq!(actual.correlations[0].r_squared, 1.0);
        assert_eq!(actual.recent_signals.len(), 1);
        assert_eq!(actual.recent_signals[0].periods_ago, 4);
        assert_eq!(
            actual.dates_covered.map(|covered| covered.start),
            Some(date(2020, 1, 1))
        );
    }

    #[test]
    fn test_analyse_security_benchmark_has_no_correlations() {
        let analyser = Analyser::default();
        let benchmark = benchmark("^GSPC", date(2020, 1, 1), &closes(60));

        let actual = analyser
            .analyse_security(&benchmark, &[], Some(&benchmark))
            .unwrap();

        assert!(actual.correlations.is_empty());
    }

    #[test]
    fn test_run_isolates_failures() {
        let universe = Universe::new([
            benchmark("^GSPC", date(2020, 1, 1), &flat_closes(10)),
            equity("XLK", date(2020, 1, 1), &flat_closes(10)),
            equity("BAD", date(2020, 1, 1), &flat_closes(10)),
        ])
        .unwrap();
        let signals = BTreeMap::from([
            (
                SecurityName::new("XLK"),
                vec![IndicatorSignals::new("rsi", [bullish("rsi", 3)])],
            ),
            (
                SecurityName::new("BAD"),
                vec![IndicatorSignals::new("rsi", [bullish("rsi", 10)])],
            ),
            (
                SecurityName::new("GONE"),
                vec![IndicatorSignals::new("rsi", [bullish("rsi", 1)])],
            ),
        ]);

        let actual = Analyser::default().run(&universe, &signals);

        assert_eq!(
            actual.securities.keys().cloned().collect::<Vec<_>>(),
            vec![SecurityName::new("XLK"), SecurityName::new("^GSPC")]
        );
        assert_eq!(
            actual.failures[&SecurityName::new("BAD")],
            ConfluenceError::MalformedSignal {
                indicator: "rsi".to_string(),
                period_index: 10,
                length: 10,
            }
        );
        assert_eq!(
            actual.failures[&SecurityName::new("GONE")],
            ConfluenceError::UnknownSecurity(SecurityName::new("GONE"))
        );

        let mci = actual.metrics.mci.defined().unwrap();
        assert!(
            mci.index
                .points
                .values()
                .all(|point| point.contributors == vec![SecurityName::new("XLK")])
        );
        assert_eq!(mci.index.value(3), Some(-8.0));
    }

    #[test]
    fn test_run_without_benchmark() {
        let universe = Universe::new([equity("XLK", date(2020, 1, 1), &flat_closes(5))]).unwrap();

        let actual = Analyser::default().run(&universe, &BTreeMap::new());

        assert!(actual.failures.is_empty());
        assert!(actual.securities[&SecurityName::new("XLK")].correlations.is_empty());
        assert!(actual.metrics.mci.is_defined());
        assert!(!actual.metrics.correlation.is_defined());
    }
}
