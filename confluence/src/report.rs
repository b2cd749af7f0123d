use crate::{
    analysis::{Analysis, SecurityAnalysis},
    cluster::dates::ClusterDate,
    composite::metrics::CompositeMetrics,
    signal::RecentSignal,
    statistic::correlation::CorrelationResult,
};
use confluence_instrument::security::{DatesCovered, SecurityKind, name::SecurityName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key the composite indices are reported under, alongside the per-security entries.
pub const METRICS_KEY: &str = "_METRICS_";

/// Key per-security failures are reported under.
pub const FAILURES_KEY: &str = "_FAILURES_";

/// Serialisable projection of an [`Analysis`] for the reporting layer.
///
/// Securities are keyed by name at the top level, with the composite indices under
/// [`METRICS_KEY`] and failures (if any) under [`FAILURES_KEY`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub securities: BTreeMap<SecurityName, SecurityReport>,
    #[serde(rename = "_METRICS_")]
    pub metrics: CompositeMetrics,
    #[serde(
        rename = "_FAILURES_",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub failures: BTreeMap<SecurityName, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SecurityReport {
    pub name: SecurityName,
    pub kind: SecurityKind,
    pub dates_covered: Option<DatesCovered>,
    pub clustered_osc: ClusteredOscReport,
    pub recent_signals: Vec<RecentSignal>,
    pub correlations: Vec<CorrelationResult>,
}

/// Actionable trend markers of one security.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ClusteredOscReport {
    pub dates: Vec<ClusterDate>,
}

impl From<SecurityAnalysis> for SecurityReport {
    fn from(value: SecurityAnalysis) -> Self {
        Self {
            name: value.name,
            kind: value.kind,
            dates_covered: value.dates_covered,
            clustered_osc: ClusteredOscReport {
                dates: value.clustered_osc.dates,
            },
            recent_signals: value.recent_signals,
            correlations: value.correlations,
        }
    }
}

impl From<Analysis> for AnalysisReport {
    fn from(value: Analysis) -> Self {
        Self {
            securities: value
                .securities
                .into_iter()
                .map(|(name, analysis)| (name, SecurityReport::from(analysis)))
                .collect(),
            metrics: value.metrics,
            failures: value
                .failures
                .into_iter()
                .map(|(name, error)| (name, error.to_string()))
                .collect(),
        }
    }
}

impl AnalysisReport {
    /// Pretty printed JSON representation of the report.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
