use crate::{
    cluster::ClusterConfig,
    composite::CompositeConfig,
    error::ConfluenceError,
    signal::DEFAULT_RECENT_LOOKBACK,
    statistic::correlation::LookbackWindow,
};
use confluence_instrument::security::name::SecurityName;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Top-level configuration of a Confluence [`Analyser`](crate::analysis::Analyser) run.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    pub cluster: ClusterConfig,
    pub correlation: CorrelationConfig,
    pub composite: CompositeConfig,
    /// Number of trailing periods a signal is reported as recent for.
    pub recent_lookback: usize,
}

impl Default for ConfluenceConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            correlation: CorrelationConfig::default(),
            composite: CompositeConfig::default(),
            recent_lookback: DEFAULT_RECENT_LOOKBACK,
        }
    }
}

impl ConfluenceConfig {
    /// Parse and validate a `ConfluenceConfig` from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Self, ConfluenceError> {
        serde_json::from_str::<Self>(input)
            .map_err(|error| ConfluenceError::Config(error.to_string()))?
            .validated()
    }

    /// Parse and validate a `ConfluenceConfig` from a JSON reader (eg/ a config file).
    pub fn from_reader<R>(reader: R) -> Result<Self, ConfluenceError>
    where
        R: Read,
    {
        serde_json::from_reader::<_, Self>(reader)
            .map_err(|error| ConfluenceError::Config(error.to_string()))?
            .validated()
    }

    pub fn validate(&self) -> Result<(), ConfluenceError> {
        self.cluster.validate()?;
        self.correlation.validate()
    }

    fn validated(self) -> Result<Self, ConfluenceError> {
        self.validate().map(|_| self)
    }
}

/// Configuration of the beta / R-Squared table and the rolling net correlation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Security every other security is regressed against.
    pub benchmark: SecurityName,
    /// Lookback windows reported per security, short to long.
    pub windows: Vec<LookbackWindow>,
    /// Window of the rolling correlation feeding the net correlation composites.
    pub rolling_window: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            benchmark: SecurityName::new("^GSPC"),
            windows: vec![LookbackWindow::new(50), LookbackWindow::new(200)],
            rolling_window: 50,
        }
    }
}

impl CorrelationConfig {
    /// At least two lookback windows of 2 or more periods are required, so short and long term
    /// beta can always be compared.
    pub fn validate(&self) -> Result<(), ConfluenceError> {
        if self.windows.len() < 2 {
            return Err(ConfluenceError::Config(format!(
                "at least 2 correlation windows are required, got {}",
                self.windows.len()
            )));
        }

        if let Some(window) = self.windows.iter().find(|window| window.periods < 2) {
            return Err(ConfluenceError::Config(format!(
                "correlation window {} must span at least 2 periods, got {}",
                window.label, window.periods
            )));
        }

        if self.rolling_window < 2 {
            return Err(ConfluenceError::Config(format!(
                "rolling correlation window must span at least 2 periods, got {}",
                self.rolling_window
            )));
        }

        Ok(())
    }
}
