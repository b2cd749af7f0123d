use crate::{
    composite::{CompositeInputs, series::CompositeSeries},
    error::ConfluenceError,
    statistic::correlation::CorrelationTable,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Market Composite Index over the equity population.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketCompositeIndex {
    /// Equally weighted mean trend of every equity with data at each period.
    pub index: CompositeSeries,
    /// Beta and R-Squared of every equity against the benchmark, per lookback window.
    pub correlations: CorrelationTable,
    /// Mean rolling correlation of the equities against the benchmark, if the benchmark is
    /// known and enough history is available.
    pub net_correlation: Option<CompositeSeries>,
}

impl MarketCompositeIndex {
    pub fn compute(inputs: CompositeInputs<'_>) -> Result<Self, ConfluenceError> {
        let equities = || inputs.analysed(inputs.universe.equities());

        let index = inputs.trend_index("mci", equities())?;

        let correlations = CorrelationTable(
            equities()
                .filter_map(|security| {
                    inputs
                        .correlations
                        .get(&security.name)
                        .map(|results| (security.name.clone(), results.to_vec()))
                })
                .collect(),
        );

        let net_correlation = inputs
            .net_correlation("mci_net_correlation", equities())
            .inspect_err(|error| debug!(%error, "market net correlation is undefined"))
            .ok();

        Ok(Self {
            index,
            correlations,
            net_correlation,
        })
    }
}
