use crate::{
    composite::{
        CompositeInputs,
        series::{CompositeSeries, mean_of},
    },
    error::ConfluenceError,
};
use confluence_instrument::security::BondCategory;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bond Composite Index, one sub-index per [`BondCategory`] plus their combination.
///
/// A category without any analysed bond is `None` and does not dilute `combined`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BondCompositeIndex {
    pub treasury: Option<CompositeSeries>,
    pub corporate: Option<CompositeSeries>,
    pub international: Option<CompositeSeries>,
    /// Per-period mean of the category sub-indices defined at that period.
    pub combined: CompositeSeries,
}

impl BondCompositeIndex {
    pub fn compute(inputs: CompositeInputs<'_>) -> Result<Self, ConfluenceError> {
        let category_index = |category: BondCategory| {
            inputs
                .trend_index(
                    &format!("bci_{category}"),
                    inputs.universe.bonds(category),
                )
                .inspect_err(|error| debug!(%category, %error, "bond category index is undefined"))
                .ok()
        };

        let treasury = category_index(BondCategory::Treasury);
        let corporate = category_index(BondCategory::Corporate);
        let international = category_index(BondCategory::International);

        let combined = mean_of(
            "bci",
            &inputs.alignment.calendar,
            [
                ("treasury", treasury.as_ref()),
                ("corporate", corporate.as_ref()),
                ("international", international.as_ref()),
            ]
            .into_iter()
            .filter_map(|(name, series)| series.map(|series| (name, series))),
        )?;

        Ok(Self {
            treasury,
            corporate,
            international,
            combined,
        })
    }

    /// Defined category sub-indices in [`BondCategory::ALL`] order.
    pub fn categories(&self) -> impl Iterator<Item = (BondCategory, &CompositeSeries)> + '_ {
        BondCategory::ALL
            .into_iter()
            .zip([&self.treasury, &self.corporate, &self.international])
            .filter_map(|(category, series)| series.as_ref().map(|series| (category, series)))
    }
}
