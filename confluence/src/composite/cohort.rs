use crate::{
    composite::{
        CompositeInputs,
        series::{CompositeSeries, mean_of},
    },
    error::ConfluenceError,
};
use confluence_instrument::security::{Security, SecurityKind, name::CohortName};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Type Composite Index over the security cohorts not covered by the market or bond indices.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TypeCompositeIndex {
    /// Mean trend of each cohort with at least one analysed member.
    pub cohorts: BTreeMap<CohortName, CompositeSeries>,
    /// Per-period mean of the cohort indices defined at that period.
    pub combined: CompositeSeries,
}

impl TypeCompositeIndex {
    pub fn compute(inputs: CompositeInputs<'_>) -> Result<Self, ConfluenceError> {
        let members = inputs
            .analysed(inputs.universe.cohorts())
            .filter_map(|security| match &security.kind {
                SecurityKind::Cohort(cohort) => Some((cohort.clone(), security)),
                _ => None,
            })
            .into_group_map()
            .into_iter()
            .collect::<BTreeMap<CohortName, Vec<&Security>>>();

        let cohorts = members
            .into_iter()
            .filter_map(|(cohort, securities)| {
                inputs
                    .trend_index(&format!("tci_{cohort}"), securities)
                    .inspect_err(|error| debug!(%cohort, %error, "cohort index is undefined"))
                    .ok()
                    .map(|series| (cohort, series))
            })
            .collect::<BTreeMap<_, _>>();

        let combined = mean_of(
            "tci",
            &inputs.alignment.calendar,
            cohorts
                .iter()
                .map(|(cohort, series)| (cohort.as_ref(), series)),
        )?;

        Ok(Self { cohorts, combined })
    }
}
