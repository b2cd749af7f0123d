use crate::{
    composite::{
        CompositeInputs, bond::BondCompositeIndex, cohort::TypeCompositeIndex,
        correlation::CorrelationCompositeIndex, market::MarketCompositeIndex,
    },
    error::ConfluenceError,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Composite index result that distinguishes "no data" from a computed index.
///
/// An `Undefined` composite is never zero-filled, so consumers can tell it apart from a defined
/// index with a value of `0.0` (no trend).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Composite<T> {
    Defined(T),
    Undefined { reason: String },
}

impl<T> Composite<T> {
    /// Construct a `Composite` from the provided builder result, logging undefined composites.
    pub fn from_result(name: &str, result: Result<T, ConfluenceError>) -> Self {
        match result {
            Ok(composite) => {
                info!(composite = name, "built composite index");
                Self::Defined(composite)
            }
            Err(error) => {
                warn!(composite = name, %error, "composite index is undefined");
                Self::Undefined {
                    reason: error.to_string(),
                }
            }
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }

    pub fn defined(&self) -> Option<&T> {
        match self {
            Self::Defined(composite) => Some(composite),
            Self::Undefined { .. } => None,
        }
    }
}

/// Every population level composite index, serialised under the `_METRICS_` report key.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CompositeMetrics {
    pub mci: Composite<MarketCompositeIndex>,
    pub bci: Composite<BondCompositeIndex>,
    pub correlation: Composite<CorrelationCompositeIndex>,
    pub tci: Composite<TypeCompositeIndex>,
}

impl CompositeMetrics {
    /// Builds every composite index from the same [`CompositeInputs`].
    ///
    /// Each composite is computed independently, so one undefined composite never affects the
    /// others.
    pub fn compute(inputs: CompositeInputs<'_>) -> Self {
        Self {
            mci: Composite::from_result("mci", MarketCompositeIndex::compute(inputs)),
            bci: Composite::from_result("bci", BondCompositeIndex::compute(inputs)),
            correlation: Composite::from_result(
                "correlation",
                CorrelationCompositeIndex::compute(inputs),
            ),
            tci: Composite::from_result("tci", TypeCompositeIndex::compute(inputs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        composite::test_utils::Fixture,
        signal::{IndicatorSignals, test_utils::bearish},
    };
    use confluence_instrument::{
        security::BondCategory,
        test_utils::{benchmark, bond, date, equity, flat_closes},
    };
    use std::collections::BTreeMap;

    #[test]
    fn test_composite_metrics_marks_missing_populations_undefined() {
        // No bonds and no cohorts
        let fixture = Fixture::new(
            vec![
                benchmark("^GSPC", date(2020, 1, 1), &[100.0, 101.0, 103.0, 102.0, 104.0]),
                equity("XLK", date(2020, 1, 1), &[50.0, 51.0, 50.0, 52.0, 53.0]),
            ],
            BTreeMap::from([("XLK", vec![IndicatorSignals::new("rsi", [bearish("rsi", 2)])])]),
            3,
        );

        let actual = CompositeMetrics::compute(fixture.inputs());

        assert!(actual.mci.is_defined());
        assert!(actual.correlation.is_defined());
        assert!(matches!(actual.bci, Composite::Undefined { .. }));
        assert!(matches!(actual.tci, Composite::Undefined { .. }));
        assert_eq!(
            actual.mci.defined().and_then(|mci| mci.index.value(2)),
            Some(8.0)
        );
    }

    #[test]
    fn test_composite_metrics_zero_trend_is_defined() {
        let fixture = Fixture::new(
            vec![bond("TLT", BondCategory::Treasury, date(2020, 1, 1), &flat_closes(4))],
            BTreeMap::new(),
            2,
        );

        let actual = CompositeMetrics::compute(fixture.inputs());

        let bci = actual.bci.defined().unwrap();
        assert_eq!(bci.combined.len(), 4);
        assert!(bci.combined.values().all(|(_, value)| value == 0.0));
        assert!(!actual.mci.is_defined());
    }

    #[test]
    fn test_composite_serde_tagging() {
        let undefined = Composite::<f64>::Undefined {
            reason: "composite tci is undefined".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&undefined).unwrap(),
            serde_json::json!({
                "status": "undefined",
                "value": {"reason": "composite tci is undefined"}
            })
        );

        let defined = Composite::Defined(1.5);
        assert_eq!(
            serde_json::to_value(&defined).unwrap(),
            serde_json::json!({"status": "defined", "value": 1.5})
        );
    }
}
