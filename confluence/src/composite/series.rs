use crate::{align::CompositeCalendar, error::ConfluenceError, statistic::algorithm::welford_online};
use chrono::NaiveDate;
use confluence_instrument::security::name::SecurityName;
use derive_more::From;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, btree_map::Entry};

/// Values of a single security keyed by composite calendar index.
///
/// A missing key means the security has no data at that period, which is distinct from a
/// present value of `0.0` (no trend).
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize, From)]
pub struct SecuritySeries(pub BTreeMap<usize, f64>);

impl FromIterator<(usize, f64)> for SecuritySeries {
    fn from_iter<Iter>(iter: Iter) -> Self
    where
        Iter: IntoIterator<Item = (usize, f64)>,
    {
        Self(iter.into_iter().collect())
    }
}

impl SecuritySeries {
    pub fn get(&self, composite_index: usize) -> Option<f64> {
        self.0.get(&composite_index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().map(|(index, value)| (*index, *value))
    }
}

/// One security's input to a composite, tagged with the category used to look up its weight.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Contribution {
    pub category: String,
    pub series: SecuritySeries,
}

/// Aggregated value of a composite at one calendar period.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CompositePoint {
    pub date: NaiveDate,
    pub value: f64,
    /// Securities that had data at this period, in name order.
    pub contributors: Vec<SecurityName>,
}

/// Population level composite index keyed by composite calendar index.
///
/// Only periods with at least one contributor are present.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CompositeSeries {
    pub points: BTreeMap<usize, CompositePoint>,
}

impl CompositeSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, composite_index: usize) -> Option<&CompositePoint> {
        self.points.get(&composite_index)
    }

    pub fn value(&self, composite_index: usize) -> Option<f64> {
        self.get(composite_index).map(|point| point.value)
    }

    /// Most recent defined point.
    pub fn latest(&self) -> Option<&CompositePoint> {
        self.points.values().next_back()
    }

    /// `(date, value)` pairs in calendar order.
    pub fn values(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.values().map(|point| (point.date, point.value))
    }

    /// Re-keys the composite as a [`SecuritySeries`], so it can contribute to a higher level
    /// composite.
    pub fn to_security_series(&self) -> SecuritySeries {
        self.points
            .iter()
            .map(|(index, point)| (*index, point.value))
            .collect()
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: f64,
    mean: f64,
    contributors: Vec<SecurityName>,
}

/// Combines per-security [`Contribution`]s into a [`CompositeSeries`].
///
/// Each period's value is the arithmetic mean of `value * weight(category)` over the securities
/// with data at that period. Category weights default to `1.0`. Absent periods are excluded from
/// the mean's denominator, and periods with no contributor are left out of the output.
///
/// # Errors
/// * [`ConfluenceError::EmptyInput`] - no contributions were provided.
/// * [`ConfluenceError::UndefinedComposite`] - no contribution had data at any period.
pub fn aggregate(
    name: &str,
    calendar: &CompositeCalendar,
    contributions: &BTreeMap<SecurityName, Contribution>,
    weights: &BTreeMap<String, f64>,
) -> Result<CompositeSeries, ConfluenceError> {
    if contributions.is_empty() {
        return Err(ConfluenceError::EmptyInput(format!(
            "composite {name} has no contributing securities"
        )));
    }

    let mut accumulators = BTreeMap::<usize, Accumulator>::new();

    for (security, contribution) in contributions {
        let weight = weights.get(&contribution.category).copied().unwrap_or(1.0);

        for (composite_index, value) in contribution.series.iter() {
            let accumulator = match accumulators.entry(composite_index) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(Accumulator::default()),
            };

            accumulator.count += 1.0;
            accumulator.mean =
                welford_online::calculate_mean(accumulator.mean, value * weight, accumulator.count);
            accumulator.contributors.push(security.clone());
        }
    }

    let points = accumulators
        .into_iter()
        .filter_map(|(composite_index, accumulator)| {
            calendar.date(composite_index).map(|date| {
                (
                    composite_index,
                    CompositePoint {
                        date,
                        value: accumulator.mean,
                        contributors: accumulator.contributors,
                    },
                )
            })
        })
        .collect::<BTreeMap<_, _>>();

    if points.is_empty() {
        return Err(ConfluenceError::UndefinedComposite(name.to_string()));
    }

    Ok(CompositeSeries { points })
}

/// Per-period mean of several named [`CompositeSeries`], each counted only where defined.
///
/// Contributors of the result are the names of the sub-composites, eg/ the bond categories of a
/// combined Bond Composite Index.
pub fn mean_of<'a, Iter>(
    name: &str,
    calendar: &CompositeCalendar,
    composites: Iter,
) -> Result<CompositeSeries, ConfluenceError>
where
    Iter: IntoIterator<Item = (&'a str, &'a CompositeSeries)>,
{
    let contributions = composites
        .into_iter()
        .map(|(sub_name, series)| {
            (
                SecurityName::new(sub_name),
                Contribution {
                    category: sub_name.to_string(),
                    series: series.to_security_series(),
                },
            )
        })
        .collect::<BTreeMap<_, _>>();

    aggregate(name, calendar, &contributions, &BTreeMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use confluence_instrument::test_utils::{date, date_plus_days};

    fn calendar(len: u64) -> CompositeCalendar {
        let start = date(2020, 1, 1);
        CompositeCalendar::new((0..len).map(|offset| date_plus_days(start, offset)))
    }

    fn contribution(category: &str, values: &[(usize, f64)]) -> Contribution {
        Contribution {
            category: category.to_string(),
            series: values.iter().copied().collect(),
        }
    }

    #[test]
    fn test_aggregate_excludes_absent_securities_from_denominator() {
        let calendar = calendar(4);
        let contributions = BTreeMap::from([
            (
                SecurityName::new("OLD"),
                contribution("equity", &[(0, -8.0), (1, -8.0), (2, 0.0), (3, 4.0)]),
            ),
            // listed at period 2
            (SecurityName::new("NEW"), contribution("equity", &[(2, 8.0), (3, 8.0)])),
        ]);

        let actual = aggregate("mci", &calendar, &contributions, &BTreeMap::new()).unwrap();

        struct Expected {
            value: f64,
            contributors: Vec<&'static str>,
        }

        let expected = [
            Expected {
                value: -8.0,
                contributors: vec!["OLD"],
            },
            Expected {
                value: -8.0,
                contributors: vec!["OLD"],
            },
            Expected {
                value: 4.0,
                contributors: vec!["NEW", "OLD"],
            },
            Expected {
                value: 6.0,
                contributors: vec!["NEW", "OLD"],
            },
        ];

        assert_eq!(actual.len(), 4);
        for (index, expected) in expected.into_iter().enumerate() {
            let point = actual.get(index).unwrap();
            assert_relative_eq!(point.value, expected.value, epsilon = 1e-12);
            assert_eq!(
                point
                    .contributors
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<&str>>(),
                expected.contributors,
                "TC{index} failed"
            );
            assert_eq!(point.date, date_plus_days(date(2020, 1, 1), index as u64));
        }
    }

    #[test]
    fn test_aggregate_omits_periods_without_contributors() {
        let calendar = calendar(5);
        let contributions = BTreeMap::from([
            (SecurityName::new("A"), contribution("equity", &[(1, 2.0)])),
            (SecurityName::new("B"), contribution("equity", &[(3, 0.0)])),
        ]);

        let actual = aggregate("tci", &calendar, &contributions, &BTreeMap::new()).unwrap();

        assert_eq!(actual.points.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        // zero is data, not absence
        assert_eq!(actual.value(3), Some(0.0));
        assert_eq!(actual.value(0), None);
    }

    #[test]
    fn test_aggregate_applies_category_weights() {
        let calendar = calendar(1);
        let contributions = BTreeMap::from([
            (SecurityName::new("A"), contribution("treasury", &[(0, 10.0)])),
            (SecurityName::new("B"), contribution("corporate", &[(0, 10.0)])),
        ]);
        let weights = BTreeMap::from([("treasury".to_string(), 2.0)]);

        let actual = aggregate("bci", &calendar, &contributions, &weights).unwrap();

        assert_relative_eq!(actual.value(0).unwrap(), 15.0);
    }

    #[test]
    fn test_aggregate_errors() {
        let calendar = calendar(3);

        assert!(matches!(
            aggregate("mci", &calendar, &BTreeMap::new(), &BTreeMap::new()),
            Err(ConfluenceError::EmptyInput(_))
        ));

        let all_absent = BTreeMap::from([(SecurityName::new("A"), contribution("equity", &[]))]);
        assert_eq!(
            aggregate("mci", &calendar, &all_absent, &BTreeMap::new()),
            Err(ConfluenceError::UndefinedComposite("mci".to_string()))
        );
    }

    #[test]
    fn test_aggregate_is_pure() {
        let calendar = calendar(3);
        let contributions = BTreeMap::from([
            (SecurityName::new("A"), contribution("equity", &[(0, 1.0), (1, 3.0)])),
            (SecurityName::new("B"), contribution("equity", &[(1, 5.0), (2, 7.0)])),
        ]);

        let first = aggregate("mci", &calendar, &contributions, &BTreeMap::new());
        let second = aggregate("mci", &calendar, &contributions, &BTreeMap::new());

        assert_eq!(first, second);
    }

    #[test]
    fn test_mean_of_sub_composites() {
        let calendar = calendar(3);
        let treasury = aggregate(
            "treasury",
            &calendar,
            &BTreeMap::from([(
                SecurityName::new("TLT"),
                contribution("bond", &[(0, 2.0), (1, 4.0)]),
            )]),
            &BTreeMap::new(),
        )
        .unwrap();
        let corporate = aggregate(
            "corporate",
            &calendar,
            &BTreeMap::from([(
                SecurityName::new("LQD"),
                contribution("bond", &[(1, 8.0), (2, 6.0)]),
            )]),
            &BTreeMap::new(),
        )
        .unwrap();

        let actual = mean_of(
            "combined",
            &calendar,
            [("treasury", &treasury), ("corporate", &corporate)],
        )
        .unwrap();

        assert_relative_eq!(actual.value(0).unwrap(), 2.0);
        assert_relative_eq!(actual.value(1).unwrap(), 6.0);
        assert_relative_eq!(actual.value(2).unwrap(), 6.0);
        assert_eq!(actual.get(1).unwrap().contributors.len(), 2);
    }
}
