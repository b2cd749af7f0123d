use crate::{composite::series::SecuritySeries, error::ConfluenceError};
use chrono::NaiveDate;
use confluence_instrument::{Dated, security::name::SecurityName};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Union of every distinct trading date observed across a set of securities, sorted ascending.
///
/// The position of a date in the calendar is the composite index shared by every aligned
/// security.
#[derive(Debug, Clone, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct CompositeCalendar {
    dates: Vec<NaiveDate>,
}

impl CompositeCalendar {
    /// Construct a `CompositeCalendar` from any number of (possibly overlapping) dates.
    pub fn new<Iter>(dates: Iter) -> Self
    where
        Iter: IntoIterator<Item = NaiveDate>,
    {
        Self {
            dates: dates.into_iter().sorted_unstable().dedup().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn date(&self, composite_index: usize) -> Option<NaiveDate> {
        self.dates.get(composite_index).copied()
    }

    /// Composite index of the provided date, if the calendar contains it.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}

/// Maps each security's local period index onto the shared [`CompositeCalendar`].
///
/// `tables[security][local_index]` is the composite index of that security's period. Since each
/// security's dates strictly increase, every table is strictly increasing too.
#[derive(Debug, Clone, Eq, PartialEq, Default, Deserialize, Serialize)]
pub struct Alignment {
    pub calendar: CompositeCalendar,
    pub tables: BTreeMap<SecurityName, Vec<usize>>,
}

impl Alignment {
    /// Composite index of the provided security's local period.
    pub fn composite_index(&self, security: &SecurityName, local_index: usize) -> Option<usize> {
        self.tables.get(security)?.get(local_index).copied()
    }

    /// Projects a local-index value vector of the provided security onto the calendar.
    ///
    /// `None` and non-finite values are absent periods and are left out of the resulting
    /// [`SecuritySeries`].
    pub fn project<Value>(
        &self,
        security: &SecurityName,
        values: &[Value],
    ) -> Result<SecuritySeries, ConfluenceError>
    where
        Value: Copy + Into<Option<f64>>,
    {
        let table = self
            .tables
            .get(security)
            .ok_or_else(|| ConfluenceError::UnknownSecurity(security.clone()))?;

        if table.len() != values.len() {
            return Err(ConfluenceError::MisalignedLength {
                security: security.clone(),
                expected: table.len(),
                actual: values.len(),
            });
        }

        Ok(table
            .iter()
            .zip(values)
            .filter_map(|(composite_index, value)| {
                (*value)
                    .into()
                    .filter(|value| value.is_finite())
                    .map(|value| (*composite_index, value))
            })
            .collect())
    }
}

/// Builds the [`CompositeCalendar`] of every provided series and the local -> composite index
/// table of each security.
///
/// Securities may start at different dates and have different lengths (eg/ newly listed funds).
pub fn align<T>(series_by_security: &BTreeMap<SecurityName, Vec<T>>) -> Alignment
where
    T: Dated,
{
    let calendar = CompositeCalendar::new(
        series_by_security
            .values()
            .flat_map(|series| series.iter().map(Dated::date)),
    );

    let tables = series_by_security
        .iter()
        .map(|(security, series)| {
            let table = series
                .iter()
                .filter_map(|item| calendar.position(item.date()))
                .collect();
            (security.clone(), table)
        })
        .collect();

    Alignment { calendar, tables }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confluence_instrument::test_utils::{date, date_plus_days};

    fn dates(start: NaiveDate, offsets: &[u64]) -> Vec<NaiveDate> {
        offsets
            .iter()
            .map(|offset| date_plus_days(start, *offset))
            .collect()
    }

    #[test]
    fn test_align_differing_starts_and_lengths() {
        let start = date(2020, 1, 1);
        let series = BTreeMap::from([
            (SecurityName::new("VTI"), dates(start, &[0, 1, 2, 3, 4])),
            // listed later
            (SecurityName::new("NEW"), dates(start, &[3, 4, 5])),
            // gap in history
            (SecurityName::new("GAP"), dates(start, &[0, 2, 4])),
        ]);

        let actual = align(&series);

        assert_eq!(actual.calendar.dates(), dates(start, &[0, 1, 2, 3, 4, 5]).as_slice());
        assert_eq!(actual.tables[&SecurityName::new("VTI")], vec![0, 1, 2, 3, 4]);
        assert_eq!(actual.tables[&SecurityName::new("NEW")], vec![3, 4, 5]);
        assert_eq!(actual.tables[&SecurityName::new("GAP")], vec![0, 2, 4]);
        assert_eq!(actual.composite_index(&SecurityName::new("NEW"), 0), Some(3));
        assert_eq!(actual.composite_index(&SecurityName::new("NEW"), 3), None);
    }

    #[test]
    fn test_align_tables_are_monotonic() {
        let start = date(2021, 6, 1);
        let series = BTreeMap::from([
            (SecurityName::new("A"), dates(start, &[1, 5, 9, 10])),
            (SecurityName::new("B"), dates(start, &[0, 2, 3, 5, 11])),
        ]);

        let actual = align(&series);

        for table in actual.tables.values() {
            assert!(table.windows(2).all(|pair| pair[0] < pair[1]));
        }
        assert_eq!(actual.calendar.len(), 8);
    }

    #[test]
    fn test_align_empty() {
        let actual = align::<NaiveDate>(&BTreeMap::new());
        assert!(actual.calendar.is_empty());
        assert!(actual.tables.is_empty());
    }

    #[test]
    fn test_alignment_project() {
        let start = date(2020, 1, 1);
        let series = BTreeMap::from([
            (SecurityName::new("VTI"), dates(start, &[0, 1, 2, 3])),
            (SecurityName::new("NEW"), dates(start, &[2, 3])),
        ]);
        let alignment = align(&series);

        let actual = alignment.project(&SecurityName::new("NEW"), &[-8.0, 0.0]).unwrap();
        assert_eq!(actual, SecuritySeries::from_iter([(2, -8.0), (3, 0.0)]));

        let actual = alignment
            .project(&SecurityName::new("VTI"), &[Some(1.0), None, None, Some(4.0)])
            .unwrap();
        assert_eq!(actual, SecuritySeries::from_iter([(0, 1.0), (3, 4.0)]));

        let actual = alignment
            .project(&SecurityName::new("VTI"), &[f64::NAN, 1.0, f64::INFINITY, 4.0])
            .unwrap();
        assert_eq!(actual, SecuritySeries::from_iter([(1, 1.0), (3, 4.0)]));

        assert_eq!(
            alignment.project(&SecurityName::new("NEW"), &[1.0]),
            Err(ConfluenceError::MisalignedLength {
                security: SecurityName::new("NEW"),
                expected: 2,
                actual: 1,
            })
        );
        assert_eq!(
            alignment.project(&SecurityName::new("SPY"), &[1.0]),
            Err(ConfluenceError::UnknownSecurity(SecurityName::new("SPY")))
        );
    }
}
