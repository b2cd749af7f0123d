use crate::{Dated, bar::Bar, error::InstrumentError};
use chrono::NaiveDate;
use derive_more::Display;
use name::{CohortName, SecurityName};
use serde::{Deserialize, Serialize};

/// Defines the Confluence [`SecurityName`] and [`CohortName`] `SmolStr` representations.
pub mod name;

/// Category a [`Security`] belongs to, determining which composite index population it joins.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum SecurityKind {
    /// Reference security that every other security is regressed against (eg/ "^GSPC").
    #[display("benchmark")]
    Benchmark,
    /// Member of the Market Composite Index population.
    #[display("equity")]
    Equity,
    /// Member of the Bond Composite Index population for the associated [`BondCategory`].
    #[display("bond_{_0}")]
    Bond(BondCategory),
    /// Member of the Type Composite Index population for the associated [`CohortName`].
    #[display("cohort_{_0}")]
    Cohort(CohortName),
}

/// Bond Composite Index sub-populations.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum BondCategory {
    #[display("treasury")]
    Treasury,
    #[display("corporate")]
    Corporate,
    #[display("international")]
    International,
}

impl BondCategory {
    pub const ALL: [BondCategory; 3] = [
        BondCategory::Treasury,
        BondCategory::Corporate,
        BondCategory::International,
    ];
}

/// First and last trading dates of a [`Security`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct DatesCovered {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Ordered OHLCV history of a single security, one [`Bar`] per trading period.
///
/// Bars are addressable by their 0-based `period_index`. Construction guarantees the bar dates
/// are strictly increasing, so a `Security` is only ever built via [`Security::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Security {
    pub name: SecurityName,
    pub kind: SecurityKind,
    bars: Vec<Bar>,
}

impl Security {
    /// Construct a new `Security`, validating the bar dates are strictly increasing.
    pub fn new<Name>(
        name: Name,
        kind: SecurityKind,
        bars: Vec<Bar>,
    ) -> Result<Self, InstrumentError>
    where
        Name: Into<SecurityName>,
    {
        let name = name.into();

        if let Some(index) = bars
            .windows(2)
            .position(|pair| pair[1].date <= pair[0].date)
        {
            return Err(InstrumentError::NonMonotonicDates {
                security: name,
                index: index + 1,
                date: bars[index + 1].date,
            });
        }

        Ok(Self { name, kind, bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn bar(&self, period_index: usize) -> Option<&Bar> {
        self.bars.get(period_index)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(Dated::date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }

    pub fn dates_covered(&self) -> Option<DatesCovered> {
        Some(DatesCovered {
            start: self.first_date()?,
            end: self.last_date()?,
        })
    }
}
