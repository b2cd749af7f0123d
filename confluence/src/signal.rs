use crate::error::ConfluenceError;
use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, StrExt};
use std::borrow::Borrow;

/// Direction of a discrete indicator [`SignalEvent`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    #[serde(alias = "BULLISH")]
    #[display("bullish")]
    Bullish,
    #[serde(alias = "BEARISH")]
    #[display("bearish")]
    Bearish,
}

/// Confluence `SmolStr` representation of the indicator that produced a [`SignalEvent`]
/// (eg/ "rsi", "full_stochastic"), normalised to lower case.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Display)]
pub struct IndicatorName(SmolStr);

impl IndicatorName {
    pub fn new<S>(name: S) -> Self
    where
        S: Into<SmolStr>,
    {
        let name = name.into();
        if name.chars().any(char::is_uppercase) {
            Self(name.to_lowercase_smolstr())
        } else {
            Self(name)
        }
    }
}

impl From<&str> for IndicatorName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for IndicatorName {
    fn borrow(&self) -> &str {
        self.0.borrow()
    }
}

impl AsRef<str> for IndicatorName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl<'de> serde::de::Deserialize<'de> for IndicatorName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(IndicatorName::new(name))
    }
}

/// Discrete bullish or bearish marker emitted by an indicator at a specific trading period of
/// one security.
///
/// `period_index` is the 0-based offset into that security's bars, so it is only meaningful
/// alongside the security that produced it.
#[derive(Debug, Clone, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct SignalEvent {
    pub kind: SignalKind,
    pub indicator: IndicatorName,
    pub value: f64,
    pub date: NaiveDate,
    pub period_index: usize,
}

/// Bullish and bearish [`SignalEvent`]s, partitioned by [`SignalKind`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct SignalEvents {
    pub bullish: Vec<SignalEvent>,
    pub bearish: Vec<SignalEvent>,
}

impl FromIterator<SignalEvent> for SignalEvents {
    fn from_iter<Iter>(iter: Iter) -> Self
    where
        Iter: IntoIterator<Item = SignalEvent>,
    {
        let (bullish, bearish) = iter
            .into_iter()
            .partition(|event| event.kind == SignalKind::Bullish);

        Self { bullish, bearish }
    }
}

impl SignalEvents {
    pub fn len(&self) -> usize {
        self.bullish.len() + self.bearish.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bullish.is_empty() && self.bearish.is_empty()
    }

    /// Iterator over every event, bullish first.
    pub fn iter(&self) -> impl Iterator<Item = &SignalEvent> + '_ {
        self.bullish.iter().chain(self.bearish.iter())
    }

    /// Returns a copy with each list ordered by `(period_index, indicator)`.
    ///
    /// Clustering is order dependent, so every caller folds events in this order.
    pub fn sorted(&self) -> Self {
        let order = |a: &SignalEvent, b: &SignalEvent| {
            a.period_index
                .cmp(&b.period_index)
                .then_with(|| a.indicator.cmp(&b.indicator))
        };

        let mut sorted = self.clone();
        sorted.bullish.sort_by(order);
        sorted.bearish.sort_by(order);
        sorted
    }

    /// Validates every event addresses a period inside a series of the provided length.
    pub fn validate(&self, length: usize) -> Result<(), ConfluenceError> {
        match self.iter().find(|event| event.period_index >= length) {
            Some(event) => Err(ConfluenceError::MalformedSignal {
                indicator: event.indicator.to_string(),
                period_index: event.period_index,
                length,
            }),
            None => Ok(()),
        }
    }
}

/// Output of a single indicator for a single security.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IndicatorSignals {
    pub indicator: IndicatorName,
    pub events: SignalEvents,
}

impl IndicatorSignals {
    pub fn new<Name, Iter>(indicator: Name, events: Iter) -> Self
    where
        Name: Into<IndicatorName>,
        Iter: IntoIterator<Item = SignalEvent>,
    {
        Self {
            indicator: indicator.into(),
            events: events.into_iter().collect(),
        }
    }
}

/// Default number of trailing periods a signal is reported by [`recent_signals`] for.
pub const DEFAULT_RECENT_LOOKBACK: usize = 10;

/// [`SignalEvent`] projected relative to the most recent trading period.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecentSignal {
    pub kind: SignalKind,
    pub indicator: IndicatorName,
    pub value: f64,
    pub date: NaiveDate,
    pub periods_ago: usize,
}

/// Lists every signal emitted within the trailing `lookback` periods of a series of the provided
/// `length`, most recent first.
///
/// Signals at or after period `length - lookback - 1` are included. Ties on `periods_ago` are
/// ordered by indicator name.
pub fn recent_signals(
    indicators: &[IndicatorSignals],
    length: usize,
    lookback: usize,
) -> Vec<RecentSignal> {
    let start_period = length.saturating_sub(lookback + 1);

    let mut recent = indicators
        .iter()
        .flat_map(|signals| signals.events.iter())
        .filter(|event| event.period_index >= start_period && event.period_index < length)
        .map(|event| RecentSignal {
            kind: event.kind,
            indicator: event.indicator.clone(),
            value: event.value,
            date: event.date,
            periods_ago: length - 1 - event.period_index,
        })
        .collect::<Vec<_>>();

    recent.sort_by(|a, b| {
        a.periods_ago
            .cmp(&b.periods_ago)
            .then_with(|| a.indicator.cmp(&b.indicator))
    });

    recent
}
