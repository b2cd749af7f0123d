#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms,
    rust_2024_compatibility
)]

//! Core Confluence data structures describing the securities under analysis.
//!
//! A [`Security`](security::Security) is an ordered, strictly date-increasing sequence of OHLCV
//! [`Bars`](bar::Bar). Securities are grouped into a name-sorted [`Universe`](universe::Universe)
//! which the analysis engine walks deterministically.

use chrono::NaiveDate;
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// OHLCV [`Bar`](bar::Bar) definition.
pub mod bar;

/// [`Security`](security::Security) related data structures.
///
/// eg/ `SecurityName`, `SecurityKind`, `BondCategory`, etc.
pub mod security;

/// Indexed, name-sorted collection of [`Security`](security::Security)s.
pub mod universe;

/// All errors generated in the confluence-instrument crate.
pub mod error;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Constructor,
)]
pub struct Keyed<Key, Value> {
    pub key: Key,
    pub value: Value,
}

impl<Key, Value> AsRef<Value> for Keyed<Key, Value> {
    fn as_ref(&self) -> &Value {
        &self.value
    }
}

/// Anything positioned on a trading calendar by a single date.
///
/// Used to align series from securities with differing histories onto one calendar.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for NaiveDate {
    fn date(&self) -> NaiveDate {
        *self
    }
}

impl<T> Dated for &T
where
    T: Dated,
{
    fn date(&self) -> NaiveDate {
        T::date(self)
    }
}

pub mod test_utils {
    use crate::{
        bar::Bar,
        security::{BondCategory, Security, SecurityKind, name::SecurityName},
    };
    use chrono::{Days, NaiveDate};

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    pub fn date_plus_days(base: NaiveDate, plus: u64) -> NaiveDate {
        base.checked_add_days(Days::new(plus)).unwrap()
    }

    pub fn bar(date: NaiveDate, close: f64) -> Bar {
        Bar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        }
    }

    /// Consecutive daily bars starting at `start`, one per provided close.
    pub fn bars(start: NaiveDate, closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(offset, close)| bar(date_plus_days(start, offset as u64), *close))
            .collect()
    }

    pub fn security(name: &str, kind: SecurityKind, start: NaiveDate, closes: &[f64]) -> Security {
        Security::new(SecurityName::new(name), kind, bars(start, closes)).unwrap()
    }

    pub fn equity(name: &str, start: NaiveDate, closes: &[f64]) -> Security {
        security(name, SecurityKind::Equity, start, closes)
    }

    pub fn bond(name: &str, category: BondCategory, start: NaiveDate, closes: &[f64]) -> Security {
        security(name, SecurityKind::Bond(category), start, closes)
    }

    pub fn benchmark(name: &str, start: NaiveDate, closes: &[f64]) -> Security {
        security(name, SecurityKind::Benchmark, start, closes)
    }

    /// Flat closes of the provided length.
    pub fn flat_closes(len: usize) -> Vec<f64> {
        vec![100.0; len]
    }
}
