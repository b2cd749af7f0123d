use crate::Dated;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Normalised OHLCV [`Bar`] for one trading period of a security.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Dated for Bar {
    fn date(&self) -> NaiveDate {
        self.date
    }
}
