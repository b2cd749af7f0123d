use crate::security::name::SecurityName;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents all possible errors that can occur when constructing or searching securities.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error)]
pub enum InstrumentError {
    /// Bar dates of a security must be strictly increasing.
    ///
    /// Contains the index of the first bar that does not advance the date.
    #[error("security {security} bar {index} dated {date} does not follow the previous bar")]
    NonMonotonicDates {
        security: SecurityName,
        index: usize,
        date: NaiveDate,
    },

    /// A [`Universe`](crate::universe::Universe) holds each security name once.
    #[error("security {0} appears more than once")]
    DuplicateSecurity(SecurityName),

    /// Failure to find a [`SecurityIndex`](crate::universe::SecurityIndex) for a given name.
    #[error("security {0} must be present in the universe")]
    SecurityNotFound(SecurityName),
}
