use confluence_instrument::security::name::SecurityName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors generated in the confluence crate.
///
/// Per-security variants (eg/ [`ConfluenceError::MisalignedLength`]) are isolated to the
/// security they describe, whereas [`ConfluenceError::UndefinedComposite`] marks a composite
/// index with no contributing data at all.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Error)]
pub enum ConfluenceError {
    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error(
        "security {security} series length {actual} does not match expected length {expected}"
    )]
    MisalignedLength {
        security: SecurityName,
        expected: usize,
        actual: usize,
    },

    #[error("security returns length {security} does not match benchmark length {benchmark}")]
    MisalignedReturns { security: usize, benchmark: usize },

    #[error("invalid lookback window of {window} periods for {available} available periods")]
    InsufficientWindow { window: usize, available: usize },

    #[error("benchmark returns are constant over the {window} period window")]
    ZeroVariance { window: usize },

    #[error(
        "indicator {indicator} signal at period {period_index} is outside series of length {length}"
    )]
    MalformedSignal {
        indicator: String,
        period_index: usize,
        length: usize,
    },

    #[error("composite {0} is undefined: no security contributed data")]
    UndefinedComposite(String),

    #[error("security {0} is not part of the universe")]
    UnknownSecurity(SecurityName),

    #[error("config: {0}")]
    Config(String),
}

impl ConfluenceError {
    /// Determines if the error marks missing data rather than a malformed input.
    pub fn is_absent_data(&self) -> bool {
        matches!(
            self,
            ConfluenceError::EmptyInput(_)
                | ConfluenceError::InsufficientWindow { .. }
                | ConfluenceError::ZeroVariance { .. }
                | ConfluenceError::UndefinedComposite(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absent_data() {
        struct TestCase {
            input: ConfluenceError,
            expected: bool,
        }

        let cases = vec![
            // TC0: window longer than history
            TestCase {
                input: ConfluenceError::InsufficientWindow {
                    window: 200,
                    available: 99,
                },
                expected: true,
            },
            // TC1: constant benchmark
            TestCase {
                input: ConfluenceError::ZeroVariance { window: 50 },
                expected: true,
            },
            // TC2: composite without contributors
            TestCase {
                input: ConfluenceError::UndefinedComposite("bci".to_string()),
                expected: true,
            },
            // TC3: malformed input
            TestCase {
                input: ConfluenceError::MisalignedReturns {
                    security: 10,
                    benchmark: 9,
                },
                expected: false,
            },
            // TC4: malformed signal
            TestCase {
                input: ConfluenceError::MalformedSignal {
                    indicator: "rsi".to_string(),
                    period_index: 10,
                    length: 10,
                },
                expected: false,
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            assert_eq!(test.input.is_absent_data(), test.expected, "TC{index} failed");
        }
    }
}
