use chrono::NaiveDate;
use confluence_instrument::security::Security;
use itertools::{EitherOrBoth, Itertools};

/// Simple period-over-period returns `(p[t] - p[t-1]) / p[t-1]`.
///
/// The result has one fewer entry than the provided prices. A zero previous price yields a
/// return of `0.0`.
pub fn period_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|pair| {
            if pair[0] == 0.0 {
                0.0
            } else {
                (pair[1] - pair[0]) / pair[0]
            }
        })
        .collect()
}

/// Returns of a security and a benchmark computed over the dates both have a close for.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PairedReturns {
    /// Date each return period ends on.
    pub dates: Vec<NaiveDate>,
    pub security: Vec<f64>,
    pub benchmark: Vec<f64>,
}

impl PairedReturns {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Joins the closes of the provided securities by date, then differences each into returns.
///
/// Dates only one side traded on are skipped, so a later-listed security is only compared with
/// the benchmark over its own history.
pub fn paired_returns(security: &Security, benchmark: &Security) -> PairedReturns {
    let (dates, (security_closes, benchmark_closes)): (Vec<_>, (Vec<_>, Vec<_>)) = security
        .bars()
        .iter()
        .merge_join_by(benchmark.bars().iter(), |a, b| a.date.cmp(&b.date))
        .filter_map(|joined| match joined {
            EitherOrBoth::Both(a, b) => Some((a.date, (a.close, b.close))),
            EitherOrBoth::Left(_) | EitherOrBoth::Right(_) => None,
        })
        .unzip();

    PairedReturns {
        dates: dates.into_iter().skip(1).collect(),
        security: period_returns(&security_closes),
        benchmark: period_returns(&benchmark_closes),
    }
}
