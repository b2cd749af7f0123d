/// Statistical algorithms for analysing datasets.
pub mod algorithm;

/// Period-over-period returns, optionally joined by date against a benchmark.
pub mod returns;

/// Ordinary least-squares regression of one series on another.
pub mod regression;

/// Beta, R-Squared and Pearson correlation of a security against a benchmark over lookback
/// windows.
pub mod correlation;
