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
#![allow(clippy::type_complexity)]

//! # Confluence
//! Confluence turns many independently computed technical indicator signals into a per-security
//! consensus score, and combines those scores across securities into population level composite
//! indices.
//!
//! ## Overview
//! At a high level, an [`Analyser`](analysis::Analyser) run is made up of the following stages:
//! * **Cluster**: Discrete bullish and bearish [`SignalEvents`](signal::SignalEvent) from every
//!   indicator are spread onto a per-period [`ClusterCurve`](cluster::curve::ClusterCurve).
//!   Near-simultaneous signals reinforce each other, isolated signals stay small and are removed
//!   by thresholding. The surviving periods become dated
//!   [`ClusterDates`](cluster::dates::ClusterDate).
//! * **Correlate**: Beta and R-Squared of each security's returns against a benchmark over
//!   multiple lookback windows.
//! * **Align**: Securities with different listing dates and history lengths are mapped onto a
//!   shared [`CompositeCalendar`](align::CompositeCalendar).
//! * **Composite**: Aligned per-security trends are averaged into the Market, Bond, Correlation
//!   and Type composite indices. A security without data at a period is absent from that
//!   period's mean, never counted as zero.
//!
//! The per-security stages run in parallel, while results are always merged in security name
//! order so every run is reproducible.
//!
//! ## Example
//! ```rust,no_run
//! use confluence::{
//!     analysis::Analyser, config::ConfluenceConfig, logging::init_logging, report::AnalysisReport,
//! };
//! use confluence_instrument::universe::Universe;
//! use std::collections::BTreeMap;
//!
//! init_logging();
//!
//! let config = ConfluenceConfig::from_json_str(r#"{"cluster": {"threshold": 7.0}}"#).unwrap();
//! let universe = Universe::new(Vec::new()).unwrap();
//!
//! let analysis = Analyser::new(config).run(&universe, &BTreeMap::new());
//! AnalysisReport::from(analysis).print_summary();
//! ```

/// Discrete indicator [`SignalEvent`](signal::SignalEvent)s and their grouping per indicator.
pub mod signal;

/// Cluster score builder, filter and cluster date extractor.
pub mod cluster;

/// Alignment of variable length, variably dated securities onto a shared calendar.
pub mod align;

/// Market, Bond, Correlation and Type composite indices.
pub mod composite;

/// Statistical algorithms, returns, regression and beta / R-Squared.
pub mod statistic;

/// End-to-end analysis pass over a [`Universe`](confluence_instrument::universe::Universe).
pub mod analysis;

/// Serialisable [`AnalysisReport`](report::AnalysisReport) projection of an analysis.
pub mod report;

/// Table display of correlation and composite results.
pub mod display;

/// Top-level [`ConfluenceConfig`](config::ConfluenceConfig).
pub mod config;

/// Provides default Confluence `tracing` logging initialisers.
pub mod logging;

/// All errors generated in the confluence crate.
pub mod error;
