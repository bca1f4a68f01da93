//! Analyzer framework
//!
//! Each analyzer folds the run's [`RecordSet`] into a set of named
//! [`Table`]s. Analyzers are built from configuration by the
//! [`AnalyzerRegistry`], never mutate the records, and do not depend on each
//! other, so the tables one produces are the same whichever others are active.

pub mod basic_stats;
pub mod counting;
mod engine;
pub mod geo;
mod histogram;
mod registry;
pub mod response_time;
pub mod spider;
mod table;

pub use engine::AnalysisEngine;
pub use registry::{AnalyzerKind, AnalyzerRegistry};
pub use table::{AnalysisResults, AnalyzerResult, Cell, Table};

use crate::record::RecordSet;

/// A pluggable analysis step.
pub trait Analyzer: Send + Sync {
    /// Stable identifier, also the key of this analyzer's entry in the results.
    fn name(&self) -> &'static str;

    /// Fold `records` into named tables. Table names are owned by this analyzer.
    fn analyze(&self, records: &RecordSet) -> AnalyzerResult;
}
