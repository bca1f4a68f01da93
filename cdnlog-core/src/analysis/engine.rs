use crate::analysis::{AnalysisResults, AnalyzerRegistry};
use crate::record::RecordSet;
use std::time::Instant;

pub struct AnalysisEngine {
    registry: AnalyzerRegistry,
}

impl AnalysisEngine {
    pub fn new(registry: AnalyzerRegistry) -> Self {
        Self { registry }
    }

    /// Run every active analyzer over `records`.
    ///
    /// Results are returned only once all analyzers have finished.
    pub fn run(&self, records: &RecordSet) -> AnalysisResults {
        tracing::info!(modules = ?self.registry.names(), records = records.len(), "running analysis");

        let mut results = AnalysisResults::new();
        for analyzer in self.registry.all() {
            let started = Instant::now();
            let tables = analyzer.analyze(records);
            tracing::info!(
                analyzer = analyzer.name(),
                tables = tables.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "analyzer finished"
            );
            results.insert(analyzer.name().to_string(), tables);
        }

        tracing::info!("all analysis modules finished");
        results
    }
}
