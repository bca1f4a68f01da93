//! One batch run: ingest → parse → analyze → report.

use crate::analysis::{AnalysisEngine, AnalysisResults, AnalyzerRegistry};
use crate::conf::AppConfig;
use crate::ingest::{LineStream, ingest};
use crate::parse::LineParser;
use crate::record::LogRecord;
use crate::report::ReporterRegistry;
use anyhow::Context;
use std::time::Instant;

/// Line counts for one parse pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines: u64,
    pub records: u64,
}

impl ParseStats {
    pub fn dropped(&self) -> u64 {
        self.lines - self.records
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub stats: ParseStats,
    /// `None` when no record was parsed and analysis was skipped.
    pub results: Option<AnalysisResults>,
    pub reports_generated: usize,
}

/// Drain `lines` through `parser`, keeping records in line order.
pub fn collect_records(lines: LineStream, parser: &LineParser) -> (Vec<LogRecord>, ParseStats) {
    let mut stats = ParseStats::default();
    let mut records = Vec::new();

    for line in lines {
        stats.lines += 1;
        if let Some(record) = parser.parse_line(&line) {
            stats.records += 1;
            records.push(record);
        }
    }

    (records, stats)
}

/// Ingest, parse and analyze without reporting.
pub fn analyze(cfg: &AppConfig) -> anyhow::Result<RunOutcome> {
    let started = Instant::now();
    let parser = LineParser::new(&cfg.parser).context("invalid parser configuration")?;

    tracing::info!(source_type = %cfg.input.source_type, path = %cfg.input.path.display(), "reading logs");
    let (records, stats) = collect_records(ingest(&cfg.input), &parser);

    if stats.dropped() > 0 {
        tracing::warn!(dropped = stats.dropped(), "log lines did not parse and were dropped");
    }
    tracing::info!(
        lines = stats.lines,
        records = stats.records,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "parsing finished"
    );

    if records.is_empty() {
        tracing::warn!("no log records were parsed, nothing to analyze");
        return Ok(RunOutcome {
            stats,
            results: None,
            reports_generated: 0,
        });
    }

    let engine = AnalysisEngine::new(AnalyzerRegistry::from_config(cfg));
    let results = engine.run(&records);

    Ok(RunOutcome {
        stats,
        results: Some(results),
        reports_generated: 0,
    })
}

/// Full run including reporters. Reporters are skipped when nothing was parsed.
pub fn run(cfg: &AppConfig) -> anyhow::Result<RunOutcome> {
    let mut outcome = analyze(cfg)?;

    if let Some(results) = &outcome.results {
        let reporters = ReporterRegistry::from_config(cfg);
        tracing::info!(reporters = ?reporters.names(), "generating reports");
        outcome.reports_generated = reporters.generate_all(results, cfg);
    }

    Ok(outcome)
}
