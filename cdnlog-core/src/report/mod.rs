//! Output sinks
//!
//! Reporters receive the finished [`AnalysisResults`] read-only together with
//! the resolved configuration. They run only after every analyzer is done.

mod cli;
mod json;

pub use cli::{CliReporter, render_results};
pub use json::{JsonReporter, REPORT_FILE_NAME};

use crate::analysis::AnalysisResults;
use crate::conf::AppConfig;
use anyhow::Context;
use std::collections::HashMap;

pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;

    fn generate(&self, results: &AnalysisResults, cfg: &AppConfig) -> anyhow::Result<()>;
}

type ReporterBuilder = fn(&AppConfig) -> anyhow::Result<Box<dyn Reporter>>;

fn build_cli(_cfg: &AppConfig) -> anyhow::Result<Box<dyn Reporter>> {
    Ok(Box::new(CliReporter::default()))
}

fn build_json(cfg: &AppConfig) -> anyhow::Result<Box<dyn Reporter>> {
    Ok(Box::new(JsonReporter::new(&cfg.output.report_path)))
}

fn builtin_builders() -> HashMap<&'static str, ReporterBuilder> {
    let mut map = HashMap::new();

    map.insert("cli", build_cli as ReporterBuilder);
    map.insert("json", build_json as ReporterBuilder);

    map
}

pub struct ReporterRegistry {
    reporters: Vec<Box<dyn Reporter>>,
}

impl ReporterRegistry {
    /// Build every reporter named in `output.reporters`; unknown names are
    /// logged and skipped.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let builders = builtin_builders();
        let mut reporters: Vec<Box<dyn Reporter>> = Vec::new();

        for name in &cfg.output.reporters {
            let Some(builder) = builders.get(name.trim()) else {
                tracing::warn!(reporter = %name, "unknown reporter, skipping");
                continue;
            };

            if reporters.iter().any(|r| r.name() == name.trim()) {
                tracing::warn!(reporter = %name, "reporter listed twice, skipping repeat");
                continue;
            }

            match builder(cfg).with_context(|| format!("failed to build reporter '{name}'")) {
                Ok(reporter) => reporters.push(reporter),
                Err(e) => tracing::error!(error = format!("{e:#}"), "skipping reporter"),
            }
        }

        Self { reporters }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.reporters.iter().map(|r| r.name()).collect()
    }

    /// Run every reporter; a failing reporter does not stop the others.
    ///
    /// Returns the number of reporters that succeeded.
    pub fn generate_all(&self, results: &AnalysisResults, cfg: &AppConfig) -> usize {
        let mut ok = 0;
        for reporter in &self.reporters {
            match reporter.generate(results, cfg) {
                Ok(()) => {
                    tracing::info!(reporter = reporter.name(), "report generated");
                    ok += 1;
                }
                Err(e) => {
                    tracing::error!(reporter = reporter.name(), error = format!("{e:#}"), "report failed")
                }
            }
        }
        ok
    }
}
