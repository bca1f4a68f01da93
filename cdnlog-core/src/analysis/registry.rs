use crate::analysis::Analyzer;
use crate::analysis::basic_stats::BasicStatsAnalyzer;
use crate::analysis::geo::GeoAnalyzer;
use crate::analysis::response_time::ResponseTimeAnalyzer;
use crate::analysis::spider::SpiderAnalyzer;
use crate::conf::AppConfig;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalyzerKind {
    BasicStats,
    GeoIp,
    ResponseTime,
    Spider,
}

impl AnalyzerKind {
    pub const ALL: [AnalyzerKind; 4] = [
        AnalyzerKind::BasicStats,
        AnalyzerKind::GeoIp,
        AnalyzerKind::ResponseTime,
        AnalyzerKind::Spider,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::BasicStats => "basic_stats",
            AnalyzerKind::GeoIp => "geo_ip",
            AnalyzerKind::ResponseTime => "response_time",
            AnalyzerKind::Spider => "spider",
        }
    }
}

impl FromStr for AnalyzerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalyzerKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or(())
    }
}

type AnalyzerBuilder = fn(&AppConfig) -> Result<Box<dyn Analyzer>>;

fn build_basic_stats(cfg: &AppConfig) -> Result<Box<dyn Analyzer>> {
    Ok(Box::new(BasicStatsAnalyzer::from_config(&cfg.analysis)?))
}

fn build_geo_ip(cfg: &AppConfig) -> Result<Box<dyn Analyzer>> {
    Ok(Box::new(GeoAnalyzer::from_config(&cfg.analysis)?))
}

fn build_response_time(_cfg: &AppConfig) -> Result<Box<dyn Analyzer>> {
    Ok(Box::new(ResponseTimeAnalyzer))
}

fn build_spider(cfg: &AppConfig) -> Result<Box<dyn Analyzer>> {
    Ok(Box::new(SpiderAnalyzer::from_config(&cfg.analysis.spider)))
}

fn builtin_builders() -> HashMap<AnalyzerKind, AnalyzerBuilder> {
    let mut map = HashMap::new();

    map.insert(AnalyzerKind::BasicStats, build_basic_stats as AnalyzerBuilder);
    map.insert(AnalyzerKind::GeoIp, build_geo_ip as AnalyzerBuilder);
    map.insert(AnalyzerKind::ResponseTime, build_response_time as AnalyzerBuilder);
    map.insert(AnalyzerKind::Spider, build_spider as AnalyzerBuilder);

    map
}

/// The active analyzers, in configured order.
pub struct AnalyzerRegistry {
    analyzers: Vec<Box<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn new(analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self { analyzers }
    }

    /// Build every analyzer named in `analysis.modules`.
    ///
    /// Unknown names, repeated names and analyzers that fail to build are
    /// logged and skipped.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let builders = builtin_builders();
        let mut analyzers: Vec<Box<dyn Analyzer>> = Vec::new();
        let mut seen: Vec<AnalyzerKind> = Vec::new();

        for name in &cfg.analysis.modules {
            let Ok(kind) = name.parse::<AnalyzerKind>() else {
                tracing::warn!(module = %name, "unknown analysis module, skipping");
                continue;
            };

            if seen.contains(&kind) {
                tracing::warn!(module = %name, "analysis module listed twice, skipping repeat");
                continue;
            }
            seen.push(kind);

            let Some(builder) = builders.get(&kind) else {
                continue;
            };

            match builder(cfg).with_context(|| format!("failed to build analyzer '{name}'")) {
                Ok(analyzer) => analyzers.push(analyzer),
                Err(e) => tracing::error!(error = format!("{e:#}"), "skipping analysis module"),
            }
        }

        Self { analyzers }
    }

    pub fn all(&self) -> &[Box<dyn Analyzer>] {
        &self.analyzers
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }
}
