//! IP geo enrichment
//!
//! Two interchangeable lookup strategies, an offline database or a batched
//! remote API, feed one normalization and rollup step, so both produce the
//! same tables with the same country remap.

mod aggregate;
mod api;
mod local;

pub use aggregate::{
    COUNTRY_COUNTS, GeoLookup, GeoRecord, IP_GEO_DETAILS, ISP_COUNTS, UNKNOWN, geo_tables,
    normalize_country,
};
pub use api::GeoApiClient;
pub use local::{GeoDatabase, MaxMindDatabase};

use crate::analysis::counting::count_by_first_seen;
use crate::analysis::{Analyzer, AnalyzerResult};
use crate::conf::types::{AnalysisConfig, GeoProvider};
use crate::record::RecordSet;

pub const NAME: &str = "geo_ip";

pub enum GeoStrategy {
    /// `None` when the database could not be opened.
    Local(Option<Box<dyn GeoDatabase>>),
    Api(GeoApiClient),
}

pub struct GeoAnalyzer {
    strategy: GeoStrategy,
    top_n: usize,
}

impl GeoAnalyzer {
    pub fn new(strategy: GeoStrategy, top_n: usize) -> Self {
        Self { strategy, top_n }
    }

    pub fn from_config(cfg: &AnalysisConfig) -> anyhow::Result<Self> {
        let strategy = match cfg.geoip.provider {
            GeoProvider::Local => GeoStrategy::Local(open_local(cfg)),
            GeoProvider::Api => GeoStrategy::Api(GeoApiClient::new(&cfg.geoip.api)?),
        };
        Ok(Self::new(strategy, cfg.top_n_count))
    }
}

fn open_local(cfg: &AnalysisConfig) -> Option<Box<dyn GeoDatabase>> {
    let local = &cfg.geoip.local;
    let Some(db_path) = local.db_path.as_deref() else {
        tracing::warn!("analysis.geoip.local.db_path is not set");
        return None;
    };

    match MaxMindDatabase::open(db_path, local.isp_db_path.as_deref()) {
        Ok(db) => {
            tracing::info!(path = %db_path.display(), "geo database opened");
            Some(Box::new(db))
        }
        Err(e) => {
            tracing::warn!(path = %db_path.display(), error = %e, "failed to open geo database");
            None
        }
    }
}

impl Analyzer for GeoAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn analyze(&self, records: &RecordSet) -> AnalyzerResult {
        let ranked = count_by_first_seen(records.iter().map(|r| r.client_ip.to_string()));
        let ips: Vec<String> = ranked.iter().map(|(ip, _)| ip.clone()).collect();

        let geo: Vec<GeoRecord> = match &self.strategy {
            GeoStrategy::Local(None) => {
                tracing::warn!("no geo database available, skipping geo enrichment");
                return AnalyzerResult::new();
            }
            GeoStrategy::Local(Some(db)) => local::lookup_all(db.as_ref(), &ips)
                .into_iter()
                .zip(ranked)
                .map(|(lookup, (ip, count))| GeoRecord::new(ip, lookup, count))
                .collect(),
            GeoStrategy::Api(client) => {
                let mut resolved = client.lookup_all(&ips);
                if resolved.is_empty() && !ips.is_empty() {
                    tracing::warn!(ips = ips.len(), "geo API resolved no IPs");
                }
                ranked
                    .into_iter()
                    .filter_map(|(ip, count)| {
                        let lookup = resolved.remove(&ip)?;
                        Some(GeoRecord::new(ip, lookup, count))
                    })
                    .collect()
            }
        };

        geo_tables(&geo, self.top_n)
    }
}
