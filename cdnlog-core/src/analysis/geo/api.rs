use crate::analysis::geo::aggregate::GeoLookup;
use crate::conf::types::ApiGeoConfig;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

/// One entry of a batch lookup response.
#[derive(Debug, Deserialize)]
pub(crate) struct BatchEntry {
    #[serde(default)]
    status: String,
    #[serde(default)]
    query: String,
    country: Option<String>,
    city: Option<String>,
    isp: Option<String>,
}

/// Batched lookups against an ip-api style `POST /batch` endpoint.
pub struct GeoApiClient {
    http: Client,
    endpoint: String,
    batch_size: usize,
    timeout: Duration,
    max_concurrent: usize,
}

impl GeoApiClient {
    pub fn new(cfg: &ApiGeoConfig) -> anyhow::Result<Self> {
        Ok(Self {
            http: Client::builder().build()?,
            endpoint: cfg.endpoint.clone(),
            batch_size: cfg.batch_size.max(1),
            timeout: Duration::from_secs(cfg.timeout),
            max_concurrent: cfg.max_concurrent_batches.max(1),
        })
    }

    /// Look up `ips`, keyed by IP.
    ///
    /// Batches run up to `max_concurrent` at a time. A failed batch is logged
    /// and contributes nothing; its siblings are unaffected.
    pub fn lookup_all(&self, ips: &[String]) -> HashMap<String, GeoLookup> {
        let batches: Vec<&[String]> = ips.chunks(self.batch_size).collect();
        tracing::info!(ips = ips.len(), batches = batches.len(), "querying geo API");

        let mut resolved = HashMap::new();
        for (wave, group) in batches.chunks(self.max_concurrent).enumerate() {
            let outcomes: Vec<Vec<BatchEntry>> = thread::scope(|s| {
                let handles: Vec<_> = group
                    .iter()
                    .enumerate()
                    .map(|(i, batch)| {
                        let index = wave * self.max_concurrent + i;
                        s.spawn(move || self.run_batch(index, batch))
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_default())
                    .collect()
            });

            for entries in outcomes {
                resolved.extend(successful(entries));
            }
        }

        tracing::info!(resolved = resolved.len(), "geo API lookup finished");
        resolved
    }

    fn run_batch(&self, index: usize, batch: &[String]) -> Vec<BatchEntry> {
        match self.post_batch(batch) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(batch = index, size = batch.len(), error = %e, "geo API batch failed");
                Vec::new()
            }
        }
    }

    fn post_batch(&self, batch: &[String]) -> Result<Vec<BatchEntry>, reqwest::Error> {
        self.http
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(batch)
            .send()?
            .error_for_status()?
            .json()
    }
}

/// Keep success-flagged entries only.
pub(crate) fn successful(entries: Vec<BatchEntry>) -> impl Iterator<Item = (String, GeoLookup)> {
    entries
        .into_iter()
        .filter(|e| e.status == "success" && !e.query.is_empty())
        .map(|e| {
            (
                e.query,
                GeoLookup {
                    country: e.country,
                    city: e.city,
                    isp: e.isp,
                },
            )
        })
}
