//! Latency distribution and edge-cache outcomes.

use crate::analysis::counting::count_by_first_seen;
use crate::analysis::histogram::Histogram;
use crate::analysis::{Analyzer, AnalyzerResult, Table};
use crate::record::RecordSet;

pub const NAME: &str = "response_time";

pub const LATENCY_BUCKETS: &str = "latency_buckets";
pub const LATENCY_PERCENTILES: &str = "latency_percentiles";
pub const CACHE_HIT_COUNTS: &str = "cache_hit_counts";

const LATENCY_BUCKETS_MS: &[u64] = &[1, 5, 10, 25, 50, 100, 250, 500, 1000];
const PERCENTILES: [(&str, f64); 3] = [("p50", 0.50), ("p95", 0.95), ("p99", 0.99)];

pub struct ResponseTimeAnalyzer;

impl Analyzer for ResponseTimeAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn analyze(&self, records: &RecordSet) -> AnalyzerResult {
        let mut latency = Histogram::new(LATENCY_BUCKETS_MS);
        for r in records {
            latency.record(r.response_time_ms);
        }

        let mut buckets = Table::new(&["bucket", "count"]);
        for (label, count) in latency.labeled() {
            buckets.push_row(vec![label.into(), count.into()]);
        }

        let mut percentiles = Table::new(&["percentile", "ms"]);
        for (label, pct) in PERCENTILES {
            percentiles.push_row(vec![label.into(), latency.percentile(pct).into()]);
        }

        let mut cache = Table::new(&["cache_hit_status", "count"]);
        let statuses = records
            .iter()
            .map(|r| r.cache_hit_status.clone().unwrap_or_else(|| "-".to_string()));
        for (status, count) in count_by_first_seen(statuses) {
            cache.push_row(vec![status.into(), count.into()]);
        }

        let mut result = AnalyzerResult::new();
        result.insert(LATENCY_BUCKETS.to_string(), buckets);
        result.insert(LATENCY_PERCENTILES.to_string(), percentiles);
        result.insert(CACHE_HIT_COUNTS.to_string(), cache);
        result
    }
}
