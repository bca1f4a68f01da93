//! Status histogram, top client IPs, hourly traffic and a record sample.

use crate::analysis::counting::{count_by_first_seen, ratio_percent};
use crate::analysis::{Analyzer, AnalyzerResult, Cell, Table};
use crate::conf::types::{AnalysisConfig, SampleSize};
use crate::record::{LogRecord, RecordSet};
use anyhow::anyhow;
use chrono::{DateTime, FixedOffset, TimeDelta, Timelike, Utc};
use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;

pub const NAME: &str = "basic_stats";

pub const STATUS_COUNTS: &str = "status_counts";
pub const TOP_IPS: &str = "top_ips";
pub const TOP_IP_STATUS: &str = "top_ip_status";
pub const HOURLY_COUNTS: &str = "hourly_counts";
pub const RAW_LOGS_SAMPLE: &str = "raw_logs_sample";

/// Widest first-to-last span, in hours, that zero-fill will cover (one leap year).
pub const DEFAULT_FILL_LIMIT_HOURS: u32 = 24 * 366;

pub const SAMPLE_COLUMNS: [&str; 12] = [
    "timestamp",
    "client_ip",
    "method",
    "domain",
    "path",
    "protocol",
    "status_code",
    "response_time_ms",
    "response_size_bytes",
    "cache_hit_status",
    "referer",
    "user_agent",
];

pub struct BasicStatsAnalyzer {
    top_n: usize,
    sample_size: SampleSize,
    offset: FixedOffset,
    fill_gaps: bool,
    fill_limit_hours: u32,
}

impl BasicStatsAnalyzer {
    pub fn new(top_n: usize, sample_size: SampleSize, offset: FixedOffset, fill_gaps: bool) -> Self {
        Self {
            top_n,
            sample_size,
            offset,
            fill_gaps,
            fill_limit_hours: DEFAULT_FILL_LIMIT_HOURS,
        }
    }

    pub fn with_fill_limit(mut self, hours: u32) -> Self {
        self.fill_limit_hours = hours;
        self
    }

    pub fn from_config(cfg: &AnalysisConfig) -> anyhow::Result<Self> {
        let offset = cfg
            .utc_offset()
            .ok_or_else(|| anyhow!("invalid analysis.timezone '{}'", cfg.timezone))?;
        Ok(
            Self::new(cfg.top_n_count, cfg.sample_size, offset, cfg.hourly_fill_gaps)
                .with_fill_limit(cfg.hourly_fill_max_hours),
        )
    }

    fn status_counts(records: &RecordSet) -> Table {
        let mut counts: BTreeMap<u16, u64> = BTreeMap::new();
        for r in records {
            *counts.entry(r.status_code).or_default() += 1;
        }

        let mut table = Table::new(&["status_code", "count"]);
        for (code, count) in counts {
            table.push_row(vec![code.into(), count.into()]);
        }
        table
    }

    /// `top_ips` and `top_ip_status` share the same IP selection.
    fn top_ips(&self, records: &RecordSet) -> (Table, Table) {
        let ranked = count_by_first_seen(records.iter().map(|r| r.client_ip));

        let mut success: HashMap<IpAddr, u64> = HashMap::new();
        for r in records.iter().filter(|r| r.is_success()) {
            *success.entry(r.client_ip).or_default() += 1;
        }

        let mut top = Table::new(&["ip", "count"]);
        let mut status = Table::new(&["ip", "total_requests", "2xx_requests", "2xx_ratio"]);

        for (ip, total) in ranked.into_iter().take(self.top_n) {
            let ok = success.get(&ip).copied().unwrap_or(0);
            top.push_row(vec![ip.to_string().into(), total.into()]);
            status.push_row(vec![
                ip.to_string().into(),
                total.into(),
                ok.into(),
                ratio_percent(ok, total).into(),
            ]);
        }

        (top, status)
    }

    fn hourly_counts(&self, records: &RecordSet) -> Table {
        let mut buckets: BTreeMap<DateTime<FixedOffset>, u64> = BTreeMap::new();
        for r in records {
            if let Some(hour) = floor_to_hour(r.timestamp, self.offset) {
                *buckets.entry(hour).or_default() += 1;
            }
        }

        if self.fill_gaps {
            fill_hour_gaps(&mut buckets, self.fill_limit_hours);
        }

        let mut table = Table::new(&["hour", "count"]);
        for (hour, count) in buckets {
            table.push_row(vec![hour.into(), count.into()]);
        }
        table
    }

    fn sample(&self, records: &RecordSet) -> Table {
        let take = match self.sample_size {
            SampleSize::Count(n) => n,
            SampleSize::All => records.len(),
        };

        let mut table = Table::new(&SAMPLE_COLUMNS);
        for r in records.iter().take(take) {
            table.push_row(sample_row(r, self.offset));
        }
        table
    }
}

impl Analyzer for BasicStatsAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn analyze(&self, records: &RecordSet) -> AnalyzerResult {
        let (top_ips, top_ip_status) = self.top_ips(records);

        let mut result = AnalyzerResult::new();
        result.insert(STATUS_COUNTS.to_string(), Self::status_counts(records));
        result.insert(TOP_IPS.to_string(), top_ips);
        result.insert(TOP_IP_STATUS.to_string(), top_ip_status);
        result.insert(HOURLY_COUNTS.to_string(), self.hourly_counts(records));
        result.insert(RAW_LOGS_SAMPLE.to_string(), self.sample(records));
        result
    }
}

/// Start of the hour containing `ts`, as seen from `offset`.
pub(crate) fn floor_to_hour(ts: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let local = ts.with_timezone(&offset);
    local
        .date_naive()
        .and_hms_opt(local.hour(), 0, 0)?
        .and_local_timezone(offset)
        .single()
}

/// Insert zero-count hours between the first and last bucket.
///
/// Spans wider than `limit_hours` are left sparse.
fn fill_hour_gaps(buckets: &mut BTreeMap<DateTime<FixedOffset>, u64>, limit_hours: u32) {
    let (Some(first), Some(last)) = (
        buckets.keys().next().copied(),
        buckets.keys().next_back().copied(),
    ) else {
        return;
    };

    let span_hours = (last - first).num_hours();
    if span_hours > i64::from(limit_hours) {
        tracing::warn!(
            first = %first,
            last = %last,
            span_hours,
            limit_hours,
            "hourly span too wide to zero-fill, omitting empty hours"
        );
        return;
    }

    let mut hour = first;
    while hour < last {
        hour += TimeDelta::hours(1);
        buckets.entry(hour).or_insert(0);
    }
}

fn sample_row(r: &LogRecord, offset: FixedOffset) -> Vec<Cell> {
    vec![
        r.timestamp.with_timezone(&offset).into(),
        r.client_ip.to_string().into(),
        r.method.as_str().into(),
        r.domain.as_str().into(),
        r.path.as_str().into(),
        r.protocol.as_str().into(),
        r.status_code.into(),
        r.response_time_ms.into(),
        r.response_size_bytes.into(),
        r.cache_hit_status.clone().into(),
        r.referer.clone().into(),
        r.user_agent.as_str().into(),
    ]
}
