use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;

/// One parsed CDN access-log line.
///
/// Records are only ever built whole by the line parser; a line whose required
/// fields do not coerce never produces a partial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub client_ip: IpAddr,
    pub response_time_ms: u64,
    /// Always three digits (100..=999).
    pub status_code: u16,
    pub response_size_bytes: u64,
    pub method: String,
    pub domain: String,
    pub path: String,
    pub protocol: String,
    pub user_agent: String,
    pub referer: Option<String>,
    pub cache_hit_status: Option<String>,
}

impl LogRecord {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status_code)
    }
}

/// Records for one run, in source-line discovery order (not necessarily chronological).
pub type RecordSet = [LogRecord];
