//! Line parsing
//!
//! Turns one raw access-log line into a [`LogRecord`] using a regular
//! expression with named groups plus a strftime-style time format.
//!
//! Parsing is total: every input either yields a complete record or `None`.
//! Lines that do not match the pattern are skipped quietly; lines that match
//! but carry fields that fail to coerce (bad IP, overflowing number, time not
//! in the configured format) are logged at `warn` and skipped.
//!
//! The `-` placeholder is normalised to `None` here, once, for the optional
//! `referer` and `cache_hit_status` fields.

mod error;
mod pattern;
#[cfg(test)]
mod tests;

pub use error::ParserError;
pub use pattern::{CDN_LINE_PATTERN, REQUIRED_GROUPS};

use crate::conf::types::ParserConfig;
use crate::record::LogRecord;
use chrono::{DateTime, NaiveDateTime, Utc};
use pattern::CDN_LINE_REGEX;
use regex::{Captures, Regex};
use std::net::IpAddr;

const ABSENT: &str = "-";

pub struct LineParser {
    pattern: Regex,
    time_format: String,
    time_has_zone: bool,
}

impl LineParser {
    pub fn new(cfg: &ParserConfig) -> Result<Self, ParserError> {
        let pattern = match &cfg.custom_regex {
            // Anchor custom patterns at line start, like the built-in one.
            Some(raw) => Regex::new(&format!("^(?:{raw})"))?,
            None => CDN_LINE_REGEX.as_ref().map_err(|e| e.clone())?.clone(),
        };

        let names: Vec<&str> = pattern.capture_names().flatten().collect();
        if let Some(missing) = REQUIRED_GROUPS.iter().find(|g| !names.contains(g)) {
            return Err(ParserError::MissingGroup(*missing));
        }

        Ok(Self {
            pattern,
            time_has_zone: has_zone_directive(&cfg.time_format),
            time_format: cfg.time_format.clone(),
        })
    }

    pub fn parse_line(&self, line: &str) -> Option<LogRecord> {
        let line = line.trim_end_matches(['\r', '\n']);
        let caps = self.pattern.captures(line)?;

        match self.build_record(&caps) {
            Ok(record) => Some(record),
            Err(field) => {
                tracing::warn!(field, line, "dropping log line with uncoercible field");
                None
            }
        }
    }

    /// On failure returns the name of the first field that did not coerce.
    fn build_record(&self, caps: &Captures<'_>) -> Result<LogRecord, &'static str> {
        let field = |name: &'static str| caps.name(name).map(|m| m.as_str()).unwrap_or_default();

        let timestamp = self.parse_time(field("time_str")).ok_or("time_str")?;
        let client_ip = field("client_ip")
            .parse::<IpAddr>()
            .map_err(|_| "client_ip")?;
        let response_time_ms = field("response_time_ms")
            .parse::<u64>()
            .map_err(|_| "response_time_ms")?;
        let status_code = field("status_code")
            .parse::<u16>()
            .ok()
            .filter(|code| (100..=999).contains(code))
            .ok_or("status_code")?;
        let response_size_bytes = field("response_size_bytes")
            .parse::<u64>()
            .map_err(|_| "response_size_bytes")?;

        Ok(LogRecord {
            timestamp,
            client_ip,
            response_time_ms,
            status_code,
            response_size_bytes,
            method: field("method").to_string(),
            domain: field("domain").to_string(),
            path: field("path").to_string(),
            protocol: field("protocol").to_string(),
            user_agent: field("user_agent").to_string(),
            referer: optional(field("referer")),
            cache_hit_status: optional(field("cache_hit_status")),
        })
    }

    fn parse_time(&self, raw: &str) -> Option<DateTime<Utc>> {
        if self.time_has_zone {
            DateTime::parse_from_str(raw, &self.time_format)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        } else {
            // Zone-less formats are read as UTC.
            NaiveDateTime::parse_from_str(raw, &self.time_format)
                .ok()
                .map(|naive| naive.and_utc())
        }
    }
}

fn optional(value: &str) -> Option<String> {
    (value != ABSENT).then(|| value.to_string())
}

fn has_zone_directive(format: &str) -> bool {
    ["%z", "%:z", "%::z", "%#z"]
        .iter()
        .any(|d| format.contains(d))
}
