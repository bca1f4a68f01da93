//! Crawler and scanner detection by user agent and request volume.

use crate::analysis::counting::count_by_first_seen;
use crate::analysis::{Analyzer, AnalyzerResult, Table};
use crate::conf::types::SpiderConfig;
use crate::record::RecordSet;
use std::collections::HashMap;
use std::net::IpAddr;

pub const NAME: &str = "spider";

pub const SPIDER_IPS: &str = "spider_ips";
pub const BLACKLIST: &str = "blacklist";

pub struct SpiderAnalyzer {
    /// Lowercased.
    keywords: Vec<String>,
    request_threshold: u64,
}

impl SpiderAnalyzer {
    pub fn from_config(cfg: &SpiderConfig) -> Self {
        Self {
            keywords: cfg
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            request_threshold: cfg.request_threshold,
        }
    }

    pub fn is_spider(&self, user_agent: &str) -> bool {
        let ua = user_agent.to_lowercase();
        self.keywords.iter().any(|k| ua.contains(k.as_str()))
    }
}

impl Analyzer for SpiderAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn analyze(&self, records: &RecordSet) -> AnalyzerResult {
        let mut first_agent: HashMap<IpAddr, &str> = HashMap::new();
        let spider_hits = count_by_first_seen(
            records
                .iter()
                .filter(|r| self.is_spider(&r.user_agent))
                .map(|r| {
                    first_agent.entry(r.client_ip).or_insert(r.user_agent.as_str());
                    r.client_ip
                }),
        );

        let mut spider_ips = Table::new(&["ip", "request_count", "user_agent"]);
        for (ip, count) in &spider_hits {
            let agent = first_agent.get(ip).copied().unwrap_or_default();
            spider_ips.push_row(vec![ip.to_string().into(), (*count).into(), agent.into()]);
        }

        let mut blacklist = Table::new(&["ip", "request_count", "reason"]);
        for (ip, total) in count_by_first_seen(records.iter().map(|r| r.client_ip)) {
            let high_volume = total > self.request_threshold;
            let spider = first_agent.contains_key(&ip);
            let reason = match (high_volume, spider) {
                (true, true) => "high_volume+spider",
                (true, false) => "high_volume",
                (false, true) => "spider",
                (false, false) => continue,
            };
            blacklist.push_row(vec![ip.to_string().into(), total.into(), reason.into()]);
        }

        let mut result = AnalyzerResult::new();
        result.insert(SPIDER_IPS.to_string(), spider_ips);
        result.insert(BLACKLIST.to_string(), blacklist);
        result
    }
}
