use crate::analysis::counting::sum_by_first_seen;
use crate::analysis::{AnalyzerResult, Table};

pub const IP_GEO_DETAILS: &str = "ip_geo_details";
pub const COUNTRY_COUNTS: &str = "country_counts";
pub const ISP_COUNTS: &str = "isp_counts";

pub const UNKNOWN: &str = "Unknown";

const IP_DETAIL_LIMIT: usize = 200;

/// Regions reported separately by lookup sources, rolled up under one country.
const COUNTRY_REMAP: [(&str, &str); 3] = [
    ("Hong Kong", "China"),
    ("Taiwan", "China"),
    ("Macao", "China"),
];

/// Raw lookup output for one IP, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoLookup {
    pub country: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
}

/// One enriched IP, normalized and joined with its request count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoRecord {
    pub ip: String,
    pub country: String,
    pub city: String,
    pub isp: Option<String>,
    pub request_count: u64,
}

impl GeoRecord {
    pub fn new(ip: String, lookup: GeoLookup, request_count: u64) -> Self {
        Self {
            ip,
            country: normalize_country(lookup.country.as_deref()),
            city: non_empty(lookup.city).unwrap_or_else(|| UNKNOWN.to_string()),
            isp: non_empty(lookup.isp),
            request_count,
        }
    }
}

pub fn normalize_country(raw: Option<&str>) -> String {
    let Some(country) = raw.map(str::trim).filter(|c| !c.is_empty()) else {
        return UNKNOWN.to_string();
    };

    COUNTRY_REMAP
        .iter()
        .find(|(from, _)| *from == country)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| country.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build the geo tables from records already in descending request order.
pub fn geo_tables(records: &[GeoRecord], top_n: usize) -> AnalyzerResult {
    let mut details = Table::new(&["ip", "country", "city", "isp", "request_count"]);
    for g in records.iter().take(IP_DETAIL_LIMIT) {
        details.push_row(vec![
            g.ip.as_str().into(),
            g.country.as_str().into(),
            g.city.as_str().into(),
            g.isp.as_deref().unwrap_or(UNKNOWN).into(),
            g.request_count.into(),
        ]);
    }

    let mut countries = Table::new(&["country", "request_count"]);
    let by_country = sum_by_first_seen(records.iter().map(|g| (g.country.clone(), g.request_count)));
    for (country, count) in by_country.into_iter().take(top_n) {
        countries.push_row(vec![country.into(), count.into()]);
    }

    let mut result = AnalyzerResult::new();
    result.insert(IP_GEO_DETAILS.to_string(), details);
    result.insert(COUNTRY_COUNTS.to_string(), countries);

    if records.iter().any(|g| g.isp.is_some()) {
        let mut isps = Table::new(&["isp", "request_count"]);
        let by_isp = sum_by_first_seen(records.iter().map(|g| {
            (
                g.isp.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                g.request_count,
            )
        }));
        for (isp, count) in by_isp.into_iter().take(top_n) {
            isps.push_row(vec![isp.into(), count.into()]);
        }
        result.insert(ISP_COUNTS.to_string(), isps);
    }

    result
}
