use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub input: InputConfig,

    #[serde(default)]
    pub parser: ParserConfig,

    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

//-----------------------------------------------------------------------------
// Input
//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default)]
    pub source_type: SourceType,

    /// Log directory in `local` mode, cache directory in `api` mode.
    pub path: PathBuf,

    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,

    #[serde(default = "default_compressed_suffix")]
    pub compressed_suffix: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<InputApiConfig>,
}

fn default_file_pattern() -> String {
    "*.log".to_string()
}

fn default_compressed_suffix() -> String {
    ".gz".to_string()
}

/// Where raw log lines come from.
///
/// Unrecognised values are kept rather than rejected at load time; ingestion
/// reports them and yields nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum SourceType {
    #[default]
    Local,
    Api,
    Unsupported(String),
}

impl From<String> for SourceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "local" => SourceType::Local,
            "api" => SourceType::Api,
            _ => SourceType::Unsupported(value),
        }
    }
}

impl From<SourceType> for String {
    fn from(value: SourceType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Local => f.write_str("local"),
            SourceType::Api => f.write_str("api"),
            SourceType::Unsupported(other) => f.write_str(other),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InputApiConfig {
    pub domain_name: String,

    /// ISO-8601 UTC, e.g. `2023-10-10T00:00:00Z`
    pub start_time: String,
    pub end_time: String,

    pub access_key: String,
    pub secret_key: String,

    /// e.g. `https://cdn.myhuaweicloud.com`
    pub endpoint: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Drop listed artifacts whose file name already exists in the cache directory.
    #[serde(default = "default_true")]
    pub skip_existing_logs: bool,

    /// Write downloaded artifacts through to the cache directory.
    #[serde(default = "default_true")]
    pub download_new_logs: bool,

    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl fmt::Debug for InputApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputApiConfig")
            .field("domain_name", &self.domain_name)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("page_size", &self.page_size)
            .field("skip_existing_logs", &self.skip_existing_logs)
            .field("download_new_logs", &self.download_new_logs)
            .field("list_timeout_secs", &self.list_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .finish()
    }
}

fn default_page_size() -> u32 {
    1000
}

fn default_list_timeout() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    180
}

fn default_true() -> bool {
    true
}

//-----------------------------------------------------------------------------
// Parser
//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// strftime-style pattern for the bracketed time field.
    #[serde(default = "default_time_format")]
    pub time_format: String,

    /// Overrides the built-in CDN line pattern. Must define the same named groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_regex: Option<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
            custom_regex: None,
        }
    }
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

//-----------------------------------------------------------------------------
// Analysis
//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    pub modules: Vec<String>,

    #[serde(default = "default_top_n")]
    pub top_n_count: usize,

    #[serde(default)]
    pub sample_size: SampleSize,

    /// Fixed UTC offset used for hourly bucketing, e.g. `+08:00`.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Emit zero-count rows for hours without traffic between the first and last bucket.
    #[serde(default = "default_true")]
    pub hourly_fill_gaps: bool,

    /// Widest first-to-last hour span that is zero-filled; wider spans keep only hours with traffic.
    #[serde(default = "default_fill_max_hours")]
    pub hourly_fill_max_hours: u32,

    #[serde(default)]
    pub geoip: GeoIpConfig,

    #[serde(default)]
    pub spider: SpiderConfig,
}

fn default_top_n() -> usize {
    20
}

fn default_fill_max_hours() -> u32 {
    crate::analysis::basic_stats::DEFAULT_FILL_LIMIT_HOURS
}

fn default_timezone() -> String {
    "+08:00".to_string()
}

/// Head-N record sample size; `all` keeps every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "SampleSizeRepr", into = "SampleSizeRepr")]
pub enum SampleSize {
    Count(usize),
    All,
}

impl Default for SampleSize {
    fn default() -> Self {
        SampleSize::Count(100)
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum SampleSizeRepr {
    Count(usize),
    Keyword(String),
}

impl TryFrom<SampleSizeRepr> for SampleSize {
    type Error = String;

    fn try_from(value: SampleSizeRepr) -> Result<Self, Self::Error> {
        match value {
            SampleSizeRepr::Count(n) => Ok(SampleSize::Count(n)),
            SampleSizeRepr::Keyword(k) if k.eq_ignore_ascii_case("all") => Ok(SampleSize::All),
            SampleSizeRepr::Keyword(k) => Err(format!(
                "sample_size must be a number or \"all\", got \"{k}\""
            )),
        }
    }
}

impl From<SampleSize> for SampleSizeRepr {
    fn from(value: SampleSize) -> Self {
        match value {
            SampleSize::Count(n) => SampleSizeRepr::Count(n),
            SampleSize::All => SampleSizeRepr::Keyword("all".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeoIpConfig {
    #[serde(default)]
    pub provider: GeoProvider,

    #[serde(default)]
    pub local: LocalGeoConfig,

    #[serde(default)]
    pub api: ApiGeoConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoProvider {
    #[default]
    Local,
    Api,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocalGeoConfig {
    /// MaxMind City database (country + city names).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// MaxMind ISP/ASN database (autonomous system organization).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isp_db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiGeoConfig {
    #[serde(default = "default_geo_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-batch request timeout in seconds.
    #[serde(default = "default_geo_timeout")]
    pub timeout: u64,

    #[serde(default = "default_concurrent_batches")]
    pub max_concurrent_batches: usize,
}

impl Default for ApiGeoConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geo_endpoint(),
            batch_size: default_batch_size(),
            timeout: default_geo_timeout(),
            max_concurrent_batches: default_concurrent_batches(),
        }
    }
}

fn default_geo_endpoint() -> String {
    "http://ip-api.com/batch?fields=status,country,city,isp,query".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_geo_timeout() -> u64 {
    10
}

fn default_concurrent_batches() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpiderConfig {
    /// Case-insensitive user-agent substrings.
    #[serde(default = "default_spider_keywords")]
    pub keywords: Vec<String>,

    /// IPs with more requests than this are blacklisted regardless of user agent.
    #[serde(default = "default_request_threshold")]
    pub request_threshold: u64,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            keywords: default_spider_keywords(),
            request_threshold: default_request_threshold(),
        }
    }
}

fn default_spider_keywords() -> Vec<String> {
    [
        "CensysInspect",
        "curl",
        "Wget",
        "bot",
        "crawl",
        "scanner",
        "security",
        "nmap",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_request_threshold() -> u64 {
    100
}

//-----------------------------------------------------------------------------
// Output
//-----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_reporters")]
    pub reporters: Vec<String>,

    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reporters: default_reporters(),
            report_path: default_report_path(),
        }
    }
}

fn default_reporters() -> Vec<String> {
    vec!["cli".to_string()]
}

fn default_report_path() -> PathBuf {
    PathBuf::from("reports")
}
