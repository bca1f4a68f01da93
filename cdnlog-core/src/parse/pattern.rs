use once_cell::sync::Lazy;
use regex::Regex;

/// Named groups every line pattern must define.
pub const REQUIRED_GROUPS: &[&str] = &[
    "time_str",
    "client_ip",
    "response_time_ms",
    "referer",
    "protocol",
    "method",
    "domain",
    "path",
    "status_code",
    "response_size_bytes",
    "cache_hit_status",
    "user_agent",
];

/// `[time] ip resp_time "referer" "protocol" "method" "domain" "path" status size cache_hit "user_agent" "other" source_ip`
///
/// `other` and `source_ip` must be present but are not captured.
pub const CDN_LINE_PATTERN: &str = concat!(
    r#"^\[(?P<time_str>.*?)\]\s+"#,
    r#"(?P<client_ip>\S+)\s+"#,
    r#"(?P<response_time_ms>\d+)\s+"#,
    r#""(?P<referer>.*?)"\s+"#,
    r#""(?P<protocol>.*?)"\s+"#,
    r#""(?P<method>.*?)"\s+"#,
    r#""(?P<domain>.*?)"\s+"#,
    r#""(?P<path>.*?)"\s+"#,
    r#"(?P<status_code>\d+)\s+"#,
    r#"(?P<response_size_bytes>\d+)\s+"#,
    r#"(?P<cache_hit_status>\S+)\s+"#,
    r#""(?P<user_agent>.*?)"\s+"#,
    r#"".*?"\s+"#,
    r#"\S+"#,
);

/// [`CDN_LINE_PATTERN`], compiled once and shared by every parser.
pub static CDN_LINE_REGEX: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(CDN_LINE_PATTERN));
