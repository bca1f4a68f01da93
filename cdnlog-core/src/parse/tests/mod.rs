use crate::conf::types::ParserConfig;
use crate::parse::{LineParser, ParserError};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::net::IpAddr;

const SAMPLE: &str = r#"[10/Oct/2023:13:55:36 +0000] 93.184.216.34 120 "-" "HTTP/1.1" "GET" "example.com" "/index.html" 200 512 HIT "Mozilla/5.0" "-" 10.0.0.1"#;

fn parser() -> LineParser {
    LineParser::new(&ParserConfig::default()).unwrap()
}

#[test]
fn parses_reference_line() {
    let record = parser().parse_line(SAMPLE).expect("line should parse");

    assert_eq!(
        record.timestamp,
        Utc.with_ymd_and_hms(2023, 10, 10, 13, 55, 36).unwrap()
    );
    assert_eq!(record.client_ip, "93.184.216.34".parse::<IpAddr>().unwrap());
    assert_eq!(record.response_time_ms, 120);
    assert_eq!(record.status_code, 200);
    assert_eq!(record.response_size_bytes, 512);
    assert_eq!(record.referer, None);
    assert_eq!(record.cache_hit_status.as_deref(), Some("HIT"));
    assert_eq!(record.method, "GET");
    assert_eq!(record.domain, "example.com");
    assert_eq!(record.path, "/index.html");
    assert_eq!(record.protocol, "HTTP/1.1");
    assert_eq!(record.user_agent, "Mozilla/5.0");
}

#[test]
fn converts_offset_timestamps_to_utc() {
    let line = SAMPLE.replace("13:55:36 +0000", "21:55:36 +0800");

    let record = parser().parse_line(&line).unwrap();

    assert_eq!(
        record.timestamp,
        Utc.with_ymd_and_hms(2023, 10, 10, 13, 55, 36).unwrap()
    );
}

#[test]
fn keeps_referer_and_normalizes_absent_cache_status() {
    let line = SAMPLE
        .replace(r#""-" "HTTP/1.1""#, r#""https://ref.example/" "HTTP/1.1""#)
        .replace(" HIT ", " - ");

    let record = parser().parse_line(&line).unwrap();

    assert_eq!(record.referer.as_deref(), Some("https://ref.example/"));
    assert_eq!(record.cache_hit_status, None);
}

#[test]
fn tolerates_trailing_newline() {
    let line = format!("{SAMPLE}\r\n");
    assert!(parser().parse_line(&line).is_some());
}

#[test]
fn drops_non_matching_lines() {
    let p = parser();

    assert_eq!(p.parse_line(""), None);
    assert_eq!(p.parse_line("GET /index.html 200"), None);
    assert_eq!(p.parse_line(&SAMPLE[..40]), None);
}

#[test]
fn drops_lines_with_uncoercible_fields() {
    let p = parser();

    let bad_ip = SAMPLE.replace("93.184.216.34", "not-an-ip");
    let bad_time = SAMPLE.replace("10/Oct/2023", "2023-10-10");
    let huge_size = SAMPLE.replace(" 512 ", " 99999999999999999999999 ");
    let short_status = SAMPLE.replace(" 200 ", " 20 ");

    assert_eq!(p.parse_line(&bad_ip), None);
    assert_eq!(p.parse_line(&bad_time), None);
    assert_eq!(p.parse_line(&huge_size), None);
    assert_eq!(p.parse_line(&short_status), None);
}

#[test]
fn never_panics_on_arbitrary_bytes() {
    let p = parser();
    let inputs: Vec<Vec<u8>> = vec![
        vec![0xff, 0xfe, 0x00, b'[', b']'],
        b"[]  \"\" \"\"".to_vec(),
        "[\u{0}] ::1 0 \"\" \"\" \"\" \"\" \"\" 999 0 X \"\" \"\" -".as_bytes().to_vec(),
        SAMPLE.as_bytes().iter().rev().copied().collect(),
    ];

    for bytes in inputs {
        let line = String::from_utf8_lossy(&bytes);
        let _ = p.parse_line(&line);
    }
}

#[test]
fn zoneless_time_format_is_read_as_utc() {
    let cfg = ParserConfig {
        time_format: "%Y-%m-%d %H:%M:%S".to_string(),
        custom_regex: None,
    };
    let line = SAMPLE.replace("10/Oct/2023:13:55:36 +0000", "2023-10-10 13:55:36");

    let record = LineParser::new(&cfg).unwrap().parse_line(&line).unwrap();

    assert_eq!(
        record.timestamp,
        Utc.with_ymd_and_hms(2023, 10, 10, 13, 55, 36).unwrap()
    );
}

#[test]
fn custom_regex_must_define_required_groups() {
    let cfg = ParserConfig {
        custom_regex: Some(r"(?P<time_str>\S+) (?P<client_ip>\S+)".to_string()),
        ..ParserConfig::default()
    };

    let err = LineParser::new(&cfg).err().unwrap();

    assert!(matches!(err, ParserError::MissingGroup("response_time_ms")));
}

#[test]
fn invalid_custom_regex_is_reported() {
    let cfg = ParserConfig {
        custom_regex: Some("(unclosed".to_string()),
        ..ParserConfig::default()
    };

    assert!(matches!(LineParser::new(&cfg), Err(ParserError::Regex(_))));
}
