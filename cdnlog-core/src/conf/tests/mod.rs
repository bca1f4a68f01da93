use crate::conf::types::{GeoProvider, SampleSize, SourceType};
use crate::conf::{ConfigError, load_config, parse_config};
use chrono::FixedOffset;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const MINIMAL: &str = "
input:
  path: ./logs
analysis:
  modules: [basic_stats]
";

fn parse(yaml: &str) -> Result<crate::conf::AppConfig, ConfigError> {
    parse_config(Path::new("test.yaml"), yaml)
}

fn validation_errors(yaml: &str) -> Vec<String> {
    match parse(yaml) {
        Err(ConfigError::Validation { errors }) => errors,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn minimal_config_gets_defaults() {
    let cfg = parse(MINIMAL).unwrap();

    assert_eq!(cfg.input.source_type, SourceType::Local);
    assert_eq!(cfg.input.path, PathBuf::from("./logs"));
    assert_eq!(cfg.input.file_pattern, "*.log");
    assert_eq!(cfg.input.compressed_suffix, ".gz");
    assert!(cfg.input.api.is_none());
    assert_eq!(cfg.parser.time_format, "%d/%b/%Y:%H:%M:%S %z");
    assert_eq!(cfg.analysis.top_n_count, 20);
    assert_eq!(cfg.analysis.sample_size, SampleSize::Count(100));
    assert_eq!(cfg.analysis.utc_offset(), FixedOffset::east_opt(8 * 3600));
    assert!(cfg.analysis.hourly_fill_gaps);
    assert_eq!(cfg.analysis.hourly_fill_max_hours, 24 * 366);
    assert_eq!(cfg.analysis.geoip.provider, GeoProvider::Local);
    assert_eq!(cfg.analysis.geoip.api.batch_size, 100);
    assert_eq!(cfg.analysis.geoip.api.timeout, 10);
    assert_eq!(cfg.analysis.spider.request_threshold, 100);
    assert_eq!(cfg.output.reporters, vec!["cli"]);
    assert_eq!(cfg.output.report_path, PathBuf::from("reports"));
}

#[test]
fn api_block_gets_defaults() {
    let yaml = "
input:
  source_type: api
  path: ./cache
  api:
    domain_name: example.com
    start_time: 2023-10-10T00:00:00Z
    end_time: 2023-10-11T00:00:00Z
    access_key: AK
    secret_key: SK
    endpoint: https://cdn.myhuaweicloud.com
analysis:
  modules: [basic_stats, geo_ip]
  geoip:
    provider: api
";

    let cfg = parse(yaml).unwrap();
    let api = cfg.input.api.as_ref().unwrap();

    assert_eq!(cfg.input.source_type, SourceType::Api);
    assert_eq!(api.page_size, 1000);
    assert!(api.skip_existing_logs);
    assert!(api.download_new_logs);
    assert_eq!(api.list_timeout_secs, 30);
    assert_eq!(api.fetch_timeout_secs, 180);
    assert_eq!(cfg.analysis.geoip.provider, GeoProvider::Api);
}

#[test]
fn secret_key_is_redacted_in_debug_output() {
    let yaml = "
input:
  source_type: api
  path: ./cache
  api:
    domain_name: example.com
    start_time: 2023-10-10T00:00:00Z
    end_time: 2023-10-11T00:00:00Z
    access_key: AK
    secret_key: super-secret
    endpoint: https://cdn.myhuaweicloud.com
analysis:
  modules: []
";

    let cfg = parse(yaml).unwrap();
    let debug = format!("{cfg:?}");

    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn unknown_source_type_is_kept_for_ingestion_to_report() {
    let cfg = parse(&MINIMAL.replace("path: ./logs", "source_type: s3\n  path: ./logs")).unwrap();

    assert_eq!(cfg.input.source_type, SourceType::Unsupported("s3".to_string()));
}

#[test]
fn sample_size_accepts_all() {
    let cfg = parse(&format!("{MINIMAL}  sample_size: all\n")).unwrap();
    assert_eq!(cfg.analysis.sample_size, SampleSize::All);

    let cfg = parse(&format!("{MINIMAL}  sample_size: 5\n")).unwrap();
    assert_eq!(cfg.analysis.sample_size, SampleSize::Count(5));

    assert!(matches!(
        parse(&format!("{MINIMAL}  sample_size: some\n")),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn timezone_accepts_utc_aliases() {
    let cfg = parse(&format!("{MINIMAL}  timezone: UTC\n")).unwrap();
    assert_eq!(cfg.analysis.utc_offset(), FixedOffset::east_opt(0));

    let cfg = parse(&format!("{MINIMAL}  timezone: \"-05:30\"\n")).unwrap();
    assert_eq!(cfg.analysis.utc_offset(), FixedOffset::west_opt(5 * 3600 + 1800));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = parse(&format!("{MINIMAL}  colour: blue\n")).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn validation_collects_every_problem() {
    let yaml = format!(
        "{MINIMAL}  top_n_count: 0\n  timezone: Asia/Shanghai\n  geoip:\n    api:\n      batch_size: 0\n"
    );

    let errors = validation_errors(&yaml);

    assert_eq!(errors.len(), 3);
    assert!(errors[0].contains("top_n_count"));
    assert!(errors[1].contains("Asia/Shanghai"));
    assert!(errors[2].contains("batch_size"));
}

#[test]
fn invalid_custom_regex_fails_validation() {
    let yaml = MINIMAL.replace(
        "analysis:",
        "parser:\n  custom_regex: \"(?P<time_str>\\\\S+)\"\nanalysis:",
    );

    let errors = validation_errors(&yaml);

    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("parser:"));
}

#[test]
fn api_endpoint_must_be_a_url() {
    let yaml = "
input:
  source_type: api
  path: ./cache
  api:
    domain_name: example.com
    start_time: 2023-10-10T00:00:00Z
    end_time: 2023-10-11T00:00:00Z
    access_key: AK
    secret_key: SK
    endpoint: not a url
analysis:
  modules: []
";

    let errors = validation_errors(yaml);

    assert_eq!(errors, vec!["input.api.endpoint 'not a url' is not a URL"]);
}

#[test]
fn load_config_reports_missing_file() {
    let dir = tempdir().unwrap();

    let err = load_config(&dir.path().join("absent.yaml")).unwrap_err();

    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn load_config_reads_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, MINIMAL).unwrap();

    let cfg = load_config(&path).unwrap();

    assert_eq!(cfg.analysis.modules, vec!["basic_stats"]);
}
