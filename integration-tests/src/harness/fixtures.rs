use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;

/// A well-formed CDN access-log line for `ip`, answered with `status`.
pub fn log_line(ip: &str, status: u16) -> String {
    format!(
        r#"[10/Oct/2023:13:55:36 +0000] {ip} 120 "-" "HTTP/1.1" "GET" "example.com" "/index.html" {status} 512 HIT "Mozilla/5.0" "-" 10.0.0.1"#
    )
}

pub fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

/// `input.api` YAML block pointing at `endpoint`.
pub fn api_input_yaml(cache_dir: &str, endpoint: &str) -> String {
    format!(
        "input:
  source_type: api
  path: {cache_dir}
  api:
    domain_name: example.com
    start_time: 2023-10-10T00:00:00Z
    end_time: 2023-10-11T00:00:00Z
    access_key: AKIDEXAMPLE
    secret_key: SECRETEXAMPLE
    endpoint: {endpoint}
    list_timeout_secs: 5
    fetch_timeout_secs: 5
"
    )
}
