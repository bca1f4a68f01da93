use crate::conf::error::ConfigError;
use crate::conf::types::{AnalysisConfig, AppConfig, SourceType};
use crate::parse::LineParser;
use chrono::FixedOffset;

impl AppConfig {
    /// Semantic validation. Every problem is collected so one run reports them all.
    ///
    /// Unsupported `source_type` values and a missing `input.api` block are not
    /// rejected here: ingestion reports them and degrades to an empty line stream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = LineParser::new(&self.parser) {
            errors.push(format!("parser: {e}"));
        }

        if self.analysis.top_n_count == 0 {
            errors.push("analysis.top_n_count must be greater than zero".to_string());
        }

        if self.analysis.utc_offset().is_none() {
            errors.push(format!(
                "analysis.timezone '{}' is not a fixed UTC offset such as +08:00",
                self.analysis.timezone
            ));
        }

        let geo_api = &self.analysis.geoip.api;
        if geo_api.batch_size == 0 {
            errors.push("analysis.geoip.api.batch_size must be greater than zero".to_string());
        }
        if geo_api.max_concurrent_batches == 0 {
            errors.push(
                "analysis.geoip.api.max_concurrent_batches must be greater than zero".to_string(),
            );
        }
        if geo_api.timeout == 0 {
            errors.push("analysis.geoip.api.timeout must be greater than zero".to_string());
        }

        if let (SourceType::Api, Some(api)) = (&self.input.source_type, &self.input.api) {
            if api.page_size == 0 {
                errors.push("input.api.page_size must be greater than zero".to_string());
            }
            if url::Url::parse(&api.endpoint).is_err() {
                errors.push(format!("input.api.endpoint '{}' is not a URL", api.endpoint));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation { errors })
        }
    }
}

impl AnalysisConfig {
    /// The configured bucketing zone as a fixed offset, `None` when unparsable.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        let tz = self.timezone.trim();
        if tz.eq_ignore_ascii_case("utc") || tz == "Z" {
            return FixedOffset::east_opt(0);
        }
        tz.parse::<FixedOffset>().ok()
    }
}
