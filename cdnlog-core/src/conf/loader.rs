use crate::conf::error::ConfigError;
use crate::conf::types::AppConfig;
use std::fs;
use std::path::Path;

/// Read, parse and validate the YAML configuration at `path`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    parse_config(path, &raw)
}

/// Parse and validate configuration text. `origin` is only used for error reporting.
pub fn parse_config(origin: &Path, raw: &str) -> Result<AppConfig, ConfigError> {
    let cfg: AppConfig = serde_yaml::from_str(raw).map_err(|e| ConfigError::parse(origin, e))?;
    cfg.validate()?;
    Ok(cfg)
}
