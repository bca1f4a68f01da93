mod error;
mod loader;
#[cfg(test)]
mod tests;
pub mod types;
mod validate;

pub use error::ConfigError;
pub use loader::{load_config, parse_config};
pub use types::AppConfig;
