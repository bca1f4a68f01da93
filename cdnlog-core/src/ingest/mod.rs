//! Ingestion
//!
//! Produces one lazy stream of raw log lines for the run, either from a local
//! directory (`local`) or from the CDN provider's log delivery API (`api`).
//!
//! Nothing here aborts the run: a missing `input.api` block, an unsupported
//! `source_type`, unreadable files and failed downloads are logged and
//! contribute no lines.

mod cache;
mod error;
pub mod lines;
pub mod local;
mod remote;
#[cfg(test)]
mod tests;

pub use cache::LogCache;
pub use error::SourceError;
pub use lines::LineStream;
pub use remote::{ArtifactSource, CachePolicy, pending_artifacts, remote_lines};

use crate::cloud::CdnLogClient;
use crate::conf::types::{InputConfig, SourceType};
use std::iter;

/// Select the configured source and return its line stream.
pub fn ingest(cfg: &InputConfig) -> LineStream {
    match &cfg.source_type {
        SourceType::Local => local::local_lines(&cfg.path, &cfg.file_pattern, &cfg.compressed_suffix),
        SourceType::Api => api_lines(cfg),
        SourceType::Unsupported(other) => {
            tracing::error!(source_type = %other, "unsupported input.source_type, no data will be read");
            Box::new(iter::empty())
        }
    }
}

fn api_lines(cfg: &InputConfig) -> LineStream {
    let Some(api) = &cfg.api else {
        tracing::error!("input.source_type is 'api' but input.api is not configured");
        return Box::new(iter::empty());
    };

    let client = match CdnLogClient::new(api) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "cannot build CDN log client");
            return Box::new(iter::empty());
        }
    };

    let policy = CachePolicy {
        skip_existing: api.skip_existing_logs,
        write_through: api.download_new_logs,
    };

    remote_lines(client, LogCache::new(&cfg.path), policy, &cfg.compressed_suffix)
}
