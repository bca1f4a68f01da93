use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloudError {
    #[error("invalid endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("invalid time window: {0}")]
    TimeWindow(String),

    #[error("cannot sign request: {0}")]
    Signing(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("listing request returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("cannot write cache file {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
