//! Cloud log delivery
//!
//! Lists the CDN provider's log artifacts for a time window and streams their
//! decompressed content. Requests to the listing API are authenticated with
//! the provider's `SDK-HMAC-SHA256` scheme (see [`signer`]); artifact links are
//! pre-signed and fetched without credentials.

mod client;
mod error;
pub mod signer;
#[cfg(test)]
mod tests;
mod types;

pub use client::{CdnLogClient, LOGS_PATH};
pub use error::CloudError;
pub use types::RemoteLogArtifact;
