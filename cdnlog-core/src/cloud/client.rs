use crate::cloud::error::CloudError;
use crate::cloud::signer::{DATE_HEADER, Signer, SigningInput, canonical_query};
use crate::cloud::types::{LogListing, RemoteLogArtifact};
use crate::conf::types::InputApiConfig;
use crate::ingest::lines::{LineStream, Lines, decoded};
use crate::ingest::local::{file_lines, is_compressed};
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use std::fs::{self, File};
use std::io;
use std::iter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const LOGS_PATH: &str = "/v1.0/cdn/logs";

/// Client for the provider's CDN log listing API and artifact downloads.
pub struct CdnLogClient {
    http: Client,
    signer: Signer,
    endpoint: Url,
    host: String,
    domain_name: String,
    start_time: String,
    end_time: String,
    page_size: u32,
    list_timeout: Duration,
    fetch_timeout: Duration,
}

impl CdnLogClient {
    pub fn new(cfg: &InputApiConfig) -> Result<Self, CloudError> {
        let endpoint = Url::parse(&cfg.endpoint).map_err(|e| CloudError::Endpoint {
            endpoint: cfg.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(h), Some(p)) => format!("{h}:{p}"),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(CloudError::Endpoint {
                    endpoint: cfg.endpoint.clone(),
                    reason: "missing host".to_string(),
                });
            }
        };

        Ok(Self {
            http: Client::builder().build()?,
            signer: Signer::new(&cfg.access_key, &cfg.secret_key),
            endpoint,
            host,
            domain_name: cfg.domain_name.clone(),
            start_time: cfg.start_time.clone(),
            end_time: cfg.end_time.clone(),
            page_size: cfg.page_size,
            list_timeout: Duration::from_secs(cfg.list_timeout_secs),
            fetch_timeout: Duration::from_secs(cfg.fetch_timeout_secs),
        })
    }

    /// Artifacts the provider reports for the configured window.
    ///
    /// Any failure is logged and degrades to an empty list.
    pub fn list_artifacts(&self) -> Vec<RemoteLogArtifact> {
        match self.try_list_artifacts(Utc::now()) {
            Ok(artifacts) if artifacts.is_empty() => {
                tracing::warn!(domain = %self.domain_name, "listing API returned no log files");
                artifacts
            }
            Ok(artifacts) => {
                tracing::info!(count = artifacts.len(), "listing API returned log files");
                artifacts
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to list CDN log files");
                Vec::new()
            }
        }
    }

    /// One signed `GET /v1.0/cdn/logs` request, signed as of `at`.
    pub fn try_list_artifacts(
        &self,
        at: DateTime<Utc>,
    ) -> Result<Vec<RemoteLogArtifact>, CloudError> {
        let query = self.listing_query()?;
        let query_string = canonical_query(&query);
        let path = self.logs_path();

        let signed = self.signer.sign(
            &SigningInput {
                method: "GET",
                host: &self.host,
                path: &path,
                query: &query,
                payload: b"",
            },
            at,
        )?;

        // The URL carries the exact signed query string.
        let mut url = self.endpoint.clone();
        url.set_path(&path);
        url.set_query(Some(&query_string));

        tracing::debug!(%url, "requesting CDN log listing");

        let response = self
            .http
            .get(url)
            .timeout(self.list_timeout)
            .header(DATE_HEADER, &signed.sdk_date)
            .header(reqwest::header::AUTHORIZATION, &signed.authorization)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CloudError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let listing: LogListing = response.json()?;

        Ok(listing
            .logs
            .into_iter()
            .filter_map(|log| {
                let artifact = RemoteLogArtifact::from_link(&log.link);
                if artifact.is_none() {
                    tracing::warn!(link = %log.link, "skipping log link without a file name");
                }
                artifact
            })
            .collect())
    }

    /// Stream an artifact's lines.
    ///
    /// With `cache_path` the raw bytes are written there first and replayed
    /// from disk; otherwise the response body is decoded in memory. A failed
    /// transfer ends only this artifact's sequence.
    pub fn fetch_lines(
        &self,
        artifact: &RemoteLogArtifact,
        cache_path: Option<&Path>,
        compressed_suffix: &str,
    ) -> LineStream {
        let response = match self.download(artifact) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(url = %artifact.download_url, error = %e, "failed to download log file");
                return Box::new(iter::empty());
            }
        };

        match cache_path {
            Some(path) => match write_through(response, path) {
                Ok(()) => {
                    tracing::info!(file = %path.display(), "log file downloaded");
                    file_lines(path, compressed_suffix)
                }
                Err(e) => {
                    tracing::error!(url = %artifact.download_url, error = %e, "failed to store log file");
                    Box::new(iter::empty())
                }
            },
            None => {
                let compressed = is_compressed(Path::new(&artifact.file_name), compressed_suffix);
                Box::new(Lines::new(
                    decoded(response, compressed),
                    artifact.download_url.clone(),
                ))
            }
        }
    }

    fn download(&self, artifact: &RemoteLogArtifact) -> Result<Response, CloudError> {
        tracing::info!(file = %artifact.file_name, "downloading log file");
        let response = self
            .http
            .get(&artifact.download_url)
            .timeout(self.fetch_timeout)
            .send()?
            .error_for_status()?;
        Ok(response)
    }

    /// Query parameters in ascending key order; the same order is signed and sent.
    fn listing_query(&self) -> Result<Vec<(&'static str, String)>, CloudError> {
        Ok(vec![
            ("domain_name", self.domain_name.clone()),
            ("end_time", to_epoch_millis(&self.end_time)?.to_string()),
            ("page_size", self.page_size.to_string()),
            ("start_time", to_epoch_millis(&self.start_time)?.to_string()),
        ])
    }

    /// Endpoint base path (if any) joined with the listing path.
    fn logs_path(&self) -> String {
        format!("{}{LOGS_PATH}", self.endpoint.path().trim_end_matches('/'))
    }
}

/// `2023-10-10T00:00:00Z` → epoch milliseconds.
pub(crate) fn to_epoch_millis(iso: &str) -> Result<i64, CloudError> {
    DateTime::parse_from_rfc3339(iso.trim())
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| CloudError::TimeWindow(format!("'{iso}': {e}")))
}

/// Stream the body into `<path>.part`, then rename into place.
fn write_through(mut response: Response, path: &Path) -> Result<(), CloudError> {
    let cache_err = |source| CloudError::Cache {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(cache_err)?;
    }

    let partial = partial_path(path);
    let result = File::create(&partial)
        .and_then(|mut file| io::copy(&mut response, &mut file).and_then(|_| file.sync_all()))
        .and_then(|()| fs::rename(&partial, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(cache_err(e));
    }
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
