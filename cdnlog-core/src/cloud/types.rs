use serde::Deserialize;
use url::Url;

/// One downloadable log file reported by the listing API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLogArtifact {
    pub download_url: String,
    /// Basename of the URL path with query string and fragment stripped.
    /// Doubles as the cache file name.
    pub file_name: String,
}

impl RemoteLogArtifact {
    /// `None` when the link has no usable basename (e.g. it ends in `/`).
    pub fn from_link(link: &str) -> Option<Self> {
        let url = Url::parse(link).ok()?;
        let name = url.path_segments()?.next_back()?;

        if name.is_empty() || name == "." || name == ".." {
            return None;
        }

        Some(Self {
            download_url: link.to_string(),
            file_name: name.to_string(),
        })
    }
}

/// `GET /v1.0/cdn/logs` response body. Fields other than `logs[].link` are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct LogListing {
    #[serde(default)]
    pub logs: Vec<LogLink>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogLink {
    pub link: String,
}
