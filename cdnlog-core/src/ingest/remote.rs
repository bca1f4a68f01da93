use crate::cloud::{CdnLogClient, RemoteLogArtifact};
use crate::ingest::cache::LogCache;
use crate::ingest::lines::LineStream;
use crate::ingest::local::file_lines;
use std::path::Path;

/// Source of remote log artifacts. Implemented by [`CdnLogClient`].
pub trait ArtifactSource {
    /// Artifacts for the configured window; failures degrade to an empty list.
    fn list_artifacts(&self) -> Vec<RemoteLogArtifact>;

    /// Lines of one artifact, written through to `cache_path` when given.
    fn fetch_lines(
        &self,
        artifact: &RemoteLogArtifact,
        cache_path: Option<&Path>,
        compressed_suffix: &str,
    ) -> LineStream;
}

impl ArtifactSource for CdnLogClient {
    fn list_artifacts(&self) -> Vec<RemoteLogArtifact> {
        CdnLogClient::list_artifacts(self)
    }

    fn fetch_lines(
        &self,
        artifact: &RemoteLogArtifact,
        cache_path: Option<&Path>,
        compressed_suffix: &str,
    ) -> LineStream {
        CdnLogClient::fetch_lines(self, artifact, cache_path, compressed_suffix)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Skip artifacts already in the cache; replay from cache on a late hit.
    pub skip_existing: bool,
    /// Write downloads through to the cache.
    pub write_through: bool,
}

/// Lines from every listed artifact not already cached.
///
/// Cache membership is checked again when each artifact is reached, so a name
/// listed twice is downloaded once and replayed from the cache the second time.
pub fn remote_lines<S>(
    source: S,
    cache: LogCache,
    policy: CachePolicy,
    compressed_suffix: &str,
) -> LineStream
where
    S: ArtifactSource + 'static,
{
    let listed = source.list_artifacts();
    let pending = pending_artifacts(listed, &cache, policy);

    let suffix = compressed_suffix.to_string();
    Box::new(pending.into_iter().flat_map(move |artifact| {
        if policy.skip_existing && cache.contains(&artifact.file_name) {
            tracing::info!(file = %artifact.file_name, "replaying log file from cache");
            return file_lines(&cache.path_for(&artifact.file_name), &suffix);
        }

        // Cached artifacts are never rewritten; a refetch streams in memory.
        let cache_path = (policy.write_through && !cache.contains(&artifact.file_name))
            .then(|| cache.path_for(&artifact.file_name));
        source.fetch_lines(&artifact, cache_path.as_deref(), &suffix)
    }))
}

/// Listed artifacts minus those already cached (when `skip_existing` is set).
pub fn pending_artifacts(
    listed: Vec<RemoteLogArtifact>,
    cache: &LogCache,
    policy: CachePolicy,
) -> Vec<RemoteLogArtifact> {
    if !policy.skip_existing {
        return listed;
    }

    let total = listed.len();
    let pending: Vec<_> = listed
        .into_iter()
        .filter(|a| !cache.contains(&a.file_name))
        .collect();

    tracing::info!(
        listed = total,
        cached = total - pending.len(),
        pending = pending.len(),
        cache = %cache.dir().display(),
        "applied log cache"
    );
    pending
}
