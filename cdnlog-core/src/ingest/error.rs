use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("glob pattern error: {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
