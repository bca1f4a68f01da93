use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid line pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("line pattern is missing named group '{0}'")]
    MissingGroup(&'static str),
}
