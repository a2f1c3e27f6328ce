use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cache document exists but is not valid JSON. A missing cache is
    /// not an error; a corrupt one is surfaced to the caller.
    #[error("log cache at {path} is corrupt: {source}")]
    CacheFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("discovery and cache load must both complete before parsing")]
    NotReady,

    #[error("no log named {0} in the registry")]
    UnknownLog(String),

    #[error("configuration error: {0}")]
    Config(#[from] confy::ConfyError),
}

impl Error {
    pub(crate) fn cache_format(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheFormat {
            path: path.into(),
            source,
        }
    }
}
