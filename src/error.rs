use std::path::PathBuf;

/// Failures that reach the user. Everything inside the timer itself is soft
/// and only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown callout pack '{0}'")]
    UnknownPack(String),

    #[error("malformed callout pack: {0}")]
    Pack(#[from] serde_json::Error),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no user executable directory on this platform")]
    NoInstallDir,

    #[error("failed to install to {path}: {source}")]
    Install {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
