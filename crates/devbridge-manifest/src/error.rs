use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or accessing a build manifest.
///
/// Every variant is fatal for the host's setup phase: none of these are
/// retried, and none should be swallowed into a fallback path.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest file does not exist. Reported before any read is
    /// attempted.
    #[error("manifest not found at {path}; run the production build first")]
    NotFound { path: PathBuf },

    /// The manifest file exists but could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest file could not be parsed. The message carries the
    /// parser's own diagnostic.
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The manifest path has an extension this crate does not know how to
    /// load.
    #[error("unknown manifest format for {path}; expected .json or .toml")]
    UnknownFormat { path: PathBuf },

    /// The process-wide manifest was queried before [`crate::init_global`]
    /// ran. A programming error in the host's setup order.
    #[error("manifest queried before initialization")]
    NotInitialized,
}
