use devbridge_manifest::ManifestError;
use thiserror::Error;

/// Core error type for devbridge setup operations.
///
/// Resolution itself never errors: an offline dev server, an asset missing
/// from both manifest and disk, or a path outside the namespace are all
/// expected conditions with documented pass-through fallbacks. Errors here
/// surface only from the setup phase, and they are meant to halt it.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured dev-server host is not a valid URL.
    #[error("invalid dev-server host '{host}': {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client used for probing could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Loading the manifest named by the dev-server config failed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
