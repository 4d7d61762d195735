//! Process-wide default manifest instance.
//!
//! Resolvers take a [`ManifestIndex`] explicitly; this accessor exists for
//! host call sites that cannot thread the dependency through. It is
//! initialized exactly once for the life of the process and never reset.

use std::path::Path;

use once_cell::sync::OnceCell;

use crate::error::ManifestError;
use crate::index::ManifestIndex;

static GLOBAL: OnceCell<ManifestIndex> = OnceCell::new();

/// Load and install the process-wide manifest.
///
/// The first successful call wins; later calls return the already-installed
/// index without touching `path` again. A failed load installs nothing, so a
/// host that treats the failure as fatal can surface it and stop.
pub fn init_global(
    path: &Path,
    source_root: Option<&str>,
) -> Result<&'static ManifestIndex, ManifestError> {
    GLOBAL.get_or_try_init(|| {
        let mut index = ManifestIndex::load(path)?;
        if let Some(root) = source_root {
            index.set_source_root(root);
        }
        Ok(index)
    })
}

/// The process-wide manifest, if [`init_global`] has run.
///
/// Querying before initialization is a setup-order bug in the host;
/// it reports [`ManifestError::NotInitialized`].
pub fn global() -> Result<&'static ManifestIndex, ManifestError> {
    GLOBAL.get().ok_or(ManifestError::NotInitialized)
}
