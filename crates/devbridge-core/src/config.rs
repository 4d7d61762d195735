use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Resolver configuration, as served by the bundler's dev-server plugin.
///
/// Normally populated from the config probe's JSON body
/// ([`crate::DevServerClient::probe_config`]); injected directly for tests
/// and for hosts that bypass probing. Every field is individually defaulted
/// so a partial body still parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Mount path segment identifying this application's asset namespace
    /// within a URL (e.g. `/apps/storefront`). Empty matches nothing.
    pub base: String,

    /// Build-output directory name below `base` (e.g. `dist`).
    pub out_dir: String,

    /// Source directory probed when the manifest cannot answer (e.g. `src`).
    pub src_dir: String,

    /// Replacement extension used to find the pre-processed source of a
    /// compiled `.css` file on disk (e.g. `scss`).
    #[serde(rename = "css")]
    pub css_extension: String,

    /// Path of a pre-built manifest to index; `None` leaves manifest
    /// lookups off entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
}
