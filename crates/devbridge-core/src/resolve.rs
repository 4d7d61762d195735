//! Build-output to source-path resolution and URL rewriting.
//!
//! The resolver answers one question per asset: given a URL the host built
//! for production output (`{base}/{out_dir}/...`), which source file should
//! the dev server serve instead? The manifest, when attached, is
//! authoritative — it knows about hashed and renamed output. The filesystem
//! fallback only trusts a fixed CSS extension substitution, which covers
//! dev-time addressing before any build has produced a manifest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use devbridge_manifest::ManifestIndex;

use crate::config::ResolverConfig;
use crate::error::Error;
use crate::paths::{relative_local_path, strip_query};
use crate::server::DevServerClient;

/// Class appended to the host's body-class list while dev mode is active.
pub const DEV_MODE_MARKER: &str = "devbridge-dev-server-active";

/// Append the dev-mode marker to a host's body-class list.
///
/// The append itself is unconditional; the host installs this only while
/// dev mode is active.
pub fn append_dev_marker(classes: &mut Vec<String>) {
    classes.push(DEV_MODE_MARKER.to_string());
}

/// Translates build-output asset references to dev-server source URLs.
///
/// Pure resolution component: it knows nothing about the host's dispatch
/// mechanism. Holds the per-process resolution cache — each asset id
/// resolves at most once; the first successful rewrite wins for the life
/// of the resolver.
#[derive(Debug)]
pub struct AssetResolver {
    config: ResolverConfig,
    base_url: String,
    server_root: PathBuf,
    manifest: Option<ManifestIndex>,
    resolved: HashMap<String, String>,
}

impl AssetResolver {
    /// New resolver over an explicit config.
    ///
    /// `base_url` is the dev-server URL rewritten assets are served from;
    /// `server_root` is the host's document root on disk.
    #[must_use]
    pub fn new(
        config: ResolverConfig,
        base_url: impl Into<String>,
        server_root: impl Into<PathBuf>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            config,
            base_url,
            server_root: server_root.into(),
            manifest: None,
            resolved: HashMap::new(),
        }
    }

    /// Attach a manifest index; manifest hits win over filesystem probing.
    #[must_use]
    pub fn with_manifest(mut self, manifest: ManifestIndex) -> Self {
        self.manifest = Some(manifest);
        self
    }

    /// Build a resolver from a probed client.
    ///
    /// Returns `Ok(None)` when the client holds no config — without one
    /// there is nothing to resolve against. When the config names a
    /// manifest path, the index is loaded here, once; a manifest that fails
    /// to load is a fatal setup error.
    pub fn from_server(
        client: &DevServerClient,
        server_root: impl Into<PathBuf>,
    ) -> Result<Option<Self>, Error> {
        let Some(config) = client.config().cloned() else {
            return Ok(None);
        };

        let mut resolver = Self::new(config, client.base_url(), server_root);
        if let Some(manifest_path) = resolver.config.manifest.clone() {
            resolver.manifest = Some(ManifestIndex::load(&manifest_path)?);
        }
        Ok(Some(resolver))
    }

    /// The config this resolver operates on.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether `path` falls inside this resolver's asset namespace.
    ///
    /// Assets belonging to unrelated applications on the same page fail
    /// this check and are passed through untouched.
    #[must_use]
    pub fn belongs_to_namespace(&self, path: &str) -> bool {
        !self.config.base.is_empty() && path.contains(&self.config.base)
    }

    /// Whether `url` is addressed at the dev server's base URL.
    #[must_use]
    pub fn contains_base_url(&self, url: &str) -> bool {
        !self.base_url.is_empty() && url.contains(&self.base_url)
    }

    /// Strip any query string and the `{base}/{out_dir}/` prefix from a
    /// build-output path, leaving the output-relative file.
    ///
    /// `None` when the path does not carry the expected output layout.
    #[must_use]
    pub fn extract_relative_file(&self, path: &str) -> Option<String> {
        let path = strip_query(path);
        let marker = format!("{}/{}/", self.config.base, self.config.out_dir);
        path.split_once(&marker).map(|(_, rest)| rest.to_string())
    }

    /// Resolve a build-output path to its source-relative file.
    ///
    /// Manifest lookup first: an entry found by generated file that carries
    /// a `src` wins immediately. Otherwise a `.css` suffix is substituted
    /// with the configured source extension and
    /// `{server_path}/{src_dir}/{file}` is probed on disk.
    #[must_use]
    pub fn resolve_source_path(&self, path: &str) -> Option<String> {
        let file = self.extract_relative_file(path)?;

        if let Some(manifest) = &self.manifest {
            if let Some(src) = manifest
                .get_by_file(&file)
                .and_then(|entry| entry.src.clone())
            {
                return Some(src);
            }
        }

        let file = match file.strip_suffix(".css") {
            Some(stem) => format!("{stem}.{}", self.config.css_extension),
            None => file,
        };
        let candidate = self
            .server_path()
            .join(&self.config.src_dir)
            .join(&file);
        if candidate.exists() {
            return Some(format!("{}/{file}", self.config.src_dir));
        }

        debug!(path, "asset not in manifest nor on disk");
        None
    }

    /// The asset namespace's root on disk: `{server_root}{base}`.
    #[must_use]
    pub fn server_path(&self) -> PathBuf {
        self.server_root
            .join(self.config.base.trim_start_matches('/'))
    }

    /// Rewrite a build-output URL to its dev-server source URL.
    ///
    /// The first successful resolution for `id` wins and is returned for
    /// every later call with that id, whatever path accompanies it. A path
    /// outside the namespace, or one that resolves nowhere, passes through
    /// unchanged; the failed case writes no cache entry, so a later call
    /// with a different path for the same id may still succeed.
    pub fn rewrite_asset_url(&mut self, path: &str, id: &str) -> String {
        if !self.belongs_to_namespace(path) {
            return path.to_string();
        }

        if let Some(resolved) = self.resolved.get(id) {
            return resolved.clone();
        }

        match self.resolve_source_path(path) {
            Some(source_path) => {
                let rewritten = format!("{}/{source_path}", self.base_url);
                debug!(id, from = path, to = %rewritten, "asset rewritten to dev server");
                self.resolved.insert(id.to_string(), rewritten.clone());
                rewritten
            }
            None => path.to_string(),
        }
    }

    /// Re-emit an asset tag as a module script when its source was
    /// rewritten to the dev server.
    ///
    /// Fires only for ids the rewrite step actually touched, so ordinary
    /// scripts and styles keep their original embedding.
    #[must_use]
    pub fn rewrite_embed_tag(&self, tag: &str, id: &str, src: &str) -> String {
        if self.contains_base_url(src) && self.resolved.contains_key(id) {
            format!("<script type=\"module\" src=\"{src}\"></script>")
        } else {
            tag.to_string()
        }
    }

    /// Resolve a component descriptor's declared render file to its source
    /// counterpart, as an npm-style `file:` reference relative to the
    /// descriptor's directory.
    ///
    /// `None` (leave the declaration untouched) when the render file is
    /// outside the namespace, missing on disk, or unresolvable.
    #[must_use]
    pub fn rewrite_render_path(&self, descriptor: &Path, render: &str) -> Option<String> {
        let dir = descriptor.parent()?;
        let render_file = dir.join(Path::new(render).file_name()?);
        let render_path = render_file.to_string_lossy();

        if !self.belongs_to_namespace(&render_path) || !render_file.is_file() {
            return None;
        }

        let resolved = self.resolve_source_path(&render_path)?;
        let absolute = self.server_path().join(resolved);
        Some(relative_local_path(dir, &absolute))
    }
}
