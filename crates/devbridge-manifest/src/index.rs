//! Keyed index over the artifacts of one loaded manifest.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Source-root prefix prepended to caller-supplied keys unless overridden.
pub const DEFAULT_SOURCE_ROOT: &str = "src";

/// Serialized formats a manifest can be loaded from.
enum Format {
    Json,
    Toml,
}

/// One build artifact recorded in the manifest.
///
/// The serialized shape mirrors what the bundler emits per source module.
/// Unknown fields are ignored so richer manifests still load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Build-output relative path of the generated file
    /// (e.g. `assets/main.abc123.js`).
    pub file: String,

    /// Source key echoed into the entry by the bundler. Authoritative for
    /// reverse resolution when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    /// Human-assigned logical name for the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether this artifact is a build entry point.
    #[serde(default)]
    pub is_entry: bool,

    /// Generated CSS chunks imported by this artifact, in emit order.
    #[serde(default)]
    pub css: Vec<String>,

    /// Source keys of chunks this artifact statically imports.
    #[serde(default)]
    pub imports: Vec<String>,
}

/// Keyed index over exactly one loaded manifest.
///
/// Immutable after load apart from [`ManifestIndex::set_source_root`].
/// Entries keep manifest order, so the linear scans below are deterministic
/// when the expected-unique `file` values collide: the first entry in
/// manifest order wins.
#[derive(Debug, Clone)]
pub struct ManifestIndex {
    entries: IndexMap<String, ManifestEntry>,
    source_root: String,
}

impl ManifestIndex {
    /// Load a manifest from disk.
    ///
    /// The format is chosen by extension: `.json` parses as a JSON object of
    /// source key to entry, `.toml` as the equivalent table. A nonexistent
    /// path fails with [`ManifestError::NotFound`] before any read happens;
    /// any other extension fails with [`ManifestError::UnknownFormat`].
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Format::Json,
            Some("toml") => Format::Toml,
            _ => {
                return Err(ManifestError::UnknownFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        let raw = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let entries = match format {
            Format::Json => serde_json::from_str(&raw).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?,
            Format::Toml => toml::from_str(&raw).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?,
        };

        Ok(Self::from_entries(entries))
    }

    /// Build an index directly from parsed entries, keeping their order.
    #[must_use]
    pub fn from_entries(entries: IndexMap<String, ManifestEntry>) -> Self {
        Self {
            entries,
            source_root: DEFAULT_SOURCE_ROOT.to_string(),
        }
    }

    /// The prefix prepended to caller-supplied keys before lookup.
    #[must_use]
    pub fn source_root(&self) -> &str {
        &self.source_root
    }

    /// Change the source-root prefix without reloading the manifest.
    pub fn set_source_root(&mut self, root: impl Into<String>) {
        self.source_root = root.into();
    }

    /// Whether `{source_root}/{key}` exists as a source key.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(&self.prefixed(key))
    }

    /// Exact lookup of `{source_root}/{key}`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ManifestEntry> {
        self.entries.get(&self.prefixed(key))
    }

    /// First entry whose generated `file` equals `file`, in manifest order.
    ///
    /// Linear scan, O(n) per call. Manifests are small and each asset is
    /// resolved at most once per process, so this is intentionally not
    /// backed by a second index.
    #[must_use]
    pub fn get_by_file(&self, file: &str) -> Option<&ManifestEntry> {
        self.entries.values().find(|entry| entry.file == file)
    }

    /// First entry whose logical `name` equals `name`, in manifest order.
    ///
    /// Same linear-scan contract as [`ManifestIndex::get_by_file`].
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries
            .values()
            .find(|entry| entry.name.as_deref() == Some(name))
    }

    /// Generated file for `{source_root}/{key}`, when the key is known.
    #[must_use]
    pub fn file_for(&self, key: &str) -> Option<&str> {
        self.get(key).map(|entry| entry.file.as_str())
    }

    /// Imported CSS chunks for `{source_root}/{key}`; empty when the key is
    /// unknown or the entry carries none.
    #[must_use]
    pub fn css_for(&self, key: &str) -> &[String] {
        match self.get(key) {
            Some(entry) => entry.css.as_slice(),
            None => &[],
        }
    }

    /// Iterate entries as `(source key, entry)` in manifest order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Number of entries in the manifest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}/{key}", self.source_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE_JSON: &str = r#"{
        "src/main.js": {
            "file": "assets/main.123456.js",
            "src": "src/main.js",
            "isEntry": true,
            "css": ["assets/main.123456.css"],
            "imports": ["src/vendor.js"]
        },
        "src/vendor.js": {
            "file": "assets/vendor.123456.js"
        },
        "source/component.js": {
            "file": "assets/component.123456.js",
            "name": "component"
        }
    }"#;

    fn load_sample() -> ManifestIndex {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, SAMPLE_JSON).unwrap();
        ManifestIndex::load(&path).unwrap()
    }

    #[test]
    fn test_load_json_and_query() {
        let index = load_sample();

        assert_eq!(index.len(), 3);
        assert!(index.has("main.js"));
        assert!(!index.has("missing.js"));

        let entry = index.get("main.js").unwrap();
        assert_eq!(entry.file, "assets/main.123456.js");
        assert!(entry.is_entry);
        assert_eq!(entry.css, vec!["assets/main.123456.css"]);
        assert_eq!(entry.imports, vec!["src/vendor.js"]);
    }

    #[test]
    fn test_load_toml_same_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.toml");
        fs::write(
            &path,
            r#"
["src/main.js"]
file = "assets/main.123456.js"
isEntry = true
css = ["assets/main.123456.css"]

["src/vendor.js"]
file = "assets/vendor.123456.js"
"#,
        )
        .unwrap();

        let index = ManifestIndex::load(&path).unwrap();
        assert!(index.has("main.js"));
        assert_eq!(index.file_for("main.js"), Some("assets/main.123456.js"));
        assert_eq!(index.css_for("vendor.js"), &[] as &[String]);
    }

    #[test]
    fn test_get_by_file_round_trip() {
        let index = load_sample();

        let entry = index.get_by_file("assets/main.123456.js").unwrap();
        assert_eq!(entry.src.as_deref(), Some("src/main.js"));
        assert!(index.get_by_file("assets/nope.js").is_none());
    }

    #[test]
    fn test_get_by_name() {
        let index = load_sample();

        let entry = index.get_by_name("component").unwrap();
        assert_eq!(entry.file, "assets/component.123456.js");
        assert!(index.get_by_name("unknown").is_none());
    }

    #[test]
    fn test_source_root_change_redirects_lookups() {
        let mut index = load_sample();

        assert!(index.has("main.js"));
        assert!(!index.has("component.js"));

        index.set_source_root("source");
        assert!(!index.has("main.js"));
        assert_eq!(
            index.file_for("component.js"),
            Some("assets/component.123456.js")
        );
    }

    #[test]
    fn test_duplicate_file_first_match_wins() {
        let json = r#"{
            "src/a.js": {"file": "assets/shared.js", "name": "first"},
            "src/b.js": {"file": "assets/shared.js", "name": "second"}
        }"#;
        let entries: IndexMap<String, ManifestEntry> = serde_json::from_str(json).unwrap();
        let index = ManifestIndex::from_entries(entries);

        let entry = index.get_by_file("assets/shared.js").unwrap();
        assert_eq!(entry.name.as_deref(), Some("first"));
    }

    #[test]
    fn test_nonexistent_path_is_not_found() {
        let err = ManifestIndex::load(Path::new("/nope/manifest.json")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.txt");
        fs::write(&path, "whatever").unwrap();

        let err = ManifestIndex::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::UnknownFormat { .. }));
    }

    #[test]
    fn test_malformed_json_keeps_parser_diagnostic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ManifestIndex::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
        // serde_json diagnostics carry line/column positions.
        assert!(err.to_string().contains("line"), "got: {err}");
    }

    #[test]
    fn test_unknown_entry_fields_are_ignored() {
        let json = r#"{
            "src/main.js": {
                "file": "assets/main.js",
                "dynamicImports": ["src/lazy.js"],
                "assets": ["assets/logo.svg"]
            }
        }"#;
        let entries: IndexMap<String, ManifestEntry> = serde_json::from_str(json).unwrap();
        let index = ManifestIndex::from_entries(entries);
        assert!(index.has("main.js"));
    }

    #[test]
    fn test_empty_manifest() {
        let entries = IndexMap::new();
        let index = ManifestIndex::from_entries(entries);
        assert!(index.is_empty());
        assert!(index.get_by_file("anything.js").is_none());
    }
}
