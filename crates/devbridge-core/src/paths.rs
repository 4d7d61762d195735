//! Path and URL string helpers shared by the resolver.

use std::path::Path;

/// Build an npm-style `file:` reference from `from_dir` to `to_file`.
///
/// This is the local-path convention package managers use for on-disk
/// dependencies: the shared leading segments of both paths are dropped,
/// each segment left on the `from` side becomes one `..`, and what remains
/// of the `to` side is appended. A file directly inside `from_dir` comes
/// out as `file:./name` with no parent traversal.
#[must_use]
pub fn relative_local_path(from_dir: &Path, to_file: &Path) -> String {
    let from = segments(from_dir);
    let to = segments(to_file);

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut reference = String::from("file:./");
    for _ in common..from.len() {
        reference.push_str("../");
    }
    reference.push_str(&to[common..].join("/"));
    reference
}

fn segments(path: &Path) -> Vec<String> {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect()
}

/// Strip a trailing query string, leaving the bare path.
#[must_use]
pub fn strip_query(path: &str) -> &str {
    match path.find('?') {
        Some(idx) => &path[..idx],
        None => path,
    }
}
