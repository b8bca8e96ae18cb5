use std::fmt;

use thiserror::Error;

use super::scheme::to_logical_scheme;

/// A URI returned by the server that does not live under the configured root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("uri {uri} is not under repository root {root}")]
pub struct InvalidLocation {
    pub uri: String,
    pub root: String,
}

/// The canonical base URI every relative path is resolved against.
///
/// Always expressed in the logical scheme and always ending in `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLocation {
    root: String,
}

impl RootLocation {
    /// Normalize a configured root.
    ///
    /// A root given in the transport scheme is converted to the logical scheme,
    /// and a trailing `/` is appended if missing.
    pub fn new(root: impl AsRef<str>) -> Self {
        let mut root = to_logical_scheme(root.as_ref());
        if !root.ends_with('/') {
            root.push('/');
        }
        Self { root }
    }

    pub fn as_str(&self) -> &str {
        &self.root
    }

    /// Absolute URI for `path` rendered as an item (no trailing `/` added).
    pub fn item_uri(&self, path: &str) -> String {
        combine(&self.root, path, false)
    }

    /// Absolute URI for `path` rendered as a container (trailing `/` guaranteed).
    pub fn path_uri(&self, path: &str) -> String {
        combine(&self.root, path, true)
    }

    /// Remove the root prefix from an absolute logical URI.
    pub fn strip_root(&self, uri: &str) -> Result<String, InvalidLocation> {
        uri.strip_prefix(self.root.as_str())
            .map(str::to_string)
            .ok_or_else(|| InvalidLocation {
                uri: uri.to_string(),
                root: self.root.clone(),
            })
    }
}

impl fmt::Display for RootLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)
    }
}

/// Join a relative path onto a root that already ends in `/`.
///
/// One leading `/` is dropped from `path`. A path that already starts with
/// `root` is not prefixed again. When `as_container` is set the result ends in
/// `/`. No other normalization happens: paths are opaque.
pub fn combine(root: &str, path: &str, as_container: bool) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let relative = relative.strip_prefix('/').unwrap_or(relative);

    let mut combined = format!("{}{}", root, relative);
    if as_container && !combined.ends_with('/') {
        combined.push('/');
    }
    combined
}

/// Everything before the last `/`, or `None` once the root level is reached.
///
/// A trailing `/` is ignored, so a container path and its item rendering share
/// a parent. `parent_of("/a/b")` is `Some("/a")`; `parent_of("/a")` and
/// `parent_of("a")` are `None`.
pub fn parent_of(path: &str) -> Option<&str> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(idx) if idx > 0 => Some(&trimmed[..idx]),
        _ => None,
    }
}
