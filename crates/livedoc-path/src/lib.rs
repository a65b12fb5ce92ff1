//! Typed document paths.
//!
//! A [`Path`] is a sequence of [`Segment`]s, each either an object key or an
//! array index. This crate formats paths for humans (`spec.template.0.name`),
//! tests prefix relationships, and reads or writes JSON values in place.
//!
//! # Example
//!
//! ```
//! use livedoc_path::{format_dotted, get, parse_dotted, set};
//! use serde_json::json;
//!
//! let path = parse_dotted("spec.replicas");
//! assert_eq!(format_dotted(&path), "spec.replicas");
//!
//! let mut doc = json!({"spec": {"replicas": 1}});
//! set(&mut doc, &path, json!(3)).unwrap();
//! assert_eq!(get(&doc, &path), Some(&json!(3)));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, Segment};

mod get;
pub use get::{get, get_mut};

mod mutate;
pub use mutate::{remove, set};

/// Rendering used for the empty (root) path.
pub const ROOT_LABEL: &str = "(root)";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot descend into scalar at `{0}`")]
    NotTraversable(String),
    #[error("invalid array index at `{0}`")]
    InvalidIndex(String),
}

/// Join a path with dots. The root path renders as [`ROOT_LABEL`].
///
/// ```
/// use livedoc_path::{format_dotted, Segment};
///
/// assert_eq!(format_dotted(&[]), "(root)");
/// assert_eq!(format_dotted(&["list".into(), Segment::Index(2)]), "list.2");
/// ```
pub fn format_dotted(path: &[Segment]) -> String {
    if path.is_empty() {
        return ROOT_LABEL.to_string();
    }
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// Parse a dotted path. Every component becomes a [`Segment::Key`].
///
/// Empty input, or [`ROOT_LABEL`], yields the root path.
pub fn parse_dotted(dotted: &str) -> Path {
    if dotted.is_empty() || dotted == ROOT_LABEL {
        return Vec::new();
    }
    dotted.split('.').map(Segment::from).collect()
}

/// Check whether `path` equals `prefix` or lies underneath it.
///
/// ```
/// use livedoc_path::{is_under, parse_dotted};
///
/// let status = parse_dotted("status");
/// assert!(is_under(&parse_dotted("status.phase"), &status));
/// assert!(is_under(&status, &status));
/// assert!(!is_under(&parse_dotted("spec"), &status));
/// ```
pub fn is_under(path: &[Segment], prefix: &[Segment]) -> bool {
    path.len() >= prefix.len() && path[..prefix.len()] == *prefix
}

/// Return a copy of `path` extended by one segment.
pub fn child(path: &[Segment], segment: impl Into<Segment>) -> Path {
    let mut out = Vec::with_capacity(path.len() + 1);
    out.extend_from_slice(path);
    out.push(segment.into());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_roundtrip_for_keys() {
        let path = parse_dotted("metadata.managedFields");
        assert_eq!(path, vec![Segment::from("metadata"), Segment::from("managedFields")]);
        assert_eq!(format_dotted(&path), "metadata.managedFields");
    }

    #[test]
    fn root_label() {
        assert!(parse_dotted("").is_empty());
        assert!(parse_dotted(ROOT_LABEL).is_empty());
        assert_eq!(format_dotted(&[]), ROOT_LABEL);
    }

    #[test]
    fn prefix_requires_whole_segments() {
        let prefix = parse_dotted("metadata.uid");
        assert!(!is_under(&parse_dotted("metadata.uidx"), &prefix));
        assert!(!is_under(&parse_dotted("metadata"), &prefix));
        assert!(is_under(&parse_dotted("metadata.uid"), &prefix));
    }

    #[test]
    fn child_appends() {
        let base = parse_dotted("spec");
        assert_eq!(format_dotted(&child(&base, 0usize)), "spec.0");
        assert_eq!(base.len(), 1);
    }
}
