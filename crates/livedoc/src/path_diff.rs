//! Structural diff: path-scoped set/delete operations between two documents.
//!
//! Arrays are atomic. Any difference inside an array, or a change between an
//! array and anything else, yields one `Set` of the whole value. Concurrent
//! edits to one array therefore always surface as a single conflict.

use livedoc_path::{child, format_dotted, is_under, parse_dotted, Path, Segment};
use livedoc_util::deep_equal;
use serde::Serialize;
use serde_json::{Map, Value};

/// Server-managed prefixes excluded from diffing, merging and highlighting.
pub const DEFAULT_IGNORED_PATHS: [&str; 6] = [
    "metadata.managedFields",
    "metadata.resourceVersion",
    "metadata.generation",
    "metadata.uid",
    "metadata.creationTimestamp",
    "status",
];

/// A structural edit recorded against a base document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PathOp {
    /// `path` should hold `value`. `base` is what the base document held
    /// there, `None` when the path did not exist.
    Set {
        path: Path,
        base: Option<Value>,
        value: Value,
    },
    /// `path` existed in the base document and should be removed.
    Delete { path: Path, base: Value },
}

impl PathOp {
    pub fn path(&self) -> &[Segment] {
        match self {
            PathOp::Set { path, .. } | PathOp::Delete { path, .. } => path,
        }
    }

    pub fn base(&self) -> Option<&Value> {
        match self {
            PathOp::Set { base, .. } => base.as_ref(),
            PathOp::Delete { base, .. } => Some(base),
        }
    }

    /// Value the path should end up with; `None` for a delete.
    pub fn target(&self) -> Option<&Value> {
        match self {
            PathOp::Set { value, .. } => Some(value),
            PathOp::Delete { .. } => None,
        }
    }

    pub fn dotted_path(&self) -> String {
        format_dotted(self.path())
    }
}

/// Set of path prefixes whose subtrees are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredPaths(Vec<Path>);

impl IgnoredPaths {
    pub fn new(prefixes: Vec<Path>) -> Self {
        Self(prefixes)
    }

    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn from_dotted<'a>(prefixes: impl IntoIterator<Item = &'a str>) -> Self {
        Self(prefixes.into_iter().map(parse_dotted).collect())
    }

    /// `true` when `path` is one of the prefixes or lies underneath one.
    pub fn contains(&self, path: &[Segment]) -> bool {
        self.0.iter().any(|prefix| is_under(path, prefix))
    }

    pub fn prefixes(&self) -> &[Path] {
        &self.0
    }
}

impl Default for IgnoredPaths {
    fn default() -> Self {
        Self::from_dotted(DEFAULT_IGNORED_PATHS)
    }
}

/// Diff with the default ignored prefixes.
pub fn diff(base: &Value, local: &Value) -> Vec<PathOp> {
    diff_with(base, local, &IgnoredPaths::default())
}

/// Operations that turn `base` into `local`, skipping `ignored` subtrees.
pub fn diff_with(base: &Value, local: &Value, ignored: &IgnoredPaths) -> Vec<PathOp> {
    let mut ops = Vec::new();
    diff_at_path(&mut ops, &[], base, local, ignored);
    ops
}

fn diff_at_path(ops: &mut Vec<PathOp>, path: &[Segment], base: &Value, local: &Value, ignored: &IgnoredPaths) {
    if ignored.contains(path) || deep_equal(base, local) {
        return;
    }
    match (base, local) {
        (Value::Array(_), _) | (_, Value::Array(_)) => set(ops, path, Some(base), local),
        (Value::Object(b), Value::Object(l)) => diff_obj(ops, path, b, l, ignored),
        _ => set(ops, path, Some(base), local),
    }
}

fn set(ops: &mut Vec<PathOp>, path: &[Segment], base: Option<&Value>, value: &Value) {
    ops.push(PathOp::Set {
        path: path.to_vec(),
        base: base.cloned(),
        value: value.clone(),
    });
}

fn diff_obj(
    ops: &mut Vec<PathOp>,
    path: &[Segment],
    base: &Map<String, Value>,
    local: &Map<String, Value>,
    ignored: &IgnoredPaths,
) {
    for (key, base_val) in base {
        let p = child(path, key.as_str());
        match local.get(key) {
            Some(local_val) => diff_at_path(ops, &p, base_val, local_val, ignored),
            None if ignored.contains(&p) => {}
            None => ops.push(PathOp::Delete {
                path: p,
                base: base_val.clone(),
            }),
        }
    }
    for (key, local_val) in local {
        if base.contains_key(key) {
            continue;
        }
        let p = child(path, key.as_str());
        if !ignored.contains(&p) {
            set(ops, &p, None, local_val);
        }
    }
}

/// Copy of `value` without any `ignored` subtree.
pub fn strip_ignored(value: &Value, ignored: &IgnoredPaths) -> Value {
    let mut out = value.clone();
    for prefix in ignored.prefixes() {
        livedoc_path::remove(&mut out, prefix);
    }
    out
}
