//! Three-way merge of a user's edits onto the latest server document.
//!
//! The user's changes are `diff(base, local)`. Each is replayed onto one
//! clone of the server document unless the server moved that path since the
//! base *and* the user wants something other than the server's new value.
//! Those paths are reported as conflicts and never resolved automatically.

use livedoc_path::{format_dotted, get, PathError};
use livedoc_util::deep_equal_opt;
use serde_json::Value;

use crate::document::{parse_single, stringify, Format};
use crate::error::{EngineError, EngineResult};
use crate::path_diff::{diff_with, IgnoredPaths, PathOp};

/// Result of [`three_way_merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Serialized merge result. Only meaningful when [`is_clean`](Self::is_clean).
    pub merged_text: String,
    pub merged: Value,
    /// Dotted paths that conflicted, in operation order.
    pub conflicts: Vec<String>,
    pub format: Format,
}

impl MergeOutcome {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// The merged text, or [`EngineError::MergeConflict`] if anything
    /// conflicted.
    pub fn into_result(self) -> EngineResult<String> {
        if self.conflicts.is_empty() {
            Ok(self.merged_text)
        } else {
            Err(EngineError::MergeConflict { paths: self.conflicts })
        }
    }
}

fn apply(merged: &mut Value, op: &PathOp) -> Result<(), PathError> {
    match op {
        PathOp::Set { path, value, .. } => livedoc_path::set(merged, path, value.clone()).map(|_| ()),
        PathOp::Delete { path, .. } => {
            livedoc_path::remove(merged, path);
            Ok(())
        }
    }
}

/// Replay `diff(base, local)` onto a clone of `server`.
///
/// Returns the merged document and the conflicting dotted paths. A `Set`
/// that cannot be written because the server turned an intermediate object
/// into a scalar is reported as a conflict at that op's path.
pub fn merge_values(base: &Value, local: &Value, server: &Value, ignored: &IgnoredPaths) -> (Value, Vec<String>) {
    let ops = diff_with(base, local, ignored);
    let mut merged = server.clone();
    let mut conflicts = Vec::new();

    for op in &ops {
        let server_value = get(server, op.path());
        let server_moved = !deep_equal_opt(server_value, op.base());
        let disagrees = !deep_equal_opt(op.target(), server_value);
        if server_moved && disagrees {
            conflicts.push(op.dotted_path());
            continue;
        }
        if let Err(err) = apply(&mut merged, op) {
            tracing::debug!(path = %format_dotted(op.path()), %err, "merge op not applicable");
            conflicts.push(op.dotted_path());
        }
    }
    (merged, conflicts)
}

/// Merge text buffers with the default ignored prefixes.
pub fn three_way_merge(base: &str, local: &str, server: &str, hint: Option<Format>) -> EngineResult<MergeOutcome> {
    three_way_merge_with(base, local, server, hint, &IgnoredPaths::default())
}

/// Merge three single-document buffers.
///
/// Each buffer is parsed by its own shape; the result is serialized in the
/// local buffer's format. Conflicts are returned inside the outcome, not as
/// an error, so callers can show them next to the untouched local text.
pub fn three_way_merge_with(
    base: &str,
    local: &str,
    server: &str,
    hint: Option<Format>,
    ignored: &IgnoredPaths,
) -> EngineResult<MergeOutcome> {
    let format = Format::resolve(local, hint);
    let (base_doc, _) = parse_single(base, Some(format))?;
    let (local_doc, _) = parse_single(local, Some(format))?;
    let (server_doc, _) = parse_single(server, Some(format))?;

    let (merged, conflicts) = merge_values(&base_doc, &local_doc, &server_doc, ignored);
    if !conflicts.is_empty() {
        tracing::warn!(conflicts = ?conflicts, "three-way merge found conflicts");
        return Ok(MergeOutcome {
            merged_text: local.to_string(),
            merged,
            conflicts,
            format,
        });
    }
    let merged_text = stringify(&merged, format)?;
    Ok(MergeOutcome {
        merged_text,
        merged,
        conflicts,
        format,
    })
}
