//! Line-level change detection for visual highlighting.
//!
//! A bounded two-cursor walk with a small resynchronization window. It does
//! not aim for a minimal edit script: it reports which lines of the new text
//! should be marked as changed, and degrades to a single prefix/suffix range
//! when inputs are too large for the walk.

use std::collections::BTreeSet;

use livedoc_util::strings::{normalize_line_endings, split_lines};
use serde::{Deserialize, Serialize};

/// Contiguous block of changed lines, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRange {
    pub start_line: usize,
    pub end_line: usize,
}

#[allow(clippy::len_without_is_empty)]
impl LineRange {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        debug_assert!(start_line >= 1 && start_line <= end_line);
        Self { start_line, end_line }
    }

    pub fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    pub fn len(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }

    pub fn lines(&self) -> impl Iterator<Item = usize> {
        self.start_line..=self.end_line
    }
}

/// Size guards for [`diff_lines_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffLimits {
    /// Above this many lines on either side, skip the walk entirely.
    pub max_lines: usize,
    /// Comparison budget for the walk before falling back.
    pub max_ops: usize,
    /// Resynchronization window, in lines, on each side.
    pub lookahead: usize,
    /// Most distinct changed lines recorded.
    pub max_changed: usize,
}

impl Default for DiffLimits {
    fn default() -> Self {
        Self {
            max_lines: 20_000,
            max_ops: 250_000,
            lookahead: 40,
            max_changed: 1_000,
        }
    }
}

/// Collapse ascending 0-based line indices into 1-based ranges.
///
/// ```
/// use livedoc::line_diff::{coalesce, LineRange};
///
/// assert_eq!(
///     coalesce([0, 1, 2, 5, 7, 8]),
///     vec![LineRange::new(1, 3), LineRange::new(6, 6), LineRange::new(8, 9)],
/// );
/// ```
pub fn coalesce(indices: impl IntoIterator<Item = usize>) -> Vec<LineRange> {
    let mut ranges: Vec<LineRange> = Vec::new();
    for idx in indices {
        let line = idx + 1;
        match ranges.last_mut() {
            Some(last) if line <= last.end_line + 1 => last.end_line = last.end_line.max(line),
            _ => ranges.push(LineRange::single(line)),
        }
    }
    ranges
}

struct ChangeSet {
    indices: BTreeSet<usize>,
    cap: usize,
}

impl ChangeSet {
    fn new(cap: usize) -> Self {
        Self {
            indices: BTreeSet::new(),
            cap,
        }
    }

    fn mark(&mut self, idx: usize) {
        if self.indices.len() < self.cap {
            self.indices.insert(idx);
        }
    }

    fn mark_span(&mut self, from: usize, to: usize) {
        for idx in from..to {
            self.mark(idx);
        }
    }
}

/// Two-cursor walk. `None` once the comparison budget is spent.
fn walk(prev: &[&str], next: &[&str], limits: &DiffLimits) -> Option<BTreeSet<usize>> {
    let mut changed = ChangeSet::new(limits.max_changed);
    let last = next.len().saturating_sub(1);
    let (mut i, mut j) = (0usize, 0usize);
    let mut ops = 0usize;

    while i < prev.len() && j < next.len() {
        ops += 1;
        if prev[i] == next[j] {
            i += 1;
            j += 1;
            continue;
        }

        // Scan both windows outward together: the first hit is the shorter
        // jump, and an insertion wins a tie.
        let mut inserted = None;
        let mut deleted = None;
        for k in 1..=limits.lookahead {
            let in_next = j + k < next.len();
            let in_prev = i + k < prev.len();
            if !in_next && !in_prev {
                break;
            }
            if in_next {
                ops += 1;
                if next[j + k] == prev[i] {
                    inserted = Some(k);
                    break;
                }
            }
            if in_prev {
                ops += 1;
                if prev[i + k] == next[j] {
                    deleted = Some(k);
                    break;
                }
            }
        }
        if ops > limits.max_ops {
            return None;
        }

        match (inserted, deleted) {
            (Some(k), _) => {
                changed.mark_span(j, j + k);
                j += k;
            }
            (None, Some(d)) => {
                changed.mark(j.min(last));
                i += d;
            }
            (None, None) => {
                changed.mark(j);
                i += 1;
                j += 1;
            }
        }
    }

    if j < next.len() {
        changed.mark_span(j, next.len());
    } else if i < prev.len() {
        changed.mark(last);
    }
    Some(changed.indices)
}

/// Single range between the common prefix and the common suffix.
fn approximate(prev: &[&str], next: &[&str], limits: &DiffLimits) -> Vec<LineRange> {
    let prefix = prev.iter().zip(next).take_while(|(a, b)| a == b).count();
    let suffix = prev[prefix..]
        .iter()
        .rev()
        .zip(next[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let end = next.len() - suffix;
    if prefix >= end {
        // Nothing survives in `next`: anchor at the deletion point.
        let anchor = prefix.min(next.len().saturating_sub(1));
        return vec![LineRange::single(anchor + 1)];
    }
    let capped_end = end.min(prefix + limits.max_changed);
    vec![LineRange::new(prefix + 1, capped_end)]
}

/// Changed-line ranges of `next` relative to `prev`, with default limits.
pub fn diff_lines(prev: &str, next: &str) -> Vec<LineRange> {
    diff_lines_with(prev, next, &DiffLimits::default())
}

/// Changed-line ranges of `next` relative to `prev`.
///
/// Line endings are normalized first, so a CRLF/LF-only change is no change.
/// Ranges are sorted, disjoint and never adjacent.
pub fn diff_lines_with(prev: &str, next: &str, limits: &DiffLimits) -> Vec<LineRange> {
    let prev = normalize_line_endings(prev);
    let next = normalize_line_endings(next);
    if prev == next {
        return Vec::new();
    }
    let prev_lines = split_lines(&prev);
    let next_lines = split_lines(&next);

    let longest = prev_lines.len().max(next_lines.len());
    if longest > limits.max_lines {
        tracing::debug!(lines = longest, "line diff over size guard, approximating");
        return approximate(&prev_lines, &next_lines, limits);
    }
    match walk(&prev_lines, &next_lines, limits) {
        Some(indices) => coalesce(indices),
        None => {
            tracing::debug!(max_ops = limits.max_ops, "line diff over comparison budget, approximating");
            approximate(&prev_lines, &next_lines, limits)
        }
    }
}
