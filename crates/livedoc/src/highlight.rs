//! Decides which lines to flag after an external change.
//!
//! Independent of any editor widget: the output is a list of line ranges for
//! a decoration API, plus a fade deadline the host polls.

use std::collections::BTreeSet;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use livedoc_util::strings::{indentation, is_blank, normalize_line_endings, split_lines};
use livedoc_util::deep_equal;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::document::parse;
use crate::line_diff::{coalesce, diff_lines_with, LineRange};
use crate::path_diff::{strip_ignored, IgnoredPaths};
use crate::timer::DeferredTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    /// Most lines decorated per highlight.
    pub max_lines: usize,
    /// Lifetime of a highlight before it is cleared.
    pub fade_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            max_lines: 200,
            fade_ms: 2_500,
        }
    }
}

impl HighlightConfig {
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

/// Lines to mark after a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    /// Raw changed-line ranges of the new text.
    pub ranges: Vec<LineRange>,
    /// What to actually decorate: `ranges` minus server-managed lines,
    /// capped.
    pub decorated: Vec<LineRange>,
}

fn managed_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*(?:-\s+)?"?(?:resourceVersion|generation|uid|creationTimestamp|managedFields)"?\s*:"#)
            .expect("static regex")
    })
}

fn managed_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^\s*(?:-\s+)?"?managedFields"?\s*:"#).expect("static regex"))
}

fn is_sequence_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed == "-" || trimmed.starts_with("- ")
}

/// 1-based numbers of lines holding server-managed fields.
///
/// A `managedFields:` header opens a block that runs until the first
/// non-blank line indented no deeper than the header. A `- ` item at the
/// header's own indentation stays inside the block, since YAML emitters
/// commonly write sequences unindented under their key.
pub fn managed_field_lines(text: &str) -> BTreeSet<usize> {
    let text = normalize_line_endings(text);
    let lines = split_lines(&text);
    let mut out = BTreeSet::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if managed_key_re().is_match(line) {
            out.insert(i + 1);
        }
        if !managed_block_re().is_match(line) {
            i += 1;
            continue;
        }
        let header_indent = indentation(line);
        let mut k = i + 1;
        while k < lines.len() {
            let candidate = lines[k];
            let ind = indentation(candidate);
            let inside = is_blank(candidate)
                || ind > header_indent
                || (ind == header_indent && is_sequence_item(candidate));
            if !inside {
                break;
            }
            out.insert(k + 1);
            k += 1;
        }
        i = k;
    }
    out
}

/// `true` when `prev` and `next` parse to the same documents once ignored
/// fields are stripped. Unparseable text never counts as a silent sync.
pub fn is_silent_sync(prev: &str, next: &str, ignored: &IgnoredPaths) -> bool {
    let (Ok(prev), Ok(next)) = (parse(prev, None), parse(next, None)) else {
        return false;
    };
    prev.documents.len() == next.documents.len()
        && prev
            .documents
            .iter()
            .zip(&next.documents)
            .all(|(a, b)| deep_equal(&strip_ignored(a, ignored), &strip_ignored(b, ignored)))
}

/// Work out what to decorate when the buffer changes from `prev` to `next`.
///
/// `None` for a silent sync or identical text. When only server-managed lines
/// changed, `decorated` is empty but `ranges` still locate the change.
pub fn plan_highlight(prev: &str, next: &str, config: &EngineConfig) -> Option<Highlight> {
    if is_silent_sync(prev, next, &config.ignored()) {
        tracing::debug!("only server-managed fields changed, skipping highlight");
        return None;
    }
    let ranges = diff_lines_with(prev, next, &config.diff);
    if ranges.is_empty() {
        return None;
    }
    let managed = managed_field_lines(next);
    let lines = ranges
        .iter()
        .flat_map(LineRange::lines)
        .filter(|line| !managed.contains(line))
        .take(config.highlight.max_lines)
        .map(|line| line - 1);
    let decorated = coalesce(lines);
    Some(Highlight { ranges, decorated })
}

/// Owns the current decorations and their fade timer for one editor.
#[derive(Debug)]
pub struct HighlightScheduler {
    config: EngineConfig,
    rendered: bool,
    current: Option<Highlight>,
    fade: DeferredTimer,
}

impl HighlightScheduler {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            rendered: false,
            current: None,
            fade: DeferredTimer::new(),
        }
    }

    /// Record that the initial content has been shown.
    pub fn mark_rendered(&mut self) {
        self.rendered = true;
    }

    /// Highlight the change from `prev` to `next`.
    ///
    /// The very first request only marks the initial render. A request with
    /// something to decorate replaces the current one and restarts the fade.
    pub fn request(&mut self, prev: &str, next: &str, now: Instant) -> Option<Highlight> {
        if !self.rendered {
            self.rendered = true;
            return None;
        }
        let highlight = plan_highlight(prev, next, &self.config)?;
        if highlight.decorated.is_empty() {
            return Some(highlight);
        }
        self.fade.schedule(now, self.config.highlight.fade());
        self.current = Some(highlight.clone());
        Some(highlight)
    }

    /// Clear decorations whose fade has elapsed. Returns `true` if cleared.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.fade.fire_if_due(now).is_some() {
            self.current = None;
            return true;
        }
        false
    }

    pub fn decorations(&self) -> &[LineRange] {
        match &self.current {
            Some(highlight) => &highlight.decorated,
            None => &[],
        }
    }

    pub fn current(&self) -> Option<&Highlight> {
        self.current.as_ref()
    }

    pub fn fade_deadline(&self) -> Option<Instant> {
        self.fade.deadline()
    }

    pub fn cancel(&mut self) {
        self.fade.cancel();
        self.current = None;
    }
}
