//! Per-editor session: baseline tracking and the server-update state machine.
//!
//! ```text
//! Clean ──edit──▶ Dirty ──server update, version advanced──▶ DirtyStale
//!   ▲               │                                           │
//!   └──edit reverts─┘◀──────── reload / clean merge ────────────┘
//! ```
//!
//! A clean session follows the server silently. A dirty one records each
//! snapshot and, once the server moves past the baseline, waits for the user
//! to reload or merge. A conflicting merge leaves everything as it was.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::config::EngineConfig;
use crate::document::{stringify, DocumentBuffer, Format};
use crate::error::{EngineError, EngineResult};
use crate::highlight::{Highlight, HighlightScheduler};
use crate::line_diff::LineRange;
use crate::merge::three_way_merge_with;
use crate::path_diff::IgnoredPaths;
use crate::timer::DeferredTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionState {
    Clean,
    Dirty,
    /// Dirty, and the server has moved past the baseline version.
    DirtyStale,
    Closed,
}

/// What an incoming server snapshot did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The buffer was clean and now holds the snapshot.
    Replaced { highlight: Option<Highlight> },
    /// The buffer is dirty; the snapshot is kept for reload or merge.
    Recorded,
    /// The buffer is dirty and the server version advanced past the baseline.
    Stale,
}

/// Result of a successful [`EditorSession::merge_changes`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub text: String,
    pub baseline_version: Option<String>,
    pub highlight: Option<Highlight>,
}

/// Timers that fired during [`EditorSession::poll`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollEvents {
    pub validated: bool,
    pub highlight_cleared: bool,
}

/// Compare resource versions. Numeric tokens compare numerically; anything
/// else counts as advanced whenever it differs.
pub fn version_advanced(latest: &str, baseline: Option<&str>) -> bool {
    let Some(baseline) = baseline else {
        return true;
    };
    match (latest.parse::<u64>(), baseline.parse::<u64>()) {
        (Ok(latest), Ok(baseline)) => latest > baseline,
        _ => latest != baseline,
    }
}

#[derive(Debug)]
pub struct EditorSession {
    config: EngineConfig,
    ignored: IgnoredPaths,
    buffer: DocumentBuffer,
    /// Baseline text for dirty tracking and the merge base.
    original: DocumentBuffer,
    /// Server snapshot that produced the current baseline.
    baseline_snapshot: String,
    baseline_version: Option<String>,
    latest_server: String,
    latest_version: Option<String>,
    server_updated_while_editing: bool,
    validation: DeferredTimer,
    validation_error: Option<EngineError>,
    highlighter: HighlightScheduler,
    closed: bool,
}

impl EditorSession {
    fn with_buffer(buffer: DocumentBuffer, version: Option<&str>, config: EngineConfig) -> Self {
        let mut highlighter = HighlightScheduler::new(config.clone());
        highlighter.mark_rendered();
        Self {
            ignored: config.ignored(),
            original: buffer.clone(),
            baseline_snapshot: buffer.text().to_string(),
            baseline_version: version.map(str::to_string),
            latest_server: buffer.text().to_string(),
            latest_version: version.map(str::to_string),
            server_updated_while_editing: false,
            validation: DeferredTimer::new(),
            validation_error: None,
            highlighter,
            closed: false,
            buffer,
            config,
        }
    }

    /// Open an editor on a server object.
    pub fn open(value: &Value, version: Option<&str>, format: Format, config: EngineConfig) -> EngineResult<Self> {
        let buffer = DocumentBuffer::from_value(value, format)?;
        tracing::debug!(?version, %format, "editor session opened");
        Ok(Self::with_buffer(buffer, version, config))
    }

    /// Open an editor on literal text with no server object behind it.
    pub fn open_text(text: impl Into<String>, config: EngineConfig) -> Self {
        Self::with_buffer(DocumentBuffer::literal(text), None, config)
    }

    fn ensure_open(&self) -> EngineResult<()> {
        if self.closed {
            return Err(EngineError::SessionClosed);
        }
        Ok(())
    }

    fn server_moved(&self) -> bool {
        match &self.latest_version {
            Some(latest) => version_advanced(latest, self.baseline_version.as_deref()),
            None => self.latest_server != self.baseline_snapshot,
        }
    }

    fn refresh_flags(&mut self) {
        self.server_updated_while_editing = self.is_dirty() && self.server_moved();
    }

    /// Make `text` both the buffer and the baseline, at the latest server
    /// snapshot.
    fn adopt(&mut self, text: String, format: Format, now: Instant) -> Option<Highlight> {
        let prev = std::mem::replace(&mut self.buffer, DocumentBuffer::new(text, format));
        self.original = self.buffer.clone();
        self.baseline_snapshot = self.latest_server.clone();
        self.baseline_version = self.latest_version.clone();
        self.server_updated_while_editing = false;
        self.validation.cancel();
        self.validation_error = None;
        self.highlighter.request(prev.text(), self.buffer.text(), now)
    }

    pub fn state(&self) -> SessionState {
        if self.closed {
            SessionState::Closed
        } else if !self.is_dirty() {
            SessionState::Clean
        } else if self.server_updated_while_editing {
            SessionState::DirtyStale
        } else {
            SessionState::Dirty
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer.text() != self.original.text()
    }

    pub fn server_updated_while_editing(&self) -> bool {
        self.server_updated_while_editing
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn format(&self) -> Format {
        self.buffer.resolved_format()
    }

    pub fn original_text(&self) -> &str {
        self.original.text()
    }

    pub fn latest_server_text(&self) -> &str {
        &self.latest_server
    }

    pub fn baseline_version(&self) -> Option<&str> {
        self.baseline_version.as_deref()
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.latest_version.as_deref()
    }

    /// Outcome of the last debounced validity check.
    pub fn validation_error(&self) -> Option<&EngineError> {
        self.validation_error.as_ref()
    }

    pub fn decorations(&self) -> &[LineRange] {
        self.highlighter.decorations()
    }

    /// Apply a local edit. Validation runs after the debounce delay.
    ///
    /// Reverting to the baseline after the server moved on loads the latest
    /// snapshot, so a clean buffer always shows the server's content.
    pub fn edit(&mut self, text: impl Into<String>, now: Instant) -> EngineResult<SessionState> {
        self.ensure_open()?;
        self.buffer.set_text(text);
        if !self.is_dirty() && self.server_moved() {
            let text = self.latest_server.clone();
            let format = self.buffer.resolved_format();
            tracing::debug!(version = ?self.latest_version, "edits reverted, catching up with server");
            self.adopt(text, format, now);
            return Ok(self.state());
        }
        self.refresh_flags();
        self.validation.schedule(now, self.config.validation_debounce());
        Ok(self.state())
    }

    /// Feed a server snapshot of the object, with its resource version.
    pub fn server_update(&mut self, value: &Value, version: Option<&str>, now: Instant) -> EngineResult<SyncOutcome> {
        self.ensure_open()?;
        let format = self.buffer.resolved_format();
        self.latest_server = stringify(value, format)?;
        self.latest_version = version.map(str::to_string);

        if !self.is_dirty() {
            let text = self.latest_server.clone();
            let highlight = self.adopt(text, format, now);
            tracing::debug!(?version, highlighted = highlight.is_some(), "clean buffer synced from server");
            return Ok(SyncOutcome::Replaced { highlight });
        }

        self.refresh_flags();
        if self.server_updated_while_editing {
            tracing::debug!(?version, baseline = ?self.baseline_version, "server changed while editing");
            Ok(SyncOutcome::Stale)
        } else {
            Ok(SyncOutcome::Recorded)
        }
    }

    /// Discard local edits and load the latest server snapshot.
    pub fn reload_from_server(&mut self, now: Instant) -> EngineResult<Option<Highlight>> {
        self.ensure_open()?;
        let text = self.latest_server.clone();
        let format = self.buffer.resolved_format();
        tracing::debug!(version = ?self.latest_version, "reloading from server");
        Ok(self.adopt(text, format, now))
    }

    /// Merge local edits onto the latest server snapshot.
    ///
    /// On conflict the session is untouched and the error lists the paths.
    pub fn merge_changes(&mut self, now: Instant) -> EngineResult<MergeReport> {
        self.ensure_open()?;
        let outcome = three_way_merge_with(
            self.original.text(),
            self.buffer.text(),
            &self.latest_server,
            self.buffer.format(),
            &self.ignored,
        )?;
        let format = outcome.format;
        let text = outcome.into_result()?;
        let highlight = self.adopt(text.clone(), format, now);
        tracing::debug!(version = ?self.baseline_version, "merged local edits onto server snapshot");
        Ok(MergeReport {
            text,
            baseline_version: self.baseline_version.clone(),
            highlight,
        })
    }

    /// Fire any timers that are due.
    pub fn poll(&mut self, now: Instant) -> PollEvents {
        if self.closed {
            return PollEvents::default();
        }
        let mut events = PollEvents::default();
        if self.validation.fire_if_due(now).is_some() {
            self.validation_error = self.buffer.validate().err();
            if let Some(err) = &self.validation_error {
                tracing::warn!(%err, "buffer does not parse");
            }
            events.validated = true;
        }
        events.highlight_cleared = self.highlighter.poll(now);
        events
    }

    /// Tear down: cancel timers and refuse further mutation.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.validation.cancel();
        self.highlighter.cancel();
        self.closed = true;
        tracing::debug!("editor session closed");
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        self.close();
    }
}
