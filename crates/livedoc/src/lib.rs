//! livedoc - live document reconciliation for structured resource editors.
//!
//! A YAML/JSON editor buffer is fed both by local keystrokes and by a live
//! server snapshot of the same object. This crate keeps the two apart and
//! brings them back together:
//!
//! - [`document`] parses and serializes buffers (format sniffed from shape).
//! - [`line_diff`] finds changed lines for highlighting, with size guards.
//! - [`path_diff`] diffs parsed documents into path-scoped set/delete ops.
//! - [`merge`] replays local ops onto the server document, reporting conflicts.
//! - [`highlight`] decides which lines to decorate and when to clear them.
//! - [`session`] tracks baseline, dirty and stale state per open editor.
//!
//! Everything is synchronous and single-threaded. Deferred work (validation
//! debounce, highlight fade) is a [`timer::DeferredTimer`] the host polls.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod highlight;
pub mod line_diff;
pub mod merge;
pub mod path_diff;
pub mod session;
pub mod timer;

pub use config::EngineConfig;
pub use document::{parse, parse_single, stringify, DocumentBuffer, Format, Parsed};
pub use error::{EngineError, EngineResult};
pub use highlight::{plan_highlight, Highlight, HighlightScheduler};
pub use line_diff::{diff_lines, diff_lines_with, DiffLimits, LineRange};
pub use merge::{merge_values, three_way_merge, three_way_merge_with, MergeOutcome};
pub use path_diff::{diff, diff_with, IgnoredPaths, PathOp};
pub use session::{EditorSession, MergeReport, PollEvents, SessionState, SyncOutcome};
