//! livedoc-util - small helpers shared by the livedoc crates.

pub mod json_equal;
pub mod strings;

pub use json_equal::{deep_equal, deep_equal_opt};
pub use strings::{indentation, is_blank, normalize_line_endings, split_lines};
