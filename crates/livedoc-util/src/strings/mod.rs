//! Line and whitespace helpers.

mod lines;

pub use lines::{indentation, is_blank, normalize_line_endings, split_lines};
