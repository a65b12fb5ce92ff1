use std::borrow::Cow;

/// Convert CRLF and lone CR line endings to LF.
///
/// Borrows the input when it contains no carriage returns.
///
/// ```
/// use livedoc_util::strings::normalize_line_endings;
///
/// assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
/// ```
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Split on `\n`. Like a JavaScript `split("\n")`, a trailing newline yields
/// a final empty line, and the empty string yields one empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Number of leading space or tab characters.
pub fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_borrows_clean_input() {
        assert!(matches!(normalize_line_endings("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn normalize_mixed() {
        assert_eq!(normalize_line_endings("a\r\n\r\nb\r"), "a\n\nb\n");
    }

    #[test]
    fn split_keeps_trailing_empty_line() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn indentation_counts_leading_whitespace() {
        assert_eq!(indentation("    key: v"), 4);
        assert_eq!(indentation("key"), 0);
        assert_eq!(indentation("   "), 3);
    }

    #[test]
    fn blank_lines() {
        assert!(is_blank("  \t"));
        assert!(!is_blank(" x "));
    }
}
