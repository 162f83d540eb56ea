//! Whitespace normalization of captured engine output.
//!
//! CMake wraps and indents its own diagnostics depending on terminal width and log context, so tests
//! match against a single-line view where every whitespace run is one space.

/// Collapse every maximal run of whitespace (spaces, tabs, newlines, any Unicode whitespace) into one space.
///
/// ## Notes
/// - Non-whitespace characters are kept verbatim; a leading or trailing run becomes a single space rather
///   than being trimmed.
/// - Idempotent: `normalize_whitespace(&normalize_whitespace(s)) == normalize_whitespace(s)`.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_mixed_runs() {
        assert_eq!(normalize_whitespace("a  b\t\tc\n\nd"), "a b c d");
    }

    #[test]
    fn test_keeps_edges_as_single_space() {
        assert_eq!(normalize_whitespace("\n  CMake Error\n"), " CMake Error ");
    }

    #[test]
    fn test_empty_and_whitespace_only() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \t\r\n "), " ");
    }

    #[test]
    fn test_wrapped_diagnostic_becomes_one_line() {
        let raw = "CMake Error at m.cmake:3 (message):\n  Fn was invoked with 2 arguments, but exactly 1\n  expected (unexpected arguments: zzyzx)\n";
        assert!(normalize_whitespace(raw).contains("but exactly 1 expected (unexpected arguments: zzyzx)"));
    }

    #[test]
    fn test_idempotent_on_sample() {
        let once = normalize_whitespace("x \n\t y  z ");
        assert_eq!(normalize_whitespace(&once), once);
    }

    #[test]
    fn test_unicode_whitespace() {
        assert_eq!(normalize_whitespace("a\u{00A0}\u{2003}b"), "a b");
    }
}
