use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)[ \t\u{A0}]+$").expect("valid trailing space pattern"));
static BLANK_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank run pattern"));

/// Convert CRLF and lone CR line endings to LF
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Strip trailing whitespace from every line and collapse runs of blank
/// lines to a single blank line (keeps paragraph breaks)
pub fn squeeze_blank_lines(text: &str) -> String {
    let text = normalize_line_endings(text);
    let text = TRAILING_SPACE.replace_all(&text, "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");

    text.trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn test_squeeze_blank_lines() {
        let text = "\n\nTitle  \n\n\n\nFirst\t\nSecond\n\n\n";
        assert_eq!(squeeze_blank_lines(text), "Title\n\nFirst\nSecond");
    }

    #[test]
    fn test_tabs_inside_lines_survive() {
        assert_eq!(squeeze_blank_lines("a\tb\n\n\nc"), "a\tb\n\nc");
    }
}
