//! Content escaping applied before rows are written.
//!
//! The hosting application renders stored content inside SQL string
//! literals, so single quotes are doubled. Code examples also lose every
//! `-` and `#` so markdown headings and rules do not survive into snippets.

/// Double every single quote.
#[must_use]
pub fn escape_kb_content(content: &str) -> String {
    content.replace('\'', "''")
}

/// Double every single quote and drop every `-` and `#`.
#[must_use]
pub fn escape_code_content(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '\'' => escaped.push_str("''"),
            '-' | '#' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kb_quotes_doubled() {
        assert_eq!(escape_kb_content("it's"), "it''s");
        assert_eq!(escape_kb_content("'a' 'b'"), "''a'' ''b''");
    }

    #[test]
    fn test_kb_keeps_hyphen_and_hash() {
        assert_eq!(escape_kb_content("# Title - sub"), "# Title - sub");
    }

    #[test]
    fn test_code_strips_hyphen_and_hash() {
        assert_eq!(escape_code_content("a-b#c"), "abc");
    }

    #[test]
    fn test_code_doubles_quotes() {
        assert_eq!(
            escape_code_content("## echo 'x' -- done"),
            " echo ''x''  done"
        );
    }

    #[test]
    fn test_no_lone_quotes_after_escape() {
        let escaped = escape_kb_content("don't 'quote' me");
        // every quote run has even length
        for run in escaped.split(|c| c != '\'').filter(|r| !r.is_empty()) {
            assert_eq!(run.len() % 2, 0, "odd quote run in {escaped:?}");
        }
    }
}
