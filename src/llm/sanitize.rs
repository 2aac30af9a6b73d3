//! Cleanup of raw model replies.
//!
//! Models wrap programs in markdown fences or quotes despite instructions.
//! `clean_program` strips that decoration in a fixed order: whitespace, then
//! fence markers (language-tagged or bare), then wrapping quotes.

/// Cleans a raw model reply into a candidate program.
pub fn clean_program(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    text = strip_fences(&text);
    text = strip_wrapping_quotes(&text);

    text.trim().to_string()
}

/// Removes markdown code-fence markers wherever they appear.
///
/// Handles both the language-tagged form (```python, ```text) and bare
/// ``` fences. Fences are removed as tokens rather than whole lines so a
/// fence wrapped in other decoration (e.g. quotes) still disappears.
fn strip_fences(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;

    while let Some(idx) = rest.find("```") {
        // An opening fence sits at the start of its line, allowing for quote
        // decoration; anything else on the line means the backticks close a
        // fence and what follows is program text.
        let line_prefix = rest[..idx].rsplit('\n').next().unwrap_or("");
        let opening = line_prefix
            .chars()
            .all(|c| c.is_whitespace() || c == '"' || c == '\'');

        out.push_str(&rest[..idx]);
        rest = &rest[idx + 3..];

        // An opening fence may carry a language tag; drop it.
        if opening {
            let tag_len: usize = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .map(char::len_utf8)
                .sum();
            rest = &rest[tag_len..];
        }
    }
    out.push_str(rest);
    out
}

/// Strips matching quote characters wrapping the whole program.
fn strip_wrapping_quotes(text: &str) -> String {
    let mut s = text.trim();
    loop {
        let stripped = s
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .or_else(|| s.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')));
        match stripped {
            // Quotes inside the program (string literals) stay untouched;
            // only a full wrap is removed.
            Some(inner) if !inner.is_empty() => s = inner.trim(),
            _ => return s.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_program_untouched() {
        let raw = r#"result = df.groupby("Department").sum("Net Amount")"#;
        assert_eq!(clean_program(raw), raw);
    }

    #[test]
    fn test_strips_language_tagged_fence() {
        let raw = "```python\nresult = df.head(5)\n```";
        assert_eq!(clean_program(raw), "result = df.head(5)");
    }

    #[test]
    fn test_strips_bare_fence() {
        let raw = "```\nresult = df.head(5)\n```";
        assert_eq!(clean_program(raw), "result = df.head(5)");
    }

    #[test]
    fn test_strips_fence_and_wrapping_quote() {
        // A fenced reply additionally wrapped in a quote character must be
        // fully cleaned before the program is considered usable.
        let raw = "\"```python\nresult = df.sort(\"Age\")\n```\"";
        assert_eq!(clean_program(raw), "result = df.sort(\"Age\")");
    }

    #[test]
    fn test_strips_single_quotes() {
        let raw = "'result = df.count()'";
        assert_eq!(clean_program(raw), "result = df.count()");
    }

    #[test]
    fn test_interior_quotes_survive() {
        let raw = r#"result = df.filter("Department" == "ENT")"#;
        assert_eq!(clean_program(raw), raw);
    }

    #[test]
    fn test_whitespace_trimmed() {
        let raw = "  \n  result = df.head(3)  \n ";
        assert_eq!(clean_program(raw), "result = df.head(3)");
    }

    #[test]
    fn test_multiline_program_in_fence() {
        let raw = "```\nstep = df.filter(\"Age\" > 30)\nresult = step.count()\n```";
        assert_eq!(
            clean_program(raw),
            "step = df.filter(\"Age\" > 30)\nresult = step.count()"
        );
    }

    #[test]
    fn test_empty_reply() {
        assert_eq!(clean_program("   "), "");
    }
}
