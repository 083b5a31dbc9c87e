//! Logical-line lexer. Folds raw source text into a sequence of
//! bracket-balanced records; the indentation parser never sees physical
//! lines, blank lines, or comments.

/// One logical line: trimmed text plus the indent of its first physical line.
/// Indent is the raw count of leading whitespace characters — tabs and spaces
/// are not normalized, callers must be internally consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub text: String,
    pub indent: usize,
}

/// Split source text into logical lines.
///
/// Blank lines and lines starting with `#` are dropped, unless a bracketed
/// literal is currently open — bracket depth (`[` +1, `]` −1) is tracked per
/// character, and while it stays positive subsequent physical lines are
/// space-joined into the open record. Depth has no string-literal awareness:
/// a `]` inside a quoted string still closes a bracket. An unterminated
/// literal at end of input flushes whatever was buffered.
pub fn logical_lines(source: &str) -> Vec<LineRecord> {
    let mut records = Vec::new();
    let mut open: Option<LineRecord> = None;
    let mut depth: i32 = 0;

    for raw in source.lines() {
        let trimmed = raw.trim();

        if let Some(record) = open.as_mut() {
            depth += bracket_delta(trimmed);
            if !trimmed.is_empty() {
                record.text.push(' ');
                record.text.push_str(trimmed);
            }
        } else {
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let indent = raw.chars().take_while(|c| c.is_whitespace()).count();
            depth = bracket_delta(trimmed);
            open = Some(LineRecord { text: trimmed.to_string(), indent });
        }

        if depth <= 0 {
            if let Some(done) = open.take() {
                records.push(done);
            }
            depth = 0;
        }
    }

    // Lenient: unbalanced brackets at end of input still yield a record.
    if let Some(record) = open {
        records.push(record);
    }

    records
}

fn bracket_delta(s: &str) -> i32 {
    s.chars()
        .map(|c| match c {
            '[' => 1,
            ']' => -1,
            _ => 0,
        })
        .sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<LineRecord> {
        logical_lines(src)
    }

    #[test]
    fn empty_source() {
        assert!(lex("").is_empty());
    }

    #[test]
    fn blank_and_comment_lines_dropped() {
        let records = lex("a = 1\n\n   \n# note\nb = 2\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "a = 1");
        assert_eq!(records[1].text, "b = 2");
    }

    #[test]
    fn indent_is_leading_whitespace_count() {
        let records = lex("    circle(1, 2, 3)");
        assert_eq!(records[0].indent, 4);
        assert_eq!(records[0].text, "circle(1, 2, 3)");
    }

    #[test]
    fn multi_line_list_merges_into_one_record() {
        let records = lex("board = [1,\n    2,\n    3]\nnext = 4");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "board = [1, 2, 3]");
        assert_eq!(records[1].text, "next = 4");
    }

    #[test]
    fn merged_record_keeps_first_line_indent() {
        let records = lex("    rows = [1,\n2]");
        assert_eq!(records[0].indent, 4);
    }

    #[test]
    fn nested_brackets_need_full_balance() {
        let records = lex("grid = [[1, 2],\n    [3, 4]]");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "grid = [[1, 2], [3, 4]]");
    }

    #[test]
    fn comment_lines_kept_while_literal_open() {
        // While a literal is open every physical line is appended, even one
        // that would otherwise be dropped as a comment.
        let records = lex("xs = [1,\n# 2,\n3]");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "xs = [1, # 2, 3]");
    }

    #[test]
    fn blank_lines_inside_literal_do_not_pad_text() {
        let records = lex("xs = [1,\n\n2]");
        assert_eq!(records[0].text, "xs = [1, 2]");
    }

    #[test]
    fn unterminated_literal_flushes_at_eof() {
        let records = lex("xs = [1,\n2,");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "xs = [1, 2,");
    }

    #[test]
    fn stray_close_bracket_does_not_open_a_literal() {
        let records = lex("a = b]\nc = 1");
        assert_eq!(records.len(), 2);
    }
}
