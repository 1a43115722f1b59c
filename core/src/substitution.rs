//! Textual parameter substitution (spec §4.3, §9): the driver never sends
//! true server-side parameters, so every bound `?` is replaced in place
//! with its literal form before the batch is submitted. The substitution
//! must skip `?` characters that appear inside string literals, bracketed
//! identifiers, or comments.

/// One substitution value, already rendered to its literal SQL text (e.g.
/// `"42"`, `"N'hello'"`, `"NULL"`, `"0x0102"`). Building this text from a
/// bound parameter record is the odbc crate's job; this module only
/// knows how to splice literals into `?` placeholders.
pub fn substitute_params(sql: &str, literals: &[String]) -> crate::Result<String> {
    let mut out = String::with_capacity(sql.len() + literals.iter().map(String::len).sum::<usize>());
    let mut params = literals.iter();
    let mut chars = sql.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        match c {
            '\'' => {
                out.push(c);
                copy_until_unescaped_quote(&mut chars, &mut out, '\'');
            }
            '[' => {
                out.push(c);
                copy_until(&mut chars, &mut out, ']');
            }
            '-' if matches!(chars.peek(), Some((_, '-'))) => {
                out.push(c);
                while let Some(&(_, next)) = chars.peek() {
                    out.push(next);
                    chars.next();
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                out.push(c);
                out.push('*');
                chars.next();
                let mut prev = '\0';
                while let Some((_, next)) = chars.next() {
                    out.push(next);
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            '?' => {
                let literal = params
                    .next()
                    .ok_or_else(|| crate::Error::InvalidData("fewer parameters bound than '?' placeholders".to_string()))?;
                out.push_str(literal);
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Counts the `?` placeholders in `sql` that lie outside string literals,
/// bracketed identifiers, and comments — the value `SQLNumParams` reports.
pub fn count_params(sql: &str) -> u16 {
    let mut count: u16 = 0;
    let mut chars = sql.char_indices().peekable();
    let mut sink = String::new();

    while let Some((_, c)) = chars.next() {
        match c {
            '\'' => copy_until_unescaped_quote(&mut chars, &mut sink, '\''),
            '[' => copy_until(&mut chars, &mut sink, ']'),
            '-' if matches!(chars.peek(), Some((_, '-'))) => {
                while let Some(&(_, next)) = chars.peek() {
                    chars.next();
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = '\0';
                while let Some((_, next)) = chars.next() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
            }
            '?' => count += 1,
            _ => {}
        }
    }
    count
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

/// A single-quoted string ends on a quote that isn't followed by another
/// quote (the SQL doubled-quote escape for an embedded `'`).
fn copy_until_unescaped_quote(chars: &mut Chars, sink: &mut String, quote: char) {
    while let Some((_, c)) = chars.next() {
        sink.push(c);
        if c == quote {
            if matches!(chars.peek(), Some((_, next)) if *next == quote) {
                let (_, next) = chars.next().unwrap();
                sink.push(next);
                continue;
            }
            return;
        }
    }
}

fn copy_until(chars: &mut Chars, sink: &mut String, end: char) {
    for (_, c) in chars.by_ref() {
        sink.push(c);
        if c == end {
            return;
        }
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn substitutes_in_order() {
        let sql = "INSERT INTO t VALUES (?, ?)";
        let out = substitute_params(sql, &["1".to_string(), "'x'".to_string()]).unwrap();
        assert_eq!(out, "INSERT INTO t VALUES (1, 'x')");
    }

    #[test]
    fn question_mark_inside_string_literal_is_not_a_placeholder() {
        let sql = "SELECT ? WHERE col = 'is this a ?'";
        assert_eq!(count_params(sql), 1);
        let out = substitute_params(sql, &["42".to_string()]).unwrap();
        assert_eq!(out, "SELECT 42 WHERE col = 'is this a ?'");
    }

    #[test]
    fn question_mark_inside_bracketed_identifier_is_skipped() {
        let sql = "SELECT [col?] FROM t WHERE x = ?";
        assert_eq!(count_params(sql), 1);
    }

    #[test]
    fn question_mark_inside_line_comment_is_skipped() {
        let sql = "SELECT 1 -- what about ?\nWHERE x = ?";
        assert_eq!(count_params(sql), 1);
    }

    #[test]
    fn question_mark_inside_block_comment_is_skipped() {
        let sql = "SELECT 1 /* skip ? here */ WHERE x = ?";
        assert_eq!(count_params(sql), 1);
    }

    #[test]
    fn escaped_quote_inside_literal_does_not_end_it_early() {
        let sql = "SELECT 'it''s a ?' WHERE x = ?";
        assert_eq!(count_params(sql), 1);
    }

    #[test]
    fn too_few_literals_is_an_error() {
        let sql = "SELECT ? , ?";
        assert!(substitute_params(sql, &["1".to_string()]).is_err());
    }
}
