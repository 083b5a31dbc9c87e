//! Token scanner for a single logical line. Statement keywords (`loop`,
//! `times`, `function`, …) are handled textually by the parser; the scanner
//! only knows the expression grammar plus `=`/`:` so assignments and bare
//! calls can be recognized from the same token stream.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Num(f64),
    Str(String),
    Bool(bool),
    Ident(String),

    // Logical keywords
    And,
    Or,
    Not,

    // Operators
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    EqEq,    // ==
    BangEq,  // !=
    Lt,      // <
    LtEq,    // <=
    Gt,      // >
    GtEq,    // >=
    Eq,      // =

    // Punctuation
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Colon,    // :

    Eof,
}

/// Maps an identifier to its keyword token, or returns `Ident`.
fn keyword_or_ident(s: String) -> TokenKind {
    match s.as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "true" => TokenKind::Bool(true),
        "false" => TokenKind::Bool(false),
        _ => TokenKind::Ident(s),
    }
}

/// A token plus its byte offset in the line, so callers can slice the
/// original text back out (used to preserve unparseable expression tails).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at column {column}")]
pub struct ScanError {
    pub message: String,
    pub column: usize,
}

pub fn scan(line: &str) -> Result<Vec<Token>, ScanError> {
    Scanner { src: line.as_bytes(), pos: 0 }.scan_all()
}

struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn scan_all(mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        while self.pos < self.src.len() {
            let start = self.pos;
            let ch = self.advance();

            let kind = match ch {
                b' ' | b'\t' => continue,

                b'+' => TokenKind::Plus,
                b'-' => TokenKind::Minus,
                b'*' => TokenKind::Star,
                b'/' => TokenKind::Slash,
                b'%' => TokenKind::Percent,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'[' => TokenKind::LBracket,
                b']' => TokenKind::RBracket,
                b',' => TokenKind::Comma,
                b':' => TokenKind::Colon,

                b'=' => {
                    if self.peek() == b'=' {
                        self.advance();
                        TokenKind::EqEq
                    } else {
                        TokenKind::Eq
                    }
                }
                b'!' => {
                    if self.peek() == b'=' {
                        self.advance();
                        TokenKind::BangEq
                    } else {
                        return Err(self.err("expected `!=`, bare `!` is not valid", start));
                    }
                }
                b'<' => {
                    if self.peek() == b'=' {
                        self.advance();
                        TokenKind::LtEq
                    } else {
                        TokenKind::Lt
                    }
                }
                b'>' => {
                    if self.peek() == b'=' {
                        self.advance();
                        TokenKind::GtEq
                    } else {
                        TokenKind::Gt
                    }
                }

                b'"' => TokenKind::Str(self.read_string(start)?),
                b'0'..=b'9' => TokenKind::Num(self.read_number(ch)),
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => keyword_or_ident(self.read_ident(ch)),

                other => {
                    return Err(self.err(format!("unexpected character `{}`", other as char), start));
                }
            };

            tokens.push(Token { kind, start });
        }

        tokens.push(Token { kind: TokenKind::Eof, start: self.src.len() });
        Ok(tokens)
    }

    fn advance(&mut self) -> u8 {
        let ch = self.src[self.pos];
        self.pos += 1;
        ch
    }

    fn peek(&self) -> u8 {
        if self.pos < self.src.len() { self.src[self.pos] } else { 0 }
    }

    fn peek_next(&self) -> u8 {
        if self.pos + 1 < self.src.len() { self.src[self.pos + 1] } else { 0 }
    }

    fn err(&self, message: impl Into<String>, column: usize) -> ScanError {
        ScanError { message: message.into(), column }
    }

    fn read_string(&mut self, start: usize) -> Result<String, ScanError> {
        let mut s = String::new();
        loop {
            if self.pos >= self.src.len() {
                return Err(self.err("unterminated string literal", start));
            }
            let ch = self.advance();
            if ch == b'"' {
                break;
            }
            if ch == b'\\' {
                if self.pos >= self.src.len() {
                    return Err(self.err("unterminated string literal", start));
                }
                match self.advance() {
                    b'n' => s.push('\n'),
                    b't' => s.push('\t'),
                    b'"' => s.push('"'),
                    b'\\' => s.push('\\'),
                    // Lenient: unknown escapes pass through verbatim.
                    other => {
                        s.push('\\');
                        s.push(other as char);
                    }
                }
            } else {
                s.push(ch as char);
            }
        }
        Ok(s)
    }

    fn read_number(&mut self, first: u8) -> f64 {
        let mut s = String::new();
        s.push(first as char);
        while self.peek().is_ascii_digit() {
            s.push(self.advance() as char);
        }
        // consume the decimal point only if a digit follows
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            s.push(self.advance() as char);
            while self.peek().is_ascii_digit() {
                s.push(self.advance() as char);
            }
        }
        s.parse().unwrap_or(0.0)
    }

    fn read_ident(&mut self, first: u8) -> String {
        let mut s = String::new();
        s.push(first as char);
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            s.push(self.advance() as char);
        }
        s
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        scan(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn integer_becomes_number() {
        assert_eq!(kinds("42"), vec![TokenKind::Num(42.0), TokenKind::Eof]);
    }

    #[test]
    fn decimal_literal() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Num(3.14), TokenKind::Eof]);
    }

    #[test]
    fn keywords_and_bools() {
        assert_eq!(kinds("and"), vec![TokenKind::And, TokenKind::Eof]);
        assert_eq!(kinds("or"), vec![TokenKind::Or, TokenKind::Eof]);
        assert_eq!(kinds("not"), vec![TokenKind::Not, TokenKind::Eof]);
        assert_eq!(kinds("true"), vec![TokenKind::Bool(true), TokenKind::Eof]);
        assert_eq!(kinds("false"), vec![TokenKind::Bool(false), TokenKind::Eof]);
    }

    #[test]
    fn loop_vocabulary_stays_plain_idents() {
        assert_eq!(kinds("times"), vec![TokenKind::Ident("times".into()), TokenKind::Eof]);
        assert_eq!(kinds("while"), vec![TokenKind::Ident("while".into()), TokenKind::Eof]);
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(kinds("=="), vec![TokenKind::EqEq, TokenKind::Eof]);
        assert_eq!(kinds("!="), vec![TokenKind::BangEq, TokenKind::Eof]);
        assert_eq!(kinds("<="), vec![TokenKind::LtEq, TokenKind::Eof]);
        assert_eq!(kinds(">="), vec![TokenKind::GtEq, TokenKind::Eof]);
    }

    #[test]
    fn single_eq_distinct_from_eqeq() {
        assert_eq!(
            kinds("x = 1"),
            vec![TokenKind::Ident("x".into()), TokenKind::Eq, TokenKind::Num(1.0), TokenKind::Eof]
        );
    }

    #[test]
    fn string_literal_with_escape() {
        assert_eq!(
            kinds(r#""a\nb""#),
            vec![TokenKind::Str("a\nb".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unknown_escape_passes_through() {
        assert_eq!(kinds(r#""\q""#), vec![TokenKind::Str("\\q".into()), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_is_error() {
        assert!(scan(r#""oops"#).is_err());
    }

    #[test]
    fn bare_bang_is_error() {
        assert!(scan("!").is_err());
    }

    #[test]
    fn token_offsets_point_into_line() {
        let tokens = scan("x = y + 1").unwrap();
        assert_eq!(tokens[0].start, 0); // x
        assert_eq!(tokens[1].start, 2); // =
        assert_eq!(tokens[2].start, 4); // y
    }

    #[test]
    fn call_shape() {
        assert_eq!(
            kinds("circle(10, 20, 5)"),
            vec![
                TokenKind::Ident("circle".into()),
                TokenKind::LParen,
                TokenKind::Num(10.0),
                TokenKind::Comma,
                TokenKind::Num(20.0),
                TokenKind::Comma,
                TokenKind::Num(5.0),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }
}
