use beanlens_types::Span;
use thiserror::Error;

/// A recoverable lexing problem. The token stream is still produced; callers
/// that care surface these as diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),
    #[error("unterminated block comment starting at byte {0}")]
    UnterminatedBlockComment(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    IntLiteral,
    StringLiteral,
    At,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Star,
    Eq,
    Lt,
    Gt,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub range: Span,
}

impl Token {
    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == text
    }

    /// The contents of a string literal token, quotes stripped. Escape
    /// sequences are preserved (no unescaping).
    pub fn string_value(&self) -> &str {
        let inner = self.text.strip_prefix('"').unwrap_or(&self.text);
        inner.strip_suffix('"').unwrap_or(inner)
    }
}

pub struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Lexer {
            text,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn remaining(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn bump_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
                self.bump_char();
            }

            let rem = self.remaining();
            if rem.starts_with("//") {
                while let Some(c) = self.bump_char() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }

            if rem.starts_with("/*") {
                let start = self.pos;
                self.bump_char();
                self.bump_char();
                while !self.remaining().is_empty() && !self.remaining().starts_with("*/") {
                    self.bump_char();
                }
                if self.remaining().starts_with("*/") {
                    self.bump_char();
                    self.bump_char();
                } else {
                    self.errors.push(LexError::UnterminatedBlockComment(start));
                }
                continue;
            }

            break;
        }
    }

    fn lex_identifier(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                out.push(c);
                self.bump_char();
            } else {
                break;
            }
        }
        out
    }

    fn lex_number(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                out.push(c);
                self.bump_char();
            } else {
                break;
            }
        }
        out
    }

    fn lex_string_literal(&mut self, start: usize) -> String {
        let mut out = String::new();
        // opening quote already consumed
        out.push('"');
        let mut terminated = false;
        while let Some(c) = self.bump_char() {
            out.push(c);
            match c {
                '"' => {
                    terminated = true;
                    break;
                }
                '\\' => {
                    if let Some(escaped) = self.bump_char() {
                        out.push(escaped);
                    }
                }
                '\n' => {
                    // String literals do not span lines; bail here so the
                    // rest of the input still tokenizes sensibly.
                    break;
                }
                _ => {}
            }
        }
        if !terminated {
            self.errors.push(LexError::UnterminatedString(start));
        }
        out
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace_and_comments();
        if self.remaining().is_empty() {
            return None;
        }

        let start = self.pos;
        let ch = self.bump_char()?;

        let (kind, text) = match ch {
            '{' => (TokenKind::LBrace, "{".to_string()),
            '}' => (TokenKind::RBrace, "}".to_string()),
            '(' => (TokenKind::LParen, "(".to_string()),
            ')' => (TokenKind::RParen, ")".to_string()),
            '[' => (TokenKind::LBracket, "[".to_string()),
            ']' => (TokenKind::RBracket, "]".to_string()),
            ';' => (TokenKind::Semi, ";".to_string()),
            ',' => (TokenKind::Comma, ",".to_string()),
            '.' => (TokenKind::Dot, ".".to_string()),
            '*' => (TokenKind::Star, "*".to_string()),
            '=' => (TokenKind::Eq, "=".to_string()),
            '<' => (TokenKind::Lt, "<".to_string()),
            '>' => (TokenKind::Gt, ">".to_string()),
            '@' => (TokenKind::At, "@".to_string()),
            '"' => {
                let lit = self.lex_string_literal(start);
                (TokenKind::StringLiteral, lit)
            }
            c if c.is_ascii_digit() => {
                let mut num = String::new();
                num.push(c);
                num.push_str(&self.lex_number());
                (TokenKind::IntLiteral, num)
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let mut ident = String::new();
                ident.push(c);
                ident.push_str(&self.lex_identifier());
                (TokenKind::Ident, ident)
            }
            other => (TokenKind::Unknown, other.to_string()),
        };

        let range = Span::new(start, self.pos);
        Some(Token { kind, text, range })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize `text`, discarding lex errors.
pub fn lex(text: &str) -> Vec<Token> {
    Lexer::new(text).collect()
}

/// Tokenize `text`, also returning the recoverable problems encountered.
pub fn lex_with_errors(text: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(text);
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next_token() {
        tokens.push(tok);
    }
    (tokens, lexer.errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<TokenKind> {
        lex(text).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_annotation_and_class_header() {
        let tokens = lex("@Component public class Foo {}");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["@", "Component", "public", "class", "Foo", "{", "}"]);
        assert_eq!(tokens[0].kind, TokenKind::At);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(
            kinds("foo // bar\n baz /* { */ qux"),
            vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Ident]
        );
    }

    #[test]
    fn string_literal_keeps_quotes_and_escapes() {
        let tokens = lex(r#"@Qualifier("a\"b")"#);
        let lit = tokens
            .iter()
            .find(|t| t.kind == TokenKind::StringLiteral)
            .expect("string literal");
        assert_eq!(lit.text, r#""a\"b""#);
        assert_eq!(lit.string_value(), r#"a\"b"#);
    }

    #[test]
    fn reports_unterminated_string() {
        let (tokens, errors) = lex_with_errors("\"abc");
        assert_eq!(errors, vec![LexError::UnterminatedString(0)]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    }

    #[test]
    fn reports_unterminated_block_comment() {
        let (tokens, errors) = lex_with_errors("foo /* bar");
        assert_eq!(errors, vec![LexError::UnterminatedBlockComment(4)]);
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = lex("ab cd");
        assert_eq!(tokens[0].range, Span::new(0, 2));
        assert_eq!(tokens[1].range, Span::new(3, 5));
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(lex("").is_empty());
        assert!(lex("   \n\t").is_empty());
    }
}
