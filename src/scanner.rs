use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::ErrorReporter;
use crate::token::TokenKind::*;
use crate::token::{Literal, Token, TokenKind};

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("and", And),
        ("break", Break),
        ("class", Class),
        ("continue", Continue),
        ("else", Else),
        ("false", False),
        ("for", For),
        ("fun", Fun),
        ("if", If),
        ("nil", Nil),
        ("or", Or),
        ("print", Print),
        ("return", Return),
        ("super", Super),
        ("this", This),
        ("true", True),
        ("var", Var),
        ("while", While),
    ])
});

/// The first step in any compiler or interpreter is scanning. The scanner
/// takes in raw source code as a series of characters and groups it into
/// a series of chunks we call tokens — the meaningful "words" and
/// "punctuation" that make up the language's grammar.
pub struct Scanner<'a> {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    reporter: &'a ErrorReporter,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &str, reporter: &'a ErrorReporter) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            reporter,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }
        self.tokens.push(Token::eof(self.line));
        log::debug!("scanned {} tokens", self.tokens.len());
        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) {
        let line = self.line;
        let c = self.advance();
        match c {
            '(' => self.add_token(LeftParen),
            ')' => self.add_token(RightParen),
            '{' => self.add_token(LeftBrace),
            '}' => self.add_token(RightBrace),
            ',' => self.add_token(Comma),
            '.' => self.add_token(Dot),
            '-' => self.add_token(Minus),
            '+' => self.add_token(Plus),
            ';' => self.add_token(Semicolon),
            '*' => self.add_token(Star),

            '!' => {
                let kind = if self.match_next('=') { BangEqual } else { Bang };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.match_next('=') { EqualEqual } else { Equal };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_next('=') { LessEqual } else { Less };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.match_next('=') { GreaterEqual } else { Greater };
                self.add_token(kind);
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            '/' => {
                if self.match_next('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(Slash)
                }
            }
            '"' => self.string(),
            d if d.is_ascii_digit() => self.number(),
            a if is_alpha(a) => self.identifier(),

            other => {
                self.reporter.error(line, format!("Unexpected character: {other}"));
            }
        }
    }

    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.reporter.error(self.line, "Unterminated string.".to_string());
            return;
        }

        // The closing ".
        self.advance();

        let value: std::string::String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token_with_literal(TokenKind::String, Literal::String(value));
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A trailing '.' is only consumed when followed by another digit, so
        // `123.` scans as NUMBER(123) then DOT.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: std::string::String = self.source[self.start..self.current].iter().collect();
        let value: f64 = text.parse().expect("scanner only admits well-formed numbers");
        self.add_token_with_literal(Number, Literal::Number(value));
    }

    fn identifier(&mut self) {
        while is_alpha_numeric(self.peek()) {
            self.advance();
        }

        let text: std::string::String = self.source[self.start..self.current].iter().collect();
        let kind = KEYWORDS.get(text.as_str()).copied().unwrap_or(Identifier);
        self.add_token(kind);
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_token_with_literal(kind, Literal::None);
    }

    fn add_token_with_literal(&mut self, kind: TokenKind, literal: Literal) {
        let text: std::string::String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(kind, text, literal, self.line));
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alpha_numeric(c: char) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(src: &str) -> Vec<Token> {
        let reporter = ErrorReporter::new();
        Scanner::new(src, &reporter).scan_tokens()
    }

    #[test]
    fn empty_source_yields_eof() {
        let tokens = scan("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn numbers_keep_trailing_dot_separate() {
        let tokens = scan("123.");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].literal, Literal::Number(123.0));
        assert_eq!(tokens[1].kind, TokenKind::Dot);
    }

    #[test]
    fn multiline_string_tracks_line_number() {
        let tokens = scan("\"a\nb\" 1");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, Literal::String("a\nb".to_string()));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_reports_error() {
        let reporter = ErrorReporter::new();
        Scanner::new("\"oops", &reporter).scan_tokens();
        assert!(reporter.had_error());
    }

    #[test]
    fn keywords_are_recognized() {
        let tokens = scan("class super this break continue");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Class,
                TokenKind::Super,
                TokenKind::This,
                TokenKind::Break,
                TokenKind::Continue,
                TokenKind::Eof,
            ]
        );
    }
}
