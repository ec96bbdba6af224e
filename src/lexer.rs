use crate::{
    diagnostics::Diagnostic,
    token::{Keyword, Literal, Token, TokenKind},
};

/// Scans `source` into tokens, collecting lexical errors along the way.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    Lexer::new(source).tokenize()
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    /// Byte offset just past the last consumed character.
    current: usize,
    line: usize,
    tokens: Vec<Token>,
    errors: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices(),
            current: 0,
            line: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let (idx, ch) = self.chars.next()?;
        self.current = idx + ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some((idx, ch))
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, ch)| ch)
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().nth(1).map(|(_, ch)| ch)
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn consume_while<F>(&mut self, mut predicate: F)
    where
        F: FnMut(char) -> bool,
    {
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.bump();
        }
    }

    fn push(&mut self, start: usize, kind: TokenKind) {
        let lexeme = &self.source[start..self.current];
        self.tokens.push(Token::new(kind, lexeme, self.line));
    }

    fn either(&mut self, start: usize, next: char, matched: TokenKind, single: TokenKind) {
        let kind = if self.match_next(next) { matched } else { single };
        self.push(start, kind);
    }

    fn skip_comment(&mut self) {
        self.consume_while(|ch| ch != '\n');
    }

    fn identifier_or_keyword(&mut self, start: usize) {
        self.consume_while(is_ident_continue);
        let lexeme = &self.source[start..self.current];
        let kind = Keyword::lookup(lexeme).map_or(TokenKind::Identifier, TokenKind::Keyword);
        self.push(start, kind);
    }

    fn number_literal(&mut self, start: usize) {
        self.consume_while(|ch| ch.is_ascii_digit());
        // A trailing `.` without a digit after it stays a separate DOT token.
        if self.peek() == Some('.') && self.peek_next().is_some_and(|ch| ch.is_ascii_digit()) {
            self.bump();
            self.consume_while(|ch| ch.is_ascii_digit());
        }
        let lexeme = &self.source[start..self.current];
        match lexeme.parse::<f64>() {
            Ok(value) => self.tokens.push(
                Token::new(TokenKind::Number, lexeme, self.line)
                    .with_literal(Literal::Number(value)),
            ),
            Err(err) => self.errors.push(Diagnostic::lexer(
                self.line,
                format!("Invalid number literal {lexeme}: {err}"),
            )),
        }
    }

    fn string_literal(&mut self, start: usize) {
        let start_line = self.line;
        while let Some((_, ch)) = self.bump() {
            if ch == '"' {
                let lexeme = &self.source[start..self.current];
                let value = &self.source[start + 1..self.current - 1];
                self.tokens.push(
                    Token::new(TokenKind::String, lexeme, start_line)
                        .with_literal(Literal::String(value.to_string())),
                );
                return;
            }
        }
        self.errors.push(Diagnostic::lexer(self.line, "Unterminated string."));
    }

    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        while let Some((start, ch)) = self.bump() {
            match ch {
                '(' => self.push(start, TokenKind::LeftParen),
                ')' => self.push(start, TokenKind::RightParen),
                '{' => self.push(start, TokenKind::LeftBrace),
                '}' => self.push(start, TokenKind::RightBrace),
                ',' => self.push(start, TokenKind::Comma),
                '.' => self.push(start, TokenKind::Dot),
                '-' => self.push(start, TokenKind::Minus),
                '+' => self.push(start, TokenKind::Plus),
                ';' => self.push(start, TokenKind::Semicolon),
                '*' => self.push(start, TokenKind::Star),
                '!' => self.either(start, '=', TokenKind::BangEqual, TokenKind::Bang),
                '=' => self.either(start, '=', TokenKind::EqualEqual, TokenKind::Equal),
                '<' => self.either(start, '=', TokenKind::LessEqual, TokenKind::Less),
                '>' => self.either(start, '=', TokenKind::GreaterEqual, TokenKind::Greater),
                '/' => {
                    if self.match_next('/') {
                        self.skip_comment();
                    } else {
                        self.push(start, TokenKind::Slash);
                    }
                }
                ' ' | '\r' | '\t' | '\n' => {}
                '"' => self.string_literal(start),
                '0'..='9' => self.number_literal(start),
                c if is_ident_start(c) => self.identifier_or_keyword(start),
                other => self.errors.push(Diagnostic::lexer(
                    self.line,
                    format!("Unexpected character: {other}"),
                )),
            }
        }
        self.tokens.push(Token::eof(self.line));
        tracing::debug!(
            tokens = self.tokens.len(),
            errors = self.errors.len(),
            "scanned source"
        );
        (self.tokens, self.errors)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
