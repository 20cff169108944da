//! Lexer implementation.
//!
//! Scans script text into tokens in a single linear pass. The language is
//! line-oriented: a physical newline ends a statement unless the line ends
//! with the continuation character `¬`. Keywords are contextual, so every
//! bare word is emitted as `TokenKind::Word` and classified by the parser.
use wt_syntax::{Diagnostic, Span, Token, TokenKind, is_word_continue, is_word_start};

/// Lexing result.
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// WildTalk lexer.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    i: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            i: 0,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Run the lexer and return tokens + diagnostics.
    pub fn lex(mut self) -> LexResult {
        let approx = self.bytes.len().saturating_div(4).max(16);
        self.tokens.reserve(approx);
        while self.i < self.bytes.len() {
            let start = self.i;
            let Some(c) = self.peek_char() else { break };
            match c {
                ' ' | '\t' => {
                    self.i += 1;
                }
                '\r' => {
                    self.i += 1;
                    if self.peek_char() == Some('\n') {
                        self.i += 1;
                    }
                    self.push(TokenKind::Newline, start);
                }
                '\n' => {
                    self.i += 1;
                    self.push(TokenKind::Newline, start);
                }
                '¬' => {
                    // Line continuation: swallow trailing whitespace and the
                    // newline so the statement keeps going.
                    self.i += '¬'.len_utf8();
                    while matches!(self.peek_char(), Some(' ' | '\t' | '\r')) {
                        self.i += 1;
                    }
                    if self.peek_char() == Some('\n') {
                        self.i += 1;
                    }
                }
                '-' => {
                    if self.peek_at(1) == Some(b'-') {
                        // Comment to end of line; the newline itself still counts.
                        while self.i < self.bytes.len() && self.bytes[self.i] != b'\n' {
                            self.i += 1;
                        }
                    } else {
                        self.i += 1;
                        self.push(TokenKind::Minus, start);
                    }
                }
                '"' => self.lex_string(start),
                '(' => self.single(TokenKind::LParen, start),
                ')' => self.single(TokenKind::RParen, start),
                ',' => self.single(TokenKind::Comma, start),
                '+' => self.single(TokenKind::Plus, start),
                '*' => self.single(TokenKind::Star, start),
                '/' => self.single(TokenKind::Slash, start),
                '^' => self.single(TokenKind::Caret, start),
                '&' => {
                    self.i += 1;
                    if self.peek_char() == Some('&') {
                        self.i += 1;
                        self.push(TokenKind::AmpAmp, start);
                    } else {
                        self.push(TokenKind::Amp, start);
                    }
                }
                '=' => self.single(TokenKind::Eq, start),
                '<' => {
                    self.i += 1;
                    match self.peek_char() {
                        Some('>') => {
                            self.i += 1;
                            self.push(TokenKind::Ne, start);
                        }
                        Some('=') => {
                            self.i += 1;
                            self.push(TokenKind::Le, start);
                        }
                        _ => self.push(TokenKind::Lt, start),
                    }
                }
                '>' => {
                    self.i += 1;
                    if self.peek_char() == Some('=') {
                        self.i += 1;
                        self.push(TokenKind::Ge, start);
                    } else {
                        self.push(TokenKind::Gt, start);
                    }
                }
                '≠' => self.wide(TokenKind::Ne, start, '≠'),
                '≤' => self.wide(TokenKind::Le, start, '≤'),
                '≥' => self.wide(TokenKind::Ge, start, '≥'),
                c if c.is_ascii_digit() => self.lex_number(start),
                c if is_word_start(c) => self.lex_word(start),
                c => {
                    self.i += c.len_utf8();
                    self.push(TokenKind::Error, start);
                    self.diagnostics.push(Diagnostic::error(
                        format!("unexpected character `{c}`"),
                        Some(Span::new(start as u32, self.i as u32)),
                    ));
                }
            }
        }
        LexResult {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    fn lex_string(&mut self, start: usize) {
        self.i += 1;
        while self.i < self.bytes.len() {
            match self.bytes[self.i] {
                b'"' => {
                    self.i += 1;
                    self.push(TokenKind::Str, start);
                    return;
                }
                b'\n' => break,
                _ => self.i += 1,
            }
        }
        self.push(TokenKind::Error, start);
        self.diagnostics.push(Diagnostic::error(
            "unterminated string literal",
            Some(Span::new(start as u32, self.i as u32)),
        ));
    }

    fn lex_number(&mut self, start: usize) {
        while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
            self.i += 1;
        }
        let mut is_float = false;
        if self.i < self.bytes.len()
            && self.bytes[self.i] == b'.'
            && self.peek_at(1).is_some_and(|b| b.is_ascii_digit())
        {
            is_float = true;
            self.i += 1;
            while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
                self.i += 1;
            }
        }
        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        self.push(kind, start);
    }

    fn lex_word(&mut self, start: usize) {
        let mut iter = self.input[start..].char_indices();
        let mut end = start;
        for (off, c) in iter.by_ref() {
            if off == 0 || is_word_continue(c) {
                end = start + off + c.len_utf8();
            } else {
                break;
            }
        }
        self.i = end;
        self.push(TokenKind::Word, start);
    }

    fn single(&mut self, kind: TokenKind, start: usize) {
        self.i += 1;
        self.push(kind, start);
    }

    fn wide(&mut self, kind: TokenKind, start: usize, c: char) {
        self.i += c.len_utf8();
        self.push(kind, start);
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens
            .push(Token::new(kind, Span::new(start as u32, self.i as u32)));
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.i..].chars().next()
    }

    fn peek_at(&self, off: usize) -> Option<u8> {
        self.bytes.get(self.i + off).copied()
    }
}
