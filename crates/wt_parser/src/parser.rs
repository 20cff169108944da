//! Parser.
//!
//! Converts lexer tokens into a `wt_ast::Script` (or a bare statement list,
//! or a single expression) and collects diagnostics. Recursive-descent
//! statement parser plus Pratt parsing for expressions. Keywords are
//! contextual `Word` tokens; all keyword matching is case-insensitive.
use wt_ast::{Handler, Script, Stmt};
use wt_syntax::{Diagnostic, Span, Token, TokenKind, name_eq};

/// Parse result for a whole script.
pub struct ParseResult {
    pub script: Script,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse result for a bare statement list (message box / `do` text).
pub struct StmtParseResult {
    pub stmts: Box<[Stmt]>,
    pub diagnostics: Vec<Diagnostic>,
}

/// WildTalk parser.
pub struct Parser<'a> {
    pub(crate) input: &'a str,
    pub(crate) tokens: &'a [Token],
    pub(crate) i: usize,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            input,
            tokens,
            i: 0,
            diagnostics: Vec::with_capacity(8),
        }
    }

    /// Parse a full script: a sequence of `on` handlers and `function`s.
    pub fn parse_script(mut self) -> ParseResult {
        let mut handlers: Vec<Handler> = Vec::new();
        let mut functions: Vec<Handler> = Vec::new();
        loop {
            self.skip_newlines();
            if self.peek().is_none() {
                break;
            }
            if self.at_word("on") {
                if let Some(h) = self.parse_handler("on") {
                    handlers.push(h);
                }
            } else if self.at_word("function") {
                if let Some(h) = self.parse_handler("function") {
                    functions.push(h);
                }
            } else {
                let span = self.peek().map(|t| t.span);
                self.error("expected `on` or `function` at top level of script", span);
                self.skip_line();
            }
        }
        ParseResult {
            script: Script {
                handlers: handlers.into_boxed_slice(),
                functions: functions.into_boxed_slice(),
            },
            diagnostics: self.diagnostics,
        }
    }

    /// Parse loose statements, as typed into a message box or passed to `do`.
    pub fn parse_statements(mut self) -> StmtParseResult {
        let stmts = self.parse_stmts_until(&[]);
        StmtParseResult {
            stmts,
            diagnostics: self.diagnostics,
        }
    }

    /// Parse a single expression. Returns `None` (without panicking) when
    /// the input is not one complete expression; callers fall back to
    /// treating the text as a literal.
    pub fn parse_expression(mut self) -> Option<wt_ast::Expr> {
        self.skip_newlines();
        let expr = self.parse_expr(0)?;
        self.skip_newlines();
        if self.peek().is_some() || !self.diagnostics.is_empty() {
            return None;
        }
        Some(expr)
    }

    fn parse_handler(&mut self, intro: &str) -> Option<Handler> {
        let start = self.peek().map(|t| t.span).unwrap_or_default();
        self.bump(); // `on` / `function`
        let Some(name) = self.eat_any_word() else {
            self.error(format!("expected a name after `{intro}`"), Some(start));
            self.skip_line();
            return None;
        };
        let mut params = Vec::new();
        while let Some(p) = self.eat_any_word() {
            params.push(p);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if !self.at_end_of_line() {
            let span = self.peek().map(|t| t.span);
            self.error("expected end of line after handler parameters", span);
            self.skip_line();
        }

        let body = self.parse_stmts_until(&["end"]);

        let mut end_span = start;
        if self.at_word("end") {
            end_span = self.peek().map(|t| t.span).unwrap_or(start);
            self.bump();
            match self.eat_any_word() {
                Some(end_name) if name_eq(&end_name, &name) => {}
                Some(end_name) => {
                    self.error(
                        format!("`end {end_name}` does not match `{intro} {name}`"),
                        Some(end_span),
                    );
                }
                None => {
                    self.error(format!("expected `end {name}`"), Some(end_span));
                }
            }
            self.skip_line();
        } else {
            self.error(format!("missing `end {name}`"), Some(start));
        }

        Some(Handler {
            name,
            params: params.into_boxed_slice(),
            body,
            span: start.merge(end_span),
        })
    }

    /// Parse statements until EOF or until a line begins with one of
    /// `stoppers` (the stopper token is not consumed).
    pub(crate) fn parse_stmts_until(&mut self, stoppers: &[&str]) -> Box<[Stmt]> {
        let mut stmts: Vec<Stmt> = Vec::with_capacity(4);
        loop {
            self.skip_newlines();
            let Some(tok) = self.peek() else { break };
            if tok.kind == TokenKind::Word {
                let text = self.text(tok);
                if stoppers.iter().any(|s| name_eq(s, text)) {
                    break;
                }
            }
            match self.parse_stmt() {
                Some(s) => stmts.push(s),
                None => self.skip_line(),
            }
            if !self.at_end_of_line() && self.peek().is_some() {
                let span = self.peek().map(|t| t.span);
                self.error("expected end of line after statement", span);
                self.skip_line();
            }
        }
        stmts.into_boxed_slice()
    }

    // -- cursor helpers --

    pub(crate) fn peek(&self) -> Option<Token> {
        self.tokens.get(self.i).copied()
    }

    pub(crate) fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub(crate) fn bump(&mut self) {
        self.i += 1;
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn text(&self, tok: Token) -> &'a str {
        &self.input[tok.span.range()]
    }

    /// Does the next token spell `word` (case-insensitively)?
    pub(crate) fn at_word(&self, word: &str) -> bool {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Word => name_eq(self.text(t), word),
            _ => false,
        }
    }

    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume and return the next token if it is any word.
    pub(crate) fn eat_any_word(&mut self) -> Option<String> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Word => {
                self.bump();
                Some(self.text(t).to_string())
            }
            _ => None,
        }
    }

    pub(crate) fn expect_word(&mut self, word: &str) -> bool {
        if self.eat_word(word) {
            return true;
        }
        let span = self.peek().map(|t| t.span);
        self.error(format!("expected `{word}`"), span);
        false
    }

    pub(crate) fn at_end_of_line(&self) -> bool {
        matches!(self.peek_kind(), None | Some(TokenKind::Newline))
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.bump();
        }
    }

    /// Error recovery: drop everything up to and including the next newline.
    pub(crate) fn skip_line(&mut self) {
        while let Some(t) = self.peek() {
            self.bump();
            if t.kind == TokenKind::Newline {
                break;
            }
        }
    }

    pub(crate) fn error(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.diagnostics.push(Diagnostic::error(message, span));
    }
}
