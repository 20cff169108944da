//! Statement parsing.
use super::Parser;
use wt_ast::{
    ChunkIndex, ChunkKind, CommandStmt, Container, ContainerChunk, Expr, IfStmt, Preposition,
    PutStmt, RepeatKind, RepeatStmt, SendStmt, Stmt,
};
use wt_syntax::TokenKind;

impl<'a> Parser<'a> {
    /// Parse a single statement. The cursor sits on the first token of a
    /// (non-empty) line.
    pub(crate) fn parse_stmt(&mut self) -> Option<Stmt> {
        let tok = self.peek()?;
        if tok.kind != TokenKind::Word {
            self.error("expected a statement", Some(tok.span));
            return None;
        }
        let word = self.text(tok);
        match word.to_lowercase().as_str() {
            "put" => self.parse_put(),
            "get" => {
                self.bump();
                Some(Stmt::Get(self.parse_expr(0)?))
            }
            "global" => self.parse_global(),
            "pass" => {
                self.bump();
                let span = tok.span;
                match self.eat_any_word() {
                    Some(name) => Some(Stmt::Pass(name)),
                    None => {
                        self.error("expected a message name after `pass`", Some(span));
                        None
                    }
                }
            }
            "return" => {
                self.bump();
                if self.at_end_of_line() {
                    Some(Stmt::Return(None))
                } else {
                    Some(Stmt::Return(Some(self.parse_expr(0)?)))
                }
            }
            "send" => self.parse_send(),
            "do" => {
                self.bump();
                Some(Stmt::Do(self.parse_expr(0)?))
            }
            "if" => self.parse_if(),
            "repeat" => self.parse_repeat(),
            "exit" => {
                self.bump();
                if self.eat_word("repeat") {
                    Some(Stmt::ExitRepeat)
                } else {
                    match self.eat_any_word() {
                        Some(name) => Some(Stmt::ExitHandler(name)),
                        None => {
                            self.error("expected `repeat` or a handler name after `exit`", Some(tok.span));
                            None
                        }
                    }
                }
            }
            "next" => {
                self.bump();
                if self.eat_word("repeat") {
                    Some(Stmt::NextRepeat)
                } else {
                    self.error("expected `repeat` after `next`", Some(tok.span));
                    None
                }
            }
            _ => self.parse_command(),
        }
    }

    fn parse_put(&mut self) -> Option<Stmt> {
        self.bump();
        let value = self.parse_expr(0)?;
        let dest = if let Some(prep) = self.eat_preposition() {
            let container = self.parse_container()?;
            Some((prep, container))
        } else {
            None
        };
        Some(Stmt::Put(Box::new(PutStmt { value, dest })))
    }

    fn eat_preposition(&mut self) -> Option<Preposition> {
        if self.eat_word("into") {
            Some(Preposition::Into)
        } else if self.eat_word("before") {
            Some(Preposition::Before)
        } else if self.eat_word("after") {
            Some(Preposition::After)
        } else if self.eat_word("replacing") {
            Some(Preposition::Replacing)
        } else {
            None
        }
    }

    /// A container: a variable, or a chunk of another container.
    pub(crate) fn parse_container(&mut self) -> Option<Container> {
        let tok = self.peek()?;
        if tok.kind != TokenKind::Word {
            self.error("expected a container", Some(tok.span));
            return None;
        }
        if let Some(kind) = chunk_kind(self.text(tok)) {
            self.bump();
            let start = self.parse_chunk_index()?;
            let end = if self.eat_word("to") {
                Some(self.parse_chunk_index()?)
            } else {
                None
            };
            if !self.expect_word("of") {
                return None;
            }
            let target = self.parse_container()?;
            return Some(Container::Chunk(Box::new(ContainerChunk {
                kind,
                start,
                end,
                target,
            })));
        }
        self.bump();
        Some(Container::Variable(self.text(tok).to_string()))
    }

    pub(crate) fn parse_chunk_index(&mut self) -> Option<ChunkIndex> {
        if self.eat_word("middle") {
            return Some(ChunkIndex::Middle);
        }
        Some(ChunkIndex::Expr(self.parse_expr(0)?))
    }

    fn parse_global(&mut self) -> Option<Stmt> {
        let span = self.peek().map(|t| t.span);
        self.bump();
        let mut names = Vec::new();
        loop {
            match self.eat_any_word() {
                Some(n) => names.push(n),
                None => {
                    self.error("expected a variable name after `global`", span);
                    return None;
                }
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Some(Stmt::Global(names.into_boxed_slice()))
    }

    fn parse_send(&mut self) -> Option<Stmt> {
        self.bump();
        let message = self.parse_expr(0)?;
        let target = if self.eat_word("to") {
            if self.eat_word("me") {
                None
            } else {
                Some(self.parse_expr(0)?)
            }
        } else {
            None
        };
        Some(Stmt::Send(Box::new(SendStmt { message, target })))
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        self.bump(); // `if`
        let cond = self.parse_expr(0)?;
        if !self.expect_word("then") {
            return None;
        }

        if self.at_end_of_line() {
            // Block form, closed by `end if` (shared with any `else if` chain).
            let then_branch = self.parse_stmts_until(&["else", "end"]);
            let mut else_branch = None;
            let mut owns_end = true;
            if self.eat_word("else") {
                if self.at_word("if") {
                    // `else if …` chain: the nested if consumes the single `end if`.
                    let nested = self.parse_if()?;
                    else_branch = Some(vec![nested].into_boxed_slice());
                    owns_end = false;
                } else if self.at_end_of_line() {
                    else_branch = Some(self.parse_stmts_until(&["end"]));
                } else {
                    let stmt = self.parse_stmt()?;
                    else_branch = Some(vec![stmt].into_boxed_slice());
                }
            }
            if owns_end {
                self.skip_newlines();
                if self.eat_word("end") {
                    self.expect_word("if");
                } else {
                    self.error("missing `end if`", None);
                }
            }
            return Some(Stmt::If(Box::new(IfStmt {
                cond,
                then_branch,
                else_branch,
            })));
        }

        // Single-line form: `if cond then stmt [else stmt]`.
        let then_stmt = self.parse_stmt()?;
        let else_branch = if self.eat_word("else") {
            Some(vec![self.parse_stmt()?].into_boxed_slice())
        } else {
            None
        };
        Some(Stmt::If(Box::new(IfStmt {
            cond,
            then_branch: vec![then_stmt].into_boxed_slice(),
            else_branch,
        })))
    }

    fn parse_repeat(&mut self) -> Option<Stmt> {
        self.bump(); // `repeat`
        let kind = if self.at_end_of_line() || self.eat_word("forever") {
            RepeatKind::Forever
        } else if self.eat_word("while") {
            RepeatKind::While(self.parse_expr(0)?)
        } else if self.eat_word("until") {
            RepeatKind::Until(self.parse_expr(0)?)
        } else if self.eat_word("with") {
            let span = self.peek().map(|t| t.span);
            let Some(var) = self.eat_any_word() else {
                self.error("expected a counter variable after `repeat with`", span);
                return None;
            };
            if !self.eat(TokenKind::Eq) {
                self.error("expected `=` in `repeat with`", span);
                return None;
            }
            let from = self.parse_expr(0)?;
            let down = self.eat_word("down");
            if !self.expect_word("to") {
                return None;
            }
            let to = self.parse_expr(0)?;
            RepeatKind::With { var, from, to, down }
        } else {
            // `repeat [for] n [times]`
            self.eat_word("for");
            let count = self.parse_expr(0)?;
            self.eat_word("times");
            RepeatKind::Times(count)
        };

        let body = self.parse_stmts_until(&["end"]);
        self.skip_newlines();
        if self.eat_word("end") {
            self.expect_word("repeat");
        } else {
            self.error("missing `end repeat`", None);
        }
        Some(Stmt::Repeat(Box::new(RepeatStmt { kind, body })))
    }

    /// A bare command line becomes a message send: `beep 3, "loud"`.
    fn parse_command(&mut self) -> Option<Stmt> {
        let name = self.eat_any_word()?;
        let mut args = Vec::new();
        if !self.at_end_of_line() {
            loop {
                args.push(self.parse_expr(0)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        Some(Stmt::Command(Box::new(CommandStmt {
            name,
            args: args.into_boxed_slice(),
        })))
    }
}

pub(crate) fn chunk_kind(word: &str) -> Option<ChunkKind> {
    if word.eq_ignore_ascii_case("char") || word.eq_ignore_ascii_case("character") {
        Some(ChunkKind::Char)
    } else if word.eq_ignore_ascii_case("word") {
        Some(ChunkKind::Word)
    } else if word.eq_ignore_ascii_case("item") {
        Some(ChunkKind::Item)
    } else if word.eq_ignore_ascii_case("line") {
        Some(ChunkKind::Line)
    } else {
        None
    }
}
