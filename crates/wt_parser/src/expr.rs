//! Expression parsing (Pratt).
//!
//! Operator words (`and`, `or`, `mod`, `div`, `is`, `contains`) take part
//! in the infix loop; any other bare word ends the expression, which is
//! what lets statement keywords like `into` or `then` terminate an operand
//! without lookahead.
use super::Parser;
use super::stmt::chunk_kind;
use wt_ast::{BinaryOp, CallExpr, ChunkExpr, Expr, UnaryOp};
use wt_syntax::{TokenKind, unquote};

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Or => (1, 2),
        BinaryOp::And => (3, 4),
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::Contains => (5, 6),
        BinaryOp::Concat | BinaryOp::ConcatSpace => (7, 8),
        BinaryOp::Add | BinaryOp::Sub => (9, 10),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::IntDiv | BinaryOp::Mod => (11, 12),
        // Right-associative.
        BinaryOp::Pow => (17, 16),
    }
}

const PREFIX_BP: u8 = 13;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let Some(tok) = self.peek() else { break };
            let op = match tok.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Caret => BinaryOp::Pow,
                TokenKind::Amp => BinaryOp::Concat,
                TokenKind::AmpAmp => BinaryOp::ConcatSpace,
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Ge => BinaryOp::Ge,
                TokenKind::Word => {
                    let w = self.text(tok);
                    if w.eq_ignore_ascii_case("and") {
                        BinaryOp::And
                    } else if w.eq_ignore_ascii_case("or") {
                        BinaryOp::Or
                    } else if w.eq_ignore_ascii_case("mod") {
                        BinaryOp::Mod
                    } else if w.eq_ignore_ascii_case("div") {
                        BinaryOp::IntDiv
                    } else if w.eq_ignore_ascii_case("contains") {
                        BinaryOp::Contains
                    } else if w.eq_ignore_ascii_case("is") {
                        // `is` / `is not`
                        let (l_bp, r_bp) = infix_binding_power(BinaryOp::Eq);
                        if l_bp < min_bp {
                            break;
                        }
                        self.bump();
                        let op = if self.eat_word("not") {
                            BinaryOp::Ne
                        } else {
                            BinaryOp::Eq
                        };
                        let rhs = self.parse_expr(r_bp)?;
                        lhs = Expr::Binary {
                            op,
                            left: Box::new(lhs),
                            right: Box::new(rhs),
                        };
                        continue;
                    } else {
                        break;
                    }
                }
                _ => break,
            };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.bump();
            let rhs = self.parse_expr(r_bp)?;
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }
        Some(lhs)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Int => {
                self.bump();
                let text = self.text(tok);
                match text.parse::<i64>() {
                    Ok(v) => Some(Expr::Int(v)),
                    // Too many digits for i64: fall back to float semantics.
                    Err(_) => Some(Expr::Float(text.parse::<f64>().unwrap_or(0.0))),
                }
            }
            TokenKind::Float => {
                self.bump();
                Some(Expr::Float(self.text(tok).parse::<f64>().unwrap_or(0.0)))
            }
            TokenKind::Str => {
                self.bump();
                Some(Expr::Str(unquote(self.text(tok)).to_string()))
            }
            TokenKind::Minus => {
                self.bump();
                let expr = self.parse_expr(PREFIX_BP)?;
                Some(Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(expr),
                })
            }
            TokenKind::LParen => {
                self.bump();
                self.skip_newlines();
                let inner = self.parse_expr(0)?;
                self.skip_newlines();
                if !self.eat(TokenKind::RParen) {
                    self.error("expected `)`", Some(tok.span));
                    return None;
                }
                Some(Expr::Group(Box::new(inner)))
            }
            TokenKind::Word => self.parse_word_prefix(),
            _ => {
                self.error("expected an expression", Some(tok.span));
                None
            }
        }
    }

    fn parse_word_prefix(&mut self) -> Option<Expr> {
        let tok = self.peek()?;
        let word = self.text(tok);

        if word.eq_ignore_ascii_case("not") {
            self.bump();
            let expr = self.parse_expr(PREFIX_BP)?;
            return Some(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
            });
        }
        if word.eq_ignore_ascii_case("the") {
            self.bump();
            return self.parse_the();
        }
        if let Some(kind) = chunk_kind(word) {
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
            let source = self.parse_prefix()?;
            return Some(Expr::Chunk(Box::new(ChunkExpr {
                kind,
                start,
                end,
                source,
            })));
        }
        if word.eq_ignore_ascii_case("true") {
            self.bump();
            return Some(Expr::Bool(true));
        }
        if word.eq_ignore_ascii_case("false") {
            self.bump();
            return Some(Expr::Bool(false));
        }
        if word.eq_ignore_ascii_case("empty") {
            self.bump();
            return Some(Expr::Empty);
        }

        self.bump();
        if self.at(TokenKind::LParen) {
            self.bump();
            let mut args = Vec::new();
            self.skip_newlines();
            if !self.at(TokenKind::RParen) {
                loop {
                    args.push(self.parse_expr(0)?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                    self.skip_newlines();
                }
            }
            if !self.eat(TokenKind::RParen) {
                self.error("expected `)` after arguments", Some(tok.span));
                return None;
            }
            return Some(Expr::Call(Box::new(CallExpr {
                name: word.to_string(),
                args: args.into_boxed_slice(),
            })));
        }
        Some(Expr::Var(word.to_string()))
    }

    /// `the result`, `the params`, `the paramCount`, and the
    /// `the <function> of <expr>` call form.
    fn parse_the(&mut self) -> Option<Expr> {
        let span = self.peek().map(|t| t.span);
        let Some(name) = self.eat_any_word() else {
            self.error("expected a property or function name after `the`", span);
            return None;
        };
        if name.eq_ignore_ascii_case("result") {
            return Some(Expr::TheResult);
        }
        if name.eq_ignore_ascii_case("params") {
            return Some(Expr::TheParams);
        }
        if name.eq_ignore_ascii_case("paramcount") {
            return Some(Expr::TheParamCount);
        }
        if self.eat_word("of") {
            let arg = self.parse_prefix()?;
            return Some(Expr::Call(Box::new(CallExpr {
                name,
                args: vec![arg].into_boxed_slice(),
            })));
        }
        self.error(
            format!("unknown `the {name}` form (expected `of` or a built-in name)"),
            span,
        );
        None
    }
}
