//! Token definitions.
//!
//! WildTalk scripts are word-oriented: almost every keyword is contextual,
//! so the lexer emits `Word` tokens and leaves keyword recognition to the
//! parser. Only literals, punctuation and operators get dedicated kinds.
use crate::Span;

/// Token kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Logical end of statement (physical newline not swallowed by `¬`).
    Newline,

    /// Identifier or contextual keyword.
    Word,
    /// Integer literal.
    Int,
    /// Float literal.
    Float,
    /// Double-quoted string literal.
    Str,

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `^`
    Caret,
    /// `&` (concatenation)
    Amp,
    /// `&&` (concatenation with a space)
    AmpAmp,

    /// `=`
    Eq,
    /// `<>` or `≠`
    Ne,
    /// `<`
    Lt,
    /// `<=` or `≤`
    Le,
    /// `>`
    Gt,
    /// `>=` or `≥`
    Ge,

    /// Anything the lexer could not classify.
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
