//! WildTalk parser.
mod expr;
mod parser;
mod stmt;

pub use parser::{ParseResult, Parser, StmtParseResult};

use wt_lexer::Lexer;

/// Lex + parse a full script.
pub fn parse_script(src: &str) -> ParseResult {
    let lex = Lexer::new(src).lex();
    let mut result = Parser::new(src, &lex.tokens).parse_script();
    let mut diagnostics = lex.diagnostics;
    diagnostics.append(&mut result.diagnostics);
    result.diagnostics = diagnostics;
    result
}

/// Lex + parse a bare statement list.
pub fn parse_statements(src: &str) -> StmtParseResult {
    let lex = Lexer::new(src).lex();
    let mut result = Parser::new(src, &lex.tokens).parse_statements();
    let mut diagnostics = lex.diagnostics;
    diagnostics.append(&mut result.diagnostics);
    result.diagnostics = diagnostics;
    result
}

/// Lex + parse a single expression. `None` when the text is not one
/// complete well-formed expression.
pub fn parse_expression(src: &str) -> Option<wt_ast::Expr> {
    let lex = Lexer::new(src).lex();
    if !lex.diagnostics.is_empty() {
        return None;
    }
    Parser::new(src, &lex.tokens).parse_expression()
}
