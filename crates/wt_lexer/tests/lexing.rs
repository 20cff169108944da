use wt_lexer::Lexer;
use wt_syntax::TokenKind;

fn kinds(src: &str) -> Vec<TokenKind> {
    Lexer::new(src).lex().tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn words_and_operators() {
    assert_eq!(
        kinds(r#"put 1 + 2 into x"#),
        vec![
            TokenKind::Word,
            TokenKind::Int,
            TokenKind::Plus,
            TokenKind::Int,
            TokenKind::Word,
            TokenKind::Word,
        ]
    );
}

#[test]
fn comments_are_skipped_but_newline_survives() {
    assert_eq!(
        kinds("put 1 -- a comment\nput 2"),
        vec![
            TokenKind::Word,
            TokenKind::Int,
            TokenKind::Newline,
            TokenKind::Word,
            TokenKind::Int,
        ]
    );
}

#[test]
fn continuation_swallows_the_newline() {
    assert_eq!(
        kinds("put 1 ¬\n  + 2 into x"),
        vec![
            TokenKind::Word,
            TokenKind::Int,
            TokenKind::Plus,
            TokenKind::Int,
            TokenKind::Word,
            TokenKind::Word,
        ]
    );
}

#[test]
fn string_literals() {
    let res = Lexer::new(r#"put "hello, world" into x"#).lex();
    assert!(res.diagnostics.is_empty());
    assert_eq!(res.tokens[1].kind, TokenKind::Str);
}

#[test]
fn unterminated_string_reports() {
    let res = Lexer::new("put \"oops\nput 2").lex();
    assert!(!res.diagnostics.is_empty());
    assert!(res.tokens.iter().any(|t| t.kind == TokenKind::Error));
}

#[test]
fn comparison_digraphs() {
    assert_eq!(
        kinds("a <> b <= c >= d"),
        vec![
            TokenKind::Word,
            TokenKind::Ne,
            TokenKind::Word,
            TokenKind::Le,
            TokenKind::Word,
            TokenKind::Ge,
            TokenKind::Word,
        ]
    );
}

#[test]
fn floats_and_ints() {
    assert_eq!(
        kinds("3.14 42 7.mod"),
        vec![
            TokenKind::Float,
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::Error,
            TokenKind::Word,
        ]
    );
}

#[test]
fn minus_vs_comment() {
    assert_eq!(
        kinds("5 - 3"),
        vec![TokenKind::Int, TokenKind::Minus, TokenKind::Int]
    );
}
