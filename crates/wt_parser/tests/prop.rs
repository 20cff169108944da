use proptest::prelude::*;
use wt_ast::Expr;
use wt_parser::parse_expression;

proptest! {
    #[test]
    fn integer_literals_round_trip(n in 0i64..=i64::MAX) {
        let expr = parse_expression(&n.to_string()).unwrap();
        prop_assert_eq!(expr, Expr::Int(n));
    }

    #[test]
    fn plain_words_parse_as_variables(name in "[a-zA-Z_][a-zA-Z0-9_]{0,12}") {
        // Operator words and literal keywords are not plain variables.
        let reserved = [
            "and", "or", "not", "mod", "div", "is", "contains", "the",
            "true", "false", "empty", "char", "character", "word", "item",
            "line", "middle",
        ];
        prop_assume!(!reserved.iter().any(|r| r.eq_ignore_ascii_case(&name)));
        let expr = parse_expression(&name).unwrap();
        prop_assert_eq!(expr, Expr::Var(name));
    }
}
