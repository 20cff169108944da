pub fn is_word_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

pub fn is_word_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Strip the surrounding double quotes from a string-literal lexeme.
/// String literals carry no escape sequences.
pub fn unquote(lexeme: &str) -> &str {
    let s = lexeme.strip_prefix('"').unwrap_or(lexeme);
    s.strip_suffix('"').unwrap_or(s)
}

/// Case-fold a script name for lookup. Handler, function and variable
/// names are case-insensitive throughout the language.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Case-insensitive name comparison. ASCII fast path, full case fold
/// only when either side carries non-ASCII letters.
pub fn name_eq(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    fold_name(a) == fold_name(b)
}
