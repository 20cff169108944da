//! WildTalk lexer.
mod lexer;

pub use lexer::{LexResult, Lexer};
