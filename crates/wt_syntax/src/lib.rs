//! Shared syntax types for the WildTalk front end.
mod diagnostic;
mod render;
mod source;
mod span;
mod token;
mod util;

pub use diagnostic::{Diagnostic, Severity};
pub use render::{render_diagnostic, render_diagnostics};
pub use source::ScriptSource;
pub use span::Span;
pub use token::{Token, TokenKind};
pub use util::{fold_name, is_word_continue, is_word_start, name_eq, unquote};
