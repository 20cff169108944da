//! Name lookup over a compiled script.
//!
//! Scripts are small (a handful of handlers), so lookup is a linear scan
//! with case-insensitive comparison rather than an index.
use crate::ast::{Handler, Script};
use wt_syntax::name_eq;

impl Script {
    pub fn empty() -> Self {
        Self {
            handlers: Box::new([]),
            functions: Box::new([]),
        }
    }

    /// Find the message handler for `name`, case-insensitively.
    pub fn handler(&self, name: &str) -> Option<&Handler> {
        self.handlers.iter().find(|h| name_eq(&h.name, name))
    }

    /// Find the user function `name`, case-insensitively.
    pub fn function(&self, name: &str) -> Option<&Handler> {
        self.functions.iter().find(|h| name_eq(&h.name, name))
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.functions.is_empty()
    }
}
