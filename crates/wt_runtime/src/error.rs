//! Runtime error taxonomy.
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RuntimeError {
    /// Script text did not parse. Carries the rendered parser diagnostics.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A statement or expression was well-formed but meaningless: a
    /// non-numeric operand, a malformed chunk index, an invalid pass
    /// target, an argument mismatch.
    #[error("{0}")]
    Semantic(String),

    /// Exact integer arithmetic left the 64-bit range.
    #[error("integer overflow in `{op}`")]
    Overflow { op: &'static str },

    #[error("division by zero")]
    DivideByZero,

    /// Any other error that aborts the executing handler.
    #[error("{0}")]
    Fault(String),
}

impl RuntimeError {
    pub fn not_a_number(operand: &str) -> Self {
        RuntimeError::Semantic(format!("expected a number here, got \"{operand}\""))
    }

    pub fn not_a_boolean(operand: &str) -> Self {
        RuntimeError::Semantic(format!("expected true or false here, got \"{operand}\""))
    }

    pub fn bad_chunk_index(operand: &str) -> Self {
        RuntimeError::Semantic(format!(
            "chunk index must be a positive whole number or `middle`, got \"{operand}\""
        ))
    }

    pub fn cant_understand(message: &str) -> Self {
        RuntimeError::Fault(format!("can't understand \"{message}\""))
    }
}
