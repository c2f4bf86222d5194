use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarryError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CarryError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CarryError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CarryError {
    fn from(e: serde_json::Error) -> Self {
        CarryError::SerializationError(e.to_string())
    }
}
