use thiserror::Error;

/// Failure to read a typed value (an address, a signature, a key) from its external representation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("error reading field '{field}': {error}")]
pub struct ReadError {
    field: String,
    error: String,
}

impl ReadError {
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self { field: field.into(), error: error.into() }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}
