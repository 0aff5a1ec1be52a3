//! Error types for Shipyard core.

use std::{error::Error, fmt};

/// Error type for Shipyard core operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ShipyardError {
    /// Client input violates a field constraint.
    Validation(String),
    /// No ship exists with the requested identifier.
    NotFound(i64),
    /// The record store failed to complete an operation.
    Storage(String),
}

impl ShipyardError {
    /// Build a validation error from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build a storage error from any displayable failure.
    pub fn storage(err: impl fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

impl fmt::Display for ShipyardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::NotFound(id) => write!(f, "ship {id} not found"),
            Self::Storage(message) => write!(f, "storage error: {message}"),
        }
    }
}

impl Error for ShipyardError {}

/// Convenience result type for Shipyard core.
pub type Result<T> = std::result::Result<T, ShipyardError>;

#[cfg(test)]
mod tests {
    use super::ShipyardError;

    #[test]
    fn validation_error_formats_message() {
        let error = ShipyardError::validation("invalid speed");
        assert_eq!(format!("{error}"), "invalid speed");
    }

    #[test]
    fn not_found_error_names_the_id() {
        let error = ShipyardError::NotFound(42);
        assert_eq!(format!("{error}"), "ship 42 not found");
    }

    #[test]
    fn storage_error_wraps_display() {
        let error = ShipyardError::storage("connection refused");
        assert_eq!(format!("{error}"), "storage error: connection refused");
    }
}
