//! Error handling module
//!
//! Provides unified error types and handling for the entire tool.

use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Simulation failed: {0}")]
    Simulation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidSchema(_) => "INVALID_SCHEMA",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Simulation(_) => "SIMULATION_FAILED",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Process exit code used by the CLI when this error aborts a command.
    ///
    /// Input problems the user can fix map to 2, environment problems to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidSchema(_)
            | AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::Conflict(_)
            | AppError::Json(_) => 2,
            AppError::Simulation(_) => 3,
            AppError::Io(_) | AppError::Config(_) => 1,
        }
    }

    /// Log the error at the appropriate level and return its exit code
    pub fn report(&self) -> i32 {
        match self {
            AppError::Io(e) => error!("I/O error: {:?}", e),
            AppError::Config(msg) => error!("Configuration error: {}", msg),
            AppError::Simulation(msg) => error!("Simulation failed: {}", msg),
            other => error!(code = other.code(), "{}", other),
        }
        self.exit_code()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias used across the crate
pub type AppResult<T> = Result<T, AppError>;

/// Helper function to create an invalid schema error
pub fn invalid_schema_error(msg: impl Into<String>) -> AppError {
    AppError::InvalidSchema(msg.into())
}

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> AppError {
    AppError::NotFound(msg.into())
}

/// Helper function to create a conflict error
pub fn conflict_error(msg: impl Into<String>) -> AppError {
    AppError::Conflict(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_split_input_from_environment() {
        assert_eq!(invalid_schema_error("enum without values").exit_code(), 2);
        assert_eq!(conflict_error("exists").exit_code(), 2);
        assert_eq!(AppError::Simulation("step 1".into()).exit_code(), 3);
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(AppError::from(io).exit_code(), 1);
    }

    #[test]
    fn test_display_includes_category() {
        let err = not_found_error("Model \"User\"");
        assert_eq!(err.to_string(), "Not found: Model \"User\"");
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
