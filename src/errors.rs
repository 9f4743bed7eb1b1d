//! Unified error types and result handling.
//!
//! The three domain error kinds (`Validation`, `Forbidden`, `StateConflict`)
//! are deterministic outcomes of the current data state and are never
//! retried. Infrastructure failures (database, I/O, configuration) convert
//! into the same enum so every fallible function in the crate can return
//! [`Result`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input: bad dates, price precision,
    /// rating out of range. Surfaced as a field-level message.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The actor is not allowed to perform the requested action.
    /// Deliberately carries no detail; the failing check must not leak.
    #[error("forbidden")]
    Forbidden,

    /// The requested transition's precondition on the current status is
    /// not met, or the requested date is already booked. No data changes.
    #[error("Invalid state: {message}")]
    StateConflict { message: String },

    #[error("Order not found: {id}")]
    OrderNotFound { id: i64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for an [`Error::Validation`] carrying `message`.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for an [`Error::StateConflict`] carrying `message`.
    pub fn state_conflict(message: impl Into<String>) -> Self {
        Error::StateConflict {
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
