//! Database error types.
//!
//! This module provides the error type shared by the repositories and the
//! use-case layer. It uses miette for fancy diagnostic output and thiserror
//! for derive macros. Missing rows are not errors: reads return `None` and
//! deletes return `false`.

use miette::Diagnostic;
use thiserror::Error;

/// Store operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Validation error: {message}")]
    #[diagnostic(code(todo_store::db::validation_error))]
    Validation { message: String },

    #[error("Invalid data: {message} (hint: {help})")]
    #[diagnostic(code(todo_store::db::invalid_data))]
    InvalidData { message: String, help: String },

    #[error("Database error: {message}")]
    #[diagnostic(code(todo_store::db::database_error))]
    Database { message: String },

    #[error("Migration error: {message}")]
    #[diagnostic(
        code(todo_store::db::migration_error),
        help("The store cannot be used until its schema initializes successfully.")
    )]
    Migration { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(todo_store::db::connection_error))]
    Connection { message: String },

    #[error("Constraint violation: {message}")]
    #[diagnostic(code(todo_store::db::constraint))]
    Constraint { message: String },
}

impl DbError {
    /// Shorthand for a use-case validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        DbError::Validation {
            message: message.into(),
        }
    }

    /// True for errors the caller can fix by correcting its input.
    pub fn is_validation(&self) -> bool {
        matches!(self, DbError::Validation { .. })
    }
}

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;
