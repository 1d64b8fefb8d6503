/// dbpeek Error Module
///
/// This module defines the error taxonomy for the dbpeek service. Every
/// operation in the core returns a typed outcome; there is no crash or
/// fatal path. SQL-level execution failures are deliberately NOT part of
/// this taxonomy: they travel as data inside `QueryOutput::Failed` so a
/// failed user query never terminates a session.
use thiserror::Error;

/// Error type covering the fallible surface of the dbpeek core:
/// - opening and closing engine handles (`Connection`)
/// - catalog and pragma introspection (`Schema`, `NotFound`)
/// - SQL pretty-printing (`Format`)
/// - configuration loading (`Config`, `Io`)
#[derive(Error, Debug)]
pub enum DbPeekError {
    /// Open/close of the underlying engine handle failed (bad path,
    /// corrupt file, locked file, permission denied).
    #[error("Connection error: {0}")]
    Connection(String),

    /// An introspection call against a valid connection failed.
    #[error("Schema error: {0}")]
    Schema(String),

    /// A named table/view/object does not exist where one was expected.
    #[error("Not found: {0}")]
    NotFound(String),

    /// SQL text could not be parsed for pretty-printing. Callers fall
    /// back to the original unformatted text.
    #[error("Format error: {0}")]
    Format(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic application errors for unexpected conditions (e.g. a
    /// poisoned lock)
    #[error("Application error: {0}")]
    App(String),
}

/// Type alias for Result to use DbPeekError as the error type.
pub type Result<T> = std::result::Result<T, DbPeekError>;
