/// Core Module for dbpeek
///
/// This module contains the fundamental components that form the backbone
/// of the dbpeek service: the database layer (connection registry, schema
/// inspection, query execution) and the shared error taxonomy.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{DbPeekError, Result};
