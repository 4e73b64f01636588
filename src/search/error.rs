//! # Search Error Types Module
//!
//! This module defines error types specific to the query-resolution component
//! of the pipeline. They pinpoint where in the search path a failure occurred:
//! embedding the query, the vector lookup itself, or shaping the results.

use thiserror::Error;

use crate::error::Error as CrateError;
use crate::index::DbError;

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Error occurred during database operations
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Error occurred during embedding generation
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Error occurred during result processing
    #[error("Result processing error: {0}")]
    ResultProcessing(String),
}

impl From<SearchError> for CrateError {
    fn from(err: SearchError) -> Self {
        CrateError::Search(err.to_string())
    }
}
