//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a draft cannot become an expense.
//! - [`Storage`] thrown when the persistence collaborator fails.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Storage`]: EngineError::Storage
use sea_orm::DbErr;
use thiserror::Error;

use crate::ValidationErrors;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Json(a), Self::Json(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
