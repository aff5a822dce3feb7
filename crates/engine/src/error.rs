//! The module contains the errors the engine can throw.
//!
//! The variants follow the failure taxonomy of the ledger:
//!
//! - [`Validation`] for malformed input (non-positive amounts, empty
//!   participant sets, share sums that do not match the total).
//! - [`NotFound`] when a referenced group/expense/user does not exist.
//! - [`Forbidden`] when the acting user is not a member or creator.
//! - [`ExistingKey`] for duplicates (username, email, friendship).
//! - [`Database`] for underlying store failures.
//!
//! [`Validation`]: EngineError::Validation
//! [`NotFound`]: EngineError::NotFound
//! [`Forbidden`]: EngineError::Forbidden
//! [`ExistingKey`]: EngineError::ExistingKey
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Not allowed: {0}")]
    Forbidden(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
