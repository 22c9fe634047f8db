use thiserror::Error;

use crate::domain::{LaunchId, UserId, ValidationError};

#[derive(Error, Debug)]
pub enum AppError {
    /// A business rule was broken; fix the input and retry
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The caller broke a precondition, e.g. updating a launch that was never saved
    #[error("Contract violation: {0}")]
    ContractViolation(&'static str),

    #[error("Invalid status: {0} (expected PENDING, SETTLED or CANCELLED)")]
    InvalidStatus(String),

    #[error("Invalid launch type: {0} (expected INCOME or EXPENSE)")]
    InvalidType(String),

    #[error("Launch not found: {0}")]
    LaunchNotFound(LaunchId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Email already in use: {0}")]
    EmailAlreadyUsed(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
