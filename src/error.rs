//! Error types for load-it-now.

use thiserror::Error;

use crate::model::ValidationError;
use crate::units::InvalidUnit;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    InvalidUnit(#[from] InvalidUnit),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
