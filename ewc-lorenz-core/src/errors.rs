use crate::bmi::BmiError;
use crate::model::ModelStatus;
use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum LorenzError {
    #[error("{0}")]
    Error(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Could not interpret forcing time {value:?}: {reason}")]
    InvalidTime { value: String, reason: String },
    #[error("Forcing {name} must be a finite number, got {value}")]
    NonFiniteForcing { name: &'static str, value: f64 },
    #[error("No working directory has been assigned to the model. Call `setup` first.")]
    NotSetUp,
    #[error("The model process handle has been released by `finalize` and cannot be used again")]
    HandleReleased,
    #[error("Cannot {operation} while the model is {status}")]
    InvalidTransition {
        operation: &'static str,
        status: ModelStatus,
    },
    #[error(transparent)]
    Bmi(#[from] BmiError),
}

/// Convenience type for `Result<T, LorenzError>`.
pub type LorenzResult<T> = Result<T, LorenzError>;
