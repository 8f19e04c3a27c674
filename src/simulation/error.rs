use thiserror::Error;

/// Errors raised by the cooling environment
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid month index: {0} (expected 0..=11)")]
    InvalidMonth(i64),
    #[error("Invalid direction: {0} (expected -1 or 1)")]
    InvalidDirection(i32),
    #[error("Invalid actuation energy: {0} (must be finite and non-negative)")]
    InvalidEnergy(f64),
    #[error("Episode already terminated; call reset before stepping again")]
    EpisodeTerminated,
    #[error("Computation error: {0}")]
    Computation(String),
}

impl From<validator::ValidationErrors> for EnvError {
    fn from(errors: validator::ValidationErrors) -> Self {
        EnvError::Validation(errors.to_string())
    }
}
