//! Ошибки конфигурации AI (racing line, tuning, профили)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RacerAIError {
    #[error("racing line needs at least {min} points, got {got}")]
    RacingLineTooShort { min: usize, got: usize },

    #[error("racing line point {index} has a non-finite field")]
    NonFinitePoint { index: usize },

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("invalid driver profile: {0}")]
    InvalidProfile(String),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RacerAIError>;
