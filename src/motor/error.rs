// Errors surfaced by the motor controller

use serde::{Deserialize, Serialize};

use crate::gpio::GpioError;

/// Machine-checkable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    InvalidCommand,
    InvalidDuration,
    DurationTooLong,
    ShutDown,
    Gpio,
}

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    InvalidCommand(String),

    #[error("{0}")]
    InvalidDuration(String),

    #[error("Duration must be <= {max} seconds (got {requested})")]
    DurationTooLong { requested: f64, max: f64 },

    #[error("Controller is shut down")]
    ShutDown,

    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),
}

pub type Result<T> = std::result::Result<T, DriveError>;

impl DriveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriveError::Configuration(_) => ErrorKind::Configuration,
            DriveError::InvalidCommand(_) => ErrorKind::InvalidCommand,
            DriveError::InvalidDuration(_) => ErrorKind::InvalidDuration,
            DriveError::DurationTooLong { .. } => ErrorKind::DurationTooLong,
            DriveError::ShutDown => ErrorKind::ShutDown,
            DriveError::Gpio(_) => ErrorKind::Gpio,
        }
    }

    /// HTTP-style status class for transports
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Configuration
            | ErrorKind::InvalidCommand
            | ErrorKind::InvalidDuration
            | ErrorKind::DurationTooLong => 400,
            ErrorKind::ShutDown => 503,
            ErrorKind::Gpio => 500,
        }
    }

    /// Caller input errors; the controller stays usable after these
    pub fn is_client_error(&self) -> bool {
        self.status_code() == 400
    }
}
