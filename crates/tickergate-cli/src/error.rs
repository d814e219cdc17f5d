use thiserror::Error;

use tickergate_core::{GatewayError, GatewayErrorKind, ValidationError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Gateway(error) => match error.kind() {
                GatewayErrorKind::Validation => 2,
                GatewayErrorKind::AuthAcquisition | GatewayErrorKind::Authentication => 3,
                GatewayErrorKind::Transport => 4,
            },
            Self::Command(_) | Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
