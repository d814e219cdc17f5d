use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation errors for caller-supplied arguments.
///
/// These are rejected before any upstream call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error(
        "invalid interval '{value}', expected one of ONE_MINUTE, FIVE_MINUTES, FIFTEEN_MINUTES, \
         THIRTY_MINUTES, ONE_HOUR, ONE_DAY, ONE_WEEK, ONE_MONTH, THREE_MONTHS"
    )]
    InvalidInterval { value: String },
    #[error(
        "invalid asset category '{value}', expected one of all, equity, index, future, \
         mutualfund, etf, currency, cryptocurrency"
    )]
    InvalidAssetCategory { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("channel id cannot be empty")]
    EmptyChannelId,
    #[error("channel id '{channel_id}' is already subscribed")]
    DuplicateChannelId { channel_id: String },
    #[error("subscription requires at least one symbol")]
    EmptySymbolSet,
}

/// Classification of gateway failures.
///
/// Only `Authentication` is ever recovered locally (invalidate the
/// session and retry); every other kind propagates to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Browser automation failed to mint a token.
    AuthAcquisition,
    /// Upstream rejected an authenticated request (401/404 on an
    /// auth-required endpoint).
    Authentication,
    /// Any other upstream or network failure.
    Transport,
    /// Caller-supplied arguments were invalid.
    Validation,
}

/// Structured error returned by every gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    kind: GatewayErrorKind,
    message: String,
}

impl GatewayError {
    pub fn auth_acquisition(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::AuthAcquisition,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Authentication,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Validation,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> GatewayErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            GatewayErrorKind::AuthAcquisition => "gateway.auth_acquisition",
            GatewayErrorKind::Authentication => "gateway.authentication",
            GatewayErrorKind::Transport => "gateway.transport",
            GatewayErrorKind::Validation => "gateway.validation",
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for GatewayError {}

impl From<ValidationError> for GatewayError {
    fn from(error: ValidationError) -> Self {
        Self::validation(error.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::transport(format!("malformed upstream payload: {error}"))
    }
}
