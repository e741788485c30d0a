use thiserror::Error;

use crate::http_client::HttpError;
use crate::retry::TERMINAL_STATUSES;

/// Maximum number of body bytes carried by a status error.
pub(crate) const STATUS_BODY_EXCERPT: usize = 256;

/// Validation and contract errors exposed by `iexcloud-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("token cannot be empty")]
    EmptyToken,
    #[error("token length {len} is shorter than the minimum {min}")]
    TokenTooShort { len: usize, min: usize },
    #[error("token contains an invalid character at index {index}")]
    TokenMalformed { index: usize },

    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("requests per second must be greater than zero")]
    ZeroRequestRate,
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid date '{value}', expected {expected}")]
    InvalidDate {
        value: String,
        expected: &'static str,
    },

    #[error("{field} is missing")]
    MissingField { field: &'static str },
    #[error("{field} is zero")]
    ZeroValue { field: &'static str },
    #[error("{field} is not positive")]
    NotPositive { field: &'static str },
}

/// Reason a [`RequestContext`](crate::RequestContext) stopped a request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Errors surfaced by [`Gateway::get`](crate::Gateway::get) and the endpoint wrappers.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway could not be built; no request was ever possible.
    #[error("invalid gateway configuration: {0}")]
    Construction(ValidationError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    #[error("received HTTP status code {code} ({code} {reason}){}", body_suffix(.body))]
    Status {
        code: u16,
        reason: String,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl GatewayError {
    /// True when the request stopped because its context was cancelled or timed out.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Context(_))
    }

    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            Self::Context(err) => Some(*err),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for statuses the caller has to fix (bad symbol, bad auth, bad request shape).
    pub fn is_client_fault(&self) -> bool {
        self.status_code()
            .map(|code| TERMINAL_STATUSES.contains(&code))
            .unwrap_or(false)
    }
}

fn body_suffix(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Errors raised while assembling a [`GatewayConfig`](crate::GatewayConfig) from the environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {name} is not set")]
    MissingVariable { name: &'static str },
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidVariable { name: &'static str, value: String },
}
