use std::fmt::{Debug, Display, Formatter};

use crate::error::ValidationError;

/// Shortest token the API can issue ("pk_", "sk_" or "Tpk_"/"Tsk_" plus at least one char).
pub const MIN_TOKEN_LEN: usize = 4;

const SANDBOX_MARKER: char = 'T';

/// Validated API token. Formatting never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let token = input.trim();
        if token.is_empty() {
            return Err(ValidationError::EmptyToken);
        }

        let len = token.chars().count();
        if len < MIN_TOKEN_LEN {
            return Err(ValidationError::TokenTooShort {
                len,
                min: MIN_TOKEN_LEN,
            });
        }

        if let Some(index) = token
            .chars()
            .position(|ch| ch.is_whitespace() || ch.is_control())
        {
            return Err(ValidationError::TokenMalformed { index });
        }

        Ok(Self(token.to_owned()))
    }

    /// Sandbox tokens ("Tpk_", "Tsk_") are the only ones starting with `T`.
    pub fn is_sandbox(&self) -> bool {
        self.0.starts_with(SANDBOX_MARKER)
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

impl Display for ApiToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

impl TryFrom<&str> for ApiToken {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for ApiToken {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
