//! Gateway configuration.
//!
//! Configuration is plain data: nothing is validated until a
//! [`Gateway`](crate::Gateway) is built from it, at which point a bad token, a
//! zero request rate or a zero timeout refuses construction. Values read from
//! the environment are checked as they are read.

use std::fmt::{Debug, Display, Formatter};
use std::time::Duration;

use crate::error::ConfigError;
use crate::retry::RetryConfig;

pub const API_DOMAIN_BASE: &str = "https://cloud.iexapis.com";
pub const API_DOMAIN_SANDBOX: &str = "https://sandbox.iexapis.com";

pub const API_VERSION_V1: &str = "v1";
pub const API_VERSION_BETA: &str = "beta";
pub const API_VERSION_STABLE: &str = "stable";
pub const API_VERSION_LATEST: &str = "latest";

pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 50;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_TOKEN: &str = "IEXCLOUD_TOKEN";
pub const ENV_VERSION: &str = "IEXCLOUD_VERSION";
pub const ENV_REQUESTS_PER_SECOND: &str = "IEXCLOUD_REQUESTS_PER_SECOND";
pub const ENV_MAX_RETRIES: &str = "IEXCLOUD_MAX_RETRIES";
pub const ENV_TIMEOUT_MS: &str = "IEXCLOUD_TIMEOUT_MS";

/// Which API deployment a gateway talks to. Chosen once, from the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Production,
    Sandbox,
}

impl Environment {
    pub const fn domain(self) -> &'static str {
        match self {
            Self::Production => API_DOMAIN_BASE,
            Self::Sandbox => API_DOMAIN_SANDBOX,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Sandbox => "sandbox",
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct GatewayConfig {
    token: String,
    pub version: String,
    pub requests_per_second: u32,
    pub retry: RetryConfig,
    pub request_timeout: Duration,
    /// Replaces the token-selected domain, e.g. to point at a local stub server.
    pub base_url: Option<String>,
    /// Opt-in: log request URLs with the raw token at trace level.
    pub log_token: bool,
}

impl GatewayConfig {
    /// An empty `version` selects [`API_VERSION_STABLE`] when the gateway is built.
    pub fn new(token: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            version: version.into(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            retry: RetryConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            base_url: None,
            log_token: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(ENV_TOKEN).ok_or(ConfigError::MissingVariable { name: ENV_TOKEN })?;
        let version = lookup(ENV_VERSION).unwrap_or_default();
        let mut config = Self::new(token, version);

        if let Some(rps) = parse_non_zero::<u32>(&lookup, ENV_REQUESTS_PER_SECOND)? {
            config.requests_per_second = rps;
        }
        if let Some(retries) = parse_var::<u32>(&lookup, ENV_MAX_RETRIES)? {
            config.retry.max_retries = retries;
        }
        if let Some(timeout_ms) = parse_non_zero::<u64>(&lookup, ENV_TIMEOUT_MS)? {
            config.request_timeout = Duration::from_millis(timeout_ms);
        }

        Ok(config)
    }

    pub fn with_requests_per_second(mut self, requests_per_second: u32) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_token_logging(mut self, enabled: bool) -> Self {
        self.log_token = enabled;
        self
    }

    pub(crate) fn raw_token(&self) -> &str {
        &self.token
    }
}

impl Debug for GatewayConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("token", &"<redacted>")
            .field("version", &self.version)
            .field("requests_per_second", &self.requests_per_second)
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .field("base_url", &self.base_url)
            .field("log_token", &self.log_token)
            .finish()
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVariable { name, value }),
    }
}

fn parse_non_zero<T: std::str::FromStr + Default + PartialEq>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match parse_var::<T>(lookup, name)? {
        Some(value) if value == T::default() => Err(ConfigError::InvalidVariable {
            name,
            value: lookup(name).unwrap_or_default(),
        }),
        parsed => Ok(parsed),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_are_applied() {
        let config = GatewayConfig::new("pk_abc123", "");

        assert_eq!(config.requests_per_second, 50);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.log_token);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn reads_all_variables() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            (ENV_TOKEN, "Tpk_abc123"),
            (ENV_VERSION, "v1"),
            (ENV_REQUESTS_PER_SECOND, "10"),
            (ENV_MAX_RETRIES, "2"),
            (ENV_TIMEOUT_MS, "1500"),
        ]))
        .expect("complete environment");

        assert_eq!(config.raw_token(), "Tpk_abc123");
        assert_eq!(config.version, "v1");
        assert_eq!(config.requests_per_second, 10);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn missing_token_is_reported() {
        let err = GatewayConfig::from_lookup(lookup_from(&[])).expect_err("no token");
        assert_eq!(err, ConfigError::MissingVariable { name: ENV_TOKEN });
    }

    #[test]
    fn unparsable_number_is_reported() {
        let err = GatewayConfig::from_lookup(lookup_from(&[
            (ENV_TOKEN, "pk_abc123"),
            (ENV_REQUESTS_PER_SECOND, "fast"),
        ]))
        .expect_err("bad rate");

        assert_eq!(
            err,
            ConfigError::InvalidVariable {
                name: ENV_REQUESTS_PER_SECOND,
                value: String::from("fast"),
            }
        );
    }

    #[test]
    fn zero_timeout_and_rate_are_rejected_when_read() {
        for name in [ENV_TIMEOUT_MS, ENV_REQUESTS_PER_SECOND] {
            let err = GatewayConfig::from_lookup(lookup_from(&[
                (ENV_TOKEN, "pk_abc123"),
                (name, "0"),
            ]))
            .expect_err("zero must be refused");

            assert_eq!(
                err,
                ConfigError::InvalidVariable {
                    name,
                    value: String::from("0"),
                }
            );
        }
    }

    #[test]
    fn zero_retries_are_allowed() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            (ENV_TOKEN, "pk_abc123"),
            (ENV_MAX_RETRIES, "0"),
        ]))
        .expect("zero retries is a valid policy");
        assert_eq!(config.retry.max_retries, 0);
    }

    #[test]
    fn debug_output_hides_token() {
        let config = GatewayConfig::new("pk_secret123", "stable");
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn environment_domains() {
        assert_eq!(Environment::Production.domain(), "https://cloud.iexapis.com");
        assert_eq!(Environment::Sandbox.domain(), "https://sandbox.iexapis.com");
    }
}
