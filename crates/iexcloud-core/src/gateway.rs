//! Rate-limited, cancellable GET gateway.
//!
//! Every logical request goes through the same steps:
//!
//! ```text
//! PENDING --tick--> IN_FLIGHT --200--> SUCCESS (consumer runs once)
//!    |                 |
//!    |                 +--retryable--> backoff --> PENDING (bounded by max_retries)
//!    |                 +--terminal / retries exhausted--> TERMINAL_FAILURE
//!    +--context done--> TERMINAL_FAILURE (no network I/O)
//! ```
//!
//! The gateway waits for a throttle tick before *each* attempt, so retries are
//! paced like fresh requests. Cancellation is honored while waiting for a tick,
//! while a request is in flight, and during backoff.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info, trace, warn};

use crate::config::{Environment, GatewayConfig, API_VERSION_STABLE};
use crate::context::RequestContext;
use crate::error::{ContextError, GatewayError, ValidationError, STATUS_BODY_EXCERPT};
use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, ResponseBody};
use crate::retry::{AttemptOutcome, RetryConfig};
use crate::throttling::Throttle;
use crate::token::ApiToken;

/// Query-string parameters. Keys are unique; encoding is sorted by key.
pub type QueryParams = BTreeMap<String, String>;

/// Query key the gateway reserves for the API token.
pub const TOKEN_PARAM: &str = "token";

const REDACTED: &str = "REDACTED";

type AttemptResult = Result<Result<HttpResponse, HttpError>, ContextError>;

/// Authenticated entry point to the API. Safe to share across tasks.
pub struct Gateway {
    http_client: Arc<dyn HttpClient>,
    throttle: Arc<Throttle>,
    token: ApiToken,
    environment: Environment,
    base_url: String,
    version: String,
    retry: RetryConfig,
    request_timeout: Duration,
    log_token: bool,
}

/// Builder for a [`Gateway`] with an injected transport or shared throttle.
pub struct GatewayBuilder {
    config: GatewayConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    throttle: Option<Arc<Throttle>>,
}

impl GatewayBuilder {
    pub fn http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Share a throttle with other gateways. Overrides `requests_per_second`.
    pub fn throttle(mut self, throttle: Arc<Throttle>) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn build(self) -> Result<Gateway, GatewayError> {
        let config = self.config;
        let token = ApiToken::parse(config.raw_token()).map_err(GatewayError::Construction)?;
        if config.request_timeout.is_zero() {
            return Err(GatewayError::Construction(ValidationError::ZeroTimeout));
        }
        if config.log_token {
            trace!(token = config.raw_token(), "creating gateway");
        }

        let version = match config.version.trim() {
            "" => {
                info!("received empty version, using '{API_VERSION_STABLE}'");
                API_VERSION_STABLE.to_owned()
            }
            version => version.to_owned(),
        };

        let environment = if token.is_sandbox() {
            info!("received sandbox token, using sandbox domain");
            Environment::Sandbox
        } else {
            Environment::Production
        };

        let base_url = config
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or_else(|| environment.domain().to_owned());

        let throttle = match self.throttle {
            Some(throttle) => throttle,
            None => Arc::new(
                Throttle::per_second(config.requests_per_second)
                    .map_err(GatewayError::Construction)?,
            ),
        };

        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));

        debug!(
            %environment,
            base_url = %base_url,
            version = %version,
            period_ms = throttle.period().as_millis() as u64,
            max_retries = config.retry.max_retries,
            "gateway configured"
        );

        Ok(Gateway {
            http_client,
            throttle,
            token,
            environment,
            base_url,
            version,
            retry: config.retry,
            request_timeout: config.request_timeout,
            log_token: config.log_token,
        })
    }
}

impl Gateway {
    /// Build a gateway that talks to the network through reqwest.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        Self::builder(config).build()
    }

    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder {
            config,
            http_client: None,
            throttle: None,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn throttle(&self) -> &Arc<Throttle> {
        &self.throttle
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// GET `{base_url}/{version}/{segments..}?{params + token}`.
    ///
    /// `consumer` runs exactly once, and only for a 200 response; its result is
    /// the call's result. Any other status yields [`GatewayError::Status`]
    /// without invoking it. The body is released on every path.
    pub async fn get<S, T, F>(
        &self,
        ctx: &RequestContext,
        segments: &[S],
        params: QueryParams,
        consumer: F,
    ) -> Result<T, GatewayError>
    where
        S: AsRef<str>,
        F: FnOnce(ResponseBody) -> Result<T, GatewayError>,
    {
        let url = self.build_url(segments, &params, self.token.expose());
        debug!(
            url = %self.build_url(segments, &params, REDACTED),
            "initiating GET request"
        );
        if self.log_token {
            trace!(url = %url, "performing GET request");
        }
        let request = HttpRequest::get(url).with_timeout(self.request_timeout);

        let mut attempt: u32 = 0;
        loop {
            let result = self.attempt(ctx, &request).await;
            let result = match result {
                Ok(Ok(response)) if response.is_ok() => {
                    trace!(attempt, "calling body consumer");
                    return consumer(response.body);
                }
                other => other,
            };

            let retry = {
                let outcome = match &result {
                    Err(err) => AttemptOutcome::Cancelled(*err),
                    Ok(Ok(response)) => AttemptOutcome::Response(response.status),
                    Ok(Err(err)) => AttemptOutcome::Transport(err),
                };
                self.retry.allows_retry(attempt, &outcome)
            };

            if !retry {
                return Err(into_error(result));
            }

            match &result {
                Ok(Ok(response)) => warn!(status = response.status, attempt, "retrying after status"),
                Ok(Err(err)) => warn!(error = %err, attempt, "retrying after transport error"),
                Err(_) => {}
            }
            drop(result);

            self.backoff(ctx, attempt).await?;
            attempt += 1;
        }
    }

    /// [`get`](Self::get) with a JSON-decoding consumer.
    pub async fn get_json<S, T>(
        &self,
        ctx: &RequestContext,
        segments: &[S],
        params: QueryParams,
    ) -> Result<T, GatewayError>
    where
        S: AsRef<str>,
        T: DeserializeOwned,
    {
        self.get(ctx, segments, params, ResponseBody::json).await
    }

    /// One physical attempt: wait for a tick, then send, racing the context throughout.
    async fn attempt(&self, ctx: &RequestContext, request: &HttpRequest) -> AttemptResult {
        if let Some(err) = ctx.err() {
            debug!(%err, "context done prior to making request");
            return Err(err);
        }

        tokio::select! {
            biased;
            err = ctx.done() => {
                debug!(%err, "context done while waiting for rate limit");
                return Err(err);
            }
            _ = self.throttle.until_ready() => trace!("ticker has ticked"),
        }

        tokio::select! {
            biased;
            err = ctx.done() => {
                debug!(%err, "context done while request in flight");
                Err(err)
            }
            result = self.http_client.execute(request.clone()) => Ok(result),
        }
    }

    async fn backoff(&self, ctx: &RequestContext, attempt: u32) -> Result<(), ContextError> {
        let delay = self.retry.delay_for_attempt(attempt);
        if delay.is_zero() {
            return Ok(());
        }
        trace!(delay_ms = delay.as_millis() as u64, "backing off");
        tokio::select! {
            biased;
            err = ctx.done() => Err(err),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    fn build_url<S: AsRef<str>>(&self, segments: &[S], params: &QueryParams, token: &str) -> String {
        let mut url = format!("{}/{}", self.base_url, urlencoding::encode(&self.version));
        for part in segments
            .iter()
            .flat_map(|segment| segment.as_ref().split('/'))
            .filter(|part| !part.is_empty())
        {
            url.push('/');
            url.push_str(&urlencoding::encode(part));
        }

        let mut query = params.clone();
        query.insert(TOKEN_PARAM.to_owned(), token.to_owned());
        let encoded = query
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        url.push('?');
        url.push_str(&encoded);
        url
    }
}

impl Debug for Gateway {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .field("throttle", &self.throttle)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

fn into_error(result: AttemptResult) -> GatewayError {
    match result {
        Err(err) => GatewayError::Context(err),
        Ok(Err(err)) => GatewayError::Transport(err),
        Ok(Ok(response)) => GatewayError::Status {
            code: response.status,
            reason: response.reason,
            body: response.body.excerpt(STATUS_BODY_EXCERPT),
        },
    }
}
