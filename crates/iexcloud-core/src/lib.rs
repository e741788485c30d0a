//! # IEX Cloud Core
//!
//! Rate-limited, cancellable client for the IEX Cloud REST API.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **A gateway** that authenticates, paces and retries every GET request
//! - **Cancellation** through [`RequestContext`] (cancel token plus deadline)
//! - **Endpoint wrappers** for prices, fundamentals, market events, reference
//!   data and options
//! - **Domain records** decoded from the API's mixed wire encodings, with
//!   explicit [`Validate`] checks
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Gateway configuration, API domains and versions |
//! | [`context`] | Cancellation and deadlines |
//! | [`domain`] | Decoded records and the [`Validate`] trait |
//! | [`endpoints`] | Typed REST wrappers |
//! | [`error`] | Error types |
//! | [`gateway`] | The request gateway |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`retry`] | Retry policy and backoff |
//! | [`throttling`] | Request pacing |
//! | [`token`] | API token handling |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use iexcloud_core::{Gateway, GatewayConfig, RequestContext, Ticker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gateway = Gateway::new(GatewayConfig::from_env()?)?;
//!     let ctx = RequestContext::new();
//!
//!     let price = gateway.stock().price(&ctx, &Ticker::parse("AAPL")?).await?;
//!     println!("AAPL: {price}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Endpoint APIs   │  StockApi, MarketApi, ReferenceApi, OptionsApi
//! └────────┬────────┘
//!          │ segments + params + decoder
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │    Gateway      │────▶│ Throttle         │
//! │ (retry, cancel) │     │ (governor GCRA)  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ HttpClient      │
//! │ (reqwest/mock)  │
//! └─────────────────┘
//! ```
//!
//! ## Security
//!
//! - The token is never printed by `Debug`/`Display` and is redacted from logs
//!   unless token logging is switched on explicitly
//! - All HTTP requests use TLS via rustls

pub mod config;
pub mod context;
pub mod domain;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod retry;
pub mod throttling;
pub mod token;

// Configuration
pub use config::{
    Environment, GatewayConfig, API_DOMAIN_BASE, API_DOMAIN_SANDBOX, API_VERSION_BETA,
    API_VERSION_LATEST, API_VERSION_STABLE, API_VERSION_V1,
};

// Cancellation
pub use context::RequestContext;

// Domain models
pub use domain::{
    validate_all, AnnounceTime, Dividend, Earning, Historical, Intraday, OptionContract,
    OptionSide, PreviousDay, Split, SymbolRecord, Ticker, UpcomingDividend, UpcomingEarning,
    UpcomingSplit, Validate,
};

// Endpoints
pub use endpoints::{
    ChartRange, DividendRange, HistoricalParams, MarketApi, OptionsApi, ReferenceApi, SortOrder,
    SplitRange, StockApi,
};

// Error types
pub use error::{ConfigError, ContextError, GatewayError, ValidationError};

// Gateway
pub use gateway::{Gateway, GatewayBuilder, QueryParams};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpFuture, HttpRequest, HttpResponse,
    ReqwestHttpClient, ResponseBody,
};

// Retry logic
pub use retry::{
    AttemptOutcome, Backoff, RetryConfig, DEFAULT_FIRST_DELAY, DEFAULT_MAX_DELAY, TERMINAL_STATUSES,
};

// Throttling
pub use throttling::Throttle;

// Token
pub use token::ApiToken;
