//! Behavior-driven tests for the retry policy
//!
//! Attempts are counted at the transport, so these tests observe exactly how
//! many physical requests one logical call produced.

use std::time::Duration;

use iexcloud_core::{Backoff, GatewayError, HttpErrorKind, QueryParams, TERMINAL_STATUSES};
use iexcloud_tests::{
    gateway_with, test_config, HttpError, Reply, RequestContext, ResponseBody, RetryConfig,
    ScriptedTransport,
};

const PRICE_PATH: [&str; 3] = ["stock", "AAPL", "price"];

async fn call(transport: &std::sync::Arc<ScriptedTransport>, retry: RetryConfig) -> Result<String, GatewayError> {
    let gateway = gateway_with(test_config("pk_abc123").with_retry(retry), transport);
    gateway
        .get(&RequestContext::new(), &PRICE_PATH, QueryParams::new(), ResponseBody::into_string)
        .await
}

// =============================================================================
// Terminal statuses
// =============================================================================

#[tokio::test]
async fn terminal_statuses_are_attempted_exactly_once() {
    for status in TERMINAL_STATUSES {
        // Given: An upstream that always answers with a client-fault status
        let transport = ScriptedTransport::always(Reply::status(status));

        // When: A request is made with a generous retry budget
        let err = call(&transport, RetryConfig::fixed(Duration::ZERO, 5))
            .await
            .expect_err("terminal status must fail");

        // Then: One attempt, one status error
        assert_eq!(transport.request_count(), 1, "status {status}");
        assert_eq!(err.status_code(), Some(status));
        assert!(err.is_client_fault());
    }
}

// =============================================================================
// Retryable statuses
// =============================================================================

#[tokio::test]
async fn retryable_statuses_exhaust_the_budget() {
    let max_retries = 3;
    for status in [429_u16, 500, 503] {
        // Given: An upstream that keeps failing with a transient status
        let transport = ScriptedTransport::always(Reply::Status(status, String::from("try later")));

        // When: A request is made
        let err = call(&transport, RetryConfig::fixed(Duration::ZERO, max_retries))
            .await
            .expect_err("exhausted retries must fail");

        // Then: max_retries + 1 attempts, and a single status error for the last one
        assert_eq!(transport.request_count(), max_retries as usize + 1, "status {status}");
        assert_eq!(err.status_code(), Some(status));
        assert!(err.to_string().contains("try later"));
        assert!(!err.is_client_fault());
    }
}

#[tokio::test]
async fn default_policy_makes_six_attempts() {
    // Given: The default policy (5 retries) with the backoff removed
    let transport = ScriptedTransport::always(Reply::status(502));
    let retry = RetryConfig {
        backoff: Backoff::Fixed(Duration::ZERO),
        ..RetryConfig::default()
    };

    // When: A request is made
    let err = call(&transport, retry).await.expect_err("must fail");

    // Then: Six attempts were made
    assert_eq!(transport.request_count(), 6);
    assert_eq!(err.status_code(), Some(502));
}

#[tokio::test]
async fn transient_failure_then_success_returns_the_success() {
    // Given: A rate-limit response followed by a success
    let transport = ScriptedTransport::new([Reply::status(429), Reply::ok("116.59")]);

    // When: A request is made
    let body = call(&transport, RetryConfig::fixed(Duration::ZERO, 5))
        .await
        .expect("second attempt succeeds");

    // Then: The retry is invisible to the caller apart from timing
    assert_eq!(body, "116.59");
    assert_eq!(transport.request_count(), 2);
}

// =============================================================================
// Transport errors
// =============================================================================

#[tokio::test]
async fn transport_errors_are_retried_and_surface_unchanged() {
    // Given: A connection that keeps being refused
    let transport = ScriptedTransport::always(Reply::Transport(HttpError::connect(
        "connection refused",
    )));

    // When: A request is made
    let err = call(&transport, RetryConfig::fixed(Duration::ZERO, 2))
        .await
        .expect_err("must fail");

    // Then: Every attempt was made and the transport error is what comes back
    assert_eq!(transport.request_count(), 3);
    match err {
        GatewayError::Transport(err) => {
            assert_eq!(err.kind(), HttpErrorKind::Connect);
            assert_eq!(err.message(), "connection refused");
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn no_retry_policy_makes_a_single_attempt() {
    // Given: A timeout and a retry-free policy
    let transport = ScriptedTransport::always(Reply::Transport(HttpError::timeout("timed out")));

    // When: A request is made
    let err = call(&transport, RetryConfig::no_retry())
        .await
        .expect_err("must fail");

    // Then: Only one attempt
    assert_eq!(transport.request_count(), 1);
    assert!(matches!(err, GatewayError::Transport(_)));
}

// =============================================================================
// Pacing and cancellation between attempts
// =============================================================================

#[tokio::test]
async fn retries_wait_for_their_own_tick() {
    // Given: A 20 rps gateway and an upstream failing twice
    let transport = ScriptedTransport::new([
        Reply::status(500),
        Reply::status(500),
        Reply::ok("116.59"),
    ]);
    let gateway = gateway_with(
        test_config("pk_abc123")
            .with_requests_per_second(20)
            .with_retry(RetryConfig::fixed(Duration::ZERO, 5)),
        &transport,
    );

    // When: The request retries to success
    gateway
        .get(&RequestContext::new(), &PRICE_PATH, QueryParams::new(), ResponseBody::into_string)
        .await
        .expect("third attempt succeeds");

    // Then: Attempts are no closer together than the tick interval
    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    for pair in requests.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        assert!(gap >= Duration::from_millis(45), "gap {gap:?}");
    }
}

#[tokio::test]
async fn cancellation_during_backoff_stops_retrying() {
    // Given: A long backoff after a server error
    let transport = ScriptedTransport::always(Reply::status(503));
    let gateway = gateway_with(
        test_config("pk_abc123").with_retry(RetryConfig::fixed(Duration::from_secs(10), 5)),
        &transport,
    );

    // When: The context expires while the gateway is backing off
    let ctx = RequestContext::new().with_timeout(Duration::from_millis(100));
    let started = std::time::Instant::now();
    let err = gateway
        .get(&ctx, &PRICE_PATH, QueryParams::new(), ResponseBody::into_string)
        .await
        .expect_err("deadline must win");

    // Then: The call returns the context error promptly after a single attempt
    assert!(err.is_cancellation());
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(transport.request_count(), 1);
}
