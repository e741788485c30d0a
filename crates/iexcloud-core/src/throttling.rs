use std::fmt::{Debug, Formatter};
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::error::ValidationError;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Request-start ticker shared by every call made through a gateway.
///
/// One tick is released every `1 / requests_per_second` and at most one tick is
/// held while nobody is waiting, so an idle gateway can start one request
/// immediately but never a burst. Wrap in an `Arc` and hand the same instance to
/// several gateways to make them share one budget.
pub struct Throttle {
    limiter: DirectRateLimiter,
    period: Duration,
}

impl Throttle {
    pub fn per_second(requests_per_second: u32) -> Result<Self, ValidationError> {
        if requests_per_second == 0 {
            return Err(ValidationError::ZeroRequestRate);
        }
        let period = Duration::from_secs(1) / requests_per_second;
        Self::with_period(period)
    }

    pub fn with_period(period: Duration) -> Result<Self, ValidationError> {
        let quota = Quota::with_period(period)
            .ok_or(ValidationError::ZeroRequestRate)?
            .allow_burst(NonZeroU32::MIN);
        Ok(Self {
            limiter: RateLimiter::direct(quota),
            period,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Waits for the next tick. Dropping the future before it resolves consumes nothing.
    pub async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }

    /// Takes a tick if one is available right now.
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Debug for Throttle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}
