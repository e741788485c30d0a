//! Retry policy with exponential backoff and jitter.
//!
//! A logical request is re-attempted after transport failures and after server
//! or capacity statuses (429, 5xx and any other status >= 400 outside
//! [`TERMINAL_STATUSES`]). Client-fault statuses and cancellation end the
//! request on the first attempt.

use std::time::Duration;

use crate::error::ContextError;
use crate::http_client::HttpError;

/// Statuses for which another attempt cannot succeed.
pub const TERMINAL_STATUSES: [u16; 7] = [400, 401, 402, 403, 404, 413, 451];

/// First wait of the default policy.
pub const DEFAULT_FIRST_DELAY: Duration = Duration::from_millis(100);
/// Longest wait of the default policy.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Wait inserted before each retry of a logical request.
///
/// The default doubles from [`DEFAULT_FIRST_DELAY`] up to
/// [`DEFAULT_MAX_DELAY`] and spreads each wait by ±50%.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// The same wait before every retry.
    Fixed(Duration),
    /// `initial * multiplier^retry`, clamped to `ceiling`.
    Exponential {
        initial: Duration,
        multiplier: f64,
        ceiling: Duration,
        /// Draw the actual wait uniformly from half to one and a half times the computed one.
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            initial: DEFAULT_FIRST_DELAY,
            multiplier: 2.0,
            ceiling: DEFAULT_MAX_DELAY,
            jitter: true,
        }
    }
}

impl Backoff {
    /// Wait before retry number `retry` (0 is the first retry).
    pub fn delay(self, retry: u32) -> Duration {
        let (initial, multiplier, ceiling, jitter) = match self {
            Self::Fixed(wait) => return wait,
            Self::Exponential {
                initial,
                multiplier,
                ceiling,
                jitter,
            } => (initial, multiplier, ceiling, jitter),
        };

        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = (initial.as_secs_f64() * multiplier.powi(exponent))
            .min(ceiling.as_secs_f64())
            .max(0.0);
        let wait = Duration::from_secs_f64(secs);
        if jitter {
            spread_by_half(wait)
        } else {
            wait
        }
    }
}

fn spread_by_half(wait: Duration) -> Duration {
    let millis = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
    let half = millis / 2;
    Duration::from_millis(fastrand::u64(millis - half..=millis.saturating_add(half)))
}

/// What a single physical attempt produced.
#[derive(Debug, Clone, Copy)]
pub enum AttemptOutcome<'a> {
    /// A response arrived with this status.
    Response(u16),
    /// No response: the transport failed.
    Transport(&'a HttpError),
    /// The caller's context ended while the attempt was pending.
    Cancelled(ContextError),
}

/// Configuration for re-attempting a logical request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Every call makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Decide whether `outcome` is worth another attempt, ignoring the attempt budget.
    pub fn should_retry(&self, outcome: &AttemptOutcome<'_>) -> bool {
        match outcome {
            AttemptOutcome::Cancelled(_) => false,
            AttemptOutcome::Transport(_) => true,
            AttemptOutcome::Response(status) => {
                *status >= 400 && !TERMINAL_STATUSES.contains(status)
            }
        }
    }

    /// Like [`should_retry`](Self::should_retry) but also checks that `attempt`
    /// retries have not used up the budget.
    pub fn allows_retry(&self, attempt: u32, outcome: &AttemptOutcome<'_>) -> bool {
        attempt < self.max_retries && self.should_retry(outcome)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
