use tracing::trace;

use crate::context::RequestContext;
use crate::domain::{OptionContract, Ticker};
use crate::error::{GatewayError, ValidationError};
use crate::gateway::{Gateway, QueryParams};

/// End-of-day options data.
#[derive(Debug, Clone, Copy)]
pub struct OptionsApi<'g> {
    gateway: &'g Gateway,
}

impl<'g> OptionsApi<'g> {
    pub fn new(gateway: &'g Gateway) -> Self {
        Self { gateway }
    }

    /// Expiration months with listed contracts, as `YYYYMM` labels.
    pub async fn expirations(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
    ) -> Result<Vec<String>, GatewayError> {
        self.gateway
            .get_json(ctx, &["stock", ticker.as_str(), "options"], QueryParams::new())
            .await
    }

    /// Contracts expiring in `expiration` (`YYYYMM` for a month, `YYYYMMDD` for a day).
    pub async fn chain(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
        expiration: &str,
    ) -> Result<Vec<OptionContract>, GatewayError> {
        let expiration = check_expiration(expiration)?;
        let segments = ["stock", ticker.as_str(), "options", expiration];
        trace!(?segments, "option: calling gateway");
        self.gateway
            .get_json(ctx, &segments, QueryParams::new())
            .await
    }
}

fn check_expiration(expiration: &str) -> Result<&str, ValidationError> {
    let trimmed = expiration.trim();
    let well_formed =
        matches!(trimmed.len(), 6 | 8) && trimmed.bytes().all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(ValidationError::InvalidDate {
            value: expiration.to_owned(),
            expected: "YYYYMM or YYYYMMDD",
        });
    }
    Ok(trimmed)
}
