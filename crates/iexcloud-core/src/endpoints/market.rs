use crate::context::RequestContext;
use crate::domain::{Ticker, UpcomingDividend, UpcomingEarning, UpcomingSplit};
use crate::error::GatewayError;
use crate::gateway::{Gateway, QueryParams};

/// Upcoming corporate events. Pass the ticker `MARKET` for the whole market.
#[derive(Debug, Clone, Copy)]
pub struct MarketApi<'g> {
    gateway: &'g Gateway,
}

impl<'g> MarketApi<'g> {
    pub fn new(gateway: &'g Gateway) -> Self {
        Self { gateway }
    }

    pub async fn upcoming_dividends(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
    ) -> Result<Vec<UpcomingDividend>, GatewayError> {
        self.gateway
            .get_json(ctx, &["stock", ticker.as_str(), "upcoming-dividends"], QueryParams::new())
            .await
    }

    pub async fn upcoming_earnings(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
    ) -> Result<Vec<UpcomingEarning>, GatewayError> {
        self.gateway
            .get_json(ctx, &["stock", ticker.as_str(), "upcoming-earnings"], QueryParams::new())
            .await
    }

    pub async fn upcoming_splits(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
    ) -> Result<Vec<UpcomingSplit>, GatewayError> {
        self.gateway
            .get_json(ctx, &["stock", ticker.as_str(), "upcoming-splits"], QueryParams::new())
            .await
    }
}
