use serde::Deserialize;
use tracing::debug;

use super::params::{DividendRange, HistoricalParams, SplitRange};
use crate::context::RequestContext;
use crate::domain::{Dividend, Earning, Historical, Intraday, PreviousDay, Split, Ticker};
use crate::error::GatewayError;
use crate::gateway::{Gateway, QueryParams};
use crate::http_client::ResponseBody;

const STOCK: &str = "stock";

/// `stock/...` price and fundamentals endpoints.
#[derive(Debug, Clone, Copy)]
pub struct StockApi<'g> {
    gateway: &'g Gateway,
}

#[derive(Deserialize)]
struct DynamicChart {
    #[serde(default)]
    range: String,
    #[serde(default)]
    data: Vec<Historical>,
}

#[derive(Deserialize)]
struct EarningsResponse {
    #[serde(default)]
    earnings: Vec<Earning>,
}

impl<'g> StockApi<'g> {
    pub fn new(gateway: &'g Gateway) -> Self {
        Self { gateway }
    }

    /// Latest price; the endpoint answers with a bare JSON number.
    pub async fn price(&self, ctx: &RequestContext, ticker: &Ticker) -> Result<f64, GatewayError> {
        self.gateway
            .get_json(ctx, &[STOCK, ticker.as_str(), "price"], QueryParams::new())
            .await
    }

    pub async fn previous_day(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
    ) -> Result<PreviousDay, GatewayError> {
        self.gateway
            .get_json(ctx, &[STOCK, ticker.as_str(), "previous"], QueryParams::new())
            .await
    }

    /// Previous day's bar for every ticker. Tickers without a bar are skipped.
    pub async fn previous_day_market(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<PreviousDay>, GatewayError> {
        let days: Vec<PreviousDay> = self
            .gateway
            .get_json(ctx, &[STOCK, "market", "previous"], QueryParams::new())
            .await?;
        let total = days.len();
        let days: Vec<PreviousDay> = days
            .into_iter()
            .filter(|day| !day.is_placeholder())
            .collect();
        debug!(total, kept = days.len(), "previous day market: dropped empty entries");
        Ok(days)
    }

    pub async fn historical(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
        params: &HistoricalParams,
    ) -> Result<Vec<Historical>, GatewayError> {
        let segments = [STOCK, ticker.as_str(), "chart"];
        if !params.is_dynamic() {
            return self.gateway.get_json(ctx, &segments, params.to_query()).await;
        }

        self.gateway
            .get(ctx, &segments, params.to_query(), |body: ResponseBody| {
                let chart: DynamicChart = body.json()?;
                debug!(range = %chart.range, bars = chart.data.len(), "historical: unwrapped dynamic range");
                Ok(chart.data)
            })
            .await
    }

    pub async fn intraday(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
        params: &HistoricalParams,
    ) -> Result<Vec<Intraday>, GatewayError> {
        self.gateway
            .get_json(ctx, &[STOCK, ticker.as_str(), "intraday-prices"], params.to_query())
            .await
    }

    pub async fn dividends(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
        range: DividendRange,
    ) -> Result<Vec<Dividend>, GatewayError> {
        self.gateway
            .get_json(
                ctx,
                &[STOCK, ticker.as_str(), "dividends", range.as_str()],
                QueryParams::new(),
            )
            .await
    }

    pub async fn splits(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
        range: SplitRange,
    ) -> Result<Vec<Split>, GatewayError> {
        self.gateway
            .get_json(
                ctx,
                &[STOCK, ticker.as_str(), "splits", range.as_str()],
                QueryParams::new(),
            )
            .await
    }

    /// The last `last` reporting periods, quarterly unless `annual` is set.
    pub async fn earnings(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
        last: u32,
        annual: bool,
    ) -> Result<Vec<Earning>, GatewayError> {
        let last = last.to_string();
        let mut params = QueryParams::new();
        if annual {
            params.insert(String::from("annual"), String::from("true"));
        }

        let response: EarningsResponse = self
            .gateway
            .get_json(ctx, &[STOCK, ticker.as_str(), "earnings", last.as_str()], params)
            .await?;
        Ok(response.earnings)
    }
}
