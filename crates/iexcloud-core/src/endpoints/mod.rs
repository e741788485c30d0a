//! Typed wrappers over [`Gateway::get`].
//!
//! Wrappers only assemble path segments and query parameters and pick a
//! decoder. They do not validate records; call
//! [`Validate`](crate::Validate) on the results where required fields matter.
//!
//! ```rust,ignore
//! let gateway = Gateway::new(GatewayConfig::from_env()?)?;
//! let ctx = RequestContext::new().with_timeout(Duration::from_secs(10));
//! let aapl = Ticker::parse("aapl")?;
//!
//! let price = gateway.stock().price(&ctx, &aapl).await?;
//! let bars = gateway
//!     .stock()
//!     .historical(&ctx, &aapl, &HistoricalParams::range(ChartRange::OneMonth))
//!     .await?;
//! ```

mod market;
mod options;
mod params;
mod reference;
mod stock;

pub use market::MarketApi;
pub use options::OptionsApi;
pub use params::{ChartRange, DividendRange, HistoricalParams, SortOrder, SplitRange};
pub use reference::ReferenceApi;
pub use stock::StockApi;

use crate::gateway::Gateway;

impl Gateway {
    pub fn stock(&self) -> StockApi<'_> {
        StockApi::new(self)
    }

    pub fn market(&self) -> MarketApi<'_> {
        MarketApi::new(self)
    }

    pub fn reference(&self) -> ReferenceApi<'_> {
        ReferenceApi::new(self)
    }

    pub fn options(&self) -> OptionsApi<'_> {
        OptionsApi::new(self)
    }
}
