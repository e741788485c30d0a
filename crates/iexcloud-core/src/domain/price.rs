use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::debug;

use super::codec::{
    date_with_minute, format_iso_date, from_epoch_millis, in_market_zone, optional_iso_date,
    to_epoch_millis,
};
use super::{require_date, require_non_zero, require_text, Validate};
use crate::ValidationError;

/// One bar from the historical prices (`chart`) endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HistoricalWire", into = "HistoricalWire")]
pub struct Historical {
    pub date: Option<Date>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub u_open: f64,
    pub u_high: f64,
    pub u_low: f64,
    pub u_close: f64,
    pub u_volume: u64,
    pub change: f64,
    pub change_percent: f64,
    pub label: String,
    pub change_over_time: f64,
    pub updated: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HistoricalWire {
    date: Option<String>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    u_open: Option<f64>,
    u_high: Option<f64>,
    u_low: Option<f64>,
    u_close: Option<f64>,
    u_volume: Option<u64>,
    change: Option<f64>,
    change_percent: Option<f64>,
    label: Option<String>,
    change_over_time: Option<f64>,
    updated: Option<i64>,
}

impl From<HistoricalWire> for Historical {
    fn from(wire: HistoricalWire) -> Self {
        let date = optional_iso_date("date", wire.date.as_deref());
        debug!(original = wire.date.as_deref(), parsed = ?date, "historical: parsed date");

        Self {
            date,
            open: wire.open.unwrap_or_default(),
            high: wire.high.unwrap_or_default(),
            low: wire.low.unwrap_or_default(),
            close: wire.close.unwrap_or_default(),
            volume: wire.volume.unwrap_or_default(),
            u_open: wire.u_open.unwrap_or_default(),
            u_high: wire.u_high.unwrap_or_default(),
            u_low: wire.u_low.unwrap_or_default(),
            u_close: wire.u_close.unwrap_or_default(),
            u_volume: wire.u_volume.unwrap_or_default(),
            change: wire.change.unwrap_or_default(),
            change_percent: wire.change_percent.unwrap_or_default(),
            label: wire.label.unwrap_or_default(),
            change_over_time: wire.change_over_time.unwrap_or_default(),
            updated: wire.updated.and_then(from_epoch_millis),
        }
    }
}

impl From<Historical> for HistoricalWire {
    fn from(bar: Historical) -> Self {
        Self {
            date: bar.date.map(format_iso_date),
            open: Some(bar.open),
            high: Some(bar.high),
            low: Some(bar.low),
            close: Some(bar.close),
            volume: Some(bar.volume),
            u_open: Some(bar.u_open),
            u_high: Some(bar.u_high),
            u_low: Some(bar.u_low),
            u_close: Some(bar.u_close),
            u_volume: Some(bar.u_volume),
            change: Some(bar.change),
            change_percent: Some(bar.change_percent),
            label: Some(bar.label),
            change_over_time: Some(bar.change_over_time),
            updated: bar.updated.and_then(to_epoch_millis),
        }
    }
}

impl Validate for Historical {
    fn validate(&self) -> Result<(), ValidationError> {
        require_date("date", self.date)?;
        require_non_zero("close", self.close)?;
        require_non_zero("uClose", self.u_close)
    }
}

/// Previous trading day's bar for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousDay {
    #[serde(default)]
    pub symbol: String,
    #[serde(flatten)]
    pub historical: Historical,
}

impl PreviousDay {
    /// `stock/market/previous` pads its array with `{}` for tickers it has no bar for.
    pub(crate) fn is_placeholder(&self) -> bool {
        self.symbol.is_empty() && self.historical.date.is_none()
    }
}

impl Validate for PreviousDay {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("symbol", &self.symbol)?;
        self.historical.validate()
    }
}

/// One minute bar from the intraday prices endpoint.
///
/// `timestamp` is the bar's start, read as US Eastern wall-clock time and
/// carrying that day's offset. It is derived from `date` and `minute` and is
/// not serialized on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IntradayWire", into = "IntradayWire")]
pub struct Intraday {
    pub date: Option<Date>,
    pub minute: String,
    pub timestamp: Option<OffsetDateTime>,
    pub label: String,
    pub market_open: f64,
    pub market_high: f64,
    pub market_low: f64,
    pub market_close: f64,
    pub market_volume: u64,
    pub market_average: f64,
    pub market_notional: f64,
    pub market_number_of_trades: u64,
    pub market_change_over_time: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub average: f64,
    pub notional: f64,
    pub number_of_trades: u64,
    pub change_over_time: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IntradayWire {
    date: Option<String>,
    minute: Option<String>,
    label: Option<String>,
    market_open: Option<f64>,
    market_high: Option<f64>,
    market_low: Option<f64>,
    market_close: Option<f64>,
    market_volume: Option<u64>,
    market_average: Option<f64>,
    market_notional: Option<f64>,
    market_number_of_trades: Option<u64>,
    market_change_over_time: Option<f64>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<u64>,
    average: Option<f64>,
    notional: Option<f64>,
    number_of_trades: Option<u64>,
    change_over_time: Option<f64>,
}

impl From<IntradayWire> for Intraday {
    fn from(wire: IntradayWire) -> Self {
        let date = optional_iso_date("date", wire.date.as_deref());
        let minute = wire.minute.unwrap_or_default();
        let timestamp = date
            .and_then(|date| date_with_minute(date, &minute))
            .and_then(in_market_zone);
        debug!(
            date = wire.date.as_deref(),
            minute = %minute,
            parsed = ?timestamp,
            "intraday: parsed date"
        );

        Self {
            date,
            minute,
            timestamp,
            label: wire.label.unwrap_or_default(),
            market_open: wire.market_open.unwrap_or_default(),
            market_high: wire.market_high.unwrap_or_default(),
            market_low: wire.market_low.unwrap_or_default(),
            market_close: wire.market_close.unwrap_or_default(),
            market_volume: wire.market_volume.unwrap_or_default(),
            market_average: wire.market_average.unwrap_or_default(),
            market_notional: wire.market_notional.unwrap_or_default(),
            market_number_of_trades: wire.market_number_of_trades.unwrap_or_default(),
            market_change_over_time: wire.market_change_over_time.unwrap_or_default(),
            open: wire.open.unwrap_or_default(),
            high: wire.high.unwrap_or_default(),
            low: wire.low.unwrap_or_default(),
            close: wire.close.unwrap_or_default(),
            volume: wire.volume.unwrap_or_default(),
            average: wire.average.unwrap_or_default(),
            notional: wire.notional.unwrap_or_default(),
            number_of_trades: wire.number_of_trades.unwrap_or_default(),
            change_over_time: wire.change_over_time.unwrap_or_default(),
        }
    }
}

impl From<Intraday> for IntradayWire {
    fn from(bar: Intraday) -> Self {
        Self {
            date: bar.date.map(format_iso_date),
            minute: Some(bar.minute),
            label: Some(bar.label),
            market_open: Some(bar.market_open),
            market_high: Some(bar.market_high),
            market_low: Some(bar.market_low),
            market_close: Some(bar.market_close),
            market_volume: Some(bar.market_volume),
            market_average: Some(bar.market_average),
            market_notional: Some(bar.market_notional),
            market_number_of_trades: Some(bar.market_number_of_trades),
            market_change_over_time: Some(bar.market_change_over_time),
            open: Some(bar.open),
            high: Some(bar.high),
            low: Some(bar.low),
            close: Some(bar.close),
            volume: Some(bar.volume),
            average: Some(bar.average),
            notional: Some(bar.notional),
            number_of_trades: Some(bar.number_of_trades),
            change_over_time: Some(bar.change_over_time),
        }
    }
}

impl Validate for Intraday {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.timestamp.is_none() {
            return Err(ValidationError::MissingField { field: "date" });
        }
        require_non_zero("marketClose", self.market_close)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime, offset};

    use super::*;

    const AAPL_BAR: &str = r#"{
        "date": "2019-06-21",
        "open": 198.8, "high": 200.85, "low": 198.15, "close": 198.78,
        "volume": 47800589,
        "uOpen": 198.8, "uHigh": 200.85, "uLow": 198.15, "uClose": 198.78,
        "uVolume": 47800589,
        "change": -0.02, "changePercent": -0.0101,
        "label": "Jun 21, 19", "changeOverTime": 0
    }"#;

    #[test]
    fn decodes_historical_bar() {
        let bar: Historical = serde_json::from_str(AAPL_BAR).expect("valid bar");

        assert_eq!(bar.date, Some(date!(2019 - 06 - 21)));
        assert_eq!(bar.close, 198.78);
        assert_eq!(bar.u_volume, 47_800_589);
        assert_eq!(bar.label, "Jun 21, 19");
        assert_eq!(bar.updated, None);
        assert!(bar.validate().is_ok());
    }

    #[test]
    fn historical_requires_date_and_closes() {
        let bar: Historical =
            serde_json::from_str(r#"{"close": 1.0, "uClose": 1.0}"#).expect("decodes");
        assert_eq!(
            bar.validate(),
            Err(ValidationError::MissingField { field: "date" })
        );

        let bar: Historical =
            serde_json::from_str(r#"{"date": "2019-06-21", "uClose": 1.0}"#).expect("decodes");
        assert_eq!(
            bar.validate(),
            Err(ValidationError::ZeroValue { field: "close" })
        );

        let bar: Historical =
            serde_json::from_str(r#"{"date": "2019-06-21", "close": 1.0, "uClose": null}"#)
                .expect("decodes");
        assert_eq!(
            bar.validate(),
            Err(ValidationError::ZeroValue { field: "uClose" })
        );
    }

    #[test]
    fn historical_reads_epoch_millis_update_stamp() {
        let bar: Historical =
            serde_json::from_str(r#"{"date": "2019-06-21", "updated": 1561147200000}"#)
                .expect("decodes");
        assert_eq!(bar.updated, Some(datetime!(2019-06-21 20:00 UTC)));
    }

    #[test]
    fn previous_day_embeds_historical_fields() {
        let json = r#"{"symbol": "AAPL", "date": "2019-06-21", "close": 198.78, "uClose": 198.78}"#;
        let previous: PreviousDay = serde_json::from_str(json).expect("decodes");

        assert_eq!(previous.symbol, "AAPL");
        assert_eq!(previous.historical.date, Some(date!(2019 - 06 - 21)));
        assert!(previous.validate().is_ok());
        assert!(!previous.is_placeholder());
    }

    #[test]
    fn previous_day_checks_symbol_first() {
        let previous: PreviousDay = serde_json::from_str("{}").expect("decodes");

        assert!(previous.is_placeholder());
        assert_eq!(
            previous.validate(),
            Err(ValidationError::MissingField { field: "symbol" })
        );
    }

    #[test]
    fn intraday_joins_date_and_minute() {
        let json = r#"{"date": "2019-06-21", "minute": "09:30", "label": "09:30 AM",
            "marketClose": 198.9, "marketVolume": 1020, "close": null, "volume": 0}"#;
        let bar: Intraday = serde_json::from_str(json).expect("decodes");

        assert_eq!(bar.timestamp, Some(datetime!(2019-06-21 09:30 -4)));
        assert_eq!(bar.market_volume, 1020);
        assert_eq!(bar.close, 0.0);
        assert!(bar.validate().is_ok());
    }

    #[test]
    fn intraday_winter_bars_use_standard_time() {
        let bar: Intraday = serde_json::from_str(
            r#"{"date": "2019-12-20", "minute": "15:59", "marketClose": 279.4}"#,
        )
        .expect("decodes");

        let timestamp = bar.timestamp.expect("timestamp");
        assert_eq!(timestamp.offset(), offset!(-5));
        assert_eq!(timestamp, datetime!(2019-12-20 20:59 UTC));
    }

    #[test]
    fn intraday_requires_market_close() {
        let bar: Intraday =
            serde_json::from_str(r#"{"date": "2019-06-21", "minute": "09:31"}"#).expect("decodes");
        assert_eq!(
            bar.validate(),
            Err(ValidationError::ZeroValue {
                field: "marketClose"
            })
        );

        let bar: Intraday = serde_json::from_str(
            r#"{"date": "2019-06-21", "minute": "09:30", "close": 198.9, "marketClose": 0}"#,
        )
        .expect("decodes");
        assert_eq!(
            bar.validate(),
            Err(ValidationError::ZeroValue {
                field: "marketClose"
            })
        );
    }

    #[test]
    fn serialized_bars_read_back() {
        let json = r#"{"date": "2019-06-21", "close": 198.78, "uClose": 198.78,
            "uVolume": 47800589, "updated": 1561147200000}"#;
        let bar: Historical = serde_json::from_str(json).expect("decodes");
        let encoded = serde_json::to_string(&bar).expect("encodes");

        assert!(encoded.contains(r#""date":"2019-06-21""#), "{encoded}");
        assert!(encoded.contains(r#""updated":1561147200000"#), "{encoded}");
        let decoded: Historical = serde_json::from_str(&encoded).expect("reads back");
        assert_eq!(decoded, bar);

        let previous: PreviousDay =
            serde_json::from_str(r#"{"symbol": "AAPL", "date": "2019-06-21", "close": 1.5}"#)
                .expect("decodes");
        let encoded = serde_json::to_string(&previous).expect("encodes");
        assert!(encoded.contains(r#""symbol":"AAPL""#), "{encoded}");
        let decoded: PreviousDay = serde_json::from_str(&encoded).expect("reads back");
        assert_eq!(decoded, previous);
    }

    #[test]
    fn serialized_intraday_rebuilds_its_timestamp() {
        let json = r#"{"date": "2019-06-21", "minute": "09:30", "marketClose": 198.9}"#;
        let bar: Intraday = serde_json::from_str(json).expect("decodes");
        let encoded = serde_json::to_string(&bar).expect("encodes");

        assert!(!encoded.contains("timestamp"), "{encoded}");
        let decoded: Intraday = serde_json::from_str(&encoded).expect("reads back");
        assert_eq!(decoded, bar);
        assert_eq!(decoded.timestamp, Some(datetime!(2019-06-21 13:30 UTC)));
    }
}
