use serde::{Deserialize, Serialize};
use time::Date;
use tracing::debug;

use super::codec::{
    format_compact_date, format_iso_date, optional_compact_date, optional_iso_date,
};
use super::{require_date, require_non_zero, require_text, Validate};
use crate::ValidationError;

/// One entry of the reference symbol list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SymbolRecordWire", into = "SymbolRecordWire")]
pub struct SymbolRecord {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub iex_id: String,
    pub currency: String,
    pub date: Option<Date>,
    pub security_type: String,
    pub is_enabled: bool,
    pub region: String,
    pub figi: String,
    pub cik: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SymbolRecordWire {
    symbol: Option<String>,
    name: Option<String>,
    exchange: Option<String>,
    #[serde(alias = "iexid")]
    iex_id: Option<String>,
    currency: Option<String>,
    date: Option<String>,
    #[serde(rename = "type")]
    security_type: Option<String>,
    is_enabled: Option<bool>,
    region: Option<String>,
    figi: Option<String>,
    cik: Option<String>,
}

impl From<SymbolRecordWire> for SymbolRecord {
    fn from(wire: SymbolRecordWire) -> Self {
        Self {
            symbol: wire.symbol.unwrap_or_default(),
            name: wire.name.unwrap_or_default(),
            exchange: wire.exchange.unwrap_or_default(),
            iex_id: wire.iex_id.unwrap_or_default(),
            currency: wire.currency.unwrap_or_default(),
            date: optional_iso_date("date", wire.date.as_deref()),
            security_type: wire.security_type.unwrap_or_default(),
            is_enabled: wire.is_enabled.unwrap_or_default(),
            region: wire.region.unwrap_or_default(),
            figi: wire.figi.unwrap_or_default(),
            cik: wire.cik.unwrap_or_default(),
        }
    }
}

impl From<SymbolRecord> for SymbolRecordWire {
    fn from(record: SymbolRecord) -> Self {
        Self {
            symbol: Some(record.symbol),
            name: Some(record.name),
            exchange: Some(record.exchange),
            iex_id: Some(record.iex_id),
            currency: Some(record.currency),
            date: record.date.map(format_iso_date),
            security_type: Some(record.security_type),
            is_enabled: Some(record.is_enabled),
            region: Some(record.region),
            figi: Some(record.figi),
            cik: Some(record.cik),
        }
    }
}

impl Validate for SymbolRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("symbol", &self.symbol)?;
        require_text("iexId", &self.iex_id)?;
        require_date("date", self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
    #[default]
    #[serde(other)]
    Unknown,
}

/// End-of-day data for one listed option contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "OptionContractWire", into = "OptionContractWire")]
pub struct OptionContract {
    pub symbol: String,
    pub id: String,
    pub expiration_date: Option<Date>,
    pub contract_size: u32,
    pub strike_price: f64,
    pub closing_price: f64,
    pub side: OptionSide,
    pub contract_type: String,
    pub volume: u64,
    pub open_interest: u64,
    pub bid: f64,
    pub ask: f64,
    pub last_updated: Option<Date>,
    pub is_adjusted: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OptionContractWire {
    symbol: Option<String>,
    id: Option<String>,
    expiration_date: Option<String>,
    contract_size: Option<u32>,
    strike_price: Option<f64>,
    closing_price: Option<f64>,
    side: Option<OptionSide>,
    #[serde(rename = "type")]
    contract_type: Option<String>,
    volume: Option<u64>,
    open_interest: Option<u64>,
    bid: Option<f64>,
    ask: Option<f64>,
    last_updated: Option<String>,
    is_adjusted: Option<bool>,
}

impl From<OptionContractWire> for OptionContract {
    fn from(wire: OptionContractWire) -> Self {
        let expiration_date =
            optional_compact_date("expirationDate", wire.expiration_date.as_deref());
        let last_updated = optional_iso_date("lastUpdated", wire.last_updated.as_deref());
        debug!(
            expiration = wire.expiration_date.as_deref(),
            parsed_expiration = ?expiration_date,
            last_updated = wire.last_updated.as_deref(),
            parsed_last_updated = ?last_updated,
            "option: parsed dates"
        );

        Self {
            symbol: wire.symbol.unwrap_or_default(),
            id: wire.id.unwrap_or_default(),
            expiration_date,
            contract_size: wire.contract_size.unwrap_or_default(),
            strike_price: wire.strike_price.unwrap_or_default(),
            closing_price: wire.closing_price.unwrap_or_default(),
            side: wire.side.unwrap_or_default(),
            contract_type: wire.contract_type.unwrap_or_default(),
            volume: wire.volume.unwrap_or_default(),
            open_interest: wire.open_interest.unwrap_or_default(),
            bid: wire.bid.unwrap_or_default(),
            ask: wire.ask.unwrap_or_default(),
            last_updated,
            is_adjusted: wire.is_adjusted.unwrap_or_default(),
        }
    }
}

impl From<OptionContract> for OptionContractWire {
    fn from(contract: OptionContract) -> Self {
        Self {
            symbol: Some(contract.symbol),
            id: Some(contract.id),
            expiration_date: contract.expiration_date.map(format_compact_date),
            contract_size: Some(contract.contract_size),
            strike_price: Some(contract.strike_price),
            closing_price: Some(contract.closing_price),
            side: Some(contract.side),
            contract_type: Some(contract.contract_type),
            volume: Some(contract.volume),
            open_interest: Some(contract.open_interest),
            bid: Some(contract.bid),
            ask: Some(contract.ask),
            last_updated: contract.last_updated.map(format_iso_date),
            is_adjusted: Some(contract.is_adjusted),
        }
    }
}

impl Validate for OptionContract {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("symbol", &self.symbol)?;
        require_text("id", &self.id)?;
        require_date("expirationDate", self.expiration_date)?;
        require_non_zero("strikePrice", self.strike_price)?;
        require_non_zero("closingPrice", self.closing_price)
    }
}
