use serde::{Deserialize, Serialize};
use time::Date;

use super::codec::{format_iso_date, optional_iso_date};
use super::{require_date, require_text, Dividend, Split, Validate};
use crate::ValidationError;

/// A dividend announced but not yet ex.
///
/// Same record as [`Dividend`]; only the required fields differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpcomingDividend(pub Dividend);

impl UpcomingDividend {
    pub fn symbol(&self) -> &str {
        &self.0.symbol
    }

    pub fn ex_date(&self) -> Option<Date> {
        self.0.ex_date
    }

    pub fn into_inner(self) -> Dividend {
        self.0
    }
}

impl Validate for UpcomingDividend {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("symbol", &self.0.symbol)?;
        require_date("exDate", self.0.ex_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UpcomingEarningWire", into = "UpcomingEarningWire")]
pub struct UpcomingEarning {
    pub symbol: String,
    pub report_date: Option<Date>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct UpcomingEarningWire {
    symbol: Option<String>,
    report_date: Option<String>,
}

impl From<UpcomingEarningWire> for UpcomingEarning {
    fn from(wire: UpcomingEarningWire) -> Self {
        Self {
            symbol: wire.symbol.unwrap_or_default(),
            report_date: optional_iso_date("reportDate", wire.report_date.as_deref()),
        }
    }
}

impl From<UpcomingEarning> for UpcomingEarningWire {
    fn from(upcoming: UpcomingEarning) -> Self {
        Self {
            symbol: Some(upcoming.symbol),
            report_date: upcoming.report_date.map(format_iso_date),
        }
    }
}

impl Validate for UpcomingEarning {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("symbol", &self.symbol)?;
        require_date("reportDate", self.report_date)
    }
}

/// A declared split that has not gone ex yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingSplit {
    #[serde(default)]
    pub symbol: String,
    #[serde(flatten)]
    pub split: Split,
}

impl Validate for UpcomingSplit {
    fn validate(&self) -> Result<(), ValidationError> {
        require_text("symbol", &self.symbol)?;
        require_date("declaredDate", self.split.declared_date)?;
        require_date("exDate", self.split.ex_date)
    }
}
