use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tracing::debug;

use super::codec::{
    flex_or_zero, format_iso_date, from_epoch_millis, optional_iso_date, to_epoch_millis,
    FlexFloat,
};
use super::{require_date, require_non_zero, require_positive, require_text, Validate};
use crate::ValidationError;

/// A declared or paid cash dividend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DividendWire", into = "DividendWire")]
pub struct Dividend {
    pub symbol: String,
    pub ex_date: Option<Date>,
    pub payment_date: Option<Date>,
    pub record_date: Option<Date>,
    pub declared_date: Option<Date>,
    pub amount: f64,
    pub flag: String,
    pub currency: String,
    pub description: String,
    pub frequency: String,
    pub updated: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DividendWire {
    symbol: Option<String>,
    ex_date: Option<String>,
    payment_date: Option<String>,
    record_date: Option<String>,
    declared_date: Option<String>,
    amount: Option<FlexFloat>,
    flag: Option<String>,
    currency: Option<String>,
    description: Option<String>,
    frequency: Option<String>,
    updated: Option<i64>,
}

impl From<DividendWire> for Dividend {
    fn from(wire: DividendWire) -> Self {
        let dividend = Self {
            symbol: wire.symbol.unwrap_or_default(),
            ex_date: optional_iso_date("exDate", wire.ex_date.as_deref()),
            payment_date: optional_iso_date("paymentDate", wire.payment_date.as_deref()),
            record_date: optional_iso_date("recordDate", wire.record_date.as_deref()),
            declared_date: optional_iso_date("declaredDate", wire.declared_date.as_deref()),
            amount: flex_or_zero(wire.amount.as_ref()),
            flag: wire.flag.unwrap_or_default(),
            currency: wire.currency.unwrap_or_default(),
            description: wire.description.unwrap_or_default(),
            frequency: wire.frequency.unwrap_or_default(),
            updated: wire.updated.and_then(from_epoch_millis),
        };
        debug!(
            ex_date = ?dividend.ex_date,
            payment_date = ?dividend.payment_date,
            amount = dividend.amount,
            "dividend: parsed fields"
        );
        dividend
    }
}

impl From<Dividend> for DividendWire {
    fn from(dividend: Dividend) -> Self {
        Self {
            symbol: Some(dividend.symbol),
            ex_date: dividend.ex_date.map(format_iso_date),
            payment_date: dividend.payment_date.map(format_iso_date),
            record_date: dividend.record_date.map(format_iso_date),
            declared_date: dividend.declared_date.map(format_iso_date),
            amount: Some(dividend.amount.into()),
            flag: Some(dividend.flag),
            currency: Some(dividend.currency),
            description: Some(dividend.description),
            frequency: Some(dividend.frequency),
            updated: dividend.updated.and_then(to_epoch_millis),
        }
    }
}

impl Validate for Dividend {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_zero("amount", self.amount)?;
        require_date("exDate", self.ex_date)?;
        require_text("currency", &self.currency)
    }
}

/// A stock split. Factors describe `to_factor`-for-`from_factor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SplitWire", into = "SplitWire")]
pub struct Split {
    pub ex_date: Option<Date>,
    pub declared_date: Option<Date>,
    pub ratio: f64,
    pub to_factor: f64,
    pub from_factor: f64,
    pub description: String,
    pub updated: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SplitWire {
    ex_date: Option<String>,
    declared_date: Option<String>,
    ratio: Option<FlexFloat>,
    to_factor: Option<FlexFloat>,
    from_factor: Option<FlexFloat>,
    description: Option<String>,
    updated: Option<i64>,
}

impl From<SplitWire> for Split {
    fn from(wire: SplitWire) -> Self {
        Self {
            ex_date: optional_iso_date("exDate", wire.ex_date.as_deref()),
            declared_date: optional_iso_date("declaredDate", wire.declared_date.as_deref()),
            ratio: flex_or_zero(wire.ratio.as_ref()),
            to_factor: flex_or_zero(wire.to_factor.as_ref()),
            from_factor: flex_or_zero(wire.from_factor.as_ref()),
            description: wire.description.unwrap_or_default(),
            updated: wire.updated.and_then(from_epoch_millis),
        }
    }
}

impl From<Split> for SplitWire {
    fn from(split: Split) -> Self {
        Self {
            ex_date: split.ex_date.map(format_iso_date),
            declared_date: split.declared_date.map(format_iso_date),
            ratio: Some(split.ratio.into()),
            to_factor: Some(split.to_factor.into()),
            from_factor: Some(split.from_factor.into()),
            description: Some(split.description),
            updated: split.updated.and_then(to_epoch_millis),
        }
    }
}

impl Validate for Split {
    fn validate(&self) -> Result<(), ValidationError> {
        require_positive("toFactor", self.to_factor)?;
        require_positive("fromFactor", self.from_factor)?;
        require_date("exDate", self.ex_date)
    }
}

/// When an earnings report is released relative to the trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AnnounceTime {
    #[serde(rename = "BTO")]
    BeforeOpen,
    #[serde(rename = "DMT")]
    DuringTrading,
    #[serde(rename = "AMC")]
    AfterClose,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One reported earnings period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EarningWire", into = "EarningWire")]
pub struct Earning {
    pub actual_eps: f64,
    pub consensus_eps: f64,
    pub announce_time: AnnounceTime,
    pub number_of_estimates: u32,
    pub eps_surprise_dollar: f64,
    pub eps_report_date: Option<Date>,
    pub fiscal_period: String,
    pub fiscal_end_date: Option<Date>,
    pub year_ago: f64,
    pub year_ago_change_percent: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct EarningWire {
    #[serde(rename = "actualEPS")]
    actual_eps: Option<f64>,
    #[serde(rename = "consensusEPS")]
    consensus_eps: Option<f64>,
    #[serde(rename = "announceTime")]
    announce_time: Option<AnnounceTime>,
    #[serde(rename = "numberOfEstimates")]
    number_of_estimates: Option<u32>,
    #[serde(rename = "EPSSurpriseDollar")]
    eps_surprise_dollar: Option<f64>,
    #[serde(rename = "EPSReportDate")]
    eps_report_date: Option<String>,
    #[serde(rename = "fiscalPeriod")]
    fiscal_period: Option<String>,
    #[serde(rename = "fiscalEndDate")]
    fiscal_end_date: Option<String>,
    #[serde(rename = "yearAgo")]
    year_ago: Option<f64>,
    #[serde(rename = "yearAgoChangePercent")]
    year_ago_change_percent: Option<f64>,
}

impl From<EarningWire> for Earning {
    fn from(wire: EarningWire) -> Self {
        Self {
            actual_eps: wire.actual_eps.unwrap_or_default(),
            consensus_eps: wire.consensus_eps.unwrap_or_default(),
            announce_time: wire.announce_time.unwrap_or_default(),
            number_of_estimates: wire.number_of_estimates.unwrap_or_default(),
            eps_surprise_dollar: wire.eps_surprise_dollar.unwrap_or_default(),
            eps_report_date: optional_iso_date("EPSReportDate", wire.eps_report_date.as_deref()),
            fiscal_period: wire.fiscal_period.unwrap_or_default(),
            fiscal_end_date: optional_iso_date("fiscalEndDate", wire.fiscal_end_date.as_deref()),
            year_ago: wire.year_ago.unwrap_or_default(),
            year_ago_change_percent: wire.year_ago_change_percent.unwrap_or_default(),
        }
    }
}

impl From<Earning> for EarningWire {
    fn from(earning: Earning) -> Self {
        Self {
            actual_eps: Some(earning.actual_eps),
            consensus_eps: Some(earning.consensus_eps),
            announce_time: Some(earning.announce_time),
            number_of_estimates: Some(earning.number_of_estimates),
            eps_surprise_dollar: Some(earning.eps_surprise_dollar),
            eps_report_date: earning.eps_report_date.map(format_iso_date),
            fiscal_period: Some(earning.fiscal_period),
            fiscal_end_date: earning.fiscal_end_date.map(format_iso_date),
            year_ago: Some(earning.year_ago),
            year_ago_change_percent: Some(earning.year_ago_change_percent),
        }
    }
}

impl Validate for Earning {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_zero("actualEPS", self.actual_eps)?;
        require_date("EPSReportDate", self.eps_report_date)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn decodes_dividend_with_string_amount() {
        let json = r#"{
            "symbol": "AAPL",
            "exDate": "2019-05-10", "paymentDate": "2019-05-16",
            "recordDate": "2019-05-13", "declaredDate": "2019-04-30",
            "amount": "0.77", "flag": "Cash", "currency": "USD",
            "description": "Ordinary Shares", "frequency": "quarterly"
        }"#;
        let dividend: Dividend = serde_json::from_str(json).expect("decodes");

        assert_eq!(dividend.amount, 0.77);
        assert_eq!(dividend.ex_date, Some(date!(2019 - 05 - 10)));
        assert_eq!(dividend.declared_date, Some(date!(2019 - 04 - 30)));
        assert!(dividend.validate().is_ok());
    }

    #[test]
    fn dividend_validation_order() {
        let dividend: Dividend =
            serde_json::from_str(r#"{"amount": "", "exDate": ""}"#).expect("decodes");
        assert_eq!(
            dividend.validate(),
            Err(ValidationError::ZeroValue { field: "amount" })
        );

        let dividend: Dividend =
            serde_json::from_str(r#"{"amount": 0.5, "exDate": "not a date"}"#).expect("decodes");
        assert_eq!(
            dividend.validate(),
            Err(ValidationError::MissingField { field: "exDate" })
        );

        let dividend: Dividend =
            serde_json::from_str(r#"{"amount": 0.5, "exDate": "2019-05-10"}"#).expect("decodes");
        assert_eq!(
            dividend.validate(),
            Err(ValidationError::MissingField { field: "currency" })
        );
    }

    #[test]
    fn split_factors_must_be_positive() {
        let json = r#"{"exDate": "2014-06-09", "declaredDate": "2014-04-23",
            "ratio": 0.142857, "toFactor": 7, "fromFactor": 1, "description": "7-for-1 split"}"#;
        let split: Split = serde_json::from_str(json).expect("decodes");
        assert_eq!(split.to_factor, 7.0);
        assert!(split.validate().is_ok());

        let split: Split =
            serde_json::from_str(r#"{"toFactor": 0, "fromFactor": 1, "exDate": "2014-06-09"}"#)
                .expect("decodes");
        assert_eq!(
            split.validate(),
            Err(ValidationError::NotPositive { field: "toFactor" })
        );

        let split: Split =
            serde_json::from_str(r#"{"toFactor": 2, "fromFactor": -1, "exDate": "2014-06-09"}"#)
                .expect("decodes");
        assert_eq!(
            split.validate(),
            Err(ValidationError::NotPositive {
                field: "fromFactor"
            })
        );
    }

    #[test]
    fn decodes_earning_with_upper_case_keys() {
        let json = r#"{
            "actualEPS": 2.46, "consensusEPS": 2.36, "announceTime": "AMC",
            "numberOfEstimates": 34, "EPSSurpriseDollar": 0.1,
            "EPSReportDate": "2019-04-30", "fiscalPeriod": "Q1 2019",
            "fiscalEndDate": "2019-03-31", "yearAgo": 2.73, "yearAgoChangePercent": -0.0989
        }"#;
        let earning: Earning = serde_json::from_str(json).expect("decodes");

        assert_eq!(earning.actual_eps, 2.46);
        assert_eq!(earning.announce_time, AnnounceTime::AfterClose);
        assert_eq!(earning.eps_report_date, Some(date!(2019 - 04 - 30)));
        assert_eq!(earning.fiscal_end_date, Some(date!(2019 - 03 - 31)));
        assert!(earning.validate().is_ok());
    }

    #[test]
    fn unknown_announce_time_is_tolerated() {
        let earning: Earning =
            serde_json::from_str(r#"{"actualEPS": 1.0, "announceTime": "TBD"}"#).expect("decodes");

        assert_eq!(earning.announce_time, AnnounceTime::Unknown);
        assert_eq!(
            earning.validate(),
            Err(ValidationError::MissingField {
                field: "EPSReportDate"
            })
        );
    }

    #[test]
    fn serialized_records_read_back() {
        let dividend: Dividend = serde_json::from_str(
            r#"{"symbol": "AAPL", "exDate": "2019-05-10", "amount": "0.77",
                "currency": "USD", "updated": 1557446400000}"#,
        )
        .expect("decodes");
        let encoded = serde_json::to_string(&dividend).expect("encodes");
        assert!(encoded.contains(r#""exDate":"2019-05-10""#), "{encoded}");
        assert!(encoded.contains(r#""amount":0.77"#), "{encoded}");
        let decoded: Dividend = serde_json::from_str(&encoded).expect("reads back");
        assert_eq!(decoded, dividend);

        let split: Split = serde_json::from_str(
            r#"{"exDate": "2014-06-09", "toFactor": "7", "fromFactor": 1, "ratio": 0.142857}"#,
        )
        .expect("decodes");
        let encoded = serde_json::to_string(&split).expect("encodes");
        let decoded: Split = serde_json::from_str(&encoded).expect("reads back");
        assert_eq!(decoded, split);

        let earning: Earning = serde_json::from_str(
            r#"{"actualEPS": 2.46, "announceTime": "AMC", "EPSReportDate": "2019-04-30"}"#,
        )
        .expect("decodes");
        let encoded = serde_json::to_string(&earning).expect("encodes");
        assert!(encoded.contains(r#""EPSReportDate":"2019-04-30""#), "{encoded}");
        assert!(encoded.contains(r#""announceTime":"AMC""#), "{encoded}");
        let decoded: Earning = serde_json::from_str(&encoded).expect("reads back");
        assert_eq!(decoded, earning);
    }
}
