//! # Domain Models
//!
//! Canonical records decoded from API responses.
//!
//! ## Overview
//!
//! Every record is decoded in two stages. A private wire struct accepts the
//! API's raw encodings (`YYYY-MM-DD` and `YYYYMMDD` strings, epoch
//! milliseconds, floats sent as strings) and is converted into the public
//! struct with canonical types. Decoding is lenient about optional data;
//! [`Validate`] is the explicit check for the fields a record cannot do
//! without.
//!
//! Serializing goes back through the same wire struct, so records encode in
//! the API's own field names and formats and decode again unchanged.
//!
//! ## Models
//!
//! | Type | Endpoint |
//! |------|----------|
//! | [`Historical`] | `stock/{ticker}/chart` |
//! | [`PreviousDay`] | `stock/{ticker}/previous`, `stock/market/previous` |
//! | [`Intraday`] | `stock/{ticker}/intraday-prices` |
//! | [`Dividend`] | `stock/{ticker}/dividends/{range}` |
//! | [`Split`] | `stock/{ticker}/splits/{range}` |
//! | [`Earning`] | `stock/{ticker}/earnings/{last}` |
//! | [`UpcomingDividend`] | `stock/{ticker}/upcoming-dividends` |
//! | [`UpcomingEarning`] | `stock/{ticker}/upcoming-earnings` |
//! | [`UpcomingSplit`] | `stock/{ticker}/upcoming-splits` |
//! | [`SymbolRecord`] | `ref-data/symbols` |
//! | [`OptionContract`] | `stock/{ticker}/options/{expiration}` |
//!
//! ## Validation
//!
//! ```rust,ignore
//! use iexcloud_core::{Historical, Validate};
//!
//! let bar: Historical = serde_json::from_str(r#"{"date":"2019-06-21","close":0}"#)?;
//! assert!(bar.validate().is_err()); // close is zero
//! ```

mod codec;
mod fundamental;
mod market;
mod price;
mod reference;
mod ticker;

use time::Date;

use crate::ValidationError;

pub use codec::{
    format_compact_date, format_iso_date, from_epoch_millis, parse_compact_date, parse_float_str,
    parse_iso_date, to_epoch_millis,
};
pub use fundamental::{AnnounceTime, Dividend, Earning, Split};
pub use market::{UpcomingDividend, UpcomingEarning, UpcomingSplit};
pub use price::{Historical, Intraday, PreviousDay};
pub use reference::{OptionContract, OptionSide, SymbolRecord};
pub use ticker::Ticker;

/// Check that a decoded record carries the data it cannot do without.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Validate every record, stopping at the first failure.
pub fn validate_all<T: Validate>(records: &[T]) -> Result<(), ValidationError> {
    records.iter().try_for_each(Validate::validate)
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(())
}

fn require_date(field: &'static str, value: Option<Date>) -> Result<(), ValidationError> {
    value
        .map(|_| ())
        .ok_or(ValidationError::MissingField { field })
}

fn require_non_zero(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value == 0.0 {
        return Err(ValidationError::ZeroValue { field });
    }
    Ok(())
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value <= 0.0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(())
}
