use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Last-known dividend record per ticker. Ordered so persisted output is stable.
pub type SymbolState = BTreeMap<String, DividendRecord>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Dividend amount cannot be negative: {0}")]
    NegativeAmount(Decimal),
    #[error("Invalid effective date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// A freshly fetched dividend event for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct DividendObservation {
    amount: Decimal,
    effective_date: NaiveDate,
}

impl DividendObservation {
    pub fn new(amount: Decimal, effective_date: NaiveDate) -> Result<Self, RecordError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(RecordError::NegativeAmount(amount));
        }
        Ok(Self {
            amount,
            effective_date,
        })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }

    /// A zero amount means the provider had nothing to report.
    pub fn has_dividend(&self) -> bool {
        !self.amount.is_zero()
    }

    pub fn into_record(self, observed_at: DateTime<Utc>) -> DividendRecord {
        DividendRecord {
            amount: self.amount,
            effective_date: Some(self.effective_date),
            last_observed_at: observed_at,
        }
    }
}

/// The most recent known dividend event for one symbol.
///
/// On disk this keeps the flat-file layout
/// `{"amount": 1.25, "date": "2024-04-15", "last_updated": "..."}` where an
/// unknown date is stored as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord", into = "RawRecord")]
pub struct DividendRecord {
    amount: Decimal,
    effective_date: Option<NaiveDate>,
    last_observed_at: DateTime<Utc>,
}

impl DividendRecord {
    pub fn new(
        amount: Decimal,
        effective_date: Option<NaiveDate>,
        last_observed_at: DateTime<Utc>,
    ) -> Result<Self, RecordError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(RecordError::NegativeAmount(amount));
        }
        Ok(Self {
            amount,
            effective_date,
            last_observed_at,
        })
    }

    /// Builds a record from its stored text columns.
    pub fn from_parts(amount: Decimal, date: &str, last_updated: &str) -> Result<Self, RecordError> {
        Self::new(amount, parse_date(date)?, parse_timestamp(last_updated)?)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.effective_date
    }

    pub fn last_observed_at(&self) -> DateTime<Utc> {
        self.last_observed_at
    }

    /// Effective date as stored text, empty when unknown.
    pub fn date_label(&self) -> String {
        self.effective_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize)]
struct RawRecord {
    amount: Decimal,
    #[serde(default)]
    date: String,
    #[serde(default)]
    last_updated: String,
}

impl TryFrom<RawRecord> for DividendRecord {
    type Error = RecordError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        Self::from_parts(raw.amount, &raw.date, &raw.last_updated)
    }
}

impl From<DividendRecord> for RawRecord {
    fn from(record: DividendRecord) -> Self {
        RawRecord {
            amount: record.amount,
            date: record.date_label(),
            last_updated: record.last_observed_at.to_rfc3339(),
        }
    }
}

fn parse_date(value: &str) -> Result<Option<NaiveDate>, RecordError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| RecordError::InvalidDate(value.to_string()))
}

// Older state files carry naive local timestamps without an offset; those are read as UTC.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RecordError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(DateTime::<Utc>::UNIX_EPOCH);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| RecordError::InvalidTimestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = DividendRecord::new(dec!(-0.01), None, Utc::now()).unwrap_err();
        assert_eq!(err, RecordError::NegativeAmount(dec!(-0.01)));

        let err = DividendObservation::new(dec!(-1), date(2024, 1, 15)).unwrap_err();
        assert_eq!(err, RecordError::NegativeAmount(dec!(-1)));
    }

    #[test]
    fn test_zero_observation_has_no_dividend() {
        let obs = DividendObservation::new(dec!(0), date(2024, 1, 15)).unwrap();
        assert!(!obs.has_dividend());

        let obs = DividendObservation::new(dec!(0.24), date(2024, 1, 15)).unwrap();
        assert!(obs.has_dividend());
    }

    #[test]
    fn test_reads_legacy_state_file() {
        let json = r#"{
            "AAPL": {"amount": 0.24, "date": "2024-02-09", "last_updated": "2024-02-10T08:15:30.123456"},
            "MSFT": {"amount": 0, "date": ""}
        }"#;

        let state: SymbolState = serde_json::from_str(json).unwrap();
        let aapl = &state["AAPL"];
        assert_eq!(aapl.amount(), dec!(0.24));
        assert_eq!(aapl.effective_date(), Some(date(2024, 2, 9)));
        assert_eq!(
            aapl.last_observed_at(),
            Utc.with_ymd_and_hms(2024, 2, 10, 8, 15, 30).unwrap()
                + chrono::Duration::microseconds(123456)
        );

        let msft = &state["MSFT"];
        assert_eq!(msft.amount(), dec!(0));
        assert_eq!(msft.effective_date(), None);
        assert_eq!(msft.last_observed_at(), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_negative_amount_on_disk_is_rejected() {
        let json = r#"{"amount": -1.5, "date": "2024-02-09", "last_updated": ""}"#;
        assert!(serde_json::from_str::<DividendRecord>(json).is_err());
    }

    #[test]
    fn test_serializes_flat_layout() {
        let observed = Utc.with_ymd_and_hms(2024, 4, 16, 9, 0, 0).unwrap();
        let record = DividendObservation::new(dec!(1.25), date(2024, 4, 15))
            .unwrap()
            .into_record(observed);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["amount"], serde_json::json!(1.25));
        assert_eq!(value["date"], "2024-04-15");
        assert_eq!(value["last_updated"], "2024-04-16T09:00:00+00:00");
    }

    #[test]
    fn test_empty_date_label() {
        let record = DividendRecord::new(dec!(0), None, Utc::now()).unwrap();
        assert_eq!(record.date_label(), "");
    }

    #[test]
    fn test_invalid_date_text() {
        let err = DividendRecord::from_parts(dec!(1), "15/04/2024", "").unwrap_err();
        assert_eq!(err, RecordError::InvalidDate("15/04/2024".to_string()));
    }
}
