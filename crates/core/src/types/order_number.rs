//! Human-readable order numbers: `ORD-YYYYMMDD-NNN`.
//!
//! The sequence restarts every calendar day at 001 and is zero-padded to
//! three digits. Past 999 the number simply grows wider (`ORD-20261018-1000`),
//! so stores must order by length before comparing text when looking for the
//! highest number of a day.

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderNumberError {
    /// The string does not have the `ORD-YYYYMMDD-NNN` shape.
    #[error("malformed order number: {0}")]
    Malformed(String),
    /// The date part is not a real calendar date.
    #[error("invalid date in order number: {0}")]
    InvalidDate(String),
    /// The sequence is zero.
    #[error("order number sequence must start at 1")]
    ZeroSequence,
    /// No further sequence can be represented for the day.
    #[error("order number sequence exhausted")]
    SequenceExhausted,
}

/// A validated order number.
///
/// ```
/// use chrono::NaiveDate;
/// use fogon_core::OrderNumber;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// let first = OrderNumber::first_of_day(day);
/// assert_eq!(first.as_str(), "ORD-20261018-001");
///
/// let next = first.successor().unwrap();
/// assert_eq!(next.as_str(), "ORD-20261018-002");
/// assert_eq!(next.sequence(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber {
    raw: String,
    date: NaiveDate,
    sequence: u32,
}

impl OrderNumber {
    /// Literal prefix of every order number.
    pub const PREFIX: &'static str = "ORD-";

    /// Build an order number from its parts.
    ///
    /// # Errors
    ///
    /// Returns `OrderNumberError::ZeroSequence` if `sequence` is 0.
    pub fn new(date: NaiveDate, sequence: u32) -> Result<Self, OrderNumberError> {
        if sequence == 0 {
            return Err(OrderNumberError::ZeroSequence);
        }
        Ok(Self {
            raw: format!("{}{sequence:03}", Self::day_prefix(date)),
            date,
            sequence,
        })
    }

    /// The first order number of a day (`...-001`).
    #[must_use]
    pub fn first_of_day(date: NaiveDate) -> Self {
        Self {
            raw: format!("{}001", Self::day_prefix(date)),
            date,
            sequence: 1,
        }
    }

    /// The prefix shared by all order numbers of a day, e.g. `ORD-20261018-`.
    #[must_use]
    pub fn day_prefix(date: NaiveDate) -> String {
        format!("{}{}-", Self::PREFIX, date.format("%Y%m%d"))
    }

    /// The next order number on the same day.
    ///
    /// # Errors
    ///
    /// Returns `OrderNumberError::SequenceExhausted` at `u32::MAX`.
    pub fn successor(&self) -> Result<Self, OrderNumberError> {
        let next = self
            .sequence
            .checked_add(1)
            .ok_or(OrderNumberError::SequenceExhausted)?;
        Self::new(self.date, next)
    }

    /// The number to allocate on `date` given the highest existing number
    /// for that date, if any.
    ///
    /// A `latest` from another day is ignored and the sequence restarts.
    ///
    /// # Errors
    ///
    /// Returns `OrderNumberError::SequenceExhausted` if the day is full.
    pub fn next_for_day(
        date: NaiveDate,
        latest: Option<&Self>,
    ) -> Result<Self, OrderNumberError> {
        match latest {
            Some(latest) if latest.date == date => latest.successor(),
            _ => Ok(Self::first_of_day(date)),
        }
    }

    /// Parse an order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `ORD-YYYYMMDD-N...` with a real
    /// date and a positive sequence.
    pub fn parse(s: &str) -> Result<Self, OrderNumberError> {
        let malformed = || OrderNumberError::Malformed(s.to_owned());

        let rest = s.strip_prefix(Self::PREFIX).ok_or_else(malformed)?;
        let (date_part, seq_part) = rest.split_once('-').ok_or_else(malformed)?;

        if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if seq_part.len() < 3 || !seq_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let date = NaiveDate::parse_from_str(date_part, "%Y%m%d")
            .map_err(|_| OrderNumberError::InvalidDate(date_part.to_owned()))?;
        let sequence: u32 = seq_part.parse().map_err(|_| malformed())?;

        let number = Self::new(date, sequence)?;
        // Reject non-canonical padding such as "0001".
        if number.raw != s {
            return Err(malformed());
        }
        Ok(number)
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The calendar date encoded in the number.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// The per-day sequence.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.raw
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.raw, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_of_day_format() {
        assert_eq!(
            OrderNumber::first_of_day(day(2026, 1, 5)).as_str(),
            "ORD-20260105-001"
        );
        assert_eq!(OrderNumber::day_prefix(day(2026, 1, 5)), "ORD-20260105-");
    }

    #[test]
    fn test_next_for_day_increments_latest() {
        let today = day(2026, 10, 18);
        let latest = OrderNumber::parse("ORD-20261018-041").unwrap();
        let next = OrderNumber::next_for_day(today, Some(&latest)).unwrap();
        assert_eq!(next.as_str(), "ORD-20261018-042");
    }

    #[test]
    fn test_next_for_day_restarts_on_new_day() {
        let latest = OrderNumber::parse("ORD-20261017-120").unwrap();
        let next = OrderNumber::next_for_day(day(2026, 10, 18), Some(&latest)).unwrap();
        assert_eq!(next.as_str(), "ORD-20261018-001");
        assert_eq!(
            OrderNumber::next_for_day(day(2026, 10, 18), None).unwrap(),
            OrderNumber::first_of_day(day(2026, 10, 18))
        );
    }

    #[test]
    fn test_sequence_grows_past_three_digits() {
        let latest = OrderNumber::parse("ORD-20261018-999").unwrap();
        let next = latest.successor().unwrap();
        assert_eq!(next.as_str(), "ORD-20261018-1000");
        assert_eq!(OrderNumber::parse("ORD-20261018-1000").unwrap(), next);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "ORD-20261018",
            "ORD-2026101-001",
            "ORD-20261018-01",
            "ORD-20261018-0001",
            "ORD-20261018-abc",
            "ord-20261018-001",
            "ORD-20261018-001-x",
        ] {
            assert!(OrderNumber::parse(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_parse_rejects_bad_date_and_zero() {
        assert!(matches!(
            OrderNumber::parse("ORD-20261345-001"),
            Err(OrderNumberError::InvalidDate(_))
        ));
        assert!(matches!(
            OrderNumber::parse("ORD-20261018-000"),
            Err(OrderNumberError::ZeroSequence)
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let number = OrderNumber::parse("ORD-20261018-007").unwrap();
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"ORD-20261018-007\"");
        let back: OrderNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sequence(), 7);
    }
}
