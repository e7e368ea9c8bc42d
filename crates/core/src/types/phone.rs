//! Phone number type - the natural key of a customer.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone cannot be empty")]
    Empty,
    /// The input contains something other than digits, `+`, spaces or hyphens.
    #[error("phone contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// A `+` appears anywhere but the first position.
    #[error("phone may only start with '+'")]
    MisplacedPlus,
    /// The normalized number is too short or too long.
    #[error("phone must have between {min} and {max} characters (got {len})")]
    InvalidLength {
        /// Normalized length.
        len: usize,
        /// Minimum allowed length.
        min: usize,
        /// Maximum allowed length.
        max: usize,
    },
}

/// A normalized phone number.
///
/// Normalization strips whitespace and hyphens. The result must contain only
/// digits (with an optional leading `+`) and be 10-15 characters long.
///
/// ## Examples
///
/// ```
/// use fogon_core::Phone;
///
/// let phone = Phone::parse("300 123 4567").unwrap();
/// assert_eq!(phone.as_str(), "3001234567");
///
/// assert!(Phone::parse("+57 300-123-4567").is_ok());
/// assert!(Phone::parse("12345").is_err());       // too short
/// assert!(Phone::parse("300.123.4567").is_err()); // dots are not allowed
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum normalized length.
    pub const MIN_LENGTH: usize = 10;
    /// Maximum normalized length.
    pub const MAX_LENGTH: usize = 15;

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other than
    /// digits, `+`, whitespace or hyphens, has a `+` after the first position,
    /// or is not 10-15 characters long once normalized.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.trim().is_empty() {
            return Err(PhoneError::Empty);
        }

        let mut normalized = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '0'..='9' => normalized.push(c),
                '+' if normalized.is_empty() => normalized.push(c),
                '+' => return Err(PhoneError::MisplacedPlus),
                '-' => {}
                c if c.is_whitespace() => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        let len = normalized.len();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&len) {
            return Err(PhoneError::InvalidLength {
                len,
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns only the digits (no leading `+`), as used by messaging links.
    #[must_use]
    pub fn digits(&self) -> &str {
        self.0.trim_start_matches('+')
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Phone {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Phone {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Stored values were normalized on the way in
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Phone {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
