//! Bangladeshi Taka amounts using decimal arithmetic.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Taka`] amount from form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Please enter a number.")]
    NotANumber,
    #[error("Price must be a positive number.")]
    Negative,
}

/// An amount in Taka (`৳`).
///
/// ```
/// use afrah_core::Taka;
///
/// let price: Taka = "450".parse().unwrap();
/// assert_eq!(price.display(), "৳450.00");
/// assert_eq!((price * 3).display(), "৳1350.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taka(Decimal);

impl Taka {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole taka, for seeds and tests.
    #[must_use]
    pub fn from_whole(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display, e.g. `৳1234.50`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("৳{:.2}", self.0)
    }

    /// Amount without the currency sign, for form inputs.
    #[must_use]
    pub fn plain(&self) -> String {
        self.0.normalize().to_string()
    }

    /// Parse a non-negative amount from a form field.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::NotANumber`] for unparseable input and
    /// [`MoneyError::Negative`] for amounts below zero.
    pub fn parse_non_negative(s: &str) -> Result<Self, MoneyError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| MoneyError::NotANumber)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(amount))
    }
}

impl fmt::Display for Taka {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl FromStr for Taka {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_non_negative(s)
    }
}

impl Add for Taka {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<i32> for Taka {
    type Output = Self;

    fn mul(self, quantity: i32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Taka {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Taka {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Taka {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Taka {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Taka::from_whole(1234).display(), "৳1234.00");
        assert_eq!("99.5".parse::<Taka>().unwrap().display(), "৳99.50");
    }

    #[test]
    fn test_line_totals_sum() {
        let lines = [(Taka::from_whole(450), 2), ("120.25".parse::<Taka>().unwrap(), 4)];
        let total: Taka = lines.iter().map(|(price, qty)| *price * *qty).sum();
        assert_eq!(total.display(), "৳1381.00");
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert_eq!(Taka::parse_non_negative("-1"), Err(MoneyError::Negative));
        assert_eq!(Taka::parse_non_negative("abc"), Err(MoneyError::NotANumber));
        assert_eq!(Taka::parse_non_negative(" 0 ").unwrap(), Taka::ZERO);
    }

    #[test]
    fn test_plain_for_form_inputs() {
        assert_eq!("450.00".parse::<Taka>().unwrap().plain(), "450");
        assert_eq!("12.50".parse::<Taka>().unwrap().plain(), "12.5");
    }
}
