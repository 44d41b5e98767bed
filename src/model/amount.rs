//! Amount type for handling non-negative monetary magnitudes.
//!
//! Whether money flows in or out is carried by the transaction type, never by the sign of the
//! amount, so an `Amount` is always zero or positive. Parsing is lenient about a leading dollar
//! sign and thousands separators, the way people tend to type money.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents a non-negative amount of money.
///
/// # Examples
///
/// ```
/// # use finman::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("$1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "$1,250.50");
/// ```
///
/// Negative and non-numeric input is rejected:
/// ```
/// # use finman::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("-5").is_err());
/// assert!(Amount::from_str("five").is_err());
/// assert!(Amount::from_str("").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// The largest accepted amount, one quadrillion. Sums of any realistic number of amounts stay
    /// far below `Decimal::MAX`.
    pub const MAX: Amount = Amount(Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0));

    /// Creates an `Amount`, rejecting negative values and values above `Amount::MAX`.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        if value > Self::MAX.0 {
            return Err(AmountError::TooLarge(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// The reasons an entered amount can be rejected.
pub enum AmountError {
    /// Nothing was entered.
    Empty,
    /// The text is not a finite number.
    NotANumber(String),
    /// The number is below zero.
    Negative(Decimal),
    /// The number is above `Amount::MAX`.
    TooLarge(Decimal),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "Please enter an amount"),
            AmountError::NotANumber(s) => write!(f, "'{s}' is not a valid amount"),
            AmountError::Negative(v) => write!(
                f,
                "The amount {v} is negative, use the transaction type to record money going out"
            ),
            AmountError::TooLarge(v) => {
                write!(f, "The amount {v} is larger than the maximum of {}", Amount::MAX)
            }
        }
    }
}

impl Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // "$50.00", "-$50.00" and "50.00" are all accepted, the sign is checked after parsing
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else {
            trimmed.strip_prefix('$').unwrap_or(trimmed).to_string()
        };
        let without_commas = without_dollar.replace(',', "");

        let value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(|_| AmountError::NotANumber(trimmed.to_string()))?;
        Amount::new(value)
    }
}

impl TryFrom<f64> for Amount {
    type Error = AmountError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let decimal =
            Decimal::from_f64(value).ok_or_else(|| AmountError::NotANumber(value.to_string()))?;
        Amount::new(decimal)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&format_money(self.0))
    }
}

/// Formats any decimal as dollars with thousands separators and two decimal places, e.g.
/// `-$60,000.00`. Used for amounts as well as derived values such as a negative net balance.
pub fn format_money(value: Decimal) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    let magnitude = value.abs().round_dp(2).to_f64().unwrap_or_default();
    format!("{sign}${}", format_num::format_num!(",.2", magnitude))
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Stored as the exact decimal text, a float would lose digits.
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts JSON numbers as well as numeric strings.
struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a non-negative number or numeric string")
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Amount::try_from(v).map_err(E::custom)
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
