//! Coin type for token amounts

use likesign_errors::{Error, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Denomination used when none is configured
pub const DEFAULT_DENOM: &str = "nanolike";

/// A single coin with denomination and amount
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "crate::serde_helpers::decimal_string")]
    pub amount: u128,
}

impl Coin {
    /// Create a new coin, validating the denomination
    pub fn new(denom: impl Into<String>, amount: u128) -> Result<Self> {
        let denom = denom.into();
        if !is_valid_denom(&denom) {
            return Err(Error::InvalidAmount(format!("invalid denomination {denom:?}")));
        }
        Ok(Self { denom, amount })
    }

    /// Create a coin from a decimal amount, rounding half away from zero
    pub fn from_decimal(denom: impl Into<String>, amount: Decimal) -> Result<Self> {
        Self::new(denom, round_to_integer(amount)?)
    }

    /// Check if coin is zero
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Round to the nearest integer, ties away from zero (`12.5 -> 13`).
pub fn round_to_integer(value: Decimal) -> Result<u128> {
    ensure_non_negative(value)?;
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u128()
        .ok_or_else(|| Error::InvalidAmount(format!("{value} is out of range")))
}

/// Round up to the next integer (`199999.4 -> 200000`).
pub fn ceil_to_integer(value: Decimal) -> Result<u128> {
    ensure_non_negative(value)?;
    value
        .ceil()
        .to_u128()
        .ok_or_else(|| Error::InvalidAmount(format!("{value} is out of range")))
}

fn ensure_non_negative(value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "negative amount {value} not allowed"
        )));
    }
    Ok(())
}

fn is_valid_denom(denom: &str) -> bool {
    if denom.len() < 3 || denom.len() > 128 {
        return false;
    }

    let mut chars = denom.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_coin_creation() {
        let coin = Coin::new("nanolike", 1000).unwrap();
        assert_eq!(coin.denom, "nanolike");
        assert_eq!(coin.amount, 1000);
        assert_eq!(coin.to_string(), "1000nanolike");

        assert!(Coin::new("", 100).is_err());
        assert!(Coin::new("1abc", 100).is_err());
        assert!(Coin::new("ibc/27394FB092D2ECCD", 100).is_ok());
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(Coin::from_decimal("nanolike", dec("12.5")).unwrap().amount, 13);
        assert_eq!(Coin::from_decimal("nanolike", dec("12.4")).unwrap().amount, 12);
        assert_eq!(Coin::from_decimal("nanolike", dec("0.5")).unwrap().amount, 1);
        assert_eq!(Coin::from_decimal("nanolike", dec("7")).unwrap().amount, 7);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = Coin::from_decimal("nanolike", dec("-1")).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
        assert!(ceil_to_integer(dec("-0.1")).is_err());
    }

    #[test]
    fn test_ceil() {
        assert_eq!(ceil_to_integer(dec("199999.4")).unwrap(), 200000);
        assert_eq!(ceil_to_integer(dec("200000")).unwrap(), 200000);
        assert_eq!(ceil_to_integer(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_amount_serializes_as_string() {
        let coin = Coin::new("nanolike", 20_000_000).unwrap();
        let json = serde_json::to_string(&coin).unwrap();
        assert_eq!(json, r#"{"denom":"nanolike","amount":"20000000"}"#);

        let parsed: Coin = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, coin);
    }
}
