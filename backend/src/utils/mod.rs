//! # Utilities Module
//!
//! This module contains helper types and functions used
//! across the backend service.
//!
//! The most important one is [`Money`]: every amount in the system
//! (project targets, raised totals, donations) is held as integer cents
//! and only converted to decimal currency units at the JSON boundary.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An amount of money in US cents.
///
/// ## Wire Format
///
/// Serialized as a JSON number in currency units (`600000`, `25.5`).
/// Deserializes from a number **or** a numeric string, so form values
/// like `"600000"` or `"$1,250.00"` are coerced the way the admin form
/// submits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Whole currency units, e.g. `Money::from_units(25)` is $25.00.
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Convert a decimal amount, rounding to the nearest cent.
    ///
    /// Returns `None` for NaN, infinities and values that do not fit.
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > i64::MAX as f64 / 2.0 {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// Parse a user-entered amount string.
    ///
    /// Accepts optional `$`, thousands separators and surrounding spaces.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use donation_site::utils::Money;
    /// assert_eq!(Money::parse("100.00").unwrap(), Money::from_units(100));
    /// assert_eq!(Money::parse("$1,250.5").unwrap().cents(), 125_050);
    /// ```
    pub fn parse(input: &str) -> Result<Self, String> {
        let cleaned: String = input
            .trim()
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',')
            .collect();

        if cleaned.is_empty() {
            return Err("Amount is empty".to_string());
        }

        let value: f64 = cleaned
            .parse()
            .map_err(|_| format!("Invalid amount: {}", input))?;

        Self::from_decimal(value).ok_or_else(|| format!("Invalid amount: {}", input))
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Amount in currency units.
    pub fn units(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Exact amount in currency units for form fields, e.g. `"423000"` or
    /// `"423000.50"`. [`Money::parse`] reads it back unchanged.
    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        match cents % 100 {
            0 => format!("{}{}", sign, cents / 100),
            frac => format!("{}{}.{:02}", sign, cents / 100, frac),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_usd(*self))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_i64(self.0 / 100)
        } else {
            serializer.serialize_f64(self.units())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount as a number or numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Money)
            .ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_decimal(v).ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse(v).map_err(E::custom)
    }
}

/// Format an amount as whole US dollars with thousands separators.
///
/// Cents are rounded half away from zero, matching how the site
/// renders currency (`$423,000`, `$2,908,323,356`).
pub fn format_usd(amount: Money) -> String {
    let cents = amount.cents();
    let negative = cents < 0;
    let dollars = (cents.unsigned_abs() + 50) / 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Funding progress as a percentage, clamped to 100.
///
/// `min(current / target, 1) * 100`. A zero target counts as fully
/// funded once anything was raised.
pub fn funding_percent(current: Money, target: Money) -> f64 {
    if target.cents() <= 0 {
        return if current.is_positive() { 100.0 } else { 0.0 };
    }
    let ratio = current.cents().max(0) as f64 / target.cents() as f64;
    ratio.min(1.0) * 100.0
}

/// Whole-number progress label (floor of [`funding_percent`]).
///
/// Computed in integer arithmetic so 423,000 of 600,000 is exactly 70.
pub fn funding_percent_label(current: Money, target: Money) -> u32 {
    if target.cents() <= 0 {
        return if current.is_positive() { 100 } else { 0 };
    }
    let current = current.cents().max(0) as i128;
    let percent = current * 100 / target.cents() as i128;
    percent.min(100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(Money::from_units(423_000)), "$423,000");
        assert_eq!(format_usd(Money::from_units(2_908_323_356)), "$2,908,323,356");
        assert_eq!(format_usd(Money::ZERO), "$0");
        assert_eq!(format_usd(Money::from_cents(2_550)), "$26");
        assert_eq!(format_usd(Money::from_units(-5)), "-$5");
    }

    #[test]
    fn test_decimal_string_is_exact() {
        assert_eq!(Money::from_units(423_000).to_decimal_string(), "423000");
        assert_eq!(Money::from_cents(42_300_050).to_decimal_string(), "423000.50");
        assert_eq!(Money::from_cents(-5).to_decimal_string(), "-0.05");

        let amount = Money::from_cents(60_000_050);
        assert_eq!(Money::parse(&amount.to_decimal_string()).unwrap(), amount);
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(Money::parse("100.00").unwrap(), Money::from_units(100));
        assert_eq!(Money::parse("1.5").unwrap().cents(), 150);
        assert_eq!(Money::parse(" $1,000 ").unwrap(), Money::from_units(1_000));
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("NaN").is_err());
    }

    #[test]
    fn test_money_coerces_strings_and_numbers() {
        let from_number: Money = serde_json::from_str("600000").unwrap();
        let from_string: Money = serde_json::from_str("\"600000\"").unwrap();
        let from_float: Money = serde_json::from_str("25.5").unwrap();
        assert_eq!(from_number, Money::from_units(600_000));
        assert_eq!(from_string, from_number);
        assert_eq!(from_float.cents(), 2_550);
    }

    #[test]
    fn test_money_serializes_as_units() {
        assert_eq!(serde_json::to_string(&Money::from_units(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&Money::from_cents(2_550)).unwrap(), "25.5");
    }

    #[test]
    fn test_funding_percent_is_clamped() {
        let target = Money::from_units(600_000);
        assert_eq!(funding_percent_label(Money::from_units(423_000), target), 70);
        assert_eq!(funding_percent(Money::from_units(900_000), target), 100.0);
        assert_eq!(funding_percent(Money::from_units(300_000), target), 50.0);
        assert_eq!(funding_percent_label(Money::from_units(300_000), Money::from_units(300_000)), 100);
    }

    #[test]
    fn test_funding_percent_zero_target() {
        assert_eq!(funding_percent(Money::ZERO, Money::ZERO), 0.0);
        assert_eq!(funding_percent_label(Money::from_units(1), Money::ZERO), 100);
    }
}
