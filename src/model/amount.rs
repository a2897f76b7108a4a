//! Amount type for handling monetary values read from, or written to, a sheet.
//!
//! Sheet cells are free text, so an amount may fail to parse. Rather than rejecting the whole row,
//! such a cell becomes a "not a number" amount which poisons any sum it takes part in and renders
//! as `NaN`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Represents a monetary amount that may be "not a number".
///
/// # Examples
///
/// Parsing follows the leading-number rules of a spreadsheet formula bar:
/// ```
/// # use sheet_expenses::model::Amount;
/// let amount = Amount::parse("12.50 for lunch");
/// assert_eq!(amount.to_string(), "12.5");
///
/// let nan = Amount::parse("lunch");
/// assert!(nan.is_nan());
/// assert_eq!(nan.to_string(), "NaN");
/// ```
///
/// NaN is sticky:
/// ```
/// # use sheet_expenses::model::Amount;
/// let total = Amount::parse("10") + Amount::NAN + Amount::parse("5");
/// assert!(total.is_nan());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Amount {
    /// `None` means "not a number".
    value: Option<Decimal>,
}

impl Amount {
    /// The "not a number" amount.
    pub const NAN: Amount = Amount { value: None };

    /// The zero amount.
    pub const ZERO: Amount = Amount {
        value: Some(Decimal::ZERO),
    };

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value: Some(value) }
    }

    /// Returns the underlying Decimal value, or `None` if this amount is not a number.
    pub fn value(&self) -> Option<Decimal> {
        self.value
    }

    /// Returns true if the amount is not a number.
    pub fn is_nan(&self) -> bool {
        self.value.is_none()
    }

    /// Returns true if the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_some_and(|v| v.is_zero())
    }

    /// Parses the longest leading number in `s`, ignoring leading whitespace. Trailing text is
    /// ignored. Yields `NaN` when there is no leading number at all.
    pub fn parse(s: &str) -> Self {
        leading_number(s)
            .and_then(parse_decimal)
            .map(Amount::new)
            .unwrap_or(Amount::NAN)
    }

    /// Returns the amount as a float. `NaN` becomes `f64::NAN`.
    pub fn to_f64(&self) -> f64 {
        self.value
            .and_then(|v| v.to_f64())
            .unwrap_or(f64::NAN)
    }

    /// Formats the amount with exactly `dp` decimal places, e.g. `12.50` for `dp = 2`.
    pub fn fixed(&self, dp: u32) -> String {
        match self.value {
            Some(v) => format!(
                "{:.*}",
                dp as usize,
                v.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
            ),
            None => String::from("NaN"),
        }
    }
}

/// Finds the longest prefix of `s` (after leading whitespace) that looks like a decimal number with
/// an optional sign, fraction and exponent.
fn leading_number(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // The exponent only counts if at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&s[..end])
}

fn parse_decimal(number: &str) -> Option<Decimal> {
    let number = number.strip_prefix('+').unwrap_or(number);
    // "5." and ".5" are valid leading numbers but not valid `Decimal` strings.
    let normalized = match (number.find('.'), number.find(['e', 'E'])) {
        (Some(dot), exp) => {
            let mantissa_end = exp.unwrap_or(number.len());
            let (int, frac) = (&number[..dot], &number[dot + 1..mantissa_end]);
            let int = match int {
                "" => "0",
                "-" => "-0",
                other => other,
            };
            let frac = if frac.is_empty() { "0" } else { frac };
            format!("{int}.{frac}{}", &number[mantissa_end..])
        }
        (None, _) => number.to_string(),
    };
    if normalized.contains(['e', 'E']) {
        Decimal::from_scientific(&normalized.to_ascii_lowercase()).ok()
    } else {
        Decimal::from_str(&normalized).ok()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{}", v.normalize()),
            None => f.write_str("NaN"),
        }
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        match (self.value, rhs.value) {
            (Some(a), Some(b)) => a.checked_add(b).map(Amount::new).unwrap_or(Amount::NAN),
            _ => Amount::NAN,
        }
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        match (self.value, rhs.value) {
            (Some(a), Some(b)) => a.checked_sub(b).map(Amount::new).unwrap_or(Amount::NAN),
            _ => Amount::NAN,
        }
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl Serialize for Amount {
    /// Serializes as a JSON number, or `null` when not a number.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value.and_then(|v| v.to_f64()) {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Accepts a number, a numeric string or `null`.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Number(n) => Amount::parse(&n.to_string()),
            serde_json::Value::String(s) => Amount::parse(&s),
            _ => Amount::NAN,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Amount::parse("50.00").value(), Some(dec("50")));
        assert_eq!(Amount::parse("  7").value(), Some(dec("7")));
        assert_eq!(Amount::parse("-3.25").value(), Some(dec("-3.25")));
    }

    #[test]
    fn test_parse_leading_number_only() {
        assert_eq!(Amount::parse("12abc").value(), Some(dec("12")));
        assert_eq!(Amount::parse("1,000").value(), Some(dec("1")));
        assert_eq!(Amount::parse("3.5.1").value(), Some(dec("3.5")));
    }

    #[test]
    fn test_parse_partial_fractions() {
        assert_eq!(Amount::parse(".5").value(), Some(dec("0.5")));
        assert_eq!(Amount::parse("5.").value(), Some(dec("5")));
        assert_eq!(Amount::parse("-.25").value(), Some(dec("-0.25")));
    }

    #[test]
    fn test_parse_exponent() {
        assert_eq!(Amount::parse("1e3").value(), Some(dec("1000")));
        assert_eq!(Amount::parse("1.5E-1").value(), Some(dec("0.15")));
        // A dangling exponent marker is not part of the number.
        assert_eq!(Amount::parse("2e").value(), Some(dec("2")));
    }

    #[test]
    fn test_parse_nan() {
        assert!(Amount::parse("").is_nan());
        assert!(Amount::parse("abc").is_nan());
        assert!(Amount::parse("$50").is_nan());
        assert!(Amount::parse("-").is_nan());
        assert!(Amount::parse(".").is_nan());
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::parse("40.00").to_string(), "40");
        assert_eq!(Amount::parse("12.50").to_string(), "12.5");
        assert_eq!(Amount::NAN.to_string(), "NaN");
    }

    #[test]
    fn test_fixed() {
        assert_eq!(Amount::parse("100").fixed(2), "100.00");
        assert_eq!(Amount::parse("133.3333").fixed(0), "133");
        assert_eq!(Amount::parse("2.345").fixed(2), "2.35");
        assert_eq!(Amount::NAN.fixed(2), "NaN");
    }

    #[test]
    fn test_sum_propagates_nan() {
        let ok: Amount = [Amount::parse("1.5"), Amount::parse("2")].iter().sum();
        assert_eq!(ok.value(), Some(dec("3.5")));

        let bad: Amount = [Amount::parse("1.5"), Amount::NAN].iter().sum();
        assert!(bad.is_nan());

        let empty: Amount = Vec::<Amount>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_sub() {
        let remaining = Amount::parse("30") - Amount::parse("40");
        assert_eq!(remaining.value(), Some(dec("-10")));
        assert!((Amount::parse("30") - Amount::NAN).is_nan());
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&Amount::parse("40")).unwrap(), "40.0");
        assert_eq!(serde_json::to_string(&Amount::parse("12.5")).unwrap(), "12.5");
        assert_eq!(serde_json::to_string(&Amount::NAN).unwrap(), "null");
    }

    #[test]
    fn test_deserialize() {
        let a: Amount = serde_json::from_str("12.5").unwrap();
        assert_eq!(a.value(), Some(dec("12.5")));
        let b: Amount = serde_json::from_str("\"99\"").unwrap();
        assert_eq!(b.value(), Some(dec("99")));
        let c: Amount = serde_json::from_str("null").unwrap();
        assert!(c.is_nan());
    }
}
