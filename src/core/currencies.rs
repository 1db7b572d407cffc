//! ISO 4217 currency codes and their minor units.
//!
//! Covers the major world currencies. Amounts are rounded to the minor unit
//! of their currency whenever a subtotal, tax or converted amount is stored.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::RabattError;

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    lookup(code).is_some()
}

/// Number of decimal places of the currency's minor unit.
pub fn decimal_places(code: &str) -> Result<u32, RabattError> {
    lookup(code).ok_or_else(|| RabattError::Currency(format!("unknown currency code {code:?}")))
}

/// Round `amount` half-up to the minor unit of `code`.
pub fn round_to_currency(amount: Decimal, code: &str) -> Result<Decimal, RabattError> {
    Ok(round_half_up(amount, decimal_places(code)?))
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
/// The result always carries exactly `dp` decimal places.
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

pub(crate) fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, RabattError> {
    a.checked_add(b)
        .ok_or_else(|| RabattError::Overflow(format!("{a} + {b}")))
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal, RabattError> {
    a.checked_sub(b)
        .ok_or_else(|| RabattError::Overflow(format!("{a} - {b}")))
}

pub(crate) fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, RabattError> {
    a.checked_mul(b)
        .ok_or_else(|| RabattError::Overflow(format!("{a} × {b}")))
}

pub(crate) fn checked_div(a: Decimal, b: Decimal) -> Result<Decimal, RabattError> {
    a.checked_div(b)
        .ok_or_else(|| RabattError::Overflow(format!("{a} / {b}")))
}

pub(crate) fn checked_sum(
    values: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal, RabattError> {
    values.into_iter().try_fold(Decimal::ZERO, checked_add)
}

fn lookup(code: &str) -> Option<u32> {
    CURRENCIES
        .binary_search_by(|(c, _)| c.cmp(&code))
        .ok()
        .map(|i| CURRENCIES[i].1)
}

/// Sorted (code, minor unit) table. Sorted for binary search.
static CURRENCIES: &[(&str, u32)] = &[
    ("AED", 2), // UAE Dirham
    ("AUD", 2), // Australian Dollar
    ("BGN", 2), // Bulgarian Lev
    ("BHD", 3), // Bahraini Dinar
    ("BRL", 2), // Brazilian Real
    ("CAD", 2), // Canadian Dollar
    ("CHF", 2), // Swiss Franc
    ("CLP", 0), // Chilean Peso
    ("CNY", 2), // Chinese Yuan
    ("CZK", 2), // Czech Koruna
    ("DKK", 2), // Danish Krone
    ("EUR", 2), // Euro
    ("GBP", 2), // Pound Sterling
    ("HUF", 2), // Hungarian Forint
    ("INR", 2), // Indian Rupee
    ("ISK", 0), // Icelandic Krona
    ("JPY", 0), // Japanese Yen
    ("KRW", 0), // South Korean Won
    ("KWD", 3), // Kuwaiti Dinar
    ("MXN", 2), // Mexican Peso
    ("NOK", 2), // Norwegian Krone
    ("NZD", 2), // New Zealand Dollar
    ("PLN", 2), // Polish Zloty
    ("RON", 2), // Romanian Leu
    ("SEK", 2), // Swedish Krona
    ("TND", 3), // Tunisian Dinar
    ("TRY", 2), // Turkish Lira
    ("USD", 2), // US Dollar
    ("VND", 0), // Vietnamese Dong
    ("ZAR", 2), // South African Rand
];

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn known_currencies() {
        assert!(is_known_currency_code("EUR"));
        assert!(is_known_currency_code("USD"));
        assert!(is_known_currency_code("JPY"));
        assert!(!is_known_currency_code("XYZ"));
        assert!(!is_known_currency_code("eur"));
    }

    #[test]
    fn minor_units() {
        assert_eq!(decimal_places("EUR").unwrap(), 2);
        assert_eq!(decimal_places("JPY").unwrap(), 0);
        assert_eq!(decimal_places("KWD").unwrap(), 3);
        assert!(decimal_places("EURO").is_err());
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_to_currency(dec!(2.345), "EUR").unwrap(), dec!(2.35));
        assert_eq!(round_to_currency(dec!(-2.345), "EUR").unwrap(), dec!(-2.35));
        assert_eq!(round_to_currency(dec!(1234.5), "JPY").unwrap(), dec!(1235));
        assert_eq!(round_to_currency(dec!(19), "EUR").unwrap().to_string(), "19.00");
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        assert_eq!(checked_sum([dec!(1.5), dec!(2.5)]).unwrap(), dec!(4.0));
        assert!(matches!(
            checked_mul(Decimal::MAX, dec!(2)),
            Err(RabattError::Overflow(_))
        ));
        assert!(matches!(
            checked_sum([Decimal::MAX, Decimal::ONE]),
            Err(RabattError::Overflow(_))
        ));
        assert!(checked_div(Decimal::MAX, dec!(0.5)).is_err());
        assert!(checked_sub(Decimal::MIN, Decimal::ONE).is_err());
    }

    #[test]
    fn list_is_sorted() {
        for window in CURRENCIES.windows(2) {
            assert!(
                window[0].0 < window[1].0,
                "currency codes not sorted: {} >= {}",
                window[0].0,
                window[1].0
            );
        }
    }
}
