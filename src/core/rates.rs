//! Currency conversion capability and a dated exchange rate table.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currencies::{checked_div, checked_mul, round_to_currency};
use super::error::RabattError;
use super::types::Company;

/// Converts amounts between currencies.
pub trait CurrencyConverter {
    /// Convert `amount` from `from` into `to` at the rate valid on `date`,
    /// rounded to the minor unit of `to`.
    fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
        company: &Company,
        date: NaiveDate,
    ) -> Result<Decimal, RabattError>;
}

/// Exchange rates per currency and date, relative to a common reference.
///
/// A rate says how many units of the currency buy one unit of the
/// reference. The rate valid on a date is the latest one recorded on or
/// before it. The reference currency itself always has rate 1.
///
/// ```
/// use chrono::NaiveDate;
/// use rabatt::core::*;
/// use rust_decimal_macros::dec;
///
/// let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let rates = RateTable::with_base("EUR").rate("USD", jan, dec!(1.25));
/// let company = CompanyBuilder::new("ACME GmbH", "EUR").build();
///
/// let eur = rates.convert(dec!(125), "USD", "EUR", &company, jan).unwrap();
/// assert_eq!(eur, dec!(100.00));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: BTreeMap<String, BTreeMap<NaiveDate, Decimal>>,
}

impl RateTable {
    /// Empty table without a reference currency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table whose reference currency is `base`.
    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            base: Some(base.into()),
            rates: BTreeMap::new(),
        }
    }

    /// Record the rate of `currency` effective from `date`.
    pub fn rate(mut self, currency: impl Into<String>, date: NaiveDate, rate: Decimal) -> Self {
        self.insert(currency, date, rate);
        self
    }

    pub fn insert(&mut self, currency: impl Into<String>, date: NaiveDate, rate: Decimal) {
        self.rates
            .entry(currency.into())
            .or_default()
            .insert(date, rate);
    }

    /// Load a table from JSON:
    /// `{"base": "EUR", "rates": {"USD": {"2024-01-01": "1.10"}}}`.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, RabattError> {
        let table: Self = serde_json::from_str(json)?;
        for (currency, rates) in &table.rates {
            if let Some((date, _)) = rates.iter().find(|(_, r)| **r <= Decimal::ZERO) {
                return Err(RabattError::Currency(format!(
                    "rate of {currency} on {date} must be positive"
                )));
            }
        }
        Ok(table)
    }

    /// Rate of `currency` valid on `date`.
    pub fn rate_at(&self, currency: &str, date: NaiveDate) -> Result<Decimal, RabattError> {
        if self.base.as_deref() == Some(currency) {
            return Ok(Decimal::ONE);
        }
        let rates = self
            .rates
            .get(currency)
            .ok_or_else(|| RabattError::Currency(format!("no rates for {currency}")))?;
        rates
            .range(..=date)
            .next_back()
            .map(|(_, rate)| *rate)
            .ok_or_else(|| RabattError::Currency(format!("no rate for {currency} on {date}")))
    }
}

impl CurrencyConverter for RateTable {
    fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
        _company: &Company,
        date: NaiveDate,
    ) -> Result<Decimal, RabattError> {
        if from == to {
            return round_to_currency(amount, to);
        }
        let from_rate = self.rate_at(from, date)?;
        let to_rate = self.rate_at(to, date)?;
        if from_rate.is_zero() {
            return Err(RabattError::Currency(format!(
                "rate of {from} on {date} is zero"
            )));
        }
        tracing::trace!(%amount, from, to, %date, %from_rate, %to_rate, "converting amount");
        round_to_currency(checked_div(checked_mul(amount, to_rate)?, from_rate)?, to)
    }
}
