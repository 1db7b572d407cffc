//! Line pricing capability.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::currencies::{checked_add, checked_mul, round_half_up};
use super::error::RabattError;
use super::rates::CurrencyConverter;
use super::types::{Company, InvoiceLine, InvoiceType};

/// Invoice-level values the line computations read.
pub struct PricingContext<'a> {
    /// Invoice currency.
    pub currency: &'a str,
    /// Minor unit of the invoice currency.
    pub currency_dp: u32,
    pub company: &'a Company,
    pub invoice_type: InvoiceType,
    /// Date exchange rates are taken at.
    pub rate_date: NaiveDate,
    pub currencies: &'a dyn CurrencyConverter,
}

impl PricingContext<'_> {
    /// True when the invoice is not in company currency.
    pub fn is_foreign(&self) -> bool {
        self.currency != self.company.currency
    }

    /// Convert an invoice-currency amount to company currency.
    pub fn to_company(&self, amount: Decimal) -> Result<Decimal, RabattError> {
        if !self.is_foreign() {
            return Ok(amount);
        }
        self.currencies.convert(
            amount,
            self.currency,
            &self.company.currency,
            self.company,
            self.rate_date,
        )
    }
}

/// Computed price fields of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    pub price_subtotal: Decimal,
    pub price_total: Decimal,
    pub price_subtotal_signed: Decimal,
}

/// Computes the price fields of a line from `price_unit`, `quantity`,
/// `discount` and `taxes`.
///
/// Implementations see a single discount only; `discount2` and `discount3`
/// are folded in by the caller.
pub trait LinePricing {
    fn compute_price(
        &self,
        ctx: &PricingContext<'_>,
        line: &InvoiceLine,
    ) -> Result<LinePrice, RabattError>;
}

/// Unit price less discount, times quantity; taxes rounded per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLinePricing;

impl LinePricing for StandardLinePricing {
    fn compute_price(
        &self,
        ctx: &PricingContext<'_>,
        line: &InvoiceLine,
    ) -> Result<LinePrice, RabattError> {
        let price_subtotal = round_half_up(discounted_amount(line)?, ctx.currency_dp);
        let mut price_total = price_subtotal;
        for tax in &line.taxes {
            let amount = checked_mul(price_subtotal, tax.rate)? / dec!(100);
            price_total = checked_add(price_total, round_half_up(amount, ctx.currency_dp))?;
        }
        let price_subtotal_signed = ctx.to_company(price_subtotal)? * ctx.invoice_type.sign();

        Ok(LinePrice {
            price_subtotal,
            price_total,
            price_subtotal_signed,
        })
    }
}

/// `price_unit × (1 − discount/100) × quantity`, unrounded. Reads the raw
/// single-discount inputs only.
pub fn discounted_amount(line: &InvoiceLine) -> Result<Decimal, RabattError> {
    let net = checked_mul(line.price_unit, Decimal::ONE - line.discount / dec!(100))?;
    checked_mul(net, line.quantity)
}
