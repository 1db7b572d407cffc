//! Triple discount substitution.
//!
//! Pricing and tax grouping only understand a single `discount` per line.
//! Before either runs, [`TripleDiscountScope::enter`] folds `discount2` and
//! `discount3` into the inputs they read, according to the line's
//! [`DiscountingType`]. Dropping the scope puts the raw values back, so the
//! substituted state never outlives the call that needed it.

use std::ops::Deref;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::currencies::round_half_up;
use super::types::{DiscountingType, InvoiceLine};

/// Raw pricing inputs of a line, captured before substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountInputs {
    pub price_unit: Decimal,
    pub discount: Decimal,
    pub discount2: Decimal,
    pub discount3: Decimal,
}

impl DiscountInputs {
    fn capture(line: &InvoiceLine) -> Self {
        Self {
            price_unit: line.price_unit,
            discount: line.discount,
            discount2: line.discount2,
            discount3: line.discount3,
        }
    }

    /// Write the captured values back onto `line`.
    pub fn restore(self, line: &mut InvoiceLine) {
        line.price_unit = self.price_unit;
        line.discount = self.discount;
        line.discount2 = self.discount2;
        line.discount3 = self.discount3;
    }
}

/// Single discount equivalent to the three discounts of a line, in percent.
pub fn aggregated_discount(
    mode: DiscountingType,
    discount: Decimal,
    discount2: Decimal,
    discount3: Decimal,
) -> Decimal {
    match mode {
        DiscountingType::Additive => discount
            .saturating_add(discount2)
            .saturating_add(discount3)
            .min(dec!(100)),
        DiscountingType::None
        | DiscountingType::Multiplicative
        | DiscountingType::CashRounding => {
            let remaining = [discount, discount2, discount3]
                .into_iter()
                .fold(Decimal::ONE, |acc, d| {
                    acc.saturating_mul(Decimal::ONE - d / dec!(100))
                });
            Decimal::ONE
                .saturating_sub(remaining)
                .saturating_mul(dec!(100))
        }
    }
}

/// Substitute the pricing inputs of `line` for its discounting mode and
/// return the raw values. `currency_dp` is the minor unit of the invoice
/// currency.
pub fn substitute(line: &mut InvoiceLine, currency_dp: u32) -> DiscountInputs {
    let previous = DiscountInputs::capture(line);
    let total = aggregated_discount(
        line.discounting_type,
        line.discount,
        line.discount2,
        line.discount3,
    );
    match line.discounting_type {
        DiscountingType::CashRounding => {
            let net = line
                .price_unit
                .saturating_mul(Decimal::ONE - total / dec!(100));
            line.price_unit = round_half_up(net, currency_dp);
            line.discount = Decimal::ZERO;
        }
        _ => line.discount = total,
    }
    line.discount2 = Decimal::ZERO;
    line.discount3 = Decimal::ZERO;
    previous
}

/// Lines with their discounts folded into the single-discount inputs.
///
/// Only a shared view is handed out; the raw inputs are restored when the
/// scope is dropped, including on early return or unwinding.
///
/// ```
/// use rabatt::core::*;
/// use rust_decimal_macros::dec;
///
/// let mut lines = vec![InvoiceLineBuilder::new("Widget", dec!(1), dec!(100))
///     .discounts(dec!(10), dec!(10), dec!(0))
///     .build()];
///
/// {
///     let scope = TripleDiscountScope::enter(&mut lines, 2);
///     assert_eq!(scope[0].discount, dec!(19));
///     assert_eq!(scope[0].discount2, dec!(0));
/// }
/// assert_eq!(lines[0].discount, dec!(10));
/// assert_eq!(lines[0].discount2, dec!(10));
/// ```
#[derive(Debug)]
pub struct TripleDiscountScope<'a> {
    lines: &'a mut [InvoiceLine],
    previous: Vec<DiscountInputs>,
}

impl<'a> TripleDiscountScope<'a> {
    pub fn enter(lines: &'a mut [InvoiceLine], currency_dp: u32) -> Self {
        let previous = lines
            .iter_mut()
            .map(|line| substitute(line, currency_dp))
            .collect();
        Self { lines, previous }
    }

    /// Scope over a single line.
    pub fn enter_line(line: &'a mut InvoiceLine, currency_dp: u32) -> Self {
        Self::enter(std::slice::from_mut(line), currency_dp)
    }
}

impl Deref for TripleDiscountScope<'_> {
    type Target = [InvoiceLine];

    fn deref(&self) -> &Self::Target {
        self.lines
    }
}

impl Drop for TripleDiscountScope<'_> {
    fn drop(&mut self) {
        for (line, previous) in self.lines.iter_mut().zip(self.previous.drain(..)) {
            previous.restore(line);
        }
    }
}
