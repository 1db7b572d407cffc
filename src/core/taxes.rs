//! Tax grouping capability.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::currencies::{checked_add, checked_mul, round_half_up};
use super::error::RabattError;
use super::pricing::{PricingContext, discounted_amount};
use super::types::{InvoiceLine, TaxGroup, TaxGroups, TaxRounding};

/// Aggregates line taxes per tax.
pub trait TaxGrouping {
    fn compute_tax_groups(
        &self,
        ctx: &PricingContext<'_>,
        lines: &[InvoiceLine],
    ) -> Result<TaxGroups, RabattError>;
}

/// Groups by tax id, reading each line's raw `price_unit`, `quantity` and
/// `discount`. Rounds per line or globally as the company dictates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTaxGrouping;

impl TaxGrouping for StandardTaxGrouping {
    fn compute_tax_groups(
        &self,
        ctx: &PricingContext<'_>,
        lines: &[InvoiceLine],
    ) -> Result<TaxGroups, RabattError> {
        let per_line = ctx.company.tax_rounding == TaxRounding::PerLine;
        let mut groups = TaxGroups::new();

        for line in lines {
            let mut base = discounted_amount(line)?;
            if per_line {
                base = round_half_up(base, ctx.currency_dp);
            }
            for tax in &line.taxes {
                if tax.rate.abs() > dec!(100) {
                    return Err(RabattError::Tax(format!(
                        "tax {} has rate {}% outside -100..=100",
                        tax.id, tax.rate
                    )));
                }
                let mut amount = checked_mul(base, tax.rate)? / dec!(100);
                if per_line {
                    amount = round_half_up(amount, ctx.currency_dp);
                }
                let group = groups.entry(tax.id.clone()).or_insert_with(|| TaxGroup {
                    tax_id: tax.id.clone(),
                    name: tax.name.clone(),
                    base: Decimal::ZERO,
                    amount: Decimal::ZERO,
                });
                group.base = checked_add(group.base, base)?;
                group.amount = checked_add(group.amount, amount)?;
            }
        }

        if !per_line {
            for group in groups.values_mut() {
                group.base = round_half_up(group.base, ctx.currency_dp);
                group.amount = round_half_up(group.amount, ctx.currency_dp);
            }
        }

        tracing::trace!(groups = groups.len(), "computed tax groups");
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{CompanyBuilder, InvoiceLineBuilder};
    use crate::core::rates::RateTable;
    use crate::core::types::{Company, InvoiceType, Tax, TaxId};
    use chrono::NaiveDate;

    fn ctx<'a>(company: &'a Company, rates: &'a RateTable) -> PricingContext<'a> {
        PricingContext {
            currency: "EUR",
            currency_dp: 2,
            company,
            invoice_type: InvoiceType::OutInvoice,
            rate_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            currencies: rates,
        }
    }

    fn lines() -> Vec<InvoiceLine> {
        let vat = Tax::percent("vat19", "VAT 19%", dec!(19));
        (0..3)
            .map(|_| {
                InvoiceLineBuilder::new("Widget", dec!(1), dec!(0.02))
                    .tax(vat.clone())
                    .build()
            })
            .collect()
    }

    #[test]
    fn rounds_per_line() {
        let company = CompanyBuilder::new("ACME GmbH", "EUR").build();
        let rates = RateTable::new();
        let groups = StandardTaxGrouping
            .compute_tax_groups(&ctx(&company, &rates), &lines())
            .unwrap();
        let group = &groups[&TaxId("vat19".into())];
        assert_eq!(group.base, dec!(0.06));
        // 0.0038 → 0.00 on every line
        assert_eq!(group.amount, dec!(0.00));
    }

    #[test]
    fn rounds_globally() {
        let company = CompanyBuilder::new("ACME GmbH", "EUR")
            .tax_rounding(TaxRounding::Globally)
            .build();
        let rates = RateTable::new();
        let groups = StandardTaxGrouping
            .compute_tax_groups(&ctx(&company, &rates), &lines())
            .unwrap();
        // 3 × 0.0038 = 0.0114 → 0.01
        assert_eq!(groups[&TaxId("vat19".into())].amount, dec!(0.01));
    }

    #[test]
    fn rejects_malformed_rate() {
        let company = CompanyBuilder::new("ACME GmbH", "EUR").build();
        let rates = RateTable::new();
        let line = InvoiceLineBuilder::new("Widget", dec!(1), dec!(10))
            .tax(Tax::percent("bad", "Bad", dec!(150)))
            .build();
        let err = StandardTaxGrouping
            .compute_tax_groups(&ctx(&company, &rates), &[line])
            .unwrap_err();
        assert!(matches!(err, RabattError::Tax(_)));
    }
}
