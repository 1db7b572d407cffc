//! Outstanding balance capability.

use rust_decimal::Decimal;

use super::currencies::checked_sub;
use super::error::RabattError;
use super::pricing::PricingContext;
use super::types::{InvoiceAmounts, Residual};

/// Computes what is left to pay on an invoice.
pub trait ResidualComputation {
    fn compute_residual(
        &self,
        ctx: &PricingContext<'_>,
        amounts: &InvoiceAmounts,
        paid: Decimal,
    ) -> Result<Residual, RabattError>;
}

/// `amount_total − paid`, converted and signed like the totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardResidual;

impl ResidualComputation for StandardResidual {
    fn compute_residual(
        &self,
        ctx: &PricingContext<'_>,
        amounts: &InvoiceAmounts,
        paid: Decimal,
    ) -> Result<Residual, RabattError> {
        let residual = checked_sub(amounts.amount_total, paid)?;
        let sign = ctx.invoice_type.sign();
        Ok(Residual {
            residual,
            residual_signed: residual * sign,
            residual_company_signed: ctx.to_company(residual)? * sign,
            reconciled: residual.is_zero(),
        })
    }
}
