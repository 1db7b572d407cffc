use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::currencies::{checked_sum, is_known_currency_code};
use super::error::{RabattError, ValidationError};
use super::types::*;

/// Validate the inputs of an invoice: currencies and every line.
/// Returns all errors found (not just the first).
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.number.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "number",
            "invoice number must not be empty",
            "BR-02",
        ));
    }
    if !is_known_currency_code(&invoice.currency) {
        errors.push(ValidationError::with_rule(
            "currency",
            format!("unknown currency code {:?}", invoice.currency),
            "BR-05",
        ));
    }
    if !is_known_currency_code(&invoice.company.currency) {
        errors.push(ValidationError::new(
            "company.currency",
            format!("unknown currency code {:?}", invoice.company.currency),
        ));
    }

    for (i, line) in invoice.lines.iter().enumerate() {
        errors.extend(validate_line(line, i));
    }

    errors
}

/// Validate one line: discounts and tax rates are percentages and tax ids
/// are unique.
pub fn validate_line(line: &InvoiceLine, index: usize) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let prefix = format!("lines[{index}]");

    for (field, value) in [
        ("discount", line.discount),
        ("discount2", line.discount2),
        ("discount3", line.discount3),
    ] {
        if value < Decimal::ZERO || value > dec!(100) {
            errors.push(ValidationError::new(
                format!("{prefix}.{field}"),
                format!("discount {value}% must be between 0 and 100"),
            ));
        }
    }

    for (i, tax) in line.taxes.iter().enumerate() {
        if tax.rate.abs() > dec!(100) {
            errors.push(ValidationError::new(
                format!("{prefix}.taxes[{i}].rate"),
                format!("tax {} has rate {}% outside -100..=100", tax.id, tax.rate),
            ));
        }
        if line.taxes[..i].iter().any(|t| t.id == tax.id) {
            errors.push(ValidationError::new(
                format!("{prefix}.taxes[{i}]"),
                format!("tax {} applied twice", tax.id),
            ));
        }
    }

    errors
}

fn display_sum(sum: Option<Decimal>) -> String {
    sum.map_or_else(|| "(overflow)".into(), |v| v.to_string())
}

/// Join validation errors into a single [`RabattError::Validation`].
pub(crate) fn validation_failed(errors: &[ValidationError]) -> RabattError {
    let msg = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    RabattError::Validation(msg)
}

/// Validate computed amounts against their formulas.
pub fn validate_amounts(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let Some(amounts) = &invoice.amounts else {
        errors.push(ValidationError::with_rule(
            "amounts",
            "amounts must be computed before validation (call compute_amount first)",
            "BR-CO-10",
        ));
        return errors;
    };

    // BR-CO-10: Sum of line net amounts
    let expected_untaxed = checked_sum(invoice.lines.iter().map(|l| l.price_subtotal)).ok();
    if Some(amounts.amount_untaxed) != expected_untaxed {
        errors.push(ValidationError::with_rule(
            "amounts.amount_untaxed",
            format!(
                "untaxed amount {} does not match sum of line subtotals {}",
                amounts.amount_untaxed,
                display_sum(expected_untaxed)
            ),
            "BR-CO-10",
        ));
    }

    // BR-CO-14: tax total equals the stored tax documents
    if !invoice.tax_lines.is_empty() {
        let tax_lines_total = checked_sum(
            invoice
                .tax_lines
                .iter()
                .map(InvoiceTaxLine::amount_total),
        )
        .ok();
        if Some(amounts.amount_tax) != tax_lines_total {
            errors.push(ValidationError::with_rule(
                "amounts.amount_tax",
                format!(
                    "tax amount {} does not match sum of tax lines {}",
                    amounts.amount_tax,
                    display_sum(tax_lines_total)
                ),
                "BR-CO-14",
            ));
        }
    }

    // BR-CO-15: total = untaxed + tax
    let expected_total = amounts.amount_untaxed.checked_add(amounts.amount_tax);
    if Some(amounts.amount_total) != expected_total {
        errors.push(ValidationError::with_rule(
            "amounts.amount_total",
            format!(
                "total {} does not match untaxed {} + tax {}",
                amounts.amount_total, amounts.amount_untaxed, amounts.amount_tax
            ),
            "BR-CO-15",
        ));
    }

    let sign = invoice.invoice_type.sign();
    if amounts.amount_total_signed != amounts.amount_total * sign {
        errors.push(ValidationError::new(
            "amounts.amount_total_signed",
            format!(
                "signed total {} does not match total {} for a {} document",
                amounts.amount_total_signed,
                amounts.amount_total,
                invoice.invoice_type.code()
            ),
        ));
    }
    if invoice.currency == invoice.company.currency {
        for (field, signed, plain) in [
            (
                "amounts.amount_untaxed_signed",
                amounts.amount_untaxed_signed,
                amounts.amount_untaxed,
            ),
            (
                "amounts.amount_total_company_signed",
                amounts.amount_total_company_signed,
                amounts.amount_total,
            ),
        ] {
            if signed != plain * sign {
                errors.push(ValidationError::new(
                    field,
                    format!("signed amount {signed} does not match {plain} × {sign}"),
                ));
            }
        }
    }

    errors
}
