//! Edge cases: extreme discounts, zero-decimal currencies, global tax rounding.

use chrono::NaiveDate;
use rabatt::core::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn vat19() -> Tax {
    Tax::percent("vat19", "VAT 19%", dec!(19))
}

fn invoice(company: Company, lines: Vec<InvoiceLine>) -> Invoice {
    let mut builder = InvoiceBuilder::new("INV/EDGE", date(2024, 6, 15))
        .partner(PartnerBuilder::new("Kunde AG").build())
        .company(company);
    for line in lines {
        builder = builder.add_line(line);
    }
    builder.build(&Services::default()).unwrap()
}

fn eur() -> Company {
    CompanyBuilder::new("ACME GmbH", "EUR").build()
}

// ---------------------------------------------------------------------------
// Discounts
// ---------------------------------------------------------------------------

#[test]
fn full_discount_gives_zero() {
    let inv = invoice(
        eur(),
        vec![
            InvoiceLineBuilder::new("Gift", dec!(4), dec!(25))
                .discounts(dec!(50), dec!(100), dec!(0))
                .tax(vat19())
                .build(),
        ],
    );
    let amounts = inv.amounts.unwrap();
    assert_eq!(amounts.amount_untaxed, Decimal::ZERO);
    assert_eq!(amounts.amount_tax, Decimal::ZERO);
}

#[test]
fn additive_over_hundred_is_capped() {
    let line = InvoiceLineBuilder::new("Gift", dec!(1), dec!(25))
        .discounts(dec!(60), dec!(50), dec!(0))
        .discounting_type(DiscountingType::Additive)
        .build();
    let inv = invoice(eur(), vec![line]);
    assert_eq!(inv.lines[0].price_subtotal, Decimal::ZERO);
}

#[test]
fn negative_quantity_credits() {
    let inv = invoice(
        eur(),
        vec![
            InvoiceLineBuilder::new("Sale", dec!(2), dec!(50))
                .discounts(dec!(10), dec!(10), dec!(0))
                .tax(vat19())
                .build(),
            InvoiceLineBuilder::new("Return", dec!(-1), dec!(50))
                .discounts(dec!(10), dec!(10), dec!(0))
                .tax(vat19())
                .build(),
        ],
    );
    let amounts = inv.amounts.unwrap();
    // 81.00 − 40.50
    assert_eq!(amounts.amount_untaxed, dec!(40.50));
    // 15.39 − 7.70 (−7.695 rounds away from zero)
    assert_eq!(amounts.amount_tax, dec!(7.69));
    assert_eq!(amounts.amount_total, dec!(48.19));
}

#[test]
fn zero_quantity_line() {
    let inv = invoice(
        eur(),
        vec![
            InvoiceLineBuilder::new("Nothing", dec!(0), dec!(99.99))
                .discounts(dec!(10), dec!(20), dec!(30))
                .tax(vat19())
                .build(),
        ],
    );
    assert_eq!(inv.amounts.unwrap().amount_total, Decimal::ZERO);
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

#[test]
fn zero_decimal_currency() {
    let company = CompanyBuilder::new("ACME KK", "JPY").build();
    let inv = invoice(
        company,
        vec![
            InvoiceLineBuilder::new("Tea", dec!(3), dec!(1234))
                .discounts(dec!(7), dec!(3), dec!(0))
                .tax(Tax::percent("jct10", "JCT 10%", dec!(10)))
                .build(),
        ],
    );
    // 1234 × 0.93 × 0.97 × 3 = 3339.5742
    assert_eq!(inv.lines[0].price_subtotal, dec!(3340));
    let amounts = inv.amounts.unwrap();
    assert_eq!(amounts.amount_tax, dec!(334));
    assert_eq!(amounts.amount_total, dec!(3674));
}

#[test]
fn global_rounding_stays_consistent() {
    let company = CompanyBuilder::new("ACME GmbH", "EUR")
        .tax_rounding(TaxRounding::Globally)
        .build();
    let lines = (0..3)
        .map(|_| {
            InvoiceLineBuilder::new("Screw", dec!(1), dec!(0.35))
                .discounts(dec!(10), dec!(10), dec!(0))
                .tax(vat19())
                .build()
        })
        .collect();
    let inv = invoice(company, lines);

    // 0.35 × 0.81 = 0.2835 → 0.28 per line
    assert_eq!(inv.lines[0].price_subtotal, dec!(0.28));
    let amounts = inv.amounts.as_ref().unwrap();
    assert_eq!(amounts.amount_untaxed, dec!(0.84));
    // 3 × 0.2835 × 0.19 = 0.161595 → 0.16
    assert_eq!(amounts.amount_tax, dec!(0.16));
    assert_eq!(
        amounts.amount_total,
        amounts.amount_untaxed + amounts.amount_tax
    );
}

#[test]
fn cash_rounding_tax_uses_rounded_unit_price() {
    let mut inv = invoice(
        eur(),
        vec![
            InvoiceLineBuilder::new("Widget", dec!(10), dec!(0.99))
                .discounts(dec!(15), dec!(0), dec!(0))
                .discounting_type(DiscountingType::CashRounding)
                .tax(vat19())
                .build(),
        ],
    );
    // 0.99 × 0.85 = 0.8415 → 0.84, × 10
    assert_eq!(inv.lines[0].price_subtotal, dec!(8.40));
    let groups = inv.get_taxes_values(&Services::default()).unwrap();
    assert_eq!(groups[&TaxId("vat19".into())].base, dec!(8.40));
    assert_eq!(groups[&TaxId("vat19".into())].amount, dec!(1.60));
}

// ---------------------------------------------------------------------------
// Overflow
// ---------------------------------------------------------------------------

fn try_invoice(lines: Vec<InvoiceLine>) -> Result<Invoice, RabattError> {
    let mut builder = InvoiceBuilder::new("INV/EDGE", date(2024, 6, 15))
        .partner(PartnerBuilder::new("Kunde AG").build())
        .company(eur());
    for line in lines {
        builder = builder.add_line(line);
    }
    builder.build(&Services::default())
}

#[test]
fn line_amount_overflow_is_an_error() {
    let err = try_invoice(vec![
        InvoiceLineBuilder::new("Huge", dec!(1000000000000000), dec!(1000000000000000)).build(),
    ])
    .unwrap_err();
    assert!(matches!(err, RabattError::Overflow(_)));
}

#[test]
fn tax_overflow_is_an_error() {
    // 1e14 × 1e14 still fits, the tax on it does not
    let err = try_invoice(vec![
        InvoiceLineBuilder::new("Huge", dec!(100000000000000), dec!(100000000000000))
            .tax(vat19())
            .build(),
    ])
    .unwrap_err();
    assert!(matches!(err, RabattError::Overflow(_)));
}

#[test]
fn untaxed_sum_overflow_is_an_error() {
    let huge = || {
        InvoiceLineBuilder::new("Huge", dec!(100000000000000), dec!(500000000000000)).build()
    };
    let err = try_invoice(vec![huge(), huge()]).unwrap_err();
    assert!(matches!(err, RabattError::Overflow(_)));
}

#[test]
fn oversized_tax_rate_fails_validation() {
    let err = try_invoice(vec![
        InvoiceLineBuilder::new("Widget", dec!(1), dec!(10))
            .tax(Tax::percent("vat150", "VAT 150%", dec!(150)))
            .build(),
    ])
    .unwrap_err();
    assert!(matches!(err, RabattError::Validation(_)));
    assert!(err.to_string().contains("lines[0].taxes[0].rate"));
}
