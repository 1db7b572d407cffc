use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use rabatt::core::*;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn services() -> Services {
    Services::with_rates(RateTable::with_base("EUR").rate("USD", test_date(), dec!(1.0873)))
}

fn build_invoice(lines: usize, currency: &str) -> Invoice {
    let modes = [
        DiscountingType::None,
        DiscountingType::Multiplicative,
        DiscountingType::Additive,
        DiscountingType::CashRounding,
    ];
    let taxes = [
        Tax::percent("vat7", "VAT 7%", dec!(7)),
        Tax::percent("vat19", "VAT 19%", dec!(19)),
    ];

    let mut builder = InvoiceBuilder::new("BENCH-001", test_date())
        .partner(PartnerBuilder::new("Kunde AG").build())
        .company(CompanyBuilder::new("Benchmark GmbH", "EUR").build())
        .currency(currency);

    for i in 0..lines {
        builder = builder.add_line(
            InvoiceLineBuilder::new(format!("Item {i}"), Decimal::from(i % 7 + 1), dec!(19.99))
                .discounts(dec!(10), dec!(5), Decimal::from(i % 3))
                .discounting_type(modes[i % modes.len()])
                .tax(taxes[i % taxes.len()].clone())
                .build(),
        );
    }

    builder.build(&services()).unwrap()
}

fn bench_recompute(c: &mut Criterion) {
    let services = services();
    let mut small = build_invoice(10, "EUR");
    let mut big = build_invoice(1000, "USD");

    c.bench_function("recompute_all_10_lines", |b| {
        b.iter(|| small.recompute_all(black_box(&services)).unwrap())
    });

    c.bench_function("recompute_all_1000_lines_foreign", |b| {
        b.iter(|| big.recompute_all(black_box(&services)).unwrap())
    });
}

fn bench_single_write(c: &mut Criterion) {
    let services = services();
    let mut inv = build_invoice(1000, "EUR");
    let mut toggle = false;

    c.bench_function("discount2_write_then_recompute", |b| {
        b.iter(|| {
            toggle = !toggle;
            let value = if toggle { dec!(7.5) } else { dec!(5) };
            inv.set_line(500, LineField::Discount2(value)).unwrap();
            inv.recompute(black_box(&services)).unwrap();
        })
    });
}

fn bench_tax_values(c: &mut Criterion) {
    let services = services();
    let mut inv = build_invoice(1000, "EUR");

    c.bench_function("get_taxes_values_1000_lines", |b| {
        b.iter(|| black_box(inv.get_taxes_values(&services).unwrap()))
    });
}

criterion_group!(benches, bench_recompute, bench_single_write, bench_tax_values);
criterion_main!(benches);
