use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::currencies::is_known_currency_code;
use super::depends::DirtySet;
use super::error::RabattError;
use super::services::Services;
use super::types::*;
use super::validation;

/// Builder for constructing invoices with computed amounts.
///
/// ```
/// use rabatt::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("INV/2024/0001", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .partner(PartnerBuilder::new("Kunde AG")
///         .discounting_type(DiscountingType::Additive)
///         .build())
///     .company(CompanyBuilder::new("ACME GmbH", "EUR").build())
///     .add_line(InvoiceLineBuilder::new("Beratung", dec!(10), dec!(150.00))
///         .discounts(dec!(5), dec!(5), dec!(0))
///         .build())
///     .build(&Services::default())
///     .unwrap();
///
/// assert_eq!(invoice.lines[0].discounting_type, DiscountingType::Additive);
/// assert_eq!(invoice.lines[0].price_subtotal, dec!(1350.00));
/// ```
pub struct InvoiceBuilder {
    number: String,
    invoice_type: InvoiceType,
    partner: Option<Partner>,
    company: Option<Company>,
    currency: Option<String>,
    date_invoice: Option<NaiveDate>,
    date: Option<NaiveDate>,
    lines: Vec<InvoiceLine>,
    paid: Decimal,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, date_invoice: NaiveDate) -> Self {
        Self {
            number: number.into(),
            invoice_type: InvoiceType::OutInvoice,
            partner: None,
            company: None,
            currency: None,
            date_invoice: Some(date_invoice),
            date: None,
            lines: Vec::new(),
            paid: Decimal::ZERO,
        }
    }

    pub fn invoice_type(mut self, invoice_type: InvoiceType) -> Self {
        self.invoice_type = invoice_type;
        self
    }

    pub fn partner(mut self, partner: Partner) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn company(mut self, company: Company) -> Self {
        self.company = Some(company);
        self
    }

    /// Invoice currency. Defaults to the company currency.
    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    /// Accounting date, if it differs from the invoice date.
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn add_line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn paid(mut self, amount: Decimal) -> Self {
        self.paid = amount;
        self
    }

    /// Build the invoice, running validation and computing every amount.
    /// Returns all validation errors (not just the first).
    pub fn build(self, services: &Services) -> Result<Invoice, RabattError> {
        if self.lines.is_empty() {
            return Err(RabattError::Builder(
                "at least one invoice line is required".into(),
            ));
        }
        if self.lines.len() > 10_000 {
            return Err(RabattError::Builder(
                "invoice cannot have more than 10,000 lines".into(),
            ));
        }

        let mut invoice = self.assemble()?;

        let errors = validation::validate_invoice(&invoice);
        if !errors.is_empty() {
            return Err(validation::validation_failed(&errors));
        }

        invoice.recompute_all(services)?;
        Ok(invoice)
    }

    /// Build without validation, for drafts or importing external
    /// data. Amounts are still computed.
    pub fn build_unchecked(self, services: &Services) -> Result<Invoice, RabattError> {
        let mut invoice = self.assemble()?;
        invoice.recompute_all(services)?;
        Ok(invoice)
    }

    fn assemble(self) -> Result<Invoice, RabattError> {
        let partner = self
            .partner
            .ok_or_else(|| RabattError::Builder("partner is required".into()))?;
        let company = self
            .company
            .ok_or_else(|| RabattError::Builder("company is required".into()))?;
        let currency = self.currency.unwrap_or_else(|| company.currency.clone());
        if !is_known_currency_code(&currency) {
            return Err(RabattError::Builder(format!(
                "unknown invoice currency {currency:?}"
            )));
        }

        let mut invoice = Invoice {
            number: self.number,
            invoice_type: self.invoice_type,
            partner,
            company,
            currency,
            date_invoice: self.date_invoice,
            date: self.date,
            lines: Vec::with_capacity(self.lines.len()),
            tax_lines: Vec::new(),
            paid: self.paid,
            amounts: None,
            residual: None,
            dirty: DirtySet::default(),
        };
        for line in self.lines {
            invoice.push_line(line);
        }
        Ok(invoice)
    }
}

/// Builder for Partner.
pub struct PartnerBuilder {
    name: String,
    discounting_type: DiscountingType,
}

impl PartnerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discounting_type: DiscountingType::None,
        }
    }

    pub fn discounting_type(mut self, mode: DiscountingType) -> Self {
        self.discounting_type = mode;
        self
    }

    pub fn build(self) -> Partner {
        Partner {
            name: self.name,
            discounting_type: self.discounting_type,
        }
    }
}

/// Builder for Company.
pub struct CompanyBuilder {
    name: String,
    currency: String,
    tax_rounding: TaxRounding,
}

impl CompanyBuilder {
    pub fn new(name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            currency: currency.into(),
            tax_rounding: TaxRounding::PerLine,
        }
    }

    pub fn tax_rounding(mut self, rounding: TaxRounding) -> Self {
        self.tax_rounding = rounding;
        self
    }

    pub fn build(self) -> Company {
        Company {
            name: self.name,
            currency: self.currency,
            tax_rounding: self.tax_rounding,
        }
    }
}

/// Builder for InvoiceLine.
pub struct InvoiceLineBuilder {
    name: String,
    quantity: Decimal,
    price_unit: Decimal,
    discount: Decimal,
    discount2: Decimal,
    discount3: Decimal,
    discounting_type: DiscountingType,
    taxes: Vec<Tax>,
}

impl InvoiceLineBuilder {
    pub fn new(name: impl Into<String>, quantity: Decimal, price_unit: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            price_unit,
            discount: Decimal::ZERO,
            discount2: Decimal::ZERO,
            discount3: Decimal::ZERO,
            discounting_type: DiscountingType::None,
            taxes: Vec::new(),
        }
    }

    pub fn discount(mut self, percent: Decimal) -> Self {
        self.discount = percent;
        self
    }

    pub fn discount2(mut self, percent: Decimal) -> Self {
        self.discount2 = percent;
        self
    }

    pub fn discount3(mut self, percent: Decimal) -> Self {
        self.discount3 = percent;
        self
    }

    /// Set all three discounts at once.
    pub fn discounts(self, first: Decimal, second: Decimal, third: Decimal) -> Self {
        self.discount(first).discount2(second).discount3(third)
    }

    pub fn discounting_type(mut self, mode: DiscountingType) -> Self {
        self.discounting_type = mode;
        self
    }

    pub fn tax(mut self, tax: Tax) -> Self {
        self.taxes.push(tax);
        self
    }

    pub fn build(self) -> InvoiceLine {
        InvoiceLine {
            name: self.name,
            quantity: self.quantity,
            price_unit: self.price_unit,
            discount: self.discount,
            discount2: self.discount2,
            discount3: self.discount3,
            discounting_type: self.discounting_type,
            taxes: self.taxes,
            price_subtotal: Decimal::ZERO,
            price_total: Decimal::ZERO,
            price_subtotal_signed: Decimal::ZERO,
        }
    }
}
