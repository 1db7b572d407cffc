use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::depends::DirtySet;

/// Customer or vendor the invoice is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    /// Display name.
    pub name: String,
    /// Discounting convention agreed with this partner. `None` when the
    /// partner has no preference.
    #[serde(default)]
    pub discounting_type: DiscountingType,
}

/// How the three line discounts combine, and how rounding interacts with
/// tax computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountingType {
    /// No convention set. Lines price like [`DiscountingType::Multiplicative`].
    #[default]
    None,
    /// Discounts compound: `1 - (1-d1)(1-d2)(1-d3)`.
    Multiplicative,
    /// Discounts add up: `d1 + d2 + d3`, capped at 100%.
    Additive,
    /// Discounts compound and the net unit price is rounded to the
    /// currency's minor unit before quantity and taxes apply.
    CashRounding,
}

impl DiscountingType {
    /// Stable snake_case name.
    pub fn code(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Multiplicative => "multiplicative",
            Self::Additive => "additive",
            Self::CashRounding => "cash_rounding",
        }
    }

    /// Parse from the snake_case name. The empty string maps to `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "" | "none" => Some(Self::None),
            "multiplicative" => Some(Self::Multiplicative),
            "additive" => Some(Self::Additive),
            "cash_rounding" => Some(Self::CashRounding),
            _ => None,
        }
    }

    /// True when a convention is actually configured.
    pub fn is_set(&self) -> bool {
        *self != Self::None
    }
}

/// The company issuing (or receiving) the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    /// Company (accounting) currency, ISO 4217.
    pub currency: String,
    /// Where tax amounts get rounded.
    #[serde(default)]
    pub tax_rounding: TaxRounding,
}

/// Tax rounding method of a company.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRounding {
    /// Round the tax of every line, then sum.
    #[default]
    PerLine,
    /// Sum unrounded line taxes per tax, round once.
    Globally,
}

/// Identifier of a tax. Tax groupings are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxId(pub String);

impl std::fmt::Display for TaxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A percentage tax, excluded from the line price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tax {
    pub id: TaxId,
    pub name: String,
    /// Rate in percent (e.g. 19 for 19%).
    pub rate: Decimal,
}

impl Tax {
    pub fn percent(id: impl Into<String>, name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            id: TaxId(id.into()),
            name: name.into(),
            rate,
        }
    }
}

/// Invoice direction and kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceType {
    /// Customer invoice.
    #[default]
    OutInvoice,
    /// Vendor bill.
    InInvoice,
    /// Customer credit note.
    OutRefund,
    /// Vendor credit note.
    InRefund,
}

impl InvoiceType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutInvoice => "out_invoice",
            Self::InInvoice => "in_invoice",
            Self::OutRefund => "out_refund",
            Self::InRefund => "in_refund",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "out_invoice" => Some(Self::OutInvoice),
            "in_invoice" => Some(Self::InInvoice),
            "out_refund" => Some(Self::OutRefund),
            "in_refund" => Some(Self::InRefund),
            _ => None,
        }
    }

    pub fn is_refund(&self) -> bool {
        matches!(self, Self::OutRefund | Self::InRefund)
    }

    /// Ledger sign: -1 for refunds, +1 otherwise.
    pub fn sign(&self) -> Decimal {
        if self.is_refund() {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ONE
        }
    }
}

/// Invoice line with three sequential discounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Line label.
    pub name: String,
    pub quantity: Decimal,
    /// Unit price before any discount.
    pub price_unit: Decimal,
    /// First discount, percent.
    pub discount: Decimal,
    /// Second discount, percent, applied after the first.
    pub discount2: Decimal,
    /// Third discount, percent, applied after the second.
    pub discount3: Decimal,
    /// Discounting convention of this line.
    #[serde(default)]
    pub discounting_type: DiscountingType,
    pub taxes: Vec<Tax>,
    /// Computed: taxable amount after all discounts, in invoice currency.
    pub price_subtotal: Decimal,
    /// Computed: `price_subtotal` plus line taxes.
    pub price_total: Decimal,
    /// Computed: `price_subtotal` in company currency, signed.
    pub price_subtotal_signed: Decimal,
}

/// Stored tax document line, generated from the tax grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTaxLine {
    pub tax_id: TaxId,
    pub name: String,
    /// Taxable base of all lines carrying this tax.
    pub base: Decimal,
    pub amount: Decimal,
    /// Manual rounding adjustment.
    pub amount_rounding: Decimal,
}

impl InvoiceTaxLine {
    /// Amount including the rounding adjustment. Saturates at the decimal
    /// range.
    pub fn amount_total(&self) -> Decimal {
        self.amount.saturating_add(self.amount_rounding)
    }
}

/// Aggregated base and tax amount of one tax across all lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxGroup {
    pub tax_id: TaxId,
    pub name: String,
    pub base: Decimal,
    pub amount: Decimal,
}

/// Tax grouping of one invoice: tax → aggregated amounts. Not stored.
pub type TaxGroups = BTreeMap<TaxId, TaxGroup>;

/// Computed invoice amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAmounts {
    /// Sum of line subtotals.
    pub amount_untaxed: Decimal,
    /// Sum of the tax grouping amounts.
    pub amount_tax: Decimal,
    /// `amount_untaxed + amount_tax`.
    pub amount_total: Decimal,
    /// Untaxed amount in company currency, signed.
    pub amount_untaxed_signed: Decimal,
    /// Total in invoice currency, signed.
    pub amount_total_signed: Decimal,
    /// Total in company currency, signed.
    pub amount_total_company_signed: Decimal,
}

impl std::fmt::Display for InvoiceAmounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "amount_untaxed: {}", self.amount_untaxed)?;
        writeln!(f, "amount_tax: {}", self.amount_tax)?;
        writeln!(f, "amount_total: {}", self.amount_total)?;
        writeln!(f, "amount_untaxed_signed: {}", self.amount_untaxed_signed)?;
        writeln!(f, "amount_total_signed: {}", self.amount_total_signed)?;
        write!(
            f,
            "amount_total_company_signed: {}",
            self.amount_total_company_signed
        )
    }
}

/// Outstanding balance of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Residual {
    /// Unpaid amount in invoice currency.
    pub residual: Decimal,
    pub residual_signed: Decimal,
    /// Unpaid amount in company currency, signed.
    pub residual_company_signed: Decimal,
    /// True once nothing is left to pay.
    pub reconciled: bool,
}

/// Invoice with triple-discount lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub invoice_type: InvoiceType,
    pub partner: Partner,
    pub company: Company,
    /// Invoice currency, ISO 4217.
    pub currency: String,
    /// Invoice date.
    pub date_invoice: Option<NaiveDate>,
    /// Accounting date.
    pub date: Option<NaiveDate>,
    pub lines: Vec<InvoiceLine>,
    pub tax_lines: Vec<InvoiceTaxLine>,
    /// Payments applied so far, in invoice currency.
    pub paid: Decimal,
    /// Set by `compute_amount()`.
    pub amounts: Option<InvoiceAmounts>,
    /// Set by the residual computation at the end of `compute_amount()`.
    pub residual: Option<Residual>,
    #[serde(skip)]
    pub(crate) dirty: DirtySet,
}
