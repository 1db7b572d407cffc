//! Dependency declarations of the computed invoice attributes.
//!
//! Every computed attribute lists the attributes it reads. A tracked write
//! ([`Invoice::set`](super::Invoice::set),
//! [`Invoice::set_line`](super::Invoice::set_line),
//! [`Invoice::set_tax_line`](super::Invoice::set_tax_line)) marks each
//! dependant dirty, and [`Invoice::recompute`](super::Invoice::recompute)
//! recomputes what is dirty before anything is read.

use std::collections::BTreeSet;

/// A writable or computed attribute of an invoice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineAttr {
    Name,
    Quantity,
    PriceUnit,
    Discount,
    Discount2,
    Discount3,
    DiscountingType,
    Taxes,
    /// Written by the line price computation.
    PriceSubtotal,
}

/// A writable attribute of a stored tax line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxLineAttr {
    Amount,
    AmountRounding,
}

/// A writable attribute of the invoice itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceAttr {
    Partner,
    Company,
    Currency,
    DateInvoice,
    Date,
    InvoiceType,
    Paid,
}

/// Any attribute a computed attribute can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Line(LineAttr),
    TaxLine(TaxLineAttr),
    Invoice(InvoiceAttr),
}

/// Computed attributes of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Computed {
    /// `price_subtotal`, `price_total`, `price_subtotal_signed` of a line.
    LinePrice,
    /// The invoice amounts (`amount_untaxed`, `amount_tax`, `amount_total`
    /// and their signed variants).
    Amount,
    /// The outstanding balance.
    Residual,
}

/// Attributes the line price computation reads.
pub const LINE_PRICE_DEPENDS: &[Attr] = &[
    Attr::Line(LineAttr::PriceUnit),
    Attr::Line(LineAttr::Quantity),
    Attr::Line(LineAttr::Discount),
    Attr::Line(LineAttr::Discount2),
    Attr::Line(LineAttr::Discount3),
    Attr::Line(LineAttr::DiscountingType),
    Attr::Line(LineAttr::Taxes),
    Attr::Invoice(InvoiceAttr::Currency),
    Attr::Invoice(InvoiceAttr::Company),
    Attr::Invoice(InvoiceAttr::DateInvoice),
    Attr::Invoice(InvoiceAttr::Date),
    Attr::Invoice(InvoiceAttr::InvoiceType),
];

/// Attributes the invoice amount computation reads.
pub const AMOUNT_DEPENDS: &[Attr] = &[
    Attr::Line(LineAttr::PriceSubtotal),
    Attr::TaxLine(TaxLineAttr::Amount),
    Attr::TaxLine(TaxLineAttr::AmountRounding),
    Attr::Invoice(InvoiceAttr::Currency),
    Attr::Invoice(InvoiceAttr::Company),
    Attr::Invoice(InvoiceAttr::DateInvoice),
    Attr::Invoice(InvoiceAttr::InvoiceType),
    Attr::Invoice(InvoiceAttr::Date),
];

/// Attributes the residual computation reads besides the amounts, which
/// always force it.
pub const RESIDUAL_DEPENDS: &[Attr] = &[Attr::Invoice(InvoiceAttr::Paid)];

/// Computed attributes that read `attr`.
pub fn dependants(attr: Attr) -> impl Iterator<Item = Computed> {
    [
        (Computed::LinePrice, LINE_PRICE_DEPENDS),
        (Computed::Amount, AMOUNT_DEPENDS),
        (Computed::Residual, RESIDUAL_DEPENDS),
    ]
    .into_iter()
    .filter(move |(_, deps)| deps.contains(&attr))
    .map(|(computed, _)| computed)
}

/// Pending recomputations of one invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtySet {
    lines: BTreeSet<usize>,
    amount: bool,
    residual: bool,
}

impl DirtySet {
    /// Mark everything reading `attr` dirty. `line` names the written line
    /// for line attributes; invoice attributes dirty all `line_count` lines.
    pub fn mark(&mut self, attr: Attr, line: Option<usize>, line_count: usize) {
        for computed in dependants(attr) {
            match computed {
                Computed::LinePrice => {
                    match (attr, line) {
                        (Attr::Line(_), Some(index)) => {
                            self.lines.insert(index);
                        }
                        _ => self.lines.extend(0..line_count),
                    }
                    // The line price computation writes `price_subtotal`.
                    self.mark(Attr::Line(LineAttr::PriceSubtotal), line, line_count);
                }
                Computed::Amount => {
                    self.amount = true;
                    self.residual = true;
                }
                Computed::Residual => self.residual = true,
            }
        }
    }

    /// A line was appended at `index`.
    pub fn line_added(&mut self, index: usize) {
        self.lines.insert(index);
        self.amount = true;
        self.residual = true;
    }

    /// The line at `index` was removed; later indices shift down by one.
    pub fn line_removed(&mut self, index: usize) {
        self.lines = self
            .lines
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        self.amount = true;
        self.residual = true;
    }

    /// The set of tax lines was replaced.
    pub fn tax_lines_replaced(&mut self) {
        self.mark(Attr::TaxLine(TaxLineAttr::Amount), None, 0);
    }

    /// Mark every computed attribute of an invoice with `line_count` lines.
    pub fn mark_all(&mut self, line_count: usize) {
        self.lines.extend(0..line_count);
        self.amount = true;
        self.residual = true;
    }

    pub fn is_clean(&self) -> bool {
        self.lines.is_empty() && !self.amount && !self.residual
    }

    pub fn is_line_dirty(&self, index: usize) -> bool {
        self.lines.contains(&index)
    }

    pub fn is_amount_dirty(&self) -> bool {
        self.amount
    }

    pub fn is_residual_dirty(&self) -> bool {
        self.residual
    }

    /// Indices of the lines whose price is stale, ascending.
    pub fn lines(&self) -> Vec<usize> {
        self.lines.iter().copied().collect()
    }

    pub(crate) fn clear_line(&mut self, index: usize) {
        self.lines.remove(&index);
    }

    pub(crate) fn clear_amount(&mut self) {
        self.amount = false;
    }

    pub(crate) fn clear_residual(&mut self) {
        self.residual = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount2_dirties_line_and_amount() {
        let mut dirty = DirtySet::default();
        dirty.mark(Attr::Line(LineAttr::Discount2), Some(1), 3);
        assert!(dirty.is_line_dirty(1));
        assert!(!dirty.is_line_dirty(0));
        assert!(dirty.is_amount_dirty());
        assert!(dirty.is_residual_dirty());
    }

    #[test]
    fn currency_dirties_every_line() {
        let mut dirty = DirtySet::default();
        dirty.mark(Attr::Invoice(InvoiceAttr::Currency), None, 3);
        assert!((0..3).all(|i| dirty.is_line_dirty(i)));
        assert!(dirty.is_amount_dirty());
    }

    #[test]
    fn tax_line_rounding_dirties_amount_only() {
        let mut dirty = DirtySet::default();
        dirty.mark(Attr::TaxLine(TaxLineAttr::AmountRounding), Some(0), 2);
        assert!(!dirty.is_line_dirty(0));
        assert!(dirty.is_amount_dirty());
    }

    #[test]
    fn paid_dirties_residual_only() {
        let mut dirty = DirtySet::default();
        dirty.mark(Attr::Invoice(InvoiceAttr::Paid), None, 2);
        assert!(!dirty.is_amount_dirty());
        assert!(dirty.is_residual_dirty());
        assert!(!dirty.is_line_dirty(0));
    }

    #[test]
    fn name_and_partner_dirty_nothing() {
        let mut dirty = DirtySet::default();
        dirty.mark(Attr::Line(LineAttr::Name), Some(0), 1);
        dirty.mark(Attr::Invoice(InvoiceAttr::Partner), None, 1);
        assert!(dirty.is_clean());
    }

    #[test]
    fn amount_trigger_set() {
        let triggers: Vec<_> = AMOUNT_DEPENDS.to_vec();
        assert_eq!(triggers.len(), 8);
        for attr in [
            Attr::Line(LineAttr::PriceSubtotal),
            Attr::TaxLine(TaxLineAttr::Amount),
            Attr::TaxLine(TaxLineAttr::AmountRounding),
            Attr::Invoice(InvoiceAttr::Currency),
            Attr::Invoice(InvoiceAttr::Company),
            Attr::Invoice(InvoiceAttr::DateInvoice),
            Attr::Invoice(InvoiceAttr::InvoiceType),
            Attr::Invoice(InvoiceAttr::Date),
        ] {
            assert!(triggers.contains(&attr), "{attr:?} missing");
            let mut dirty = DirtySet::default();
            dirty.mark(attr, Some(0), 1);
            assert!(dirty.is_amount_dirty(), "{attr:?} does not dirty amounts");
        }
        assert!(!triggers.contains(&Attr::Line(LineAttr::Discount2)));
        assert!(!triggers.contains(&Attr::Invoice(InvoiceAttr::Paid)));
    }

    #[test]
    fn removal_shifts_dirty_lines() {
        let mut dirty = DirtySet::default();
        dirty.mark(Attr::Line(LineAttr::Quantity), Some(0), 4);
        dirty.mark(Attr::Line(LineAttr::Quantity), Some(3), 4);
        dirty.line_removed(1);
        assert!(dirty.is_line_dirty(0));
        assert!(dirty.is_line_dirty(2));
        assert!(!dirty.is_line_dirty(3));
    }
}
