use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::currencies::{checked_add, checked_sum, decimal_places};
use super::depends::{Attr, DirtySet, InvoiceAttr, LineAttr, TaxLineAttr};
use super::discount::TripleDiscountScope;
use super::error::RabattError;
use super::pricing::PricingContext;
use super::services::Services;
use super::validation::{validate_line, validation_failed};
use super::types::*;

/// A tracked write to an invoice attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceField {
    Partner(Partner),
    Company(Company),
    Currency(String),
    DateInvoice(Option<NaiveDate>),
    Date(Option<NaiveDate>),
    InvoiceType(InvoiceType),
    Paid(Decimal),
}

impl InvoiceField {
    pub fn attr(&self) -> InvoiceAttr {
        match self {
            Self::Partner(_) => InvoiceAttr::Partner,
            Self::Company(_) => InvoiceAttr::Company,
            Self::Currency(_) => InvoiceAttr::Currency,
            Self::DateInvoice(_) => InvoiceAttr::DateInvoice,
            Self::Date(_) => InvoiceAttr::Date,
            Self::InvoiceType(_) => InvoiceAttr::InvoiceType,
            Self::Paid(_) => InvoiceAttr::Paid,
        }
    }
}

/// A tracked write to an invoice line attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum LineField {
    Name(String),
    Quantity(Decimal),
    PriceUnit(Decimal),
    Discount(Decimal),
    Discount2(Decimal),
    Discount3(Decimal),
    DiscountingType(DiscountingType),
    Taxes(Vec<Tax>),
}

impl LineField {
    pub fn attr(&self) -> LineAttr {
        match self {
            Self::Name(_) => LineAttr::Name,
            Self::Quantity(_) => LineAttr::Quantity,
            Self::PriceUnit(_) => LineAttr::PriceUnit,
            Self::Discount(_) => LineAttr::Discount,
            Self::Discount2(_) => LineAttr::Discount2,
            Self::Discount3(_) => LineAttr::Discount3,
            Self::DiscountingType(_) => LineAttr::DiscountingType,
            Self::Taxes(_) => LineAttr::Taxes,
        }
    }

    fn apply(self, line: &mut InvoiceLine) {
        match self {
            Self::Name(v) => line.name = v,
            Self::Quantity(v) => line.quantity = v,
            Self::PriceUnit(v) => line.price_unit = v,
            Self::Discount(v) => line.discount = v,
            Self::Discount2(v) => line.discount2 = v,
            Self::Discount3(v) => line.discount3 = v,
            Self::DiscountingType(v) => line.discounting_type = v,
            Self::Taxes(v) => line.taxes = v,
        }
    }
}

/// A tracked write to a stored tax line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxLineField {
    Amount(Decimal),
    AmountRounding(Decimal),
}

fn pricing_context<'a>(
    currency: &'a str,
    company: &'a Company,
    invoice_type: InvoiceType,
    rate_date: NaiveDate,
    services: &'a Services,
) -> Result<PricingContext<'a>, RabattError> {
    Ok(PricingContext {
        currency,
        currency_dp: decimal_places(currency)?,
        company,
        invoice_type,
        rate_date,
        currencies: services.currencies.as_ref(),
    })
}

impl Invoice {
    /// Discounting convention of the partner (read-only mirror).
    pub fn discounting_type(&self) -> DiscountingType {
        self.partner.discounting_type
    }

    /// Date exchange rates are taken at: the accounting date, else the
    /// invoice date, else today.
    pub fn rate_date(&self) -> NaiveDate {
        self.date
            .or(self.date_invoice)
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Pending recomputations.
    pub fn dirty(&self) -> &DirtySet {
        &self.dirty
    }

    // --- Tracked writes ---

    /// Write an invoice attribute and mark its dependants dirty.
    pub fn set(&mut self, field: InvoiceField) {
        let attr = field.attr();
        match field {
            InvoiceField::Partner(v) => self.partner = v,
            InvoiceField::Company(v) => self.company = v,
            InvoiceField::Currency(v) => self.currency = v,
            InvoiceField::DateInvoice(v) => self.date_invoice = v,
            InvoiceField::Date(v) => self.date = v,
            InvoiceField::InvoiceType(v) => self.invoice_type = v,
            InvoiceField::Paid(v) => self.paid = v,
        }
        self.dirty.mark(Attr::Invoice(attr), None, self.lines.len());
    }

    /// Write a line attribute and mark its dependants dirty.
    ///
    /// A write that would make the line fail [`validate_line`] is rejected
    /// with [`RabattError::Validation`] and leaves the line untouched.
    /// Violations the line already had are not re-reported.
    pub fn set_line(&mut self, index: usize, field: LineField) -> Result<(), RabattError> {
        let count = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(RabattError::NoSuchLine(index))?;
        let attr = field.attr();
        let mut updated = line.clone();
        field.apply(&mut updated);

        let existing = validate_line(line, index);
        let introduced: Vec<_> = validate_line(&updated, index)
            .into_iter()
            .filter(|e| !existing.contains(e))
            .collect();
        if !introduced.is_empty() {
            return Err(validation_failed(&introduced));
        }

        *line = updated;
        self.dirty.mark(Attr::Line(attr), Some(index), count);
        Ok(())
    }

    /// Write a tax line attribute and mark its dependants dirty.
    pub fn set_tax_line(&mut self, index: usize, field: TaxLineField) -> Result<(), RabattError> {
        let tax_line = self
            .tax_lines
            .get_mut(index)
            .ok_or(RabattError::NoSuchTaxLine(index))?;
        let attr = match field {
            TaxLineField::Amount(v) => {
                tax_line.amount = v;
                TaxLineAttr::Amount
            }
            TaxLineField::AmountRounding(v) => {
                tax_line.amount_rounding = v;
                TaxLineAttr::AmountRounding
            }
        };
        self.dirty.mark(Attr::TaxLine(attr), Some(index), self.lines.len());
        Ok(())
    }

    /// Append a line. A line without its own discounting convention takes
    /// the partner's. Lines failing [`validate_line`] are rejected.
    pub fn add_line(&mut self, line: InvoiceLine) -> Result<(), RabattError> {
        let errors = validate_line(&line, self.lines.len());
        if !errors.is_empty() {
            return Err(validation_failed(&errors));
        }
        self.push_line(line);
        Ok(())
    }

    /// Append a line without validation.
    pub(crate) fn push_line(&mut self, mut line: InvoiceLine) {
        if !line.discounting_type.is_set() {
            line.discounting_type = self.partner.discounting_type;
        }
        self.lines.push(line);
        self.dirty.line_added(self.lines.len() - 1);
    }

    pub fn remove_line(&mut self, index: usize) -> Result<InvoiceLine, RabattError> {
        if index >= self.lines.len() {
            return Err(RabattError::NoSuchLine(index));
        }
        let line = self.lines.remove(index);
        self.dirty.line_removed(index);
        Ok(line)
    }

    // --- Interactive changes ---

    /// Select another partner and propagate its discounting convention.
    pub fn change_partner(&mut self, partner: Partner) {
        self.set(InvoiceField::Partner(partner));
        self.propagate_discounting_type();
    }

    /// Select another company and propagate the partner's discounting
    /// convention.
    pub fn change_company(&mut self, company: Company) {
        self.set(InvoiceField::Company(company));
        self.propagate_discounting_type();
    }

    /// Copy the partner's discounting convention onto every line. A partner
    /// without one leaves the lines alone.
    fn propagate_discounting_type(&mut self) {
        let mode = self.partner.discounting_type;
        if !mode.is_set() {
            return;
        }
        tracing::debug!(
            invoice = %self.number,
            mode = mode.code(),
            lines = self.lines.len(),
            "propagating partner discounting type"
        );
        let count = self.lines.len();
        for (index, line) in self.lines.iter_mut().enumerate() {
            if line.discounting_type != mode {
                line.discounting_type = mode;
                self.dirty
                    .mark(Attr::Line(LineAttr::DiscountingType), Some(index), count);
            }
        }
    }

    // --- Computations ---

    /// Recompute the price fields of one line with its three discounts
    /// folded in.
    pub fn compute_line_price(
        &mut self,
        index: usize,
        services: &Services,
    ) -> Result<(), RabattError> {
        let rate_date = self.rate_date();
        let ctx = pricing_context(
            &self.currency,
            &self.company,
            self.invoice_type,
            rate_date,
            services,
        )?;
        let line = self
            .lines
            .get_mut(index)
            .ok_or(RabattError::NoSuchLine(index))?;

        let price = {
            let scope = TripleDiscountScope::enter_line(line, ctx.currency_dp);
            services.pricing.compute_price(&ctx, &scope[0])?
        };

        line.price_subtotal = price.price_subtotal;
        line.price_total = price.price_total;
        line.price_subtotal_signed = price.price_subtotal_signed;
        tracing::trace!(
            index,
            subtotal = %price.price_subtotal,
            mode = line.discounting_type.code(),
            "recomputed line price"
        );

        self.dirty.clear_line(index);
        Ok(())
    }

    /// Recompute the price fields of every line.
    pub fn compute_line_prices(&mut self, services: &Services) -> Result<(), RabattError> {
        for index in 0..self.lines.len() {
            self.compute_line_price(index, services)?;
        }
        Ok(())
    }

    /// Tax grouping over the lines with their three discounts folded in.
    ///
    /// The grouping reads the raw line inputs directly, so without the
    /// substitution its amounts would disagree with the line subtotals.
    pub fn get_taxes_values(&mut self, services: &Services) -> Result<TaxGroups, RabattError> {
        let rate_date = self.rate_date();
        let ctx = pricing_context(
            &self.currency,
            &self.company,
            self.invoice_type,
            rate_date,
            services,
        )?;
        let scope = TripleDiscountScope::enter(&mut self.lines, ctx.currency_dp);
        services.taxes.compute_tax_groups(&ctx, &scope)
    }

    /// Regenerate the stored tax lines from the tax grouping.
    pub fn compute_taxes(&mut self, services: &Services) -> Result<(), RabattError> {
        let groups = self.get_taxes_values(services)?;
        self.tax_lines = groups
            .into_values()
            .map(|group| InvoiceTaxLine {
                tax_id: group.tax_id,
                name: group.name,
                base: group.base,
                amount: group.amount,
                amount_rounding: Decimal::ZERO,
            })
            .collect();
        self.dirty.tax_lines_replaced();
        Ok(())
    }

    /// Recompute the invoice amounts from the line subtotals and the tax
    /// grouping, then the residual.
    pub fn compute_amount(&mut self, services: &Services) -> Result<(), RabattError> {
        let amount_untaxed = checked_sum(self.lines.iter().map(|l| l.price_subtotal))?;
        let amount_tax = checked_sum(
            self.get_taxes_values(services)?
                .values()
                .map(|group| group.amount),
        )?;
        let amount_total = checked_add(amount_untaxed, amount_tax)?;

        let rate_date = self.rate_date();
        let ctx = pricing_context(
            &self.currency,
            &self.company,
            self.invoice_type,
            rate_date,
            services,
        )?;
        let (total_company, untaxed_company) = if ctx.is_foreign() {
            (ctx.to_company(amount_total)?, ctx.to_company(amount_untaxed)?)
        } else {
            (amount_total, amount_untaxed)
        };
        let sign = self.invoice_type.sign();

        let amounts = InvoiceAmounts {
            amount_untaxed,
            amount_tax,
            amount_total,
            amount_untaxed_signed: untaxed_company * sign,
            amount_total_signed: amount_total * sign,
            amount_total_company_signed: total_company * sign,
        };
        let residual = services
            .residual
            .compute_residual(&ctx, &amounts, self.paid)?;

        tracing::debug!(
            invoice = %self.number,
            untaxed = %amounts.amount_untaxed,
            tax = %amounts.amount_tax,
            total = %amounts.amount_total,
            "recomputed invoice amounts"
        );

        self.amounts = Some(amounts);
        self.residual = Some(residual);
        self.dirty.clear_amount();
        self.dirty.clear_residual();
        Ok(())
    }

    /// Recompute the residual from the current amounts.
    pub fn compute_residual(&mut self, services: &Services) -> Result<(), RabattError> {
        let Some(amounts) = self.amounts.clone() else {
            return self.compute_amount(services);
        };
        let rate_date = self.rate_date();
        let ctx = pricing_context(
            &self.currency,
            &self.company,
            self.invoice_type,
            rate_date,
            services,
        )?;
        let residual = services
            .residual
            .compute_residual(&ctx, &amounts, self.paid)?;
        self.residual = Some(residual);
        self.dirty.clear_residual();
        Ok(())
    }

    /// Recompute whatever tracked writes have made stale: dirty lines first,
    /// then the amounts they feed.
    pub fn recompute(&mut self, services: &Services) -> Result<(), RabattError> {
        for index in self.dirty.lines() {
            if index < self.lines.len() {
                self.compute_line_price(index, services)?;
            } else {
                self.dirty.clear_line(index);
            }
        }
        if self.dirty.is_amount_dirty() {
            self.compute_amount(services)?;
        } else if self.dirty.is_residual_dirty() {
            self.compute_residual(services)?;
        }
        Ok(())
    }

    /// Recompute everything regardless of the dirty set.
    pub fn recompute_all(&mut self, services: &Services) -> Result<(), RabattError> {
        self.dirty.mark_all(self.lines.len());
        self.recompute(services)
    }
}
