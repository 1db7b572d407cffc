use super::pricing::{LinePricing, StandardLinePricing};
use super::rates::{CurrencyConverter, RateTable};
use super::residual::{ResidualComputation, StandardResidual};
use super::taxes::{StandardTaxGrouping, TaxGrouping};

/// The capabilities invoice recomputation composes.
///
/// `Services::default()` uses the standard implementations and an empty
/// rate table, which is enough for invoices in company currency.
pub struct Services {
    pub pricing: Box<dyn LinePricing>,
    pub taxes: Box<dyn TaxGrouping>,
    pub currencies: Box<dyn CurrencyConverter>,
    pub residual: Box<dyn ResidualComputation>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            pricing: Box::new(StandardLinePricing),
            taxes: Box::new(StandardTaxGrouping),
            currencies: Box::new(RateTable::new()),
            residual: Box::new(StandardResidual),
        }
    }
}

impl Services {
    /// Standard services converting with `rates`.
    pub fn with_rates(rates: RateTable) -> Self {
        Self::default().currencies(rates)
    }

    pub fn pricing(mut self, pricing: impl LinePricing + 'static) -> Self {
        self.pricing = Box::new(pricing);
        self
    }

    pub fn taxes(mut self, taxes: impl TaxGrouping + 'static) -> Self {
        self.taxes = Box::new(taxes);
        self
    }

    pub fn currencies(mut self, currencies: impl CurrencyConverter + 'static) -> Self {
        self.currencies = Box::new(currencies);
        self
    }

    pub fn residual(mut self, residual: impl ResidualComputation + 'static) -> Self {
        self.residual = Box::new(residual);
        self
    }
}
