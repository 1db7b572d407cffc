//! # rabatt
//!
//! Invoice lines with three sequential percentage discounts ("triple
//! discount") and a discounting mode, plus invoice totals that stay in
//! lockstep with the generated tax lines.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Pricing, tax grouping, currency conversion and residual computation are
//! pluggable capabilities bundled in [`core::Services`]; the triple-discount
//! layer composes them and never reimplements them.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rabatt::core::*;
//! use rust_decimal_macros::dec;
//!
//! let services = Services::default();
//! let vat = Tax::percent("vat10", "VAT 10%", dec!(10));
//!
//! let mut invoice = InvoiceBuilder::new("INV/2024/0001", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .partner(PartnerBuilder::new("Kunde AG").build())
//!     .company(CompanyBuilder::new("ACME GmbH", "EUR").build())
//!     .add_line(InvoiceLineBuilder::new("Consulting", dec!(1), dec!(100))
//!         .discounts(dec!(10), dec!(10), dec!(0))
//!         .tax(vat.clone())
//!         .build())
//!     .add_line(InvoiceLineBuilder::new("Hosting", dec!(1), dec!(19))
//!         .tax(vat)
//!         .build())
//!     .build(&services)
//!     .unwrap();
//!
//! let amounts = invoice.amounts.as_ref().unwrap();
//! assert_eq!(invoice.lines[0].price_subtotal, dec!(81.00));
//! assert_eq!(amounts.amount_untaxed, dec!(100.00));
//! assert_eq!(amounts.amount_tax, dec!(10.00));
//! assert_eq!(amounts.amount_total, dec!(110.00));
//! # invoice.recompute(&services).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice model, triple discount, totals, validation |
//! | `json` | Load exchange rate tables from JSON |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
