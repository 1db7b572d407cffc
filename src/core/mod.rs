//! Invoice model, triple discount substitution, and invoice amounts.
//!
//! The host capabilities (pricing, tax grouping, currency conversion,
//! residual) are traits with standard implementations; [`Invoice`] composes
//! them with the triple-discount substitution.

mod builder;
pub mod currencies;
pub mod depends;
mod discount;
mod error;
mod invoice;
mod pricing;
mod rates;
mod residual;
mod services;
mod taxes;
mod types;
mod validation;

pub use builder::*;
pub use currencies::{is_known_currency_code, round_to_currency};
pub use depends::DirtySet;
pub use discount::*;
pub use error::*;
pub use invoice::*;
pub use pricing::*;
pub use rates::*;
pub use residual::*;
pub use services::*;
pub use taxes::*;
pub use types::*;
pub use validation::*;
