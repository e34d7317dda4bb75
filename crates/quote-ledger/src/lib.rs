//! Pricing and aggregation engine for quotations
//!
//! - [`Ledger`]: ordered line items with validation on insert
//! - [`DerivedTotals`]: per-line and aggregate amounts, recomputed on every read
//! - [`catalog`]: the closed set of services and how their names are composed
//! - [`format`]: the amount formatting every consumer must share

pub mod catalog;
pub mod error;
pub mod format;
pub mod ledger;
pub mod totals;

pub use catalog::{Category, Service, MONTHLY_SUFFIX};
pub use error::{CatalogError, ValidationError};
pub use format::{format_amount, format_currency, format_percent};
pub use ledger::Ledger;
pub use totals::{DerivedTotals, LineAmounts};
