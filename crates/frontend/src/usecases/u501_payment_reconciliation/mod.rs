//! u501: bulk payment reconciliation.
//!
//! The operator pastes `order id / amount / date` lines copied from a bank
//! statement or spreadsheet into a grid and submits them. Every line becomes
//! one order update; lines that went through disappear from the grid, lines
//! that failed stay with the error next to them so they can be fixed and
//! resubmitted.

pub mod api;
pub mod model;
pub mod normalize;
pub mod paste;
pub mod submit;
pub mod view;

pub use view::PaymentReconciliationPage;

/// Shown after formatted amounts
pub const CURRENCY_SUFFIX: &str = "đ";
