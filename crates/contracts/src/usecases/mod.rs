pub mod common;
pub mod u501_payment_reconciliation;
