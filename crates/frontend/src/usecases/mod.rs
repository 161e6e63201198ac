pub mod u501_payment_reconciliation;
