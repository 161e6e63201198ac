pub mod report;

pub use report::{RowOutcome, SubmissionReport};

use crate::usecases::common::UseCaseMetadata;

pub struct PaymentReconciliation;

impl UseCaseMetadata for PaymentReconciliation {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "payment_reconciliation"
    }

    fn display_name() -> &'static str {
        "Payment reconciliation"
    }

    fn description() -> &'static str {
        "Paste order id / amount / date rows from a spreadsheet and update paid amounts in bulk"
    }
}
