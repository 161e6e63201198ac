//! Batch submission of grid rows.
//!
//! Rows are sent one by one, each call awaited before the next one starts.
//! A failing row never stops the batch: its message is recorded and the
//! loop moves on. The caller gets a [`SubmissionReport`] back and decides
//! how to notify the operator.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use contracts::domain::a001_order::{PaidAmount, UpdateOrderRequest};
use contracts::shared::ApiResponse;
use contracts::usecases::u501_payment_reconciliation::{RowOutcome, SubmissionReport};
use uuid::Uuid;

use super::model::{PaymentRow, PaymentRows};
use super::normalize::{parse_payment_date, DateInput};

/// Row error shown when the request never produced an API answer
pub const TRANSPORT_ERROR_MESSAGE: &str = "Failed to update order";

/// Remote order update.
///
/// `Ok` carries the API envelope, whose `success` flag decides the row's fate.
/// `Err` is a transport failure (network, unreadable body).
#[async_trait(?Send)]
pub trait OrderUpdater {
    async fn update_order(
        &self,
        request: UpdateOrderRequest,
    ) -> Result<ApiResponse<serde_json::Value>, String>;
}

/// Ensures only one batch runs at a time. Shared between the submit button
/// handler and the close controls of the grid.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGate {
    busy: Arc<AtomicBool>,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter `Submitting`. Returns `None` when a batch is already running.
    pub fn try_begin(&self) -> Option<SubmissionGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_submitting(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Back to `Idle` when dropped
#[derive(Debug)]
pub struct SubmissionGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No row has an order id; nothing was sent and the rows are unchanged
    NothingToSubmit,
    /// Another batch is in flight; this trigger was ignored
    AlreadySubmitting,
    Completed {
        rows: PaymentRows,
        report: SubmissionReport,
    },
}

/// Amount cell to payload value: empty leaves the amount alone, zero clears
/// it, anything else is sent as a number.
///
/// Zero is any run of `0` digits, the same value `format_currency` shows as
/// `"0"`.
pub fn resolve_amount(raw: &str) -> Result<PaidAmount, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(PaidAmount::Unchanged);
    }
    if raw.bytes().all(|b| b == b'0') {
        return Ok(PaidAmount::Cleared);
    }
    raw.parse::<u64>()
        .map(PaidAmount::Set)
        .map_err(|_| format!("Invalid amount: {}", raw))
}

/// Payload for one row. Unparseable dates are left out of the request.
pub fn build_request(row: &PaymentRow) -> Result<UpdateOrderRequest, String> {
    let total_paid = resolve_amount(&row.raw_amount)?;
    let date = parse_payment_date(&row.raw_date);
    if date == DateInput::Unparseable {
        log::warn!(
            "order {}: payment date '{}' not recognised, sending without date",
            row.order_id.trim(),
            row.raw_date
        );
    }

    Ok(UpdateOrderRequest::new(row.order_id.trim())
        .with_total_paid(total_paid)
        .with_payment_date(date.wire_value()))
}

async fn submit_row<U>(row: &PaymentRow, updater: &U) -> RowOutcome
where
    U: OrderUpdater + ?Sized,
{
    let order_id = row.order_id.trim().to_string();
    let failed = |message: String| RowOutcome::Failed {
        row_id: row.id,
        order_id: order_id.clone(),
        message,
    };

    let request = match build_request(row) {
        Ok(request) => request,
        Err(message) => {
            log::warn!("order {}: {}", order_id, message);
            return failed(message);
        }
    };

    match updater.update_order(request).await {
        Ok(response) => match response.into_result() {
            Ok(_) => RowOutcome::Updated {
                row_id: row.id,
                order_id: order_id.clone(),
            },
            Err(api_error) => {
                log::warn!("order {}: rejected: {}", order_id, api_error);
                failed(api_error.message)
            }
        },
        Err(cause) => {
            log::error!("order {}: request failed: {}", order_id, cause);
            failed(TRANSPORT_ERROR_MESSAGE.to_string())
        }
    }
}

/// Send every row that has an order id, sequentially.
/// Returns `None` when there is nothing to send.
pub async fn run_batch<U>(rows: &PaymentRows, updater: &U) -> Option<SubmissionReport>
where
    U: OrderUpdater + ?Sized,
{
    let pending: Vec<&PaymentRow> = rows.pending_rows().collect();
    if pending.is_empty() {
        return None;
    }

    log::info!("payment batch: submitting {} row(s)", pending.len());
    let mut report = SubmissionReport::default();
    for row in pending {
        report.push(submit_row(row, updater).await);
    }
    log::info!(
        "payment batch: {} succeeded, {} failed",
        report.succeeded,
        report.failed
    );
    Some(report)
}

/// Write a report back into a collection: updated rows go away, failed rows
/// get their message, every other row loses its previous error. Rows are
/// matched by id, so this can be applied to a collection edited while the
/// batch was running.
pub fn apply_report(current: &PaymentRows, report: &SubmissionReport) -> PaymentRows {
    let mut removed: HashSet<Uuid> = HashSet::new();
    let mut errors: HashMap<Uuid, &str> = HashMap::new();
    for outcome in &report.outcomes {
        match outcome {
            RowOutcome::Updated { .. } => {
                removed.insert(outcome.row_id());
            }
            RowOutcome::Failed { message, .. } => {
                errors.insert(outcome.row_id(), message.as_str());
            }
        }
    }

    let rows = current
        .rows()
        .iter()
        .filter(|r| !removed.contains(&r.id))
        .map(|r| {
            let mut row = r.clone();
            row.error = errors.get(&r.id).map(|message| (*message).to_string());
            row
        })
        .collect();

    PaymentRows::from_rows(rows)
}

/// Full submission: gate, send, reconcile.
pub async fn submit_rows<U>(gate: &SubmissionGate, rows: &PaymentRows, updater: &U) -> SubmitOutcome
where
    U: OrderUpdater + ?Sized,
{
    let Some(_guard) = gate.try_begin() else {
        log::debug!("payment batch already running, trigger ignored");
        return SubmitOutcome::AlreadySubmitting;
    };

    match run_batch(rows, updater).await {
        None => SubmitOutcome::NothingToSubmit,
        Some(report) => SubmitOutcome::Completed {
            rows: apply_report(rows, &report),
            report,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_payment_reconciliation::model::RowField;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    type Reply = Result<ApiResponse<serde_json::Value>, String>;

    /// Records every request and answers from a script (default: success)
    #[derive(Default)]
    struct ScriptedUpdater {
        requests: RefCell<Vec<UpdateOrderRequest>>,
        replies: RefCell<VecDeque<Reply>>,
    }

    impl ScriptedUpdater {
        fn with_replies(replies: Vec<Reply>) -> Self {
            Self {
                requests: RefCell::default(),
                replies: RefCell::new(replies.into()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.borrow().len()
        }

        fn request_json(&self, index: usize) -> serde_json::Value {
            serde_json::to_value(&self.requests.borrow()[index]).unwrap()
        }
    }

    #[async_trait(?Send)]
    impl OrderUpdater for ScriptedUpdater {
        async fn update_order(&self, request: UpdateOrderRequest) -> Reply {
            self.requests.borrow_mut().push(request);
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::ok(serde_json::json!({}))))
        }
    }

    fn grid(lines: &[(&str, &str, &str)]) -> PaymentRows {
        let mut rows = PaymentRows::new();
        rows.ensure_len(lines.len());
        let ids: Vec<Uuid> = rows.rows().iter().map(|r| r.id).collect();
        for (id, (order_id, amount, date)) in ids.into_iter().zip(lines) {
            rows.update_field(id, RowField::OrderId, order_id.to_string());
            rows.update_field(id, RowField::Amount, amount.to_string());
            rows.update_field(id, RowField::Date, date.to_string());
        }
        rows
    }

    #[tokio::test]
    async fn test_middle_row_fails() {
        let rows = grid(&[
            ("ORD-1", "100000", "01-02-2024"),
            ("ORD-2", "200000", "02-02-2024"),
            ("ORD-3", "300000", "03-02-2024"),
        ]);
        let failed_id = rows.rows()[1].id;
        let updater = ScriptedUpdater::with_replies(vec![
            Ok(ApiResponse::ok(serde_json::json!({}))),
            Ok(ApiResponse::fail("Order not found")),
        ]);

        let outcome = submit_rows(&SubmissionGate::new(), &rows, &updater).await;
        let SubmitOutcome::Completed { rows: after, report } = outcome else {
            panic!("expected a completed batch");
        };

        assert_eq!(updater.calls(), 3);
        assert_eq!((report.succeeded, report.failed), (2, 1));
        assert!(!report.should_close());
        assert_eq!(after.len(), 1);
        let row = &after.rows()[0];
        assert_eq!(row.id, failed_id);
        assert_eq!(row.error.as_deref(), Some("Order not found"));
        assert_eq!(row.order_id, "ORD-2");
        assert_eq!(row.raw_amount, "200000");
        assert_eq!(row.raw_date, "02-02-2024");
    }

    #[tokio::test]
    async fn test_transport_error_gets_generic_message() {
        let rows = grid(&[("ORD-1", "5", ""), ("ORD-2", "6", "")]);
        let updater = ScriptedUpdater::with_replies(vec![Err("connection refused".into())]);

        let SubmitOutcome::Completed { rows: after, report } =
            submit_rows(&SubmissionGate::new(), &rows, &updater).await
        else {
            panic!("expected a completed batch");
        };

        assert_eq!(updater.calls(), 2);
        assert_eq!((report.succeeded, report.failed), (1, 1));
        assert_eq!(after.rows()[0].error.as_deref(), Some(TRANSPORT_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_nothing_to_submit() {
        let rows = grid(&[("", "100", "01-01-2024"), ("   ", "", "")]);
        let updater = ScriptedUpdater::default();

        let outcome = submit_rows(&SubmissionGate::new(), &rows, &updater).await;
        assert_eq!(outcome, SubmitOutcome::NothingToSubmit);
        assert_eq!(updater.calls(), 0);
    }

    #[tokio::test]
    async fn test_full_success_resets_to_blank() {
        let rows = grid(&[("ORD-1", "1", ""), ("ORD-2", "2", "")]);
        let updater = ScriptedUpdater::default();

        let SubmitOutcome::Completed { rows: after, report } =
            submit_rows(&SubmissionGate::new(), &rows, &updater).await
        else {
            panic!("expected a completed batch");
        };

        assert!(report.should_close());
        assert_eq!(after.len(), 1);
        assert!(after.rows()[0].is_blank());
        assert!(after.rows()[0].error.is_none());
    }

    #[tokio::test]
    async fn test_blank_rows_survive_and_are_not_sent() {
        let rows = grid(&[("ORD-1", "1", ""), ("", "999", "")]);
        let blank_id = rows.rows()[1].id;
        let updater = ScriptedUpdater::default();

        let SubmitOutcome::Completed { rows: after, .. } =
            submit_rows(&SubmissionGate::new(), &rows, &updater).await
        else {
            panic!("expected a completed batch");
        };

        assert_eq!(updater.calls(), 1);
        assert_eq!(after.len(), 1);
        assert_eq!(after.rows()[0].id, blank_id);
        assert!(after.rows()[0].error.is_none());
    }

    #[tokio::test]
    async fn test_amount_three_states_on_the_wire() {
        let rows = grid(&[
            ("ORD-0", "0", ""),
            ("ORD-E", "", ""),
            ("ORD-S", "50000", ""),
        ]);
        let updater = ScriptedUpdater::default();
        submit_rows(&SubmissionGate::new(), &rows, &updater).await;

        let cleared = updater.request_json(0);
        assert!(cleared["totalPaid"].is_null());
        assert!(cleared.as_object().unwrap().contains_key("totalPaid"));

        let unchanged = updater.request_json(1);
        assert!(!unchanged.as_object().unwrap().contains_key("totalPaid"));

        let set = updater.request_json(2);
        assert_eq!(set["totalPaid"], 50000);
    }

    #[tokio::test]
    async fn test_dates_and_trimmed_order_id() {
        let rows = grid(&[
            ("  ORD-1  ", "", "01-02-2024"),
            ("ORD-2", "", "not-a-date"),
        ]);
        let updater = ScriptedUpdater::default();
        submit_rows(&SubmissionGate::new(), &rows, &updater).await;

        let first = updater.request_json(0);
        assert_eq!(first["orderId"], "ORD-1");
        assert_eq!(first["paymentDate"], "2024-02-01T00:00:00.000Z");

        let second = updater.request_json(1);
        assert!(!second.as_object().unwrap().contains_key("paymentDate"));
    }

    #[tokio::test]
    async fn test_overflowing_amount_fails_locally() {
        let rows = grid(&[("ORD-1", "99999999999999999999999", ""), ("ORD-2", "1", "")]);
        let updater = ScriptedUpdater::default();

        let SubmitOutcome::Completed { rows: after, report } =
            submit_rows(&SubmissionGate::new(), &rows, &updater).await
        else {
            panic!("expected a completed batch");
        };

        assert_eq!(updater.calls(), 1);
        assert_eq!((report.succeeded, report.failed), (1, 1));
        assert!(after.rows()[0]
            .error
            .as_deref()
            .unwrap()
            .starts_with("Invalid amount"));
    }

    #[tokio::test]
    async fn test_gate_blocks_second_batch() {
        let gate = SubmissionGate::new();
        let rows = grid(&[("ORD-1", "1", "")]);
        let updater = ScriptedUpdater::default();

        let guard = gate.try_begin().unwrap();
        assert!(gate.is_submitting());
        assert_eq!(
            submit_rows(&gate, &rows, &updater).await,
            SubmitOutcome::AlreadySubmitting
        );
        assert_eq!(updater.calls(), 0);

        drop(guard);
        assert!(!gate.is_submitting());
        assert!(matches!(
            submit_rows(&gate, &rows, &updater).await,
            SubmitOutcome::Completed { .. }
        ));
        assert!(!gate.is_submitting());
    }

    #[tokio::test]
    async fn test_retry_only_resends_failed_rows() {
        let rows = grid(&[("ORD-1", "1", ""), ("ORD-2", "2", "")]);
        let updater = ScriptedUpdater::with_replies(vec![
            Ok(ApiResponse::fail("Locked")),
        ]);
        let gate = SubmissionGate::new();

        let SubmitOutcome::Completed { rows: after, .. } = submit_rows(&gate, &rows, &updater).await
        else {
            panic!("expected a completed batch");
        };
        submit_rows(&gate, &after, &updater).await;

        assert_eq!(updater.calls(), 3);
        assert_eq!(updater.request_json(2)["orderId"], "ORD-1");
    }

    #[test]
    fn test_apply_report_to_edited_collection() {
        let mut rows = grid(&[("ORD-1", "1", ""), ("ORD-2", "2", "")]);
        let first = rows.rows()[0].id;
        let second = rows.rows()[1].id;
        let added = rows.add_row();

        let mut report = SubmissionReport::default();
        report.push(RowOutcome::Updated {
            row_id: first,
            order_id: "ORD-1".into(),
        });
        report.push(RowOutcome::Failed {
            row_id: second,
            order_id: "ORD-2".into(),
            message: "Locked".into(),
        });

        let after = apply_report(&rows, &report);
        let ids: Vec<Uuid> = after.rows().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second, added]);
        assert_eq!(after.get(second).unwrap().error.as_deref(), Some("Locked"));
    }

    #[tokio::test]
    async fn test_error_cleared_when_row_leaves_batch() {
        let rows = grid(&[("ORD-BAD", "1", ""), ("ORD-OK", "2", "")]);
        let updater =
            ScriptedUpdater::with_replies(vec![Ok(ApiResponse::fail("Order not found"))]);
        let gate = SubmissionGate::new();

        let SubmitOutcome::Completed { rows: mut after, .. } =
            submit_rows(&gate, &rows, &updater).await
        else {
            panic!("expected a completed batch");
        };
        let stale = after.rows()[0].id;
        assert_eq!(after.error_count(), 1);

        after.update_field(stale, RowField::OrderId, String::new());
        let added = after.add_row();
        after.update_field(added, RowField::OrderId, "ORD-NEW".into());

        let SubmitOutcome::Completed { rows: after, report } =
            submit_rows(&gate, &after, &updater).await
        else {
            panic!("expected a completed batch");
        };

        assert_eq!(updater.calls(), 3);
        assert_eq!((report.succeeded, report.failed), (1, 0));
        assert_eq!(after.rows().len(), 1);
        assert!(after.get(stale).unwrap().error.is_none());
        assert_eq!(after.error_count(), 0);
    }

    #[tokio::test]
    async fn test_typed_zeros_clear_the_amount() {
        let mut rows = grid(&[("ORD-1", "", "")]);
        let id = rows.rows()[0].id;
        rows.set_amount_input(id, "00");
        assert_eq!(rows.get(id).unwrap().raw_amount, "0");

        let updater = ScriptedUpdater::default();
        submit_rows(&SubmissionGate::new(), &rows, &updater).await;

        let sent = updater.request_json(0);
        assert!(sent["totalPaid"].is_null());
        assert!(sent.as_object().unwrap().contains_key("totalPaid"));
    }

    #[test]
    fn test_resolve_amount() {
        assert_eq!(resolve_amount(""), Ok(PaidAmount::Unchanged));
        assert_eq!(resolve_amount("0"), Ok(PaidAmount::Cleared));
        assert_eq!(resolve_amount("00"), Ok(PaidAmount::Cleared));
        assert_eq!(resolve_amount("007"), Ok(PaidAmount::Set(7)));
        assert_eq!(resolve_amount("50000"), Ok(PaidAmount::Set(50000)));
        assert!(resolve_amount("12a").is_err());
    }
}
