use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_payment_reconciliation::{PaymentReconciliation, SubmissionReport};
use gloo_timers::callback::Timeout;
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;
use uuid::Uuid;

use super::api::HttpOrderUpdater;
use super::model::{PaymentRows, RowField};
use super::normalize::{format_currency, format_date_display, parse_payment_date, DateInput};
use super::paste::{apply_paste, PasteOutcome};
use super::submit::{apply_report, submit_rows, SubmissionGate, SubmitOutcome};
use super::CURRENCY_SUFFIX;
use crate::shared::modal::Modal;

/// How long a notice stays on screen
const NOTICE_TIMEOUT_MS: u32 = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    fn css_class(self) -> &'static str {
        match self {
            NoticeKind::Info => "notice notice--info",
            NoticeKind::Success => "notice notice--success",
            NoticeKind::Warning => "notice notice--warning",
            NoticeKind::Error => "notice notice--error",
        }
    }
}

/// Message shown above the page after a submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

pub fn nothing_to_submit_notice() -> Notice {
    Notice::new(
        NoticeKind::Info,
        "Nothing to submit: enter an order ID in at least one row",
    )
}

pub fn notice_for(report: &SubmissionReport) -> Notice {
    match (report.succeeded, report.failed) {
        (succeeded, 0) => Notice::new(
            NoticeKind::Success,
            format!("Updated {} order(s)", succeeded),
        ),
        (0, failed) => Notice::new(
            NoticeKind::Error,
            format!("{} order(s) could not be updated, see the row errors", failed),
        ),
        (succeeded, failed) => Notice::new(
            NoticeKind::Warning,
            format!(
                "Updated {} order(s), {} failed. Fix the highlighted rows and submit again",
                succeeded, failed
            ),
        ),
    }
}

#[component]
pub fn PaymentReconciliationPage() -> impl IntoView {
    let rows = RwSignal::new(PaymentRows::new());
    let (is_open, set_is_open) = signal(false);
    let (is_submitting, set_is_submitting) = signal(false);
    let locked = Signal::from(is_submitting);
    let gate = SubmissionGate::new();

    let notice = RwSignal::new(Option::<Notice>::None);
    let notice_timer = StoredValue::new_local(Option::<Timeout>::None);

    // Replacing the stored Timeout drops the previous one, which cancels it
    let show_notice = move |value: Notice| {
        notice.set(Some(value));
        let timeout = Timeout::new(NOTICE_TIMEOUT_MS, move || notice.set(None));
        notice_timer.set_value(Some(timeout));
    };
    let dismiss_notice = move || {
        notice_timer.set_value(None);
        notice.set(None);
    };

    let close_grid = {
        let gate = gate.clone();
        Callback::new(move |_: ()| {
            if gate.is_submitting() {
                return;
            }
            rows.update(|r| r.reset_to_single_blank());
            set_is_open.set(false);
        })
    };

    let submit = Callback::new(move |_: ()| {
        if gate.is_submitting() {
            return;
        }
        let gate = gate.clone();
        let snapshot = rows.get_untracked();
        set_is_submitting.set(true);

        spawn_local(async move {
            match submit_rows(&gate, &snapshot, &HttpOrderUpdater).await {
                SubmitOutcome::AlreadySubmitting => return,
                SubmitOutcome::NothingToSubmit => show_notice(nothing_to_submit_notice()),
                SubmitOutcome::Completed { report, .. } => {
                    rows.update(|current| *current = apply_report(current, &report));
                    show_notice(notice_for(&report));
                    if report.should_close() {
                        rows.update(|r| r.reset_to_single_blank());
                        set_is_open.set(false);
                    }
                }
            }
            set_is_submitting.set(false);
        });
    });

    view! {
        <div id=PaymentReconciliation::full_name() class="page">
            <div class="page__header">
                <h1 class="page__title">{PaymentReconciliation::display_name()}</h1>
                <p class="page__description">{PaymentReconciliation::description()}</p>
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=move |_| set_is_open.set(true)
                >
                    "Bulk payment entry"
                </Button>
            </div>

            {move || notice.get().map(|n| view! {
                <div class=n.kind.css_class()>
                    <span>{n.text}</span>
                    <button class="button button--icon" on:click=move |_| dismiss_notice()>
                        "✕"
                    </button>
                </div>
            })}

            <Show when=move || is_open.get()>
                <Modal
                    title=PaymentReconciliation::display_name()
                    on_close=close_grid
                    close_locked=locked
                >
                    <p class="payment-grid__hint">
                        "Paste a range from Excel or Google Sheets: order ID, amount, payment date."
                    </p>
                    <PaymentGrid rows=rows locked=locked />
                    <PaymentGridFooter rows=rows locked=locked on_submit=submit />
                </Modal>
            </Show>
        </div>
    }
}

#[component]
pub fn PaymentGrid(rows: RwSignal<PaymentRows>, #[prop(into)] locked: Signal<bool>) -> impl IntoView {
    view! {
        <table class="table payment-grid">
            <thead>
                <tr>
                    <th class="payment-grid__index">"#"</th>
                    {RowField::COLUMNS
                        .iter()
                        .map(|field| view! { <th>{field.title()}</th> })
                        .collect_view()}
                    <th></th>
                </tr>
            </thead>
            <tbody>
                <For
                    each=move || rows.with(|r| r.rows().iter().map(|row| row.id).collect::<Vec<_>>())
                    key=|id| *id
                    children=move |id| view! { <PaymentGridRow id=id rows=rows locked=locked /> }
                />
            </tbody>
        </table>
    }
}

/// One grid line. Cells read the row by id, so the inputs keep focus while
/// the collection around them changes.
#[component]
fn PaymentGridRow(id: Uuid, rows: RwSignal<PaymentRows>, locked: Signal<bool>) -> impl IntoView {
    let field_value = move |field: RowField| {
        rows.with(|r| {
            r.get(id)
                .map(|row| row.get(field).to_string())
                .unwrap_or_default()
        })
    };
    let row_error = move || rows.with(|r| r.get(id).and_then(|row| row.error.clone()));
    let can_remove = move || !locked.get() && rows.with(|r| r.len() > 1);

    let on_paste = move |field: RowField, ev: ev::ClipboardEvent| {
        let Some(text) = ev
            .clipboard_data()
            .and_then(|data| data.get_data("text/plain").ok())
        else {
            return;
        };
        let Some(row_index) = rows.with_untracked(|r| r.position(id)) else {
            return;
        };
        let outcome = rows.with_untracked(|r| apply_paste(r, &text, row_index, field.column()));
        if let PasteOutcome::Applied { rows: merged, .. } = outcome {
            ev.prevent_default();
            rows.set(merged);
        }
    };

    let date_hint = move || match parse_payment_date(&field_value(RowField::Date)) {
        DateInput::Parsed(dt) => Some(("payment-grid__date-hint", format_date_display(&dt))),
        DateInput::Unparseable => Some((
            "payment-grid__date-hint payment-grid__date-hint--warning",
            "Not recognised, date will not be changed".to_string(),
        )),
        DateInput::Empty => None,
    };

    view! {
        <tr class=move || {
            if row_error().is_some() {
                "payment-grid__row payment-grid__row--error"
            } else {
                "payment-grid__row"
            }
        }>
            <td class="payment-grid__index">
                {move || rows.with(|r| r.position(id).map(|p| p + 1))}
            </td>
            <td>
                <input
                    type="text"
                    class="payment-grid__input"
                    placeholder="ORD-..."
                    prop:value=move || field_value(RowField::OrderId)
                    disabled=move || locked.get()
                    on:input=move |ev| {
                        rows.update(|r| {
                            r.update_field(id, RowField::OrderId, event_target_value(&ev));
                        });
                    }
                    on:paste=move |ev| on_paste(RowField::OrderId, ev)
                />
            </td>
            <td>
                <input
                    type="text"
                    inputmode="numeric"
                    class="payment-grid__input payment-grid__input--amount"
                    placeholder="0"
                    prop:value=move || format_currency(&field_value(RowField::Amount))
                    disabled=move || locked.get()
                    on:input=move |ev| {
                        rows.update(|r| {
                            r.set_amount_input(id, &event_target_value(&ev));
                        });
                    }
                    on:paste=move |ev| on_paste(RowField::Amount, ev)
                />
            </td>
            <td>
                <input
                    type="text"
                    class="payment-grid__input"
                    placeholder="DD-MM-YYYY"
                    prop:value=move || field_value(RowField::Date)
                    disabled=move || locked.get()
                    on:input=move |ev| {
                        rows.update(|r| {
                            r.update_field(id, RowField::Date, event_target_value(&ev));
                        });
                    }
                    on:paste=move |ev| on_paste(RowField::Date, ev)
                />
                {move || date_hint().map(|(class, text)| view! { <div class=class>{text}</div> })}
            </td>
            <td>
                <button
                    class="button button--icon"
                    title="Remove row"
                    disabled=move || !can_remove()
                    on:click=move |_| {
                        rows.update(|r| {
                            r.remove_row(id);
                        });
                    }
                >
                    "🗑"
                </button>
            </td>
        </tr>
        {move || row_error().map(|message| view! {
            <tr class="payment-grid__error-row">
                <td></td>
                <td colspan="4" class="payment-grid__error">{message}</td>
            </tr>
        })}
    }
}

#[component]
fn PaymentGridFooter(
    rows: RwSignal<PaymentRows>,
    locked: Signal<bool>,
    on_submit: Callback<()>,
) -> impl IntoView {
    let summary = move || {
        rows.with(|r| {
            format!(
                "{} order(s), total {} {}",
                r.pending_count(),
                format_currency(&r.pending_total().to_string()),
                CURRENCY_SUFFIX
            )
        })
    };
    let error_summary = move || {
        let count = rows.with(|r| r.error_count());
        (count > 0).then(|| format!("{} row(s) with errors", count))
    };

    view! {
        <div class="payment-grid__footer">
            <div class="payment-grid__summary">
                <span>{summary}</span>
                {move || error_summary().map(|text| view! {
                    <span class="payment-grid__summary-errors">{text}</span>
                })}
            </div>
            <Flex gap=FlexGap::Small align=FlexAlign::Center>
                <Button
                    appearance=ButtonAppearance::Secondary
                    disabled=locked
                    on_click=move |_| {
                        rows.update(|r| {
                            r.add_row();
                        });
                    }
                >
                    "+ Add row"
                </Button>
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=locked
                    on_click=move |_| on_submit.run(())
                >
                    {move || if locked.get() { "Submitting..." } else { "Submit" }}
                </Button>
            </Flex>
        </div>
    }
}
