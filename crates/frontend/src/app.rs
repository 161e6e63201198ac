use crate::usecases::u501_payment_reconciliation::PaymentReconciliationPage;
use leptos::prelude::*;
use thaw::ConfigProvider;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <ConfigProvider>
            <PaymentReconciliationPage />
        </ConfigProvider>
    }
}
