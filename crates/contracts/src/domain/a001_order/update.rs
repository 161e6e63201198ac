use serde::{Deserialize, Serialize};

use super::PaidAmount;

/// Частичное обновление оплаты заказа (тело PATCH)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    /// Номер заказа, как его ввёл оператор (без пробелов по краям)
    pub order_id: String,

    #[serde(default, skip_serializing_if = "PaidAmount::is_unchanged")]
    pub total_paid: PaidAmount,

    /// Дата оплаты в ISO-8601; отсутствие ключа означает "не менять"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
}

impl UpdateOrderRequest {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            total_paid: PaidAmount::Unchanged,
            payment_date: None,
        }
    }

    pub fn with_total_paid(mut self, total_paid: PaidAmount) -> Self {
        self.total_paid = total_paid;
        self
    }

    pub fn with_payment_date(mut self, payment_date: Option<String>) -> Self {
        self.payment_date = payment_date;
        self
    }
}
