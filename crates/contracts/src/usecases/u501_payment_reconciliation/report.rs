use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Результат отправки одной строки
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RowOutcome {
    /// Заказ обновлён, строка удаляется из таблицы
    Updated {
        #[serde(rename = "rowId")]
        row_id: Uuid,
        #[serde(rename = "orderId")]
        order_id: String,
    },

    /// Обновление отклонено или не доставлено, строка остаётся с ошибкой `message`
    Failed {
        #[serde(rename = "rowId")]
        row_id: Uuid,
        #[serde(rename = "orderId")]
        order_id: String,
        message: String,
    },
}

impl RowOutcome {
    pub fn row_id(&self) -> Uuid {
        match self {
            RowOutcome::Updated { row_id, .. } | RowOutcome::Failed { row_id, .. } => *row_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Updated { .. })
    }
}

/// Итог одной пакетной отправки, в порядке отправки
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<RowOutcome>,
}

impl SubmissionReport {
    pub fn push(&mut self, outcome: RowOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Таблица закрывается, только если все строки прошли
    pub fn should_close(&self) -> bool {
        self.failed == 0 && self.succeeded > 0
    }

    pub fn is_partial(&self) -> bool {
        self.failed > 0 && self.succeeded > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updated() -> RowOutcome {
        RowOutcome::Updated {
            row_id: Uuid::new_v4(),
            order_id: "ORD-1".into(),
        }
    }

    fn failed() -> RowOutcome {
        RowOutcome::Failed {
            row_id: Uuid::new_v4(),
            order_id: "ORD-2".into(),
            message: "Order not found".into(),
        }
    }

    #[test]
    fn test_counts_and_close() {
        let mut report = SubmissionReport::default();
        report.push(updated());
        assert!(report.should_close());

        report.push(failed());
        assert_eq!((report.succeeded, report.failed), (1, 1));
        assert!(!report.should_close());
        assert!(report.is_partial());
    }

    #[test]
    fn test_outcome_serialization_tag() {
        let value = serde_json::to_value(failed()).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["message"], "Order not found");
        assert_eq!(value["orderId"], "ORD-2");
    }
}
