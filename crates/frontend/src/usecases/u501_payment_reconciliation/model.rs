use uuid::Uuid;

use super::normalize::amount_digits;

/// Editable column of the grid, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    OrderId,
    Amount,
    Date,
}

impl RowField {
    pub const COLUMNS: [RowField; 3] = [RowField::OrderId, RowField::Amount, RowField::Date];

    pub fn from_column(index: usize) -> Option<Self> {
        Self::COLUMNS.get(index).copied()
    }

    pub fn column(self) -> usize {
        match self {
            RowField::OrderId => 0,
            RowField::Amount => 1,
            RowField::Date => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RowField::OrderId => "Order ID",
            RowField::Amount => "Amount paid",
            RowField::Date => "Payment date (DD-MM-YYYY)",
        }
    }
}

/// One line of the grid: a candidate update of one order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRow {
    pub id: Uuid,
    pub order_id: String,
    /// Digits only, smallest currency unit; empty means "no change"
    pub raw_amount: String,
    pub raw_date: String,
    pub error: Option<String>,
}

impl PaymentRow {
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: String::new(),
            raw_amount: String::new(),
            raw_date: String::new(),
            error: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.order_id.trim().is_empty()
    }

    pub fn get(&self, field: RowField) -> &str {
        match field {
            RowField::OrderId => &self.order_id,
            RowField::Amount => &self.raw_amount,
            RowField::Date => &self.raw_date,
        }
    }

    pub fn set(&mut self, field: RowField, value: String) {
        match field {
            RowField::OrderId => self.order_id = value,
            RowField::Amount => self.raw_amount = value,
            RowField::Date => self.raw_date = value,
        }
    }
}

/// Ordered rows of the grid. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRows {
    rows: Vec<PaymentRow>,
}

impl Default for PaymentRows {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentRows {
    pub fn new() -> Self {
        Self {
            rows: vec![PaymentRow::blank()],
        }
    }

    /// Build from existing rows; an empty list becomes a single blank row
    pub fn from_rows(rows: Vec<PaymentRow>) -> Self {
        if rows.is_empty() {
            Self::new()
        } else {
            Self { rows }
        }
    }

    pub fn rows(&self) -> &[PaymentRow] {
        &self.rows
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, id: Uuid) -> Option<&PaymentRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Append a blank row and return its id
    pub fn add_row(&mut self) -> Uuid {
        let row = PaymentRow::blank();
        let id = row.id;
        self.rows.push(row);
        id
    }

    /// Grow with blank rows until there are at least `count` rows
    pub fn ensure_len(&mut self, count: usize) {
        while self.rows.len() < count {
            self.rows.push(PaymentRow::blank());
        }
    }

    /// Remove a row. The last remaining row is never removed; unknown ids are ignored.
    pub fn remove_row(&mut self, id: Uuid) -> bool {
        if self.rows.len() <= 1 {
            return false;
        }
        let before = self.rows.len();
        self.rows.retain(|r| r.id != id);
        before != self.rows.len()
    }

    /// Replace one field of a row. The row's error stays as it is.
    pub fn update_field(&mut self, id: Uuid, field: RowField, value: String) -> bool {
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Amount cell keystroke handler: only digits are stored
    pub fn set_amount_input(&mut self, id: Uuid, text: &str) -> bool {
        self.update_field(id, RowField::Amount, amount_digits(text))
    }

    pub fn reset_to_single_blank(&mut self) {
        self.rows = vec![PaymentRow::blank()];
    }

    pub(super) fn rows_mut(&mut self) -> &mut Vec<PaymentRow> {
        &mut self.rows
    }

    /// Rows a submission would send (non-blank order id), in grid order
    pub fn pending_rows(&self) -> impl Iterator<Item = &PaymentRow> {
        self.rows.iter().filter(|r| !r.is_blank())
    }

    pub fn pending_count(&self) -> usize {
        self.pending_rows().count()
    }

    /// Sum of amounts of pending rows. Amounts that do not fit in u64 are skipped.
    pub fn pending_total(&self) -> u64 {
        self.pending_rows()
            .filter_map(|r| r.raw_amount.parse::<u64>().ok())
            .fold(0u64, |acc, v| acc.saturating_add(v))
    }

    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|r| r.error.is_some()).count()
    }
}
