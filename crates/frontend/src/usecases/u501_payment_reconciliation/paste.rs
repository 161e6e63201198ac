//! Spreadsheet paste into the grid.
//!
//! Text copied from Excel / Google Sheets arrives as rows separated by
//! newlines and cells separated by tabs. A block is written starting at the
//! focused cell; the grid grows downwards when the block is taller than the
//! remaining rows, while columns past the last one are dropped.

use super::model::{PaymentRows, RowField};
use super::normalize::amount_digits;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Plain single-cell text: let the input handle the paste itself
    PassThrough,
    /// Block was merged; `rows` replaces the current collection as a whole
    Applied {
        rows: PaymentRows,
        rows_touched: usize,
        rows_added: usize,
    },
}

/// True when the text looks like a copied range rather than a single value
pub fn is_tabular(text: &str) -> bool {
    text.contains('\t') || text.contains('\n')
}

/// Split clipboard text into cells. Blank lines are dropped.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

fn clean_cell(field: RowField, value: &str) -> String {
    match field {
        RowField::Amount => amount_digits(value),
        RowField::OrderId | RowField::Date => value.trim().to_string(),
    }
}

/// Merge pasted text into a copy of `current`, anchored at
/// (`target_row`, `target_col`). `current` itself is never modified.
pub fn apply_paste(
    current: &PaymentRows,
    text: &str,
    target_row: usize,
    target_col: usize,
) -> PasteOutcome {
    if !is_tabular(text) {
        return PasteOutcome::PassThrough;
    }

    let block = parse_tsv(text);
    let mut rows = current.clone();
    let before = rows.len();
    rows.ensure_len(target_row + block.len());

    for (r, cells) in block.iter().enumerate() {
        let row = &mut rows.rows_mut()[target_row + r];
        for (c, value) in cells.iter().enumerate() {
            // Extra columns in the block fall off the right edge
            let Some(field) = RowField::from_column(target_col + c) else {
                break;
            };
            row.set(field, clean_cell(field, value));
        }
    }

    let rows_added = rows.len() - before;
    log::debug!(
        "paste: {} line(s) at row {}, col {}, {} row(s) added",
        block.len(),
        target_row,
        target_col,
        rows_added
    );

    PasteOutcome::Applied {
        rows,
        rows_touched: block.len(),
        rows_added,
    }
}
