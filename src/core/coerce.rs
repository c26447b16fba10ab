use crate::core::{Cell, NumericCell};

/// 將儲存格轉為浮點數
///
/// Text has its thousands separators stripped before parsing, numbers pass
/// through, and blank cells become `NaN`. Anything else is reported and
/// marked as unconvertible; this never fails the surrounding build.
pub fn coerce_cell(cell: &Cell) -> NumericCell {
    match cell {
        Cell::Text(text) => {
            let cleaned = text.trim().replace(',', "");
            match cleaned.parse::<f64>() {
                Ok(value) => NumericCell::Numeric(value),
                Err(_) => {
                    tracing::debug!("Could not parse '{}' as a number", text);
                    NumericCell::Unconvertible {
                        type_name: cell.type_name(),
                        original: text.clone(),
                    }
                }
            }
        }
        Cell::Number(value) => NumericCell::Numeric(*value),
        Cell::Empty => NumericCell::Numeric(f64::NAN),
        Cell::Bool(value) => {
            tracing::warn!("⚠️ Encountered unexpected type {}", cell.type_name());
            NumericCell::Unconvertible {
                type_name: cell.type_name(),
                original: value.to_string(),
            }
        }
    }
}

/// Counts the unconvertible cells, for summary logging after a build.
pub fn count_unconvertible<'a>(cells: impl IntoIterator<Item = &'a NumericCell>) -> usize {
    cells
        .into_iter()
        .filter(|c| matches!(c, NumericCell::Unconvertible { .. }))
        .count()
}
