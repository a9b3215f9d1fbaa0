//! Bulk clipboard paste.
//!
//! Clipboard text is split into lines and routed, one line per row, into the
//! rendered cells of a single column starting at the pasted-into cell. Each
//! value runs through the column's paste validator (if any) and then type
//! coercion. Rejected values write the type default and mark the cell
//! invalid with the original text; accepted values clear any earlier mark.

use std::collections::HashMap;

use lumex_grid_core::logging::targets;

use super::cell::CellIdentity;
use super::column::Column;
use super::row::Row;
use super::value::{CellData, Coercion};

/// Splits clipboard text into trimmed lines.
///
/// `\r\n`, `\n` and `\r` all end a line. A single trailing empty line left by
/// a terminating line break is dropped.
pub fn split_clipboard_lines(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = normalized.split('\n').map(|line| line.trim().to_string()).collect();
    if lines.len() > 1 && normalized.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// What happened to one pasted value.
#[derive(Debug, Clone, PartialEq)]
pub enum PasteCellOutcome {
    /// The value was accepted and written.
    Applied(CellData),
    /// The value was rejected; the type default was written.
    Invalid,
}

/// Summary of a paste operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PasteReport {
    /// Cells that received a valid value.
    pub applied: usize,
    /// Cells marked invalid.
    pub invalid: usize,
    /// Lines with no rendered cell to land in.
    pub dropped: usize,
    /// Whether the grid has no invalid cells after the paste.
    pub grid_valid: bool,
}

/// Invalid-cell bookkeeping for pasteable columns.
pub struct PasteEngine<T> {
    invalid_cells: HashMap<CellIdentity<T>, String>,
}

impl<T> Default for PasteEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PasteEngine<T> {
    /// Creates an engine with no invalid cells.
    pub fn new() -> Self {
        Self {
            invalid_cells: HashMap::new(),
        }
    }

    /// Returns `true` if no cell is invalid.
    pub fn is_valid(&self) -> bool {
        self.invalid_cells.is_empty()
    }

    /// Returns `true` if `identity` holds a rejected value.
    pub fn is_invalid(&self, identity: &CellIdentity<T>) -> bool {
        self.invalid_cells.contains_key(identity)
    }

    /// The original text pasted into an invalid cell.
    pub fn invalid_value(&self, identity: &CellIdentity<T>) -> Option<&str> {
        self.invalid_cells.get(identity).map(String::as_str)
    }

    /// Number of invalid cells.
    pub fn invalid_count(&self) -> usize {
        self.invalid_cells.len()
    }

    /// Clears the invalid mark of one cell.
    pub fn clear_invalid(&mut self, identity: &CellIdentity<T>) -> bool {
        self.invalid_cells.remove(identity).is_some()
    }

    /// Clears every invalid mark.
    pub fn clear_all(&mut self) {
        self.invalid_cells.clear();
    }

    /// Pastes one value into the cell `identity` of `column`.
    pub fn paste_value(&mut self, column: &Column<T>, identity: &CellIdentity<T>, text: &str) -> PasteCellOutcome {
        let row = identity.row();

        let candidate = match column.paste_validator() {
            Some(validator) => {
                let verdict = validator(&row.read(), text);
                verdict.valid.then_some(verdict.coerced)
            }
            None => Some(text.to_string()),
        };

        let value = candidate.and_then(|candidate| match column.value_type().coerce(&candidate) {
            Coercion::Value(value) => Some(value),
            Coercion::Cleared => Some(CellData::None),
            Coercion::Invalid => None,
        });

        match value {
            Some(value) => {
                column.write(row, value.clone());
                self.invalid_cells.remove(identity);
                PasteCellOutcome::Applied(value)
            }
            None => {
                tracing::debug!(
                    target: targets::PASTE,
                    column = identity.column_index(),
                    value = text,
                    "pasted value rejected"
                );
                column.write(row, column.value_type().default_value());
                self.invalid_cells.insert(identity.clone(), text.to_string());
                PasteCellOutcome::Invalid
            }
        }
    }
}

/// Maps pasted lines onto the rendered rows of a column.
///
/// Line `i` lands on the rendered row at `start + i`. Returns the targeted
/// pairs and the number of lines with no row to land in.
pub fn paste_targets<'a, T>(
    rendered: &[Row<T>],
    start: usize,
    lines: &'a [String],
) -> (Vec<(Row<T>, &'a str)>, usize) {
    let available = rendered.len().saturating_sub(start);
    let pairs = rendered
        .iter()
        .skip(start)
        .zip(lines)
        .map(|(row, line)| (row.clone(), line.as_str()))
        .collect();
    (pairs, lines.len().saturating_sub(available))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::column::PasteVerdict;
    use crate::grid::value::ValueType;

    fn amount_column() -> Column<f64> {
        let column = Column::pasteable(
            "Amount",
            ValueType::Numeric,
            |v: &f64| CellData::from(*v),
            |v: &mut f64, value| *v = value.as_float().unwrap_or(-1.0),
        );
        column.set_index(Some(0));
        column
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_clipboard_lines("a\r\nb\rc\n"), ["a", "b", "c"]);
        assert_eq!(split_clipboard_lines(" 1 \n\n2"), ["1", "", "2"]);
        assert_eq!(split_clipboard_lines(""), [""]);
        assert_eq!(split_clipboard_lines("x\n\n"), ["x", ""]);
    }

    #[test]
    fn test_targets_drop_overflow() {
        let rendered: Vec<Row<f64>> = (0..5).map(|i| Row::new(i as f64)).collect();
        let lines: Vec<String> = ["a", "b", "c"].map(String::from).to_vec();

        let (targets, dropped) = paste_targets(&rendered, 1, &lines);
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].0, rendered[1]);
        assert_eq!(targets[2].0, rendered[3]);
        assert_eq!(dropped, 0);

        let (targets, dropped) = paste_targets(&rendered, 4, &lines);
        assert_eq!(targets.len(), 1);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_numeric_coercion() {
        let column = amount_column();
        let mut engine = PasteEngine::new();
        let row = Row::new(5.0);
        let identity = CellIdentity::new(row.clone(), 0);

        assert_eq!(engine.paste_value(&column, &identity, "abc"), PasteCellOutcome::Invalid);
        assert_eq!(*row.read(), 0.0);
        assert_eq!(engine.invalid_value(&identity), Some("abc"));
        assert!(!engine.is_valid());

        assert_eq!(
            engine.paste_value(&column, &identity, "42"),
            PasteCellOutcome::Applied(CellData::Float(42.0))
        );
        assert_eq!(*row.read(), 42.0);
        assert!(!engine.is_invalid(&identity));

        assert_eq!(
            engine.paste_value(&column, &identity, ""),
            PasteCellOutcome::Applied(CellData::None)
        );
        assert!(engine.is_valid());
    }

    #[test]
    fn test_validator_rejects_before_coercion() {
        let column = amount_column().with_paste_validator(|_, text| {
            if text.starts_with('-') {
                PasteVerdict::reject()
            } else {
                PasteVerdict::accept(text.trim_start_matches('$'))
            }
        });
        let mut engine = PasteEngine::new();
        let identity = CellIdentity::new(Row::new(1.0), 0);

        assert_eq!(
            engine.paste_value(&column, &identity, "$7"),
            PasteCellOutcome::Applied(CellData::Float(7.0))
        );
        assert_eq!(engine.paste_value(&column, &identity, "-3"), PasteCellOutcome::Invalid);
        assert_eq!(*identity.row().read(), 0.0);
    }
}
