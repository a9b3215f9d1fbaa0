//! Inline cell editing.
//!
//! [`EditSession`] tracks the single cell being edited, the grid's dirty set
//! and the cancellation flag that suppresses late writes after Escape.
//!
//! The session moves between `Idle` and `Editing`. Starting an edit records
//! the active cell and clears the cancellation flag; stopping commits (the
//! written value is kept); cancelling sets the flag and clears the active
//! cell so that any value change still in flight is skipped.
//!
//! A cell becomes dirty when its display string after an input differs from
//! the display string captured at its most recent render. The comparison is
//! made on display strings, not raw values, so a change that formats to the
//! same text does not count.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lumex_grid_core::logging::targets;

use super::cell::CellIdentity;
use super::column::Column;
use super::row::Row;
use super::value::{CellData, Coercion};

/// Result of feeding one value change into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The change was ignored: editing was cancelled or the cell is not active.
    Skipped,
    /// The value was coerced and written through the column's setter.
    Applied {
        /// Whether the cell became dirty with this change.
        became_dirty: bool,
    },
    /// The text could not be coerced; the item was left untouched.
    Rejected {
        /// Whether the cell became dirty with this change.
        became_dirty: bool,
    },
}

impl InputOutcome {
    /// Returns `true` if the item was written.
    pub fn is_applied(self) -> bool {
        matches!(self, InputOutcome::Applied { .. })
    }
}

/// The grid's editing state.
pub struct EditSession<T> {
    active: Option<CellIdentity<T>>,
    cancelled: bool,
    dirty: HashSet<CellIdentity<T>>,
    /// Display string of each editable cell at its most recent render.
    rendered_text: HashMap<CellIdentity<T>, String>,
}

impl<T> Default for EditSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EditSession<T> {
    /// Creates an idle session with no dirty cells.
    pub fn new() -> Self {
        Self {
            active: None,
            cancelled: false,
            dirty: HashSet::new(),
            rendered_text: HashMap::new(),
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The cell being edited.
    pub fn active(&self) -> Option<&CellIdentity<T>> {
        self.active.as_ref()
    }

    /// Returns `true` if a cell is being edited.
    pub fn is_editing(&self) -> bool {
        self.active.is_some()
    }

    /// Returns `true` if `identity` is the cell being edited.
    pub fn is_editing_cell(&self, identity: &CellIdentity<T>) -> bool {
        self.active.as_ref() == Some(identity)
    }

    /// Whether the last edit was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Starts editing `row` in `column`.
    ///
    /// Returns `false` (and changes nothing) if the column is not editable or
    /// has no index in the current collection pass.
    pub fn start(&mut self, column: &Column<T>, row: &Row<T>) -> bool {
        let Some(index) = column.index().filter(|_| column.is_editable()) else {
            return false;
        };
        let identity = CellIdentity::new(row.clone(), index);
        self.rendered_text
            .entry(identity.clone())
            .or_insert_with(|| column.display_text(&row.read()));
        tracing::debug!(target: targets::EDIT, column = index, "start editing");
        self.active = Some(identity);
        self.cancelled = false;
        true
    }

    /// Commits the current edit. Returns the committed cell.
    pub fn stop(&mut self) -> Option<CellIdentity<T>> {
        let committed = self.active.take();
        if committed.is_some() {
            tracing::debug!(target: targets::EDIT, "stop editing");
        }
        committed
    }

    /// Cancels the current edit. Returns the cancelled cell.
    ///
    /// Value changes arriving after this call are skipped until the next
    /// edit starts.
    pub fn cancel(&mut self) -> Option<CellIdentity<T>> {
        self.cancelled = true;
        let cancelled = self.active.take();
        if cancelled.is_some() {
            tracing::debug!(target: targets::EDIT, "cancel editing");
        }
        cancelled
    }

    /// Applies typed `text` to the active cell.
    pub fn input(&mut self, column: &Column<T>, identity: &CellIdentity<T>, text: &str) -> InputOutcome {
        if self.cancelled || !self.is_editing_cell(identity) {
            tracing::trace!(target: targets::EDIT, "input skipped");
            return InputOutcome::Skipped;
        }

        let row = identity.row();
        let written = match column.value_type().coerce(text) {
            Coercion::Value(value) => column.write(row, value),
            Coercion::Cleared => column.write(row, CellData::None),
            Coercion::Invalid => false,
        };

        if written {
            let display = column.display_text(&row.read());
            InputOutcome::Applied {
                became_dirty: self.mark_if_changed(identity, &display),
            }
        } else {
            InputOutcome::Rejected {
                became_dirty: self.mark_if_changed(identity, text),
            }
        }
    }

    // =========================================================================
    // Dirty tracking
    // =========================================================================

    /// Records the display string of `identity` at render time.
    pub fn record_render(&mut self, identity: CellIdentity<T>, display: String) {
        self.rendered_text.insert(identity, display);
    }

    /// Drops the render baselines of `column_index`, except the active cell's.
    ///
    /// Called when the column starts a new render pass; the cells it renders
    /// again record fresh baselines.
    pub fn forget_renders(&mut self, column_index: usize) {
        let active = self.active.as_ref();
        self.rendered_text
            .retain(|identity, _| identity.column_index() != column_index || Some(identity) == active);
    }

    /// Number of cells with a recorded render baseline.
    pub fn baseline_count(&self) -> usize {
        self.rendered_text.len()
    }

    /// Marks `identity` dirty if `display` differs from its rendered text.
    ///
    /// Returns `true` if the cell became dirty with this call.
    pub fn mark_if_changed(&mut self, identity: &CellIdentity<T>, display: &str) -> bool {
        let changed = self
            .rendered_text
            .get(identity)
            .is_none_or(|rendered| rendered != display);
        changed && self.dirty.insert(identity.clone())
    }

    /// Returns `true` if `identity` is dirty.
    pub fn is_dirty(&self, identity: &CellIdentity<T>) -> bool {
        self.dirty.contains(identity)
    }

    /// The dirty cells, in no particular order.
    pub fn dirty_cells(&self) -> impl Iterator<Item = &CellIdentity<T>> {
        self.dirty.iter()
    }

    /// Clears the dirty mark of one cell.
    pub fn clear_dirty(&mut self, identity: &CellIdentity<T>) -> bool {
        self.dirty.remove(identity)
    }

    /// Clears every dirty mark.
    pub fn clear_all_dirty(&mut self) {
        self.dirty.clear();
    }
}

// =========================================================================
// Navigation
// =========================================================================

/// The next editable column after `from` in index order.
pub fn next_editable_column<T>(columns: &[Arc<Column<T>>], from: usize) -> Option<Arc<Column<T>>> {
    columns
        .iter()
        .filter(|column| column.is_editable() && column.is_visible())
        .find(|column| column.index().is_some_and(|index| index > from))
        .cloned()
}

/// The previous editable column before `from` in index order.
pub fn prev_editable_column<T>(columns: &[Arc<Column<T>>], from: usize) -> Option<Arc<Column<T>>> {
    columns
        .iter()
        .rev()
        .filter(|column| column.is_editable() && column.is_visible())
        .find(|column| column.index().is_some_and(|index| index < from))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::value::ValueType;

    fn amount_column(index: usize) -> Arc<Column<f64>> {
        let column = Arc::new(
            Column::editable(
                "Amount",
                ValueType::Numeric,
                |v: &f64| CellData::from(*v),
                |v: &mut f64, value| *v = value.as_float().unwrap_or_default(),
            )
            .with_format("0.00"),
        );
        column.set_index(Some(index));
        column
    }

    #[test]
    fn test_start_requires_editable_column() {
        let mut session = EditSession::new();
        let row = Row::new(1.0);
        let property = Column::property("P", |v: &f64| CellData::from(*v));
        property.set_index(Some(0));

        assert!(!session.start(&property, &row));
        assert!(!session.is_editing());

        let column = amount_column(1);
        assert!(session.start(&column, &row));
        assert!(session.is_editing_cell(&CellIdentity::new(row, 1)));
    }

    #[test]
    fn test_input_writes_and_marks_dirty() {
        let mut session = EditSession::new();
        let column = amount_column(0);
        let row = Row::new(1.0);
        let identity = CellIdentity::new(row.clone(), 0);
        session.record_render(identity.clone(), "1.00".into());
        session.start(&column, &row);

        assert_eq!(
            session.input(&column, &identity, "1"),
            InputOutcome::Applied { became_dirty: false }
        );
        assert!(!session.is_dirty(&identity));

        assert_eq!(
            session.input(&column, &identity, "2.5"),
            InputOutcome::Applied { became_dirty: true }
        );
        assert_eq!(*row.read(), 2.5);
        assert!(session.is_dirty(&identity));
    }

    #[test]
    fn test_rejected_input_leaves_item() {
        let mut session = EditSession::new();
        let column = amount_column(0);
        let row = Row::new(1.0);
        let identity = CellIdentity::new(row.clone(), 0);
        session.start(&column, &row);

        let outcome = session.input(&column, &identity, "bad");
        assert_eq!(outcome, InputOutcome::Rejected { became_dirty: true });
        assert_eq!(*row.read(), 1.0);
    }

    #[test]
    fn test_cancel_skips_late_input() {
        let mut session = EditSession::new();
        let column = amount_column(0);
        let row = Row::new(1.0);
        let identity = CellIdentity::new(row.clone(), 0);
        session.start(&column, &row);

        assert_eq!(session.cancel(), Some(identity.clone()));
        assert!(session.is_cancelled());
        assert_eq!(session.input(&column, &identity, "9"), InputOutcome::Skipped);
        assert_eq!(*row.read(), 1.0);

        session.start(&column, &row);
        assert!(!session.is_cancelled());
    }

    #[test]
    fn test_dirty_is_sticky_until_cleared() {
        let mut session = EditSession::new();
        let identity = CellIdentity::new(Row::new(0.0), 0);
        session.record_render(identity.clone(), "a".into());

        assert!(session.mark_if_changed(&identity, "b"));
        assert!(!session.mark_if_changed(&identity, "a"));
        assert!(session.is_dirty(&identity));

        assert!(session.clear_dirty(&identity));
        assert!(!session.is_dirty(&identity));
    }

    #[test]
    fn test_forget_renders_keeps_other_columns_and_active_cell() {
        let mut session = EditSession::new();
        let column = amount_column(0);
        let editing = Row::new(1.0);
        let scrolled = Row::new(2.0);
        session.record_render(CellIdentity::new(scrolled.clone(), 0), "2.00".into());
        session.record_render(CellIdentity::new(scrolled.clone(), 1), "2.00".into());
        session.start(&column, &editing);
        assert_eq!(session.baseline_count(), 3);

        session.forget_renders(0);
        assert_eq!(session.baseline_count(), 2);

        // The active cell still compares against its captured text.
        let identity = CellIdentity::new(editing.clone(), 0);
        assert_eq!(
            session.input(&column, &identity, "1"),
            InputOutcome::Applied { became_dirty: false }
        );
    }

    #[test]
    fn test_navigation_does_not_wrap() {
        let first = amount_column(1);
        let second = amount_column(3);
        let readonly = Arc::new(Column::property("P", |v: &f64| CellData::from(*v)));
        readonly.set_index(Some(2));
        let columns = vec![first.clone(), readonly, second.clone()];

        assert!(next_editable_column(&columns, 1).is_some_and(|c| Arc::ptr_eq(&c, &second)));
        assert!(next_editable_column(&columns, 3).is_none());
        assert!(prev_editable_column(&columns, 3).is_some_and(|c| Arc::ptr_eq(&c, &first)));
        assert!(prev_editable_column(&columns, 1).is_none());
    }
}
