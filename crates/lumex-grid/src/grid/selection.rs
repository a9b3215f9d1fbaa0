//! Row selection.
//!
//! [`SelectionManager`] tracks which row items are selected under one of
//! three modes. Every mutating operation returns a [`SelectionChange`]
//! describing the rows that became selected or deselected; the grid turns a
//! non-empty change into a `selection_changed` emission once its locks are
//! released.
//!
//! # Example
//!
//! ```ignore
//! use lumex_grid::grid::{Row, SelectionManager, SelectionMode};
//!
//! let mut selection = SelectionManager::new(SelectionMode::Single);
//! let a = Row::new("a");
//! let b = Row::new("b");
//!
//! selection.toggle(&a, true);
//! selection.toggle(&b, true);
//! assert!(!selection.is_selected(&a));
//! assert!(selection.is_selected(&b));
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::row::Row;

/// Selection behavior mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Rows cannot be selected.
    #[default]
    None,
    /// At most one row is selected.
    Single,
    /// Any number of rows can be selected.
    Multiple,
}

/// Rows whose selection state changed in one operation.
#[derive(Debug)]
pub struct SelectionChange<T> {
    pub selected: Vec<Row<T>>,
    pub deselected: Vec<Row<T>>,
}

impl<T> Default for SelectionChange<T> {
    fn default() -> Self {
        Self {
            selected: Vec::new(),
            deselected: Vec::new(),
        }
    }
}

impl<T> SelectionChange<T> {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }
}

/// Selected rows under a selection mode.
pub struct SelectionManager<T> {
    mode: SelectionMode,

    /// Set of selected rows for O(1) lookup.
    selected_set: HashSet<Row<T>>,

    /// Selected rows in selection order.
    selected: Vec<Row<T>>,
}

impl<T> Default for SelectionManager<T> {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

impl<T> SelectionManager<T> {
    /// Creates an empty selection under `mode`.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected_set: HashSet::new(),
            selected: Vec::new(),
        }
    }

    // =========================================================================
    // Mode
    // =========================================================================

    /// The current selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Changes the selection mode.
    ///
    /// Switching to [`SelectionMode::None`] clears the selection, as does
    /// switching to [`SelectionMode::Single`] while two or more rows are
    /// selected.
    pub fn set_mode(&mut self, mode: SelectionMode) -> SelectionChange<T> {
        let previous = std::mem::replace(&mut self.mode, mode);
        let must_clear = match mode {
            SelectionMode::None => true,
            SelectionMode::Single => previous != SelectionMode::Single && self.selected.len() > 1,
            SelectionMode::Multiple => false,
        };
        if must_clear {
            self.clear()
        } else {
            SelectionChange::default()
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns `true` if `row` is selected.
    pub fn is_selected(&self, row: &Row<T>) -> bool {
        self.selected_set.contains(row)
    }

    /// The selected rows in selection order.
    pub fn selected(&self) -> &[Row<T>] {
        &self.selected
    }

    /// Number of selected rows.
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Returns `true` if any row is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Selects or deselects `row`.
    ///
    /// Under `Single` selecting a row replaces the selection; under
    /// `Multiple` rows are added and removed independently; under `None`
    /// nothing happens.
    pub fn toggle(&mut self, row: &Row<T>, selected: bool) -> SelectionChange<T> {
        let mut change = SelectionChange::default();
        match (self.mode, selected) {
            (SelectionMode::None, _) => {}
            (_, false) => {
                if self.remove(row) {
                    change.deselected.push(row.clone());
                }
            }
            (SelectionMode::Single, true) => {
                if self.is_selected(row) {
                    return change;
                }
                change = self.clear();
                self.add(row.clone());
                change.selected.push(row.clone());
            }
            (SelectionMode::Multiple, true) => {
                if self.add(row.clone()) {
                    change.selected.push(row.clone());
                }
            }
        }
        change
    }

    /// Replaces the selection with `rows`. Only honored under `Multiple`.
    pub fn select_all(&mut self, rows: &[Row<T>]) -> SelectionChange<T> {
        if self.mode != SelectionMode::Multiple {
            return SelectionChange::default();
        }

        let incoming: HashSet<&Row<T>> = rows.iter().collect();
        let deselected: Vec<Row<T>> = self
            .selected
            .iter()
            .filter(|row| !incoming.contains(row))
            .cloned()
            .collect();
        let selected: Vec<Row<T>> = rows
            .iter()
            .filter(|row| !self.selected_set.contains(*row))
            .cloned()
            .collect();

        self.selected_set.clear();
        self.selected.clear();
        for row in rows {
            self.add(row.clone());
        }

        SelectionChange {
            selected,
            deselected,
        }
    }

    /// Deselects every row.
    pub fn clear(&mut self) -> SelectionChange<T> {
        self.selected_set.clear();
        SelectionChange {
            selected: Vec::new(),
            deselected: std::mem::take(&mut self.selected),
        }
    }

    fn add(&mut self, row: Row<T>) -> bool {
        if self.selected_set.insert(row.clone()) {
            self.selected.push(row);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, row: &Row<T>) -> bool {
        if self.selected_set.remove(row) {
            self.selected.retain(|r| r != row);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Row<usize>> {
        (0..n).map(Row::new).collect()
    }

    #[test]
    fn test_single_replaces_selection() {
        let rows = rows(2);
        let mut selection = SelectionManager::new(SelectionMode::Single);

        selection.toggle(&rows[0], true);
        let change = selection.toggle(&rows[1], true);

        assert_eq!(selection.selected(), &rows[1..]);
        assert_eq!(change.selected, vec![rows[1].clone()]);
        assert_eq!(change.deselected, vec![rows[0].clone()]);
    }

    #[test]
    fn test_multiple_is_independent() {
        let rows = rows(3);
        let mut selection = SelectionManager::new(SelectionMode::Multiple);

        selection.toggle(&rows[0], true);
        selection.toggle(&rows[2], true);
        selection.toggle(&rows[0], false);

        assert!(!selection.is_selected(&rows[0]));
        assert!(selection.is_selected(&rows[2]));
        assert_eq!(selection.selected_count(), 1);
    }

    #[test]
    fn test_none_mode_ignores_toggles() {
        let rows = rows(1);
        let mut selection = SelectionManager::new(SelectionMode::None);
        assert!(selection.toggle(&rows[0], true).is_empty());
        assert!(!selection.has_selection());
    }

    #[test]
    fn test_multiple_to_single_clears() {
        let rows = rows(3);
        let mut selection = SelectionManager::new(SelectionMode::Multiple);
        selection.select_all(&rows);

        let change = selection.set_mode(SelectionMode::Single);
        assert_eq!(change.deselected.len(), 3);
        assert!(!selection.has_selection());
    }

    #[test]
    fn test_multiple_to_single_keeps_one() {
        let rows = rows(2);
        let mut selection = SelectionManager::new(SelectionMode::Multiple);
        selection.toggle(&rows[1], true);

        assert!(selection.set_mode(SelectionMode::Single).is_empty());
        assert!(selection.is_selected(&rows[1]));
    }

    #[test]
    fn test_select_all_reports_delta() {
        let rows = rows(3);
        let mut selection = SelectionManager::new(SelectionMode::Multiple);
        selection.toggle(&rows[0], true);

        let change = selection.select_all(&rows[1..]);
        assert_eq!(change.selected.len(), 2);
        assert_eq!(change.deselected, vec![rows[0].clone()]);

        let single = &mut SelectionManager::new(SelectionMode::Single);
        assert!(single.select_all(&rows).is_empty());
    }
}
