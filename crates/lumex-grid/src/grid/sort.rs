//! Column-driven sorting.
//!
//! [`SortEngine`] holds the grid's single sort column and direction. Sorting
//! is stable in both directions: descending order reverses the comparator,
//! never the output, so rows with equal keys keep their input order.

use std::sync::Arc;

use lumex_grid_core::logging::targets;

use super::column::Column;
use super::row::Row;
use super::value::{CellData, compare_cell_data};

/// Requested sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Flip when the same column is re-selected, otherwise ascending.
    #[default]
    Auto,
    Ascending,
    Descending,
}

/// The sort as forwarded to external data providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    /// Index of the sort column in the current collection pass.
    pub column_index: Option<usize>,
    /// Title of the sort column.
    pub column_title: String,
    pub ascending: bool,
}

/// Current sort column and direction.
pub struct SortEngine<T> {
    column: Option<Arc<Column<T>>>,
    ascending: bool,
}

impl<T> Default for SortEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SortEngine<T> {
    /// Creates an engine with no sort.
    pub fn new() -> Self {
        Self {
            column: None,
            ascending: true,
        }
    }

    /// The current sort column.
    pub fn column(&self) -> Option<&Arc<Column<T>>> {
        self.column.as_ref()
    }

    /// Whether the current sort is ascending.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Returns `true` if `column` is the current sort column.
    pub fn is_sorted_by(&self, column: &Arc<Column<T>>) -> bool {
        self.column.as_ref().is_some_and(|c| Arc::ptr_eq(c, column))
    }

    /// Sets the sort column and direction.
    ///
    /// [`SortDirection::Auto`] flips the direction when `column` is already
    /// the sort column and sorts ascending otherwise.
    pub fn set_sort(&mut self, column: Arc<Column<T>>, direction: SortDirection) {
        let ascending = match direction {
            SortDirection::Ascending => true,
            SortDirection::Descending => false,
            SortDirection::Auto if self.is_sorted_by(&column) => !self.ascending,
            SortDirection::Auto => true,
        };
        tracing::debug!(
            target: targets::SORT,
            column = column.title(),
            ascending,
            "sort changed"
        );
        self.column = Some(column);
        self.ascending = ascending;
    }

    /// Removes the sort.
    pub fn clear(&mut self) {
        self.column = None;
        self.ascending = true;
    }

    /// Describes the current sort for an external provider.
    pub fn descriptor(&self) -> Option<SortDescriptor> {
        self.column.as_ref().map(|column| SortDescriptor {
            column_index: column.index(),
            column_title: column.title().to_string(),
            ascending: self.ascending,
        })
    }

    /// Orders `rows` by the sort column; input order is kept without one.
    pub fn apply(&self, rows: Vec<Row<T>>) -> Vec<Row<T>> {
        let Some(column) = &self.column else {
            return rows;
        };

        let mut keyed: Vec<(CellData, Row<T>)> = rows
            .into_iter()
            .map(|row| {
                let key = column.value_of(&row.read());
                (key, row)
            })
            .collect();

        if self.ascending {
            keyed.sort_by(|(a, _), (b, _)| compare_cell_data(a, b));
        } else {
            keyed.sort_by(|(a, _), (b, _)| compare_cell_data(b, a));
        }

        keyed.into_iter().map(|(_, row)| row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        key: i64,
        tag: &'static str,
    }

    fn key_column() -> Arc<Column<Item>> {
        Arc::new(Column::property("Key", |item: &Item| CellData::from(item.key)))
    }

    fn rows() -> Vec<Row<Item>> {
        [(2, "a"), (1, "b"), (2, "c"), (1, "d")]
            .into_iter()
            .map(|(key, tag)| Row::new(Item { key, tag }))
            .collect()
    }

    fn tags(rows: &[Row<Item>]) -> Vec<&'static str> {
        rows.iter().map(|row| row.read().tag).collect()
    }

    #[test]
    fn test_no_column_keeps_order() {
        let engine = SortEngine::new();
        assert_eq!(tags(&engine.apply(rows())), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_stable_in_both_directions() {
        let mut engine = SortEngine::new();
        let column = key_column();

        engine.set_sort(column.clone(), SortDirection::Ascending);
        assert_eq!(tags(&engine.apply(rows())), ["b", "d", "a", "c"]);

        engine.set_sort(column, SortDirection::Descending);
        assert_eq!(tags(&engine.apply(rows())), ["a", "c", "b", "d"]);
    }

    #[test]
    fn test_auto_toggles_same_column() {
        let mut engine = SortEngine::new();
        let column = key_column();
        let other = key_column();

        engine.set_sort(column.clone(), SortDirection::Auto);
        assert!(engine.is_ascending());
        engine.set_sort(column.clone(), SortDirection::Auto);
        assert!(!engine.is_ascending());
        engine.set_sort(column.clone(), SortDirection::Auto);
        assert!(engine.is_ascending());

        engine.set_sort(column, SortDirection::Descending);
        engine.set_sort(other.clone(), SortDirection::Auto);
        assert!(engine.is_ascending());
        assert!(engine.is_sorted_by(&other));
    }

    #[test]
    fn test_clear() {
        let mut engine = SortEngine::new();
        engine.set_sort(key_column(), SortDirection::Descending);
        assert!(engine.descriptor().is_some_and(|d| !d.ascending));

        engine.clear();
        assert!(engine.descriptor().is_none());
    }
}
