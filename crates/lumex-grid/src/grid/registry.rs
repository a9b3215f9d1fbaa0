//! Column collection.
//!
//! Columns are re-registered on every collection pass. A pass is opened with
//! [`ColumnRegistry::begin_collection`], which hands out a
//! [`ColumnCollector`]; registration is only possible through the collector.
//! [`ColumnRegistry::finish`] closes the pass, assigns every column its
//! final position as its index and applies the first declared default sort
//! if no sort is set yet.

use std::fmt;
use std::sync::Arc;

use lumex_grid_core::logging::targets;
use tokio::sync::watch;

use super::column::{Column, ColumnKind};
use super::sort::SortEngine;

/// An open collection pass.
pub struct ColumnCollector<T> {
    pass: u64,
    columns: Vec<Arc<Column<T>>>,
}

impl<T> ColumnCollector<T> {
    /// Registers a column for this pass.
    ///
    /// Invisible columns are skipped. An Expand column is placed first.
    pub fn register(&mut self, column: Arc<Column<T>>) {
        if !column.is_visible() {
            column.set_index(None);
            return;
        }
        if self.columns.iter().any(|c| Arc::ptr_eq(c, &column)) {
            return;
        }
        if column.kind() == ColumnKind::Expand {
            self.columns.insert(0, column);
        } else {
            self.columns.push(column);
        }
    }

    /// Number of columns registered so far.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Outcome of a finished collection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionReport {
    /// Number of indexed columns.
    pub columns: usize,
    /// Whether a column's default sort was applied.
    pub default_sort_applied: bool,
    /// Whether this was the first completed pass.
    pub first_pass: bool,
    /// Whether the collector belonged to an outdated pass and was ignored.
    pub stale: bool,
}

/// The ordered list of columns from the latest collection pass.
pub struct ColumnRegistry<T> {
    columns: Vec<Arc<Column<T>>>,
    pass: u64,
    first_collected: watch::Sender<bool>,
}

impl<T> Default for ColumnRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ColumnRegistry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        let (first_collected, _) = watch::channel(false);
        Self {
            columns: Vec::new(),
            pass: 0,
            first_collected,
        }
    }

    /// Opens a collection pass.
    pub fn begin_collection(&self) -> ColumnCollector<T> {
        ColumnCollector {
            pass: self.pass,
            columns: Vec::new(),
        }
    }

    /// Closes the pass opened by `collector`.
    ///
    /// A collector from a pass that another collector already closed is
    /// ignored.
    pub fn finish(&mut self, collector: ColumnCollector<T>, sort: &mut SortEngine<T>) -> CollectionReport {
        if collector.pass != self.pass {
            tracing::warn!(
                target: targets::COLUMNS,
                pass = collector.pass,
                current = self.pass,
                "ignoring stale column collection"
            );
            return CollectionReport {
                columns: self.columns.len(),
                default_sort_applied: false,
                first_pass: false,
                stale: true,
            };
        }

        for column in &self.columns {
            column.set_index(None);
        }
        for (index, column) in collector.columns.iter().enumerate() {
            column.set_index(Some(index));
        }
        self.columns = collector.columns;

        let mut default_sort_applied = false;
        if sort.column().is_none() {
            let declared = self
                .columns
                .iter()
                .filter(|column| column.is_sortable())
                .find_map(|column| column.default_sort().map(|direction| (column, direction)));
            if let Some((column, direction)) = declared {
                sort.set_sort(Arc::clone(column), direction);
                default_sort_applied = true;
            }
        }

        let first_pass = self.pass == 0;
        self.pass += 1;
        if first_pass {
            self.first_collected.send_replace(true);
        }

        tracing::debug!(
            target: targets::COLUMNS,
            pass = self.pass,
            columns = self.columns.len(),
            "columns collected"
        );

        CollectionReport {
            columns: self.columns.len(),
            default_sort_applied,
            first_pass,
            stale: false,
        }
    }

    /// The indexed columns in index order.
    pub fn columns(&self) -> &[Arc<Column<T>>] {
        &self.columns
    }

    /// The column at `index`.
    pub fn column(&self, index: usize) -> Option<&Arc<Column<T>>> {
        self.columns.get(index)
    }

    /// Number of completed passes.
    pub fn pass_count(&self) -> u64 {
        self.pass
    }

    /// Returns `true` once the first pass has completed.
    pub fn is_collected(&self) -> bool {
        *self.first_collected.borrow()
    }

    /// Subscribes to the one-shot "columns first collected" flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.first_collected.subscribe()
    }
}

impl<T> fmt::Debug for ColumnRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnRegistry")
            .field("columns", &self.columns)
            .field("pass", &self.pass)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::sort::SortDirection;
    use crate::grid::value::CellData;

    fn property(title: &str) -> Arc<Column<i64>> {
        Arc::new(Column::property(title, |v: &i64| CellData::from(*v)))
    }

    #[test]
    fn test_indices_follow_position() {
        let mut registry = ColumnRegistry::new();
        let mut sort = SortEngine::new();
        let a = property("A");
        let hidden = Arc::new(Column::property("H", |v: &i64| CellData::from(*v)).with_visible(false));
        let b = property("B");
        let expand = Arc::new(Column::expand());

        let mut collector = registry.begin_collection();
        collector.register(a.clone());
        collector.register(hidden.clone());
        collector.register(b.clone());
        collector.register(expand.clone());
        let report = registry.finish(collector, &mut sort);

        assert_eq!(report.columns, 3);
        assert!(report.first_pass);
        assert_eq!(expand.index(), Some(0));
        assert_eq!(a.index(), Some(1));
        assert_eq!(b.index(), Some(2));
        assert_eq!(hidden.index(), None);
    }

    #[test]
    fn test_dropped_columns_lose_index() {
        let mut registry = ColumnRegistry::new();
        let mut sort = SortEngine::new();
        let a = property("A");
        let b = property("B");

        let mut collector = registry.begin_collection();
        collector.register(a.clone());
        collector.register(b.clone());
        registry.finish(collector, &mut sort);

        let mut collector = registry.begin_collection();
        collector.register(b.clone());
        let report = registry.finish(collector, &mut sort);

        assert!(!report.first_pass);
        assert_eq!(a.index(), None);
        assert_eq!(b.index(), Some(0));
    }

    #[test]
    fn test_first_default_sort_wins_once() {
        let mut registry = ColumnRegistry::new();
        let mut sort = SortEngine::new();
        let a = Arc::new(
            Column::property("A", |v: &i64| CellData::from(*v)).with_default_sort(SortDirection::Descending),
        );
        let b = Arc::new(
            Column::property("B", |v: &i64| CellData::from(*v)).with_default_sort(SortDirection::Ascending),
        );

        let mut collector = registry.begin_collection();
        collector.register(a.clone());
        collector.register(b.clone());
        assert!(registry.finish(collector, &mut sort).default_sort_applied);
        assert!(sort.is_sorted_by(&a));
        assert!(!sort.is_ascending());

        sort.set_sort(b.clone(), SortDirection::Ascending);
        let mut collector = registry.begin_collection();
        collector.register(a);
        collector.register(b.clone());
        assert!(!registry.finish(collector, &mut sort).default_sort_applied);
        assert!(sort.is_sorted_by(&b));
    }

    #[test]
    fn test_stale_collector_is_ignored() {
        let mut registry = ColumnRegistry::new();
        let mut sort = SortEngine::new();
        let first = registry.begin_collection();
        let mut second = registry.begin_collection();
        second.register(property("A"));

        assert!(!registry.finish(second, &mut sort).stale);
        assert!(registry.finish(first, &mut sort).stale);
        assert_eq!(registry.columns().len(), 1);
    }

    #[tokio::test]
    async fn test_first_collection_notifies() {
        let mut registry = ColumnRegistry::<i64>::new();
        let mut sort = SortEngine::new();
        let mut rx = registry.subscribe();
        assert!(!registry.is_collected());

        let collector = registry.begin_collection();
        registry.finish(collector, &mut sort);

        assert!(rx.wait_for(|collected| *collected).await.is_ok());
        assert!(registry.is_collected());
    }
}
