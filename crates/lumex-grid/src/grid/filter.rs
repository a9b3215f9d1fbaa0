//! Client-side filtering.
//!
//! A [`FilterEngine`] combines an optional row predicate with an optional
//! query string. A row passes when it satisfies both. The query matches
//! case-insensitively against the display text of every indexed column that
//! has a value accessor.

use std::fmt;
use std::sync::Arc;

use super::column::Column;
use super::row::Row;

/// A row predicate.
pub type FilterPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Predicate and query filter over the logical data set.
pub struct FilterEngine<T> {
    predicate: Option<FilterPredicate<T>>,
    query: String,
    /// Lowercased copy of `query` used for matching.
    needle: String,
}

impl<T> Default for FilterEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FilterEngine<T> {
    /// Creates an engine that passes every row.
    pub fn new() -> Self {
        Self {
            predicate: None,
            query: String::new(),
            needle: String::new(),
        }
    }

    /// Sets the row predicate.
    pub fn set_predicate<F>(&mut self, predicate: F)
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
    }

    /// Removes the row predicate.
    pub fn clear_predicate(&mut self) {
        self.predicate = None;
    }

    /// Sets the query string; an empty query disables query filtering.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.needle = self.query.trim().to_lowercase();
    }

    /// The current query string.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The query as forwarded to external providers, if one is active.
    pub fn active_query(&self) -> Option<String> {
        (!self.needle.is_empty()).then(|| self.query.clone())
    }

    /// Returns `true` if a predicate or query is active.
    pub fn is_active(&self) -> bool {
        self.predicate.is_some() || !self.needle.is_empty()
    }

    /// Removes both the predicate and the query.
    pub fn clear(&mut self) {
        self.predicate = None;
        self.set_query(String::new());
    }

    /// Returns `true` if `item` passes the filter.
    pub fn accepts(&self, item: &T, columns: &[Arc<Column<T>>]) -> bool {
        if let Some(predicate) = &self.predicate {
            if !predicate(item) {
                return false;
            }
        }
        if self.needle.is_empty() {
            return true;
        }
        columns
            .iter()
            .filter(|column| column.index().is_some() && column.has_value())
            .any(|column| column.display_text(item).to_lowercase().contains(&self.needle))
    }

    /// Keeps the rows that pass the filter, in input order.
    pub fn apply(&self, rows: Vec<Row<T>>, columns: &[Arc<Column<T>>]) -> Vec<Row<T>> {
        if !self.is_active() {
            return rows;
        }
        rows.into_iter()
            .filter(|row| self.accepts(&row.read(), columns))
            .collect()
    }
}

impl<T> fmt::Debug for FilterEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEngine")
            .field("has_predicate", &self.predicate.is_some())
            .field("query", &self.query)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::value::CellData;

    struct Item {
        name: &'static str,
        qty: i64,
    }

    fn columns() -> Vec<Arc<Column<Item>>> {
        let name = Arc::new(Column::property("Name", |i: &Item| CellData::from(i.name)));
        let qty = Arc::new(Column::property("Qty", |i: &Item| CellData::from(i.qty)));
        name.set_index(Some(0));
        qty.set_index(Some(1));
        vec![name, qty]
    }

    fn rows() -> Vec<Row<Item>> {
        [("Apple", 3), ("banana", 12), ("Cherry", 30)]
            .into_iter()
            .map(|(name, qty)| Row::new(Item { name, qty }))
            .collect()
    }

    fn names(rows: &[Row<Item>]) -> Vec<&'static str> {
        rows.iter().map(|r| r.read().name).collect()
    }

    #[test]
    fn test_inactive_passes_everything() {
        let filter = FilterEngine::new();
        assert_eq!(filter.apply(rows(), &columns()).len(), 3);
    }

    #[test]
    fn test_query_is_case_insensitive_across_columns() {
        let mut filter = FilterEngine::new();
        filter.set_query("AN");
        assert_eq!(names(&filter.apply(rows(), &columns())), ["banana"]);

        filter.set_query("3");
        assert_eq!(names(&filter.apply(rows(), &columns())), ["Apple", "Cherry"]);
    }

    #[test]
    fn test_predicate_and_query_combine() {
        let mut filter = FilterEngine::new();
        filter.set_predicate(|i: &Item| i.qty > 5);
        filter.set_query("r");
        assert_eq!(names(&filter.apply(rows(), &columns())), ["Cherry"]);

        filter.clear();
        assert!(!filter.is_active());
    }

    #[test]
    fn test_unindexed_columns_are_ignored() {
        let columns = columns();
        columns[0].set_index(None);
        let mut filter = FilterEngine::new();
        filter.set_query("apple");
        assert!(filter.apply(rows(), &columns).is_empty());
    }
}
