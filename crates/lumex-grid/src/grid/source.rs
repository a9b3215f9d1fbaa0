//! Data sources.
//!
//! A grid is bound to at most one source: a static collection of rows that
//! the grid filters, sorts and pages itself, or an external provider that
//! receives each [`DataRequest`] verbatim and is trusted to do that work.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use lumex_grid_core::CancellationToken;

use crate::error::Result;

use super::row::Row;
use super::sort::SortDescriptor;

/// A request for a range of rows.
#[derive(Debug, Clone)]
pub struct DataRequest {
    /// Index of the first row.
    pub start_index: usize,
    /// Number of rows; `None` requests everything from `start_index`.
    pub count: Option<usize>,
    /// The current sort.
    pub sort: Option<SortDescriptor>,
    /// The current filter query.
    pub filter: Option<String>,
    /// Cancelled when a newer request supersedes this one.
    pub cancellation: CancellationToken,
}

impl DataRequest {
    /// Slices a fully filtered and sorted row set to this request's range.
    pub fn slice<T>(&self, rows: Vec<Row<T>>) -> Vec<Row<T>> {
        let rows = rows.into_iter().skip(self.start_index);
        match self.count {
            Some(count) => rows.take(count).collect(),
            None => rows.collect(),
        }
    }
}

/// One page of rows and the size of the whole logical data set.
pub struct DataPage<T> {
    pub rows: Vec<Row<T>>,
    pub total_count: usize,
}

impl<T> DataPage<T> {
    /// Creates a page.
    pub fn new(rows: Vec<Row<T>>, total_count: usize) -> Self {
        Self { rows, total_count }
    }

    /// A page with no rows.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

impl<T> Clone for DataPage<T> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            total_count: self.total_count,
        }
    }
}

impl<T> fmt::Debug for DataPage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPage")
            .field("rows", &self.rows.len())
            .field("total_count", &self.total_count)
            .finish()
    }
}

/// An external, asynchronous row provider.
pub type DataProvider<T> = Arc<dyn Fn(DataRequest) -> BoxFuture<'static, Result<DataPage<T>>> + Send + Sync>;

/// Wraps a closure as a [`DataProvider`].
///
/// ```ignore
/// use futures_util::FutureExt;
///
/// let provider = data_provider(move |request: DataRequest| {
///     let api = api.clone();
///     async move { api.fetch(request).await }.boxed()
/// });
/// ```
pub fn data_provider<T, F>(f: F) -> DataProvider<T>
where
    F: Fn(DataRequest) -> BoxFuture<'static, Result<DataPage<T>>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What a grid is bound to.
pub enum GridSource<T> {
    /// No source; loads produce empty pages.
    Empty,
    /// A static collection the grid filters, sorts and pages itself.
    Items(Vec<Row<T>>),
    /// An external provider.
    Provider(DataProvider<T>),
}

impl<T> Default for GridSource<T> {
    fn default() -> Self {
        GridSource::Empty
    }
}

impl<T> Clone for GridSource<T> {
    fn clone(&self) -> Self {
        match self {
            GridSource::Empty => GridSource::Empty,
            GridSource::Items(rows) => GridSource::Items(rows.clone()),
            GridSource::Provider(provider) => GridSource::Provider(Arc::clone(provider)),
        }
    }
}

impl<T> fmt::Debug for GridSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridSource::Empty => f.write_str("Empty"),
            GridSource::Items(rows) => f.debug_tuple("Items").field(&rows.len()).finish(),
            GridSource::Provider(_) => f.write_str("Provider"),
        }
    }
}

/// Page position for paginated loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub items_per_page: usize,
    /// Zero-based page index.
    pub current_page: usize,
    /// Total row count reported by the most recent load.
    pub total_count: usize,
}

impl PaginationState {
    /// Starts at the first page.
    pub fn new(items_per_page: usize) -> Self {
        Self {
            items_per_page: items_per_page.max(1),
            current_page: 0,
            total_count: 0,
        }
    }

    /// Index of the first row of the current page.
    pub fn start_index(&self) -> usize {
        self.current_page * self.items_per_page
    }

    /// Number of pages for the last known total.
    pub fn page_count(&self) -> usize {
        self.total_count.div_ceil(self.items_per_page)
    }

    /// Moves to `page`, clamped to the known page range.
    ///
    /// Returns `true` if the page changed.
    pub fn go_to(&mut self, page: usize) -> bool {
        let last = self.page_count().saturating_sub(1);
        let page = page.min(last);
        let changed = page != self.current_page;
        self.current_page = page;
        changed
    }
}
