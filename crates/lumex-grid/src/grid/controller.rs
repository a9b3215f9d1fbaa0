//! Data loading.
//!
//! [`GridController`] owns the grid's data source and the cancellation state
//! of its two load pipelines:
//!
//! - **Plain loads** fetch the whole logical data set (or the current page).
//!   Every trigger cancels the pending load and arms a new token; a result
//!   is committed only if its token is still current when it resolves.
//! - **Range requests** fetch `[start, start + count)` for a virtualized
//!   viewport. They are debounced: the first request of a burst runs at
//!   once, later ones wait out the debounce delay and are dropped without
//!   fetching if a newer request cancels them first.
//!
//! Both tokens are swapped synchronously when a trigger arrives, before the
//! caller gets the load future back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use lumex_grid_core::logging::targets;
use lumex_grid_core::{CancellationSlot, CancellationToken, DebounceDecision, Debouncer};
use parking_lot::RwLock;

use crate::error::{GridError, Result};

use super::row::Row;
use super::source::{DataPage, DataProvider, DataRequest, GridSource};

/// Data source binding plus load cancellation and debounce state.
pub struct GridController<T> {
    source: RwLock<GridSource<T>>,
    load_slot: CancellationSlot,
    range_slot: CancellationSlot,
    debouncer: Debouncer,
    fetches: AtomicU64,
}

impl<T: Send + Sync + 'static> GridController<T> {
    /// Creates a controller with no source and the given debounce delay.
    pub fn new(debounce: Duration) -> Self {
        Self {
            source: RwLock::new(GridSource::Empty),
            load_slot: CancellationSlot::new(),
            range_slot: CancellationSlot::new(),
            debouncer: Debouncer::new(debounce),
            fetches: AtomicU64::new(0),
        }
    }

    // =========================================================================
    // Source binding
    // =========================================================================

    /// Binds the grid to `source`, replacing the previous binding.
    pub fn set_source(&self, source: GridSource<T>) {
        tracing::debug!(target: targets::CONTROLLER, ?source, "data source changed");
        *self.source.write() = source;
    }

    /// Binds a static collection.
    ///
    /// Fails if an external provider is already bound.
    pub fn bind_items(&self, rows: Vec<Row<T>>) -> Result<()> {
        let mut source = self.source.write();
        if matches!(*source, GridSource::Provider(_)) {
            return Err(GridError::configuration(
                "items, provider",
                "a grid can be bound to a static collection or a data provider, not both",
            ));
        }
        *source = GridSource::Items(rows);
        Ok(())
    }

    /// Binds an external provider.
    ///
    /// Fails if a static collection is already bound.
    pub fn bind_provider(&self, provider: DataProvider<T>) -> Result<()> {
        let mut source = self.source.write();
        if matches!(*source, GridSource::Items(_)) {
            return Err(GridError::configuration(
                "items, provider",
                "a grid can be bound to a static collection or a data provider, not both",
            ));
        }
        *source = GridSource::Provider(provider);
        Ok(())
    }

    /// Returns `true` if an external provider is bound.
    pub fn has_provider(&self) -> bool {
        matches!(*self.source.read(), GridSource::Provider(_))
    }

    /// Snapshot of the bound static collection, if any.
    pub fn items(&self) -> Option<Vec<Row<T>>> {
        match &*self.source.read() {
            GridSource::Items(rows) => Some(rows.clone()),
            _ => None,
        }
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Starts a plain load: cancels the pending one and arms a new token.
    pub fn begin_load(&self) -> CancellationToken {
        self.load_slot.replace()
    }

    /// Returns `true` if `token` belongs to the most recently started load.
    pub fn is_current_load(&self, token: &CancellationToken) -> bool {
        self.load_slot.is_current(token)
    }

    /// Starts a range request with a fresh token.
    pub fn begin_range(&self) -> (CancellationToken, DebounceDecision) {
        let token = self.range_slot.replace();
        (token, self.debouncer.arm())
    }

    /// Starts a range request with a caller-supplied token.
    pub fn begin_range_with(&self, token: CancellationToken) -> DebounceDecision {
        self.range_slot.install(token);
        self.debouncer.arm()
    }

    /// Returns `true` if `token` belongs to the most recent range request.
    pub fn is_current_range(&self, token: &CancellationToken) -> bool {
        self.range_slot.is_current(token)
    }

    /// Cancels every pending load and forgets the debounce burst.
    pub fn cancel_all(&self) {
        self.load_slot.cancel();
        self.range_slot.cancel();
        self.debouncer.reset();
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Number of fetches that reached the data source.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Resolves `request` against the bound source.
    ///
    /// A static collection is run through `arrange` (filter, then sort) and
    /// sliced right away; a provider receives the request verbatim. No lock
    /// is held by the returned future.
    pub fn fetch<F>(&self, request: DataRequest, arrange: F) -> BoxFuture<'static, Result<DataPage<T>>>
    where
        F: FnOnce(Vec<Row<T>>) -> Vec<Row<T>>,
    {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            target: targets::CONTROLLER,
            start = request.start_index,
            count = ?request.count,
            "fetching rows"
        );

        let source = self.source.read().clone();
        match source {
            GridSource::Empty => future::ready(Ok(DataPage::empty())).boxed(),
            GridSource::Items(rows) => {
                let arranged = arrange(rows);
                let total_count = arranged.len();
                let page = DataPage::new(request.slice(arranged), total_count);
                future::ready(Ok(page)).boxed()
            }
            GridSource::Provider(provider) => provider(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::source::data_provider;
    use lumex_grid_core::DEFAULT_DEBOUNCE;

    fn request(start_index: usize, count: Option<usize>) -> DataRequest {
        DataRequest {
            start_index,
            count,
            sort: None,
            filter: None,
            cancellation: CancellationToken::new(),
        }
    }

    #[test]
    fn test_items_and_provider_conflict() {
        let controller = GridController::<i32>::new(DEFAULT_DEBOUNCE);
        controller.bind_items(Vec::new()).unwrap();
        let provider = data_provider(|_: DataRequest| future::ready(Ok(DataPage::empty())).boxed());
        assert!(controller.bind_provider(provider).unwrap_err().is_configuration());
    }

    #[test]
    fn test_load_tokens_supersede() {
        let controller = GridController::<i32>::new(DEFAULT_DEBOUNCE);
        let first = controller.begin_load();
        let second = controller.begin_load();
        assert!(first.is_cancelled());
        assert!(!controller.is_current_load(&first));
        assert!(controller.is_current_load(&second));
    }

    #[tokio::test]
    async fn test_fetch_items_arranges_then_slices() {
        let controller = GridController::new(DEFAULT_DEBOUNCE);
        controller
            .bind_items((0..10).map(Row::new).collect())
            .unwrap();

        let page = controller
            .fetch(request(2, Some(3)), |rows| rows.into_iter().filter(|r| *r.read() % 2 == 0).collect())
            .await
            .unwrap();

        assert_eq!(page.total_count, 5);
        let values: Vec<i32> = page.rows.iter().map(|r| *r.read()).collect();
        assert_eq!(values, [4, 6, 8]);
        assert_eq!(controller.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_without_source_is_empty() {
        let controller = GridController::<i32>::new(DEFAULT_DEBOUNCE);
        let page = controller.fetch(request(0, None), |rows| rows).await.unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total_count, 0);
    }
}
