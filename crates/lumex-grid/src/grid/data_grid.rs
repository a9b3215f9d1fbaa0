//! The grid instance.
//!
//! [`DataGrid`] owns every engine of one grid (columns, sort, filter, edit
//! session, paste state, selection, and the load controller) and exposes
//! the operations a host view drives. Engines never discover the grid; the
//! grid hands each operation the engines it needs.
//!
//! A grid is shared as `Arc<DataGrid<T>>`. Operations that load data return
//! `'static` boxed futures; the cancellation state of a load is swapped when
//! the operation is called, so the order of calls (not the order in which
//! futures are polled) decides which load wins.
//!
//! # Locking
//!
//! Engines sit behind `parking_lot` locks, acquired in the order
//! columns, sort, filter, edit, paste, selection, view. No lock is held across
//! an await or while a signal is emitted.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lumex_grid::grid::{CellData, Column, DataGrid, GridOptions, ValueType};
//!
//! let grid = DataGrid::builder()
//!     .options(GridOptions::default())
//!     .items(products)
//!     .build()?;
//!
//! let name = Arc::new(Column::property("Name", |p: &Product| p.name.as_str().into()));
//! grid.collect_columns(|columns| columns.register(name.clone()));
//! grid.refresh().await?;
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use lumex_grid_core::logging::{PerfSpan, span_names, targets};
use lumex_grid_core::{CancellationToken, DebounceDecision, Debouncer, Signal};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::Instrument;

use crate::clipboard::ClipboardSource;
use crate::error::{GridError, Result};

use super::cell::{Cell, CellFlags, CellIdentity};
use super::column::Column;
use super::controller::GridController;
use super::edit::{EditSession, InputOutcome, next_editable_column, prev_editable_column};
use super::filter::FilterEngine;
use super::keyboard::{KeyCommand, KeyEvent, KeyOutcome, route_key};
use super::options::GridOptions;
use super::paste::{PasteCellOutcome, PasteEngine, PasteReport, paste_targets, split_clipboard_lines};
use super::registry::{CollectionReport, ColumnCollector, ColumnRegistry};
use super::row::Row;
use super::selection::{SelectionChange, SelectionManager, SelectionMode};
use super::sort::{SortDescriptor, SortDirection, SortEngine};
use super::source::{DataPage, DataProvider, DataRequest, GridSource, PaginationState};

/// Payload of [`GridSignals::rows_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsChanged {
    /// Logical index of the first displayed row.
    pub start_index: usize,
    /// Number of displayed rows.
    pub row_count: usize,
    /// Size of the whole logical data set.
    pub total_count: usize,
}

/// Change notifications for the host view.
pub struct GridSignals<T> {
    /// A load committed new rows.
    pub rows_changed: Signal<RowsChanged>,
    /// The sort column or direction changed.
    pub sort_changed: Signal<Option<SortDescriptor>>,
    /// Rows were selected or deselected. Args: (selected, deselected)
    pub selection_changed: Signal<(Vec<Row<T>>, Vec<Row<T>>)>,
    /// The editing cell changed; `None` when editing ended.
    pub editing_changed: Signal<Option<CellIdentity<T>>>,
    /// Grid validity after a paste or a successful re-edit.
    pub validity_changed: Signal<bool>,
    /// A collection pass finished. Args: number of indexed columns
    pub columns_collected: Signal<usize>,
    /// A detail row was expanded or collapsed.
    pub row_expanded: Signal<(Row<T>, bool)>,
}

impl<T: 'static> GridSignals<T> {
    fn new() -> Self {
        Self {
            rows_changed: Signal::new(),
            sort_changed: Signal::new(),
            selection_changed: Signal::new(),
            editing_changed: Signal::new(),
            validity_changed: Signal::new(),
            columns_collected: Signal::new(),
            row_expanded: Signal::new(),
        }
    }
}

/// Rows currently shown by the view.
struct ViewState<T> {
    rows: Vec<Row<T>>,
    start_index: usize,
    total_count: usize,
    /// Most recent virtualized range `(start, count)`.
    range: Option<(usize, usize)>,
    pagination: Option<PaginationState>,
}

/// Builder for [`DataGrid`].
pub struct DataGridBuilder<T> {
    options: GridOptions,
    items: Option<Vec<Row<T>>>,
    provider: Option<DataProvider<T>>,
}

impl<T: Send + Sync + 'static> DataGridBuilder<T> {
    /// Sets the grid options.
    pub fn options(mut self, options: GridOptions) -> Self {
        self.options = options;
        self
    }

    /// Binds a static collection of items.
    pub fn items(self, items: impl IntoIterator<Item = T>) -> Self {
        self.rows(items.into_iter().map(Row::new).collect())
    }

    /// Binds a static collection of existing row handles.
    pub fn rows(mut self, rows: Vec<Row<T>>) -> Self {
        self.items = Some(rows);
        self
    }

    /// Binds an external data provider.
    pub fn provider(mut self, provider: DataProvider<T>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Validates the configuration and creates the grid.
    pub fn build(self) -> Result<Arc<DataGrid<T>>> {
        self.options.validate()?;

        let source = match (self.items, self.provider) {
            (Some(_), Some(_)) => {
                return Err(GridError::configuration(
                    "items, provider",
                    "a grid can be bound to a static collection or a data provider, not both",
                ));
            }
            (Some(rows), None) => GridSource::Items(rows),
            (None, Some(provider)) => GridSource::Provider(provider),
            (None, None) => GridSource::Empty,
        };

        let registry = ColumnRegistry::new();
        let columns_ready = registry.subscribe();
        let controller = GridController::new(self.options.debounce());
        controller.set_source(source);

        tracing::debug!(
            target: targets::CONTROLLER,
            virtualize = self.options.virtualize,
            "grid created"
        );

        Ok(Arc::new(DataGrid {
            columns: RwLock::new(registry),
            sort: RwLock::new(SortEngine::new()),
            filter: RwLock::new(FilterEngine::new()),
            edit: Mutex::new(EditSession::new()),
            paste: Mutex::new(PasteEngine::new()),
            selection: Mutex::new(SelectionManager::new(self.options.selection_mode)),
            expanded: Mutex::new(HashSet::new()),
            view: RwLock::new(ViewState {
                rows: Vec::new(),
                start_index: 0,
                total_count: 0,
                range: None,
                pagination: self.options.items_per_page.map(PaginationState::new),
            }),
            controller,
            columns_ready,
            options: self.options,
            signals: GridSignals::new(),
        }))
    }
}

/// A data grid: its engines, its data binding and its signals.
pub struct DataGrid<T> {
    options: GridOptions,
    columns: RwLock<ColumnRegistry<T>>,
    sort: RwLock<SortEngine<T>>,
    filter: RwLock<FilterEngine<T>>,
    edit: Mutex<EditSession<T>>,
    paste: Mutex<PasteEngine<T>>,
    selection: Mutex<SelectionManager<T>>,
    expanded: Mutex<HashSet<Row<T>>>,
    view: RwLock<ViewState<T>>,
    controller: GridController<T>,
    columns_ready: watch::Receiver<bool>,

    /// Change notifications.
    pub signals: GridSignals<T>,
}

impl<T: Send + Sync + 'static> DataGrid<T> {
    /// Starts building a grid.
    pub fn builder() -> DataGridBuilder<T> {
        DataGridBuilder {
            options: GridOptions::default(),
            items: None,
            provider: None,
        }
    }

    /// The grid options.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// The load controller.
    pub fn controller(&self) -> &GridController<T> {
        &self.controller
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Opens a column collection pass.
    pub fn begin_collection(&self) -> ColumnCollector<T> {
        self.columns.read().begin_collection()
    }

    /// Closes a column collection pass.
    pub fn finish_collection(&self, collector: ColumnCollector<T>) -> CollectionReport {
        let (report, descriptor) = {
            let mut columns = self.columns.write();
            let mut sort = self.sort.write();
            let report = columns.finish(collector, &mut sort);
            (report, sort.descriptor())
        };

        if !report.stale {
            self.signals.columns_collected.emit(report.columns);
        }
        if report.default_sort_applied {
            self.signals.sort_changed.emit(descriptor);
        }
        report
    }

    /// Runs a whole collection pass: `register` adds this pass's columns.
    pub fn collect_columns<F>(&self, register: F) -> CollectionReport
    where
        F: FnOnce(&mut ColumnCollector<T>),
    {
        let mut collector = self.begin_collection();
        register(&mut collector);
        self.finish_collection(collector)
    }

    /// Resolves once the first collection pass has finished.
    pub fn wait_for_columns(&self) -> BoxFuture<'static, ()> {
        let mut ready = self.columns_ready.clone();
        async move {
            // The sender lives as long as the grid.
            let _ = ready.wait_for(|collected| *collected).await;
        }
        .boxed()
    }

    /// The indexed columns of the latest pass.
    pub fn columns(&self) -> Vec<Arc<Column<T>>> {
        self.columns.read().columns().to_vec()
    }

    /// The column at `index` in the latest pass.
    pub fn column(&self, index: usize) -> Option<Arc<Column<T>>> {
        self.columns.read().column(index).cloned()
    }

    /// Waits for the columns, then performs the first load.
    ///
    /// Virtualized grids load on the viewport's first range request instead.
    pub fn initialize(self: &Arc<Self>) -> BoxFuture<'static, Result<()>> {
        let grid = Arc::clone(self);
        async move {
            grid.wait_for_columns().await;
            if !grid.options.virtualize {
                grid.refresh().await?;
            }
            Ok(())
        }
        .boxed()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Reloads the displayed rows.
    ///
    /// Resolves to `false` if a newer load superseded this one; its result is
    /// then discarded, and so is any error it produced.
    pub fn refresh(self: &Arc<Self>) -> BoxFuture<'static, Result<bool>> {
        if self.options.virtualize {
            let Some((start, count)) = self.view.read().range else {
                return future::ready(Ok(false)).boxed();
            };
            return self.request_range(start, count).map(|result| result.map(|page| page.is_some())).boxed();
        }

        let token = self.controller.begin_load();
        let (start, count) = match self.view.read().pagination {
            Some(pages) => (pages.start_index(), Some(pages.items_per_page)),
            None => (0, None),
        };
        let request = self.build_request(start, count, token.clone());
        let fetch = self.controller.fetch(request, |rows| self.arrange(rows));

        let grid = Arc::clone(self);
        let span = tracing::info_span!(target: "lumex_grid::perf", "perf", operation = span_names::LOAD);
        async move {
            let result = fetch.await;
            if !grid.controller.is_current_load(&token) {
                tracing::debug!(target: targets::CONTROLLER, "discarding superseded load");
                return Ok(false);
            }
            let page = result?;
            grid.commit_page(start, page);
            Ok(true)
        }
        .instrument(span)
        .boxed()
    }

    /// Requests the rows `[start, start + count)` for a virtualized viewport.
    ///
    /// Resolves to `None` if a newer request superseded this one.
    pub fn request_range(self: &Arc<Self>, start: usize, count: usize) -> BoxFuture<'static, Result<Option<DataPage<T>>>> {
        let (token, decision) = self.controller.begin_range();
        self.range_load(start, count, token, decision)
    }

    /// Like [`request_range`](Self::request_range), with a caller-owned token.
    ///
    /// Cancelling `token` abandons the request.
    pub fn request_range_with_token(
        self: &Arc<Self>,
        start: usize,
        count: usize,
        token: CancellationToken,
    ) -> BoxFuture<'static, Result<Option<DataPage<T>>>> {
        let decision = self.controller.begin_range_with(token.clone());
        self.range_load(start, count, token, decision)
    }

    fn range_load(
        self: &Arc<Self>,
        start: usize,
        count: usize,
        token: CancellationToken,
        decision: DebounceDecision,
    ) -> BoxFuture<'static, Result<Option<DataPage<T>>>> {
        self.view.write().range = Some((start, count));

        let grid = Arc::clone(self);
        let span = tracing::info_span!(target: "lumex_grid::perf", "perf", operation = span_names::RANGE);
        async move {
            if !Debouncer::settle(decision, &token).await {
                tracing::trace!(target: targets::CONTROLLER, start, count, "range request dropped");
                return Ok(None);
            }

            let request = grid.build_request(start, Some(count), token.clone());
            let result = grid.controller.fetch(request, |rows| grid.arrange(rows)).await;
            if !grid.controller.is_current_range(&token) {
                tracing::debug!(target: targets::CONTROLLER, start, count, "discarding superseded range");
                return Ok(None);
            }
            let page = result?;
            grid.commit_page(start, page.clone());
            Ok(Some(page))
        }
        .instrument(span)
        .boxed()
    }

    fn build_request(&self, start_index: usize, count: Option<usize>, cancellation: CancellationToken) -> DataRequest {
        let sort = self.sort.read().descriptor();
        let filter = self.filter.read().active_query();
        DataRequest {
            start_index,
            count,
            sort,
            filter,
            cancellation,
        }
    }

    /// Filters, then sorts, a static row set.
    fn arrange(&self, rows: Vec<Row<T>>) -> Vec<Row<T>> {
        let columns = self.columns.read();
        let sort = self.sort.read();
        let filter = self.filter.read();
        sort.apply(filter.apply(rows, columns.columns()))
    }

    fn commit_page(&self, start_index: usize, page: DataPage<T>) {
        let changed = {
            let mut view = self.view.write();
            view.start_index = start_index;
            view.total_count = page.total_count;
            view.rows = page.rows;
            if let Some(pages) = view.pagination.as_mut() {
                pages.total_count = page.total_count;
            }
            RowsChanged {
                start_index,
                row_count: view.rows.len(),
                total_count: view.total_count,
            }
        };
        tracing::debug!(
            target: targets::CONTROLLER,
            rows = changed.row_count,
            total = changed.total_count,
            "rows committed"
        );
        self.signals.rows_changed.emit(changed);
    }

    /// The rows currently displayed.
    pub fn displayed_rows(&self) -> Vec<Row<T>> {
        self.view.read().rows.clone()
    }

    /// Size of the logical data set as of the last committed load.
    pub fn total_count(&self) -> usize {
        self.view.read().total_count
    }

    /// Every row of the logical data set that is known locally.
    ///
    /// For a static collection this is the filtered and sorted collection;
    /// for a provider it is the displayed rows.
    pub fn logical_rows(&self) -> Vec<Row<T>> {
        match self.controller.items() {
            Some(items) => self.arrange(items),
            None => self.displayed_rows(),
        }
    }

    // =========================================================================
    // Data source
    // =========================================================================

    /// Binds a static collection and reloads.
    ///
    /// Fails with a configuration error if a provider is bound.
    pub fn set_items(self: &Arc<Self>, rows: Vec<Row<T>>) -> BoxFuture<'static, Result<bool>> {
        if let Err(err) = self.controller.bind_items(rows) {
            return future::ready(Err(err)).boxed();
        }
        self.refresh()
    }

    /// Binds an external provider and reloads.
    ///
    /// Fails with a configuration error if a static collection is bound.
    pub fn set_provider(self: &Arc<Self>, provider: DataProvider<T>) -> BoxFuture<'static, Result<bool>> {
        if let Err(err) = self.controller.bind_provider(provider) {
            return future::ready(Err(err)).boxed();
        }
        self.refresh()
    }

    /// Replaces the data binding, whatever it was, and reloads.
    pub fn set_source(self: &Arc<Self>, source: GridSource<T>) -> BoxFuture<'static, Result<bool>> {
        self.controller.set_source(source);
        self.refresh()
    }

    // =========================================================================
    // Sorting and filtering
    // =========================================================================

    /// Sorts by `column` and reloads.
    ///
    /// Non-sortable columns are ignored; the returned future then resolves
    /// to `false` without loading.
    pub fn sort_by_column(self: &Arc<Self>, column: &Arc<Column<T>>, direction: SortDirection) -> BoxFuture<'static, Result<bool>> {
        if !column.is_sortable() {
            tracing::debug!(target: targets::SORT, column = column.title(), "column is not sortable");
            return future::ready(Ok(false)).boxed();
        }
        let descriptor = {
            let mut sort = self.sort.write();
            sort.set_sort(Arc::clone(column), direction);
            sort.descriptor()
        };
        self.signals.sort_changed.emit(descriptor);
        self.refresh()
    }

    /// Sorts by the column at `index` and reloads.
    pub fn sort_by_index(self: &Arc<Self>, index: usize, direction: SortDirection) -> BoxFuture<'static, Result<bool>> {
        match self.column(index) {
            Some(column) => self.sort_by_column(&column, direction),
            None => future::ready(Ok(false)).boxed(),
        }
    }

    /// Removes the sort and reloads.
    pub fn clear_sort(self: &Arc<Self>) -> BoxFuture<'static, Result<bool>> {
        self.sort.write().clear();
        self.signals.sort_changed.emit(None);
        self.refresh()
    }

    /// The current sort.
    pub fn sort_descriptor(&self) -> Option<SortDescriptor> {
        self.sort.read().descriptor()
    }

    /// Returns `true` if `column` is the sort column.
    pub fn is_sorted_by(&self, column: &Arc<Column<T>>) -> bool {
        self.sort.read().is_sorted_by(column)
    }

    /// Sets the row predicate and reloads.
    pub fn set_filter_predicate<F>(self: &Arc<Self>, predicate: F) -> BoxFuture<'static, Result<bool>>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter.write().set_predicate(predicate);
        self.refresh()
    }

    /// Sets the filter query and reloads.
    pub fn set_filter_query(self: &Arc<Self>, query: impl Into<String>) -> BoxFuture<'static, Result<bool>> {
        self.filter.write().set_query(query);
        self.refresh()
    }

    /// Removes every filter and reloads.
    pub fn clear_filter(self: &Arc<Self>) -> BoxFuture<'static, Result<bool>> {
        self.filter.write().clear();
        self.refresh()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Starts a render pass of the column at `index`.
    ///
    /// The column's rendered-row list and its cells' dirty baselines are
    /// reset; the active edit cell keeps its baseline.
    pub fn begin_column_render(&self, index: usize) {
        if let Some(column) = self.column(index) {
            column.begin_render();
            self.edit.lock().forget_renders(index);
        }
    }

    /// Produces the cell of `row` in the column at `index`.
    pub fn render_cell(&self, index: usize, row: &Row<T>) -> Option<Cell> {
        let column = self.column(index)?;
        column.push_rendered(row);
        let identity = CellIdentity::new(row.clone(), index);

        let mut flags = CellFlags::default();
        if column.is_editable() {
            let display = column.display_text(&row.read());
            let mut edit = self.edit.lock();
            edit.record_render(identity.clone(), display);
            flags.editing = edit.is_editing_cell(&identity);
            flags.dirty = edit.is_dirty(&identity);
        }
        if column.is_pasteable() {
            flags.invalid = self.paste.lock().invalid_value(&identity).map(str::to_string);
        }
        flags.selected = self.selection.lock().is_selected(row);
        flags.expanded = self.expanded.lock().contains(row);

        Some(Cell::create(&column, row, flags))
    }

    /// Toggles the detail row of `row`. Returns the new state.
    ///
    /// Always `false` unless detail rows are enabled.
    pub fn toggle_expanded(&self, row: &Row<T>) -> bool {
        if !self.options.detail_rows {
            return false;
        }
        let expanded = {
            let mut expanded = self.expanded.lock();
            if expanded.remove(row) {
                false
            } else {
                expanded.insert(row.clone());
                true
            }
        };
        self.signals.row_expanded.emit((row.clone(), expanded));
        expanded
    }

    /// Returns `true` if the detail row of `row` is shown.
    pub fn is_expanded(&self, row: &Row<T>) -> bool {
        self.expanded.lock().contains(row)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Starts editing `row` in the column at `index`.
    ///
    /// Returns `false` if that column is not editable.
    pub fn start_editing(&self, index: usize, row: &Row<T>) -> bool {
        let Some(column) = self.column(index) else {
            return false;
        };
        let started = self.edit.lock().start(&column, row);
        if started {
            self.signals.editing_changed.emit(Some(CellIdentity::new(row.clone(), index)));
        }
        started
    }

    /// Applies typed text to the editing cell.
    pub fn input(&self, identity: &CellIdentity<T>, text: &str) -> InputOutcome {
        let Some(column) = self.column(identity.column_index()) else {
            return InputOutcome::Skipped;
        };
        let outcome = self.edit.lock().input(&column, identity, text);
        if outcome.is_applied() {
            let cleared = {
                let mut paste = self.paste.lock();
                paste.clear_invalid(identity).then(|| paste.is_valid())
            };
            if let Some(valid) = cleared {
                self.signals.validity_changed.emit(valid);
            }
        }
        outcome
    }

    /// Commits the current edit.
    pub fn stop_editing(&self) -> Option<CellIdentity<T>> {
        let stopped = self.edit.lock().stop();
        if stopped.is_some() {
            self.signals.editing_changed.emit(None);
        }
        stopped
    }

    /// Cancels the current edit; later value changes are skipped.
    pub fn cancel_editing(&self) -> Option<CellIdentity<T>> {
        let cancelled = self.edit.lock().cancel();
        if cancelled.is_some() {
            self.signals.editing_changed.emit(None);
        }
        cancelled
    }

    /// The cell being edited.
    pub fn editing_cell(&self) -> Option<CellIdentity<T>> {
        self.edit.lock().active().cloned()
    }

    /// Returns `true` if `identity` is being edited.
    pub fn is_editing(&self, identity: &CellIdentity<T>) -> bool {
        self.edit.lock().is_editing_cell(identity)
    }

    /// Moves editing to the next editable column of the same row.
    ///
    /// Does nothing (and returns `false`) at the last editable column.
    pub fn start_editing_next_cell(&self) -> bool {
        self.move_editing(|columns, from| next_editable_column(columns, from))
    }

    /// Moves editing to the previous editable column of the same row.
    ///
    /// Does nothing (and returns `false`) at the first editable column.
    pub fn start_editing_prev_cell(&self) -> bool {
        self.move_editing(|columns, from| prev_editable_column(columns, from))
    }

    fn move_editing<F>(&self, pick: F) -> bool
    where
        F: FnOnce(&[Arc<Column<T>>], usize) -> Option<Arc<Column<T>>>,
    {
        let Some(active) = self.editing_cell() else {
            return false;
        };
        let target = {
            let columns = self.columns.read();
            pick(columns.columns(), active.column_index())
        };
        match target.and_then(|column| column.index()) {
            Some(index) => self.start_editing(index, active.row()),
            None => false,
        }
    }

    /// Commits the current edit and edits the same column in the next row.
    ///
    /// On the last displayed row the edit is only committed.
    pub fn start_editing_next_row_cell(&self) -> bool {
        let Some(committed) = self.stop_editing() else {
            return false;
        };
        let next = {
            let view = self.view.read();
            view.rows
                .iter()
                .position(|row| row == committed.row())
                .and_then(|position| view.rows.get(position + 1).cloned())
        };
        match next {
            Some(row) => self.start_editing(committed.column_index(), &row),
            None => false,
        }
    }

    /// Routes a key event while a cell is being edited.
    pub fn handle_key(&self, event: KeyEvent) -> KeyOutcome {
        if self.editing_cell().is_none() {
            return KeyOutcome::ignored();
        }
        let outcome = route_key(event);
        match outcome.command {
            Some(KeyCommand::NextCell) => {
                self.start_editing_next_cell();
            }
            Some(KeyCommand::PrevCell) => {
                self.start_editing_prev_cell();
            }
            Some(KeyCommand::NextRowCell) => {
                self.start_editing_next_row_cell();
            }
            Some(KeyCommand::Cancel) => {
                self.cancel_editing();
            }
            None => {}
        }
        outcome
    }

    // =========================================================================
    // Dirty cells
    // =========================================================================

    /// Returns `true` if `identity` is dirty.
    pub fn is_dirty(&self, identity: &CellIdentity<T>) -> bool {
        self.edit.lock().is_dirty(identity)
    }

    /// Every dirty cell.
    pub fn dirty_cells(&self) -> Vec<CellIdentity<T>> {
        self.edit.lock().dirty_cells().cloned().collect()
    }

    /// Clears the dirty mark of one cell.
    pub fn clear_dirty(&self, identity: &CellIdentity<T>) -> bool {
        self.edit.lock().clear_dirty(identity)
    }

    /// Clears every dirty mark.
    pub fn clear_all_dirty(&self) {
        self.edit.lock().clear_all_dirty();
    }

    // =========================================================================
    // Paste
    // =========================================================================

    /// Pastes `text` starting at the rendered cell `identity`.
    ///
    /// Line `i` of the text lands on the column's rendered row at the
    /// pasted-into row's position plus `i`; lines past the last rendered row
    /// are dropped. An edit in progress on any target row is committed.
    pub fn start_pasting(&self, identity: &CellIdentity<T>, text: &str) -> PasteReport {
        let _span = PerfSpan::new(span_names::PASTE);
        let index = identity.column_index();
        let lines = split_clipboard_lines(text);

        let column = match self.column(index) {
            Some(column) if column.is_pasteable() => column,
            _ => {
                tracing::debug!(target: targets::PASTE, column = index, "column does not accept paste");
                return PasteReport {
                    dropped: lines.len(),
                    grid_valid: self.is_valid(),
                    ..PasteReport::default()
                };
            }
        };

        let rendered = column.rendered_rows();
        let Some(start) = column.rendered_position(identity.row()) else {
            tracing::warn!(target: targets::PASTE, column = index, "pasted-into cell was not rendered");
            return PasteReport {
                dropped: lines.len(),
                grid_valid: self.is_valid(),
                ..PasteReport::default()
            };
        };
        let (pairs, dropped) = paste_targets(&rendered, start, &lines);

        let mut report = PasteReport {
            dropped,
            ..PasteReport::default()
        };
        let mut stopped_editing = false;
        {
            let mut edit = self.edit.lock();
            let mut paste = self.paste.lock();
            for (row, value) in pairs {
                let target = CellIdentity::new(row, index);
                if edit.active().is_some_and(|active| active.row() == target.row()) {
                    stopped_editing |= edit.stop().is_some();
                }
                match paste.paste_value(&column, &target, value) {
                    PasteCellOutcome::Applied(_) => report.applied += 1,
                    PasteCellOutcome::Invalid => report.invalid += 1,
                }
                let display = column.display_text(&target.row().read());
                edit.mark_if_changed(&target, &display);
            }
            report.grid_valid = paste.is_valid();
        }

        tracing::debug!(
            target: targets::PASTE,
            applied = report.applied,
            invalid = report.invalid,
            dropped = report.dropped,
            "paste finished"
        );

        if stopped_editing {
            self.signals.editing_changed.emit(None);
        }
        self.signals.validity_changed.emit(report.grid_valid);
        report
    }

    /// Reads `clipboard` and pastes its text starting at `identity`.
    pub fn paste_from_clipboard(
        self: &Arc<Self>,
        identity: &CellIdentity<T>,
        clipboard: &dyn ClipboardSource,
    ) -> BoxFuture<'static, Result<PasteReport>> {
        let read = clipboard.read_text();
        let grid = Arc::clone(self);
        let identity = identity.clone();
        async move {
            let text = read.await?;
            Ok(grid.start_pasting(&identity, &text))
        }
        .boxed()
    }

    /// Returns `true` if `identity` holds a rejected paste.
    pub fn is_invalid(&self, identity: &CellIdentity<T>) -> bool {
        self.paste.lock().is_invalid(identity)
    }

    /// The original text pasted into an invalid cell.
    pub fn invalid_value(&self, identity: &CellIdentity<T>) -> Option<String> {
        self.paste.lock().invalid_value(identity).map(str::to_string)
    }

    /// Returns `true` if no cell holds a rejected paste.
    pub fn is_valid(&self) -> bool {
        self.paste.lock().is_valid()
    }

    /// Clears the invalid mark of one cell.
    pub fn clear_invalid(&self, identity: &CellIdentity<T>) -> bool {
        let cleared = {
            let mut paste = self.paste.lock();
            paste.clear_invalid(identity).then(|| paste.is_valid())
        };
        if let Some(valid) = cleared {
            self.signals.validity_changed.emit(valid);
        }
        cleared.is_some()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The current selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.selection.lock().mode()
    }

    /// Changes the selection mode.
    pub fn set_selection_mode(&self, mode: SelectionMode) {
        let change = self.selection.lock().set_mode(mode);
        self.emit_selection(change);
    }

    /// Selects or deselects `row`.
    pub fn toggle_selection(&self, row: &Row<T>, selected: bool) {
        let change = self.selection.lock().toggle(row, selected);
        self.emit_selection(change);
    }

    /// Selects every row of the logical data set (multiple mode only).
    pub fn select_all(&self) {
        let rows = self.logical_rows();
        let change = self.selection.lock().select_all(&rows);
        self.emit_selection(change);
    }

    /// Deselects every row.
    pub fn clear_selection(&self) {
        let change = self.selection.lock().clear();
        self.emit_selection(change);
    }

    /// Handles a click on `row` in the column at `index`.
    ///
    /// Clicks that land in an editable cell do not change the selection.
    /// Returns `true` if the click toggled the row.
    pub fn click_row(&self, row: &Row<T>, index: Option<usize>) -> bool {
        if index.and_then(|i| self.column(i)).is_some_and(|column| column.is_editable()) {
            return false;
        }
        let change = {
            let mut selection = self.selection.lock();
            let selected = !selection.is_selected(row);
            selection.toggle(row, selected)
        };
        let toggled = !change.is_empty();
        self.emit_selection(change);
        toggled
    }

    /// Returns `true` if `row` is selected.
    pub fn is_selected(&self, row: &Row<T>) -> bool {
        self.selection.lock().is_selected(row)
    }

    /// The selected rows in selection order.
    pub fn selected_rows(&self) -> Vec<Row<T>> {
        self.selection.lock().selected().to_vec()
    }

    fn emit_selection(&self, change: SelectionChange<T>) {
        if change.is_empty() {
            return;
        }
        tracing::debug!(
            target: targets::SELECTION,
            selected = change.selected.len(),
            deselected = change.deselected.len(),
            "selection changed"
        );
        self.signals
            .selection_changed
            .emit((change.selected, change.deselected));
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// The pagination state, if the grid is paginated.
    pub fn pagination(&self) -> Option<PaginationState> {
        self.view.read().pagination
    }

    /// Number of pages, as of the last committed load.
    pub fn page_count(&self) -> usize {
        self.pagination().map_or(0, |pages| pages.page_count())
    }

    /// Moves to `page` and reloads.
    ///
    /// Resolves to `false` without loading if the grid is not paginated or
    /// the page does not change.
    pub fn go_to_page(self: &Arc<Self>, page: usize) -> BoxFuture<'static, Result<bool>> {
        let changed = self
            .view
            .write()
            .pagination
            .as_mut()
            .is_some_and(|pages| pages.go_to(page));
        if changed {
            self.refresh()
        } else {
            future::ready(Ok(false)).boxed()
        }
    }
}

impl<T> fmt::Debug for DataGrid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGrid")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
