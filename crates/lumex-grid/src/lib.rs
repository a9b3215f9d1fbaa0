//! Data and state engine for the Lumex data grid.
//!
//! This crate holds everything a grid does besides drawing itself:
//!
//! - **Columns**: Registration passes, stable indexes, typed value accessors
//! - **Loading**: Static collections or async providers, with stale-load
//!   cancellation, debounced range requests and pagination
//! - **Sort and Filter**: Stable single-column sort and row predicates
//! - **Editing**: Inline edit sessions with type coercion and dirty tracking
//! - **Paste**: Multi-line clipboard paste with per-cell validation
//! - **Selection**: None, single and multiple selection modes
//!
//! The host view renders cells, forwards input and listens to the grid's
//! signals.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lumex_grid::prelude::*;
//!
//! let grid = DataGrid::builder()
//!     .options(GridOptions::load("grid.toml")?)
//!     .items(orders)
//!     .build()?;
//!
//! let qty = Arc::new(Column::editable(
//!     "Qty",
//!     ValueType::Numeric,
//!     |o: &Order| CellData::from(o.qty),
//!     |o: &mut Order, v| o.qty = v.as_float().unwrap_or_default(),
//! ));
//! grid.collect_columns(|columns| columns.register(qty.clone()));
//!
//! grid.signals.rows_changed.connect(|change| {
//!     println!("{} of {} rows", change.row_count, change.total_count);
//! });
//! grid.initialize().await?;
//! ```

pub mod clipboard;
pub mod grid;

mod error;

pub use error::{GridError, Result};
pub use lumex_grid_core::{CancellationToken, ConnectionId, Signal};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::clipboard::{ClipboardSource, StaticClipboard};
    pub use crate::grid::{
        Cell, CellData, CellIdentity, Column, DataGrid, DataPage, DataRequest, GridKey, GridOptions, GridSource,
        KeyEvent, PasteReport, PasteVerdict, Row, SelectionMode, SortDirection, ValueType, data_provider,
    };
    pub use crate::{CancellationToken, GridError, Result};

    #[cfg(feature = "system-clipboard")]
    pub use crate::clipboard::SystemClipboard;
}
