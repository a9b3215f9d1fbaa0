//! The grid engine.
//!
//! Each concern lives in its own engine, and [`DataGrid`] ties them together:
//!
//! - [`registry`]: per-pass column collection and indexing
//! - [`sort`], [`filter`]: ordering and narrowing of static collections
//! - [`controller`]: data binding, load cancellation and debounce
//! - [`edit`], [`keyboard`]: inline editing and its key bindings
//! - [`paste`]: multi-line clipboard paste with validation
//! - [`selection`]: row selection in none, single or multiple mode

pub mod cell;
pub mod column;
pub mod controller;
pub mod data_grid;
pub mod edit;
pub mod filter;
pub mod keyboard;
pub mod options;
pub mod paste;
pub mod registry;
pub mod row;
pub mod selection;
pub mod sort;
pub mod source;
pub mod value;

pub use cell::{Cell, CellFlags, CellIdentity, CellValue, EditableCell};
pub use column::{Column, ColumnKind, PasteVerdict};
pub use controller::GridController;
pub use data_grid::{DataGrid, DataGridBuilder, GridSignals, RowsChanged};
pub use edit::{EditSession, InputOutcome};
pub use filter::FilterEngine;
pub use keyboard::{GridKey, KeyCommand, KeyEvent, KeyOutcome, KeyPhase};
pub use options::GridOptions;
pub use paste::{PasteEngine, PasteReport};
pub use registry::{CollectionReport, ColumnCollector, ColumnRegistry};
pub use row::{Row, rows_from};
pub use selection::{SelectionChange, SelectionManager, SelectionMode};
pub use sort::{SortDescriptor, SortDirection, SortEngine};
pub use source::{DataPage, DataProvider, DataRequest, GridSource, PaginationState, data_provider};
pub use value::{CellData, Coercion, ValueType};
