//! Core systems for the Lumex grid engine.
//!
//! This crate provides the building blocks the grid engine is assembled from:
//!
//! - **Signals**: Type-safe change notifications from the engine to the view
//! - **Cancellation**: Tokens that mark superseded data loads as stale
//! - **Debounce**: Burst coalescing for viewport range requests
//! - **Logging**: `tracing` targets and span helpers
//!
//! # Signal Example
//!
//! ```
//! use lumex_grid_core::Signal;
//!
//! let rows_changed = Signal::<usize>::new();
//! let conn_id = rows_changed.connect(|count| {
//!     println!("now showing {count} rows");
//! });
//!
//! rows_changed.emit(25);
//! rows_changed.disconnect(conn_id);
//! ```
//!
//! # Cancellation Example
//!
//! ```
//! use lumex_grid_core::CancellationSlot;
//!
//! let slot = CancellationSlot::new();
//! let first = slot.replace();
//! let second = slot.replace();
//!
//! assert!(first.is_cancelled());
//! assert!(slot.is_current(&second));
//! ```

pub mod cancel;
pub mod debounce;
pub mod logging;
pub mod signal;

pub use cancel::{CancellationSlot, CancellationToken};
pub use debounce::{DEFAULT_DEBOUNCE, DebounceDecision, Debouncer};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
