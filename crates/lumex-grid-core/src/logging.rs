//! Logging facilities for the grid engine.
//!
//! The engine is instrumented with the `tracing` crate. Nothing is printed
//! unless the host installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("lumex_grid::controller=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "lumex_grid_core";
    /// Signal emission.
    pub const SIGNAL: &str = "lumex_grid_core::signal";
    /// Data loading, debounce and cancellation.
    pub const CONTROLLER: &str = "lumex_grid::controller";
    /// Column collection and indexing.
    pub const COLUMNS: &str = "lumex_grid::columns";
    /// Sort state changes.
    pub const SORT: &str = "lumex_grid::sort";
    /// Inline editing.
    pub const EDIT: &str = "lumex_grid::edit";
    /// Clipboard paste and validation.
    pub const PASTE: &str = "lumex_grid::paste";
    /// Row selection.
    pub const SELECTION: &str = "lumex_grid::selection";
}

/// Span names used for timed operations.
pub mod span_names {
    /// A plain (non-virtualized) load.
    pub const LOAD: &str = "lumex_grid::load";
    /// A virtualized range request.
    pub const RANGE: &str = "lumex_grid::range";
    /// A full paste operation.
    pub const PASTE: &str = "lumex_grid::paste";
}

/// A performance tracing span guard.
///
/// Enters an info-level span for the named operation; the span closes when
/// the guard is dropped. Use it around synchronous work only; async loads
/// attach spans with `tracing::Instrument` instead.
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "lumex_grid::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_creation() {
        let _span = PerfSpan::new(span_names::PASTE);
    }
}
