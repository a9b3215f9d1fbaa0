//! Grid configuration.
//!
//! [`GridOptions`] collects the knobs a host sets once per grid. Options can
//! be built in code or read from a TOML table; every field has a default.
//!
//! ```ignore
//! use lumex_grid::grid::GridOptions;
//!
//! let options = GridOptions::from_toml_str(r#"
//! virtualize = true
//! item_size = 32.0
//! debounce_ms = 80
//! selection_mode = "multiple"
//! "#)?;
//! options.validate()?;
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

use super::selection::SelectionMode;

/// Default row height in virtualized mode.
pub const DEFAULT_ITEM_SIZE: f32 = 50.0;

/// Default number of rows rendered beyond the viewport.
pub const DEFAULT_OVERSCAN_COUNT: usize = 3;

/// Default debounce delay for virtualized range requests.
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// Per-grid options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Load rows in ranges as the viewport scrolls.
    pub virtualize: bool,
    /// Row height used by the viewport to compute ranges.
    pub item_size: f32,
    /// Rows rendered beyond the visible viewport.
    pub overscan_count: usize,
    /// Delay applied to follow-up range requests within a burst.
    pub debounce_ms: u64,
    /// Initial selection mode.
    pub selection_mode: SelectionMode,
    /// Whether rows can expand into detail rows.
    pub detail_rows: bool,
    /// Page size for paginated (non-virtualized) loading.
    pub items_per_page: Option<usize>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            virtualize: false,
            item_size: DEFAULT_ITEM_SIZE,
            overscan_count: DEFAULT_OVERSCAN_COUNT,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            selection_mode: SelectionMode::default(),
            detail_rows: false,
            items_per_page: None,
        }
    }
}

impl GridOptions {
    /// Parses options from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// The debounce delay as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Checks for mutually exclusive or out-of-range options.
    pub fn validate(&self) -> Result<()> {
        if self.virtualize && self.detail_rows {
            return Err(GridError::configuration(
                "virtualize, detail_rows",
                "detail rows are not supported with virtualization",
            ));
        }
        if self.virtualize && self.items_per_page.is_some() {
            return Err(GridError::configuration(
                "virtualize, items_per_page",
                "pagination is not supported with virtualization",
            ));
        }
        if self.virtualize && (self.item_size.is_nan() || self.item_size <= 0.0) {
            return Err(GridError::configuration(
                "item_size",
                "item size must be positive when virtualizing",
            ));
        }
        if self.items_per_page == Some(0) {
            return Err(GridError::configuration("items_per_page", "page size must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GridOptions::default();
        assert!(!options.virtualize);
        assert_eq!(options.debounce(), Duration::from_millis(50));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let options = GridOptions::from_toml_str(
            r#"
            virtualize = true
            item_size = 32.0
            selection_mode = "multiple"
            "#,
        )
        .unwrap();
        assert!(options.virtualize);
        assert_eq!(options.item_size, 32.0);
        assert_eq!(options.selection_mode, SelectionMode::Multiple);
        assert_eq!(options.overscan_count, DEFAULT_OVERSCAN_COUNT);
    }

    #[test]
    fn test_parse_error() {
        let err = GridOptions::from_toml_str("virtualize = \"yes\"").unwrap_err();
        assert!(matches!(err, GridError::Config(_)));
    }

    #[test]
    fn test_conflicting_options() {
        let detail = GridOptions {
            virtualize: true,
            detail_rows: true,
            ..GridOptions::default()
        };
        assert!(detail.validate().unwrap_err().is_configuration());

        let paged = GridOptions {
            virtualize: true,
            items_per_page: Some(20),
            ..GridOptions::default()
        };
        assert!(paged.validate().is_err());

        let flat = GridOptions {
            virtualize: true,
            item_size: 0.0,
            ..GridOptions::default()
        };
        assert!(flat.validate().is_err());
    }
}
