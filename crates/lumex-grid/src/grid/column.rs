//! Column definitions.
//!
//! A [`Column`] binds a title and a [`ColumnKind`] to plain accessor
//! closures supplied once at definition time:
//!
//! - a value accessor `Fn(&T) -> CellData` used for display, sorting and
//!   filtering,
//! - an optional formatter or format string,
//! - for editable kinds, a value setter `Fn(&mut T, CellData)`,
//! - for pasteable kinds, an optional paste validator.
//!
//! Columns are owned by the host as `Arc<Column<T>>` and registered with the
//! grid on every collection pass. The grid assigns the column's index for
//! the pass and keeps the column's rendered-row list (used to address paste
//! targets) scoped to the column itself.
//!
//! # Example
//!
//! ```ignore
//! use lumex_grid::grid::{CellData, Column, SortDirection, ValueType};
//!
//! struct Product {
//!     name: String,
//!     price: f64,
//! }
//!
//! let name = Column::property("Name", |p: &Product| CellData::from(p.name.as_str()))
//!     .with_default_sort(SortDirection::Ascending);
//!
//! let price = Column::pasteable(
//!     "Price",
//!     ValueType::Numeric,
//!     |p: &Product| CellData::from(p.price),
//!     |p: &mut Product, value| p.price = value.as_float().unwrap_or_default(),
//! )
//! .with_format("0.00");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::cell::CellValue;
use super::row::Row;
use super::sort::SortDirection;
use super::value::{CellData, ValueType};

/// Reads a cell value out of a row item.
pub type ValueAccessor<T> = Arc<dyn Fn(&T) -> CellData + Send + Sync>;

/// Writes a new cell value back into a row item.
pub type ValueSetter<T> = Arc<dyn Fn(&mut T, CellData) + Send + Sync>;

/// Formats a raw value with the column's format string.
pub type FormatFn = Arc<dyn Fn(&CellData, &str) -> String + Send + Sync>;

/// Validates a pasted string before type coercion.
pub type PasteValidator<T> = Arc<dyn Fn(&T, &str) -> PasteVerdict + Send + Sync>;

const NO_INDEX: usize = usize::MAX;

/// The kinds of column a grid can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// A template column; displays its value accessor if it has one.
    Default,
    /// The row-selection checkbox column.
    Checkbox,
    /// The detail-row expander; always indexed first.
    Expand,
    /// A read-only bound property.
    Property,
    /// A bound property editable inline.
    Editable,
    /// An editable property that also accepts clipboard paste.
    Pasteable,
}

impl ColumnKind {
    /// Returns `true` for kinds whose cells can enter edit mode.
    pub fn is_editable(self) -> bool {
        matches!(self, ColumnKind::Editable | ColumnKind::Pasteable)
    }
}

/// Outcome of a column's paste validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteVerdict {
    /// Whether the pasted value is acceptable.
    pub valid: bool,
    /// The value to continue coercion with when valid.
    pub coerced: String,
}

impl PasteVerdict {
    /// Accepts the value, continuing with `coerced`.
    pub fn accept(coerced: impl Into<String>) -> Self {
        Self {
            valid: true,
            coerced: coerced.into(),
        }
    }

    /// Rejects the value.
    pub fn reject() -> Self {
        Self {
            valid: false,
            coerced: String::new(),
        }
    }
}

/// A grid column definition.
pub struct Column<T> {
    title: String,
    kind: ColumnKind,
    visible: bool,
    sortable: Option<bool>,
    default_sort: Option<SortDirection>,
    value_type: ValueType,
    value: Option<ValueAccessor<T>>,
    setter: Option<ValueSetter<T>>,
    format: Option<String>,
    formatter: Option<FormatFn>,
    paste_validator: Option<PasteValidator<T>>,
    /// Index assigned by the most recent collection pass.
    index: AtomicUsize,
    /// Rows whose cells this column has rendered since its last render pass.
    rendered: Mutex<RenderedRows<T>>,
}

/// Rows rendered by one column, in render order, with a position lookup.
struct RenderedRows<T> {
    rows: Vec<Row<T>>,
    positions: HashMap<Row<T>, usize>,
}

impl<T> RenderedRows<T> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.positions.clear();
    }

    fn push(&mut self, row: &Row<T>) -> usize {
        if let Some(&position) = self.positions.get(row) {
            return position;
        }
        let position = self.rows.len();
        self.rows.push(row.clone());
        self.positions.insert(row.clone(), position);
        position
    }
}

impl<T> Column<T> {
    fn with_kind(kind: ColumnKind, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            visible: true,
            sortable: None,
            default_sort: None,
            value_type: ValueType::default(),
            value: None,
            setter: None,
            format: None,
            formatter: None,
            paste_validator: None,
            index: AtomicUsize::new(NO_INDEX),
            rendered: Mutex::new(RenderedRows::new()),
        }
    }

    /// Creates a template column with no bound value.
    pub fn template(title: impl Into<String>) -> Self {
        Self::with_kind(ColumnKind::Default, title)
    }

    /// Creates the row-selection checkbox column.
    pub fn checkbox() -> Self {
        Self::with_kind(ColumnKind::Checkbox, "").with_sortable(false)
    }

    /// Creates the detail-row expander column.
    pub fn expand() -> Self {
        Self::with_kind(ColumnKind::Expand, "").with_sortable(false)
    }

    /// Creates a read-only column bound to a property.
    pub fn property<F>(title: impl Into<String>, value: F) -> Self
    where
        F: Fn(&T) -> CellData + Send + Sync + 'static,
    {
        Self::with_kind(ColumnKind::Property, title).with_value(value)
    }

    /// Creates an inline-editable column.
    pub fn editable<F, S>(title: impl Into<String>, value_type: ValueType, value: F, setter: S) -> Self
    where
        F: Fn(&T) -> CellData + Send + Sync + 'static,
        S: Fn(&mut T, CellData) + Send + Sync + 'static,
    {
        let mut column = Self::with_kind(ColumnKind::Editable, title).with_value(value);
        column.value_type = value_type;
        column.setter = Some(Arc::new(setter));
        column
    }

    /// Creates an editable column that also accepts clipboard paste.
    pub fn pasteable<F, S>(title: impl Into<String>, value_type: ValueType, value: F, setter: S) -> Self
    where
        F: Fn(&T) -> CellData + Send + Sync + 'static,
        S: Fn(&mut T, CellData) + Send + Sync + 'static,
    {
        let mut column = Self::editable(title, value_type, value, setter);
        column.kind = ColumnKind::Pasteable;
        column
    }

    /// Binds the value accessor.
    pub fn with_value<F>(mut self, value: F) -> Self
    where
        F: Fn(&T) -> CellData + Send + Sync + 'static,
    {
        self.value = Some(Arc::new(value));
        self
    }

    /// Sets whether the column is rendered (and therefore indexed).
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Overrides whether the column can be sorted.
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    /// Declares this column as the grid's initial sort.
    pub fn with_default_sort(mut self, direction: SortDirection) -> Self {
        self.default_sort = Some(direction);
        self
    }

    /// Sets the format string applied to displayed values.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Replaces the built-in formatting with a custom formatter.
    ///
    /// The formatter receives the raw value and the column's format string
    /// (empty when none was set).
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&CellData, &str) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Registers a validator run on every pasted value before coercion.
    pub fn with_paste_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T, &str) -> PasteVerdict + Send + Sync + 'static,
    {
        self.paste_validator = Some(Arc::new(validator));
        self
    }

    /// The column title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The column kind.
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Whether the column is rendered.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the column has a value accessor.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Whether the column can be sorted.
    ///
    /// Columns without a value accessor are never sortable; otherwise the
    /// explicit override wins and the default is sortable.
    pub fn is_sortable(&self) -> bool {
        self.value.is_some() && self.sortable.unwrap_or(true)
    }

    /// The declared initial sort, if any.
    pub fn default_sort(&self) -> Option<SortDirection> {
        self.default_sort
    }

    /// Whether cells of this column can be edited inline.
    pub fn is_editable(&self) -> bool {
        self.kind.is_editable() && self.setter.is_some()
    }

    /// Whether cells of this column accept clipboard paste.
    pub fn is_pasteable(&self) -> bool {
        self.kind == ColumnKind::Pasteable && self.setter.is_some()
    }

    /// The stored value type of an editable column.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The format string, if any.
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// The paste validator, if any.
    pub fn paste_validator(&self) -> Option<&PasteValidator<T>> {
        self.paste_validator.as_ref()
    }

    /// The index assigned by the most recent collection pass.
    pub fn index(&self) -> Option<usize> {
        match self.index.load(Ordering::Acquire) {
            NO_INDEX => None,
            index => Some(index),
        }
    }

    pub(crate) fn set_index(&self, index: Option<usize>) {
        self.index.store(index.unwrap_or(NO_INDEX), Ordering::Release);
    }

    /// Reads the raw value for an item.
    pub fn value_of(&self, item: &T) -> CellData {
        self.value.as_ref().map_or(CellData::None, |value| value(item))
    }

    /// Formats a raw value for display.
    pub fn format_value(&self, raw: &CellData) -> String {
        let format = self.format.as_deref().unwrap_or("");
        match &self.formatter {
            Some(formatter) => formatter(raw, format),
            None if format.is_empty() => raw.to_string(),
            None => raw.format_with(format),
        }
    }

    /// Computes the cell value (raw and formatted) for an item.
    pub fn cell_value(&self, item: &T) -> CellValue {
        let raw = self.value_of(item);
        let formatted = self.value.as_ref().map(|_| self.format_value(&raw));
        CellValue { raw, formatted }
    }

    /// The display string for an item.
    pub fn display_text(&self, item: &T) -> String {
        self.format_value(&self.value_of(item))
    }

    /// Writes a value into a row through the setter.
    ///
    /// Returns `false` if the column has no setter.
    pub fn write(&self, row: &Row<T>, value: CellData) -> bool {
        match &self.setter {
            Some(setter) => {
                setter(&mut row.write(), value);
                true
            }
            None => false,
        }
    }

    /// Starts a render pass of this column, forgetting previously rendered rows.
    pub fn begin_render(&self) {
        self.rendered.lock().clear();
    }

    /// Records that this column rendered a cell for `row`.
    ///
    /// Returns the row's position in the column's rendered list. A row that
    /// is already listed keeps its position.
    pub fn push_rendered(&self, row: &Row<T>) -> usize {
        self.rendered.lock().push(row)
    }

    /// Snapshot of the rows rendered since the last render pass.
    pub fn rendered_rows(&self) -> Vec<Row<T>> {
        self.rendered.lock().rows.clone()
    }

    /// Position of `row` in the rendered list.
    pub fn rendered_position(&self, row: &Row<T>) -> Option<usize> {
        self.rendered.lock().positions.get(row).copied()
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("visible", &self.visible)
            .field("index", &self.index())
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}
