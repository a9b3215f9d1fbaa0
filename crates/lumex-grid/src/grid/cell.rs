//! Cell identity and the per-kind cell factory.
//!
//! A cell is addressed by its row item and the index of its column.
//! [`CellIdentity`] is the key used by the dirty set, the invalid-cell map
//! and the editing-cell lookup. [`Cell`] is what a column produces for one
//! row on a render pass.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::column::{Column, ColumnKind};
use super::row::Row;
use super::value::CellData;

/// Value identity of a cell: the row item plus the column index.
///
/// Two identities are equal iff they name the same item (by reference) and
/// the same column index.
pub struct CellIdentity<T> {
    row: Row<T>,
    column_index: usize,
}

impl<T> CellIdentity<T> {
    /// Creates an identity for `row` in the column at `column_index`.
    pub fn new(row: Row<T>, column_index: usize) -> Self {
        Self { row, column_index }
    }

    /// The row item.
    pub fn row(&self) -> &Row<T> {
        &self.row
    }

    /// The column index.
    pub fn column_index(&self) -> usize {
        self.column_index
    }
}

impl<T> Clone for CellIdentity<T> {
    fn clone(&self) -> Self {
        Self {
            row: self.row.clone(),
            column_index: self.column_index,
        }
    }
}

impl<T> PartialEq for CellIdentity<T> {
    fn eq(&self, other: &Self) -> bool {
        self.column_index == other.column_index && self.row == other.row
    }
}

impl<T> Eq for CellIdentity<T> {}

impl<T> Hash for CellIdentity<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.row.hash(state);
        self.column_index.hash(state);
    }
}

impl<T> fmt::Debug for CellIdentity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellIdentity")
            .field("row", &self.row)
            .field("column_index", &self.column_index)
            .finish()
    }
}

/// A cell's value as computed for one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellValue {
    /// The raw value read by the column's accessor.
    pub raw: CellData,
    /// The formatted display string; `None` when the column has no accessor.
    pub formatted: Option<String>,
}

impl CellValue {
    /// The string shown to the user.
    pub fn display_text(&self) -> &str {
        self.formatted.as_deref().unwrap_or("")
    }
}

/// Per-cell state flags the grid supplies when producing a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFlags {
    pub selected: bool,
    pub expanded: bool,
    pub editing: bool,
    pub dirty: bool,
    /// The original pasted text, if the cell is invalid.
    pub invalid: Option<String>,
}

/// State of an editable cell.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableCell {
    pub value: CellValue,
    pub editing: bool,
    pub dirty: bool,
    /// The original pasted text of an invalid cell.
    pub invalid: Option<String>,
}

impl EditableCell {
    /// Returns `true` if the cell holds a rejected paste.
    pub fn is_invalid(&self) -> bool {
        self.invalid.is_some()
    }
}

/// A cell produced by a column for one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A template cell.
    Default(CellValue),
    /// A read-only property cell.
    Property(CellValue),
    /// The row-selection checkbox.
    Checkbox { selected: bool },
    /// The detail-row expander.
    Expand { expanded: bool },
    /// An inline-editable cell.
    Editable(EditableCell),
    /// An editable cell that accepts paste.
    Pasteable(EditableCell),
}

impl Cell {
    /// Produces the cell `column` renders for `row`.
    pub fn create<T>(column: &Column<T>, row: &Row<T>, flags: CellFlags) -> Self {
        let value = || column.cell_value(&row.read());
        match column.kind() {
            ColumnKind::Default => Cell::Default(value()),
            ColumnKind::Property => Cell::Property(value()),
            ColumnKind::Checkbox => Cell::Checkbox {
                selected: flags.selected,
            },
            ColumnKind::Expand => Cell::Expand {
                expanded: flags.expanded,
            },
            ColumnKind::Editable => Cell::Editable(EditableCell {
                value: value(),
                editing: flags.editing,
                dirty: flags.dirty,
                invalid: None,
            }),
            ColumnKind::Pasteable => Cell::Pasteable(EditableCell {
                value: value(),
                editing: flags.editing,
                dirty: flags.dirty,
                invalid: flags.invalid,
            }),
        }
    }

    /// The display string of value-carrying cells.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Cell::Default(value) | Cell::Property(value) => Some(value.display_text()),
            Cell::Editable(cell) | Cell::Pasteable(cell) => Some(cell.value.display_text()),
            Cell::Checkbox { .. } | Cell::Expand { .. } => None,
        }
    }

    /// The editable state, for editable kinds.
    pub fn as_editable(&self) -> Option<&EditableCell> {
        match self {
            Cell::Editable(cell) | Cell::Pasteable(cell) => Some(cell),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::value::ValueType;
    use std::collections::HashSet;

    #[test]
    fn test_identity_equality() {
        let a = Row::new(1);
        let b = Row::new(1);

        assert_eq!(CellIdentity::new(a.clone(), 0), CellIdentity::new(a.clone(), 0));
        assert_ne!(CellIdentity::new(a.clone(), 0), CellIdentity::new(a.clone(), 1));
        assert_ne!(CellIdentity::new(a.clone(), 0), CellIdentity::new(b.clone(), 0));

        let set: HashSet<_> = [
            CellIdentity::new(a.clone(), 0),
            CellIdentity::new(a, 0),
            CellIdentity::new(b, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_factory_by_kind() {
        let row = Row::new(3.0_f64);

        let property = Column::property("P", |v: &f64| CellData::from(*v));
        assert_eq!(
            Cell::create(&property, &row, CellFlags::default()).display_text(),
            Some("3")
        );

        let checkbox = Column::<f64>::checkbox();
        let flags = CellFlags {
            selected: true,
            ..CellFlags::default()
        };
        assert_eq!(
            Cell::create(&checkbox, &row, flags),
            Cell::Checkbox { selected: true }
        );

        let pasteable = Column::pasteable(
            "V",
            ValueType::Numeric,
            |v: &f64| CellData::from(*v),
            |v: &mut f64, value| *v = value.as_float().unwrap_or_default(),
        );
        let flags = CellFlags {
            dirty: true,
            invalid: Some("abc".into()),
            ..CellFlags::default()
        };
        let cell = Cell::create(&pasteable, &row, flags);
        let editable = cell.as_editable().unwrap();
        assert!(editable.dirty);
        assert!(editable.is_invalid());
        assert!(!editable.editing);
    }
}
