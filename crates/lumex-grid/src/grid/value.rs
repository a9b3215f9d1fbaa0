//! Cell values and type coercion.
//!
//! [`CellData`] is the type-erased value a column accessor reads out of a row
//! item. [`ValueType`] describes what an editable column stores and knows how
//! to coerce typed or pasted text into a `CellData`.

use std::cmp::Ordering;
use std::fmt::{self, Write as _};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date/time layouts accepted when coercing text into a date value.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

/// Date-only layouts; the time component becomes midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Type-erased value read from a row item by a column accessor.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellData {
    /// No value.
    #[default]
    None,
    /// Text.
    String(String),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Date and time without a time zone.
    DateTime(NaiveDateTime),
}

impl CellData {
    /// The zero date written into date cells whose pasted value was rejected.
    pub fn zero_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
    }

    /// Returns `true` if this is `CellData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, CellData::None)
    }

    /// Attempts to get the data as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellData::Float(n) => Some(*n),
            CellData::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellData::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the data as a date/time.
    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            CellData::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Formats the value with a format string.
    ///
    /// Numbers accept a decimal pattern such as `"0.00"` (two decimals) or
    /// `"0"` (no decimals). Dates accept a `chrono` strftime pattern such as
    /// `"%Y-%m-%d"`. Other values ignore the format.
    pub fn format_with(&self, format: &str) -> String {
        match self {
            CellData::Float(n) => match decimal_places(format) {
                Some(places) => format!("{n:.places$}"),
                None => self.to_string(),
            },
            CellData::Int(n) => match decimal_places(format) {
                Some(places) => format!("{:.places$}", *n as f64),
                None => self.to_string(),
            },
            CellData::DateTime(dt) => {
                let mut out = String::new();
                match write!(out, "{}", dt.format(format)) {
                    Ok(()) => out,
                    Err(_) => self.to_string(),
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Number of decimals requested by a `0.00`-style pattern.
fn decimal_places(format: &str) -> Option<usize> {
    let (whole, fraction) = match format.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (format, ""),
    };
    let is_pattern = !whole.is_empty()
        && whole.chars().all(|c| c == '0' || c == '#' || c == ',')
        && fraction.chars().all(|c| c == '0' || c == '#');
    is_pattern.then_some(fraction.len())
}

impl fmt::Display for CellData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellData::None => Ok(()),
            CellData::String(s) => f.write_str(s),
            CellData::Int(n) => write!(f, "{n}"),
            CellData::Float(n) => write!(f, "{n}"),
            CellData::Bool(b) => write!(f, "{b}"),
            CellData::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<String> for CellData {
    fn from(s: String) -> Self {
        CellData::String(s)
    }
}

impl From<&str> for CellData {
    fn from(s: &str) -> Self {
        CellData::String(s.to_string())
    }
}

impl From<i64> for CellData {
    fn from(n: i64) -> Self {
        CellData::Int(n)
    }
}

impl From<i32> for CellData {
    fn from(n: i32) -> Self {
        CellData::Int(n as i64)
    }
}

impl From<f64> for CellData {
    fn from(n: f64) -> Self {
        CellData::Float(n)
    }
}

impl From<bool> for CellData {
    fn from(b: bool) -> Self {
        CellData::Bool(b)
    }
}

impl From<NaiveDateTime> for CellData {
    fn from(dt: NaiveDateTime) -> Self {
        CellData::DateTime(dt)
    }
}

impl<V: Into<CellData>> From<Option<V>> for CellData {
    fn from(opt: Option<V>) -> Self {
        opt.map_or(CellData::None, Into::into)
    }
}

/// Compares two values using their natural ordering.
///
/// `None` sorts first; integers and floats compare numerically with each
/// other; values of unrelated kinds compare equal so that a stable sort
/// leaves them in input order.
pub fn compare_cell_data(a: &CellData, b: &CellData) -> Ordering {
    match (a, b) {
        (CellData::None, CellData::None) => Ordering::Equal,
        (CellData::None, _) => Ordering::Less,
        (_, CellData::None) => Ordering::Greater,
        (CellData::String(sa), CellData::String(sb)) => sa.cmp(sb),
        (CellData::Int(ia), CellData::Int(ib)) => ia.cmp(ib),
        (CellData::Bool(ba), CellData::Bool(bb)) => ba.cmp(bb),
        (CellData::DateTime(da), CellData::DateTime(db)) => da.cmp(db),
        (CellData::Float(_) | CellData::Int(_), CellData::Float(_) | CellData::Int(_)) => {
            let fa = a.as_float().unwrap_or_default();
            let fb = b.as_float().unwrap_or_default();
            fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

/// What an editable column stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueType {
    /// Free text; every input is accepted verbatim.
    #[default]
    String,
    /// A floating point number.
    Numeric,
    /// A date and time.
    DateTime,
}

/// Result of coercing text into a column's value type.
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    /// The text parsed into a value.
    Value(CellData),
    /// Empty input for a numeric or date column: a valid "cleared" value.
    Cleared,
    /// Non-empty text that does not parse.
    Invalid,
}

impl ValueType {
    /// Returns `true` for string columns.
    pub fn is_string(self) -> bool {
        self == ValueType::String
    }

    /// Returns `true` for numeric columns.
    pub fn is_numeric(self) -> bool {
        self == ValueType::Numeric
    }

    /// Returns `true` for date/time columns.
    pub fn is_date_time(self) -> bool {
        self == ValueType::DateTime
    }

    /// The value written into a cell whose input was rejected.
    pub fn default_value(self) -> CellData {
        match self {
            ValueType::String => CellData::String(String::new()),
            ValueType::Numeric => CellData::Float(0.0),
            ValueType::DateTime => CellData::DateTime(CellData::zero_date()),
        }
    }

    /// Coerces `text` into this type.
    ///
    /// String columns take the text verbatim. Numeric and date columns trim
    /// it first; empty input is [`Coercion::Cleared`], unparseable input is
    /// [`Coercion::Invalid`].
    pub fn coerce(self, text: &str) -> Coercion {
        if self == ValueType::String {
            return Coercion::Value(CellData::String(text.to_string()));
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Coercion::Cleared;
        }

        let parsed = match self {
            ValueType::Numeric => parse_number(trimmed).map(CellData::Float),
            ValueType::DateTime => parse_date_time(trimmed).map(CellData::DateTime),
            ValueType::String => None,
        };
        parsed.map_or(Coercion::Invalid, Coercion::Value)
    }
}

/// Parses a finite number, tolerating `,` group separators.
pub fn parse_number(text: &str) -> Option<f64> {
    let parsed = text
        .parse::<f64>()
        .ok()
        .or_else(|| text.replace(',', "").parse::<f64>().ok())?;
    parsed.is_finite().then_some(parsed)
}

/// Parses a date or date/time in one of the accepted layouts.
pub fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
