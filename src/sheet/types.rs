//! Common types for spreadsheet values.

use chrono::{NaiveDate, NaiveDateTime};

/// Types of data that can be stored in a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell
    Empty,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// String value
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date with time of day
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// The tag a cell holding this value gets when none is forced.
    pub fn detect_type(&self) -> CellType {
        match self {
            CellValue::Empty => CellType::Empty,
            CellValue::Bool(_) => CellType::Boolean,
            CellValue::Int(_) | CellValue::Float(_) => CellType::Numeric,
            CellValue::String(s) if s.is_empty() => CellType::Empty,
            CellValue::String(s) if s.starts_with('=') => CellType::Formula,
            CellValue::String(_) => CellType::String,
            CellValue::Date(_) | CellValue::DateTime(_) => CellType::Date,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// How a cell is serialized.
///
/// The tag fully determines the emitted markup; a value that does not fit
/// its tag is rejected when the row is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    String,
    Boolean,
    Numeric,
    /// Text starting with `=`, which is stripped on output
    Formula,
    Date,
    Error,
    Empty,
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value.into())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Int(value.into())
    }
}

impl From<f32> for CellValue {
    fn from(value: f32) -> Self {
        CellValue::Float(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}
