//! A single worksheet cell.

use super::style::Style;
use super::types::{CellType, CellValue};

/// A tagged value with an optional style.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    value: CellValue,
    cell_type: CellType,
    style: Style,
}

impl Cell {
    /// Create a cell whose tag is detected from the value.
    ///
    /// ```
    /// use longan::sheet::{Cell, CellType};
    ///
    /// assert_eq!(Cell::new("=A1*2").cell_type(), CellType::Formula);
    /// assert_eq!(Cell::new(42).cell_type(), CellType::Numeric);
    /// assert_eq!(Cell::new("").cell_type(), CellType::Empty);
    /// ```
    pub fn new(value: impl Into<CellValue>) -> Self {
        let value = value.into();
        let cell_type = value.detect_type();
        Self {
            value,
            cell_type,
            style: Style::default(),
        }
    }

    /// Create a cell with a forced tag.
    ///
    /// No validation happens here: a value that does not fit `cell_type` is
    /// reported when the row containing the cell is written.
    pub fn with_type(value: impl Into<CellValue>, cell_type: CellType) -> Self {
        Self {
            value: value.into(),
            cell_type,
            style: Style::default(),
        }
    }

    /// Create an error cell such as `#N/A` or `#DIV/0!`.
    pub fn error(text: impl Into<String>) -> Self {
        Self::with_type(CellValue::String(text.into()), CellType::Error)
    }

    pub fn empty() -> Self {
        Self::new(CellValue::Empty)
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    pub fn style(&self) -> &Style {
        &self.style
    }
}
