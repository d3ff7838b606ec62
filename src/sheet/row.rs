//! A sparse worksheet row.

use std::collections::BTreeMap;

use super::cell::Cell;
use super::style::Style;
use super::types::CellValue;
use crate::common::{Error, Result};

/// Deepest row grouping level the format supports.
pub const MAX_OUTLINE_LEVEL: u8 = 7;

/// An ordered, sparse mapping from zero-based column index to [`Cell`].
///
/// Gaps are allowed; the logical cell count is the highest occupied index
/// plus one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<u32, Cell>,
    style: Style,
    height: Option<f64>,
    outline_level: u8,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from consecutive values starting at column 0.
    ///
    /// ```
    /// use longan::sheet::Row;
    ///
    /// let row = Row::from_values(["name", "=B2*2", ""]);
    /// assert_eq!(row.cell_count(), 3);
    /// ```
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self::from_cells(values.into_iter().map(Cell::new))
    }

    /// Build a row from consecutive cells starting at column 0.
    pub fn from_cells<I: IntoIterator<Item = Cell>>(cells: I) -> Self {
        let cells = (0u32..).zip(cells).collect();
        Self {
            cells,
            ..Self::default()
        }
    }

    pub fn with_cell(mut self, column: u32, cell: Cell) -> Self {
        self.set_cell(column, cell);
        self
    }

    /// Put `cell` at the zero-based `column`, replacing any previous cell.
    pub fn set_cell(&mut self, column: u32, cell: Cell) {
        self.cells.insert(column, cell);
    }

    pub fn cell(&self, column: u32) -> Option<&Cell> {
        self.cells.get(&column)
    }

    /// Occupied cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, &Cell)> {
        self.cells.iter().map(|(column, cell)| (*column, cell))
    }

    /// Highest occupied column index plus one, 0 for a row without cells.
    pub fn cell_count(&self) -> u32 {
        self.last_column()
            .map_or(0, |column| column.saturating_add(1))
    }

    /// Highest occupied column index.
    pub fn last_column(&self) -> Option<u32> {
        self.cells.last_key_value().map(|(column, _)| *column)
    }

    pub fn has_cells(&self) -> bool {
        !self.cells.is_empty()
    }

    /// A row without cells and without grouping is skipped on output.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.outline_level == 0
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn set_height(&mut self, height: Option<f64>) {
        self.height = height;
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    /// Set the grouping depth, rejecting anything deeper than 7.
    pub fn set_outline_level(&mut self, level: u8) -> Result<()> {
        if level > MAX_OUTLINE_LEVEL {
            return Err(Error::InvalidOutlineLevel(level));
        }
        self.outline_level = level;
        Ok(())
    }

    pub fn outline_level(&self) -> u8 {
        self.outline_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_cell_count() {
        let row = Row::new()
            .with_cell(4, Cell::new(1))
            .with_cell(1, Cell::new("b"));
        assert_eq!(row.cell_count(), 5);
        let columns: Vec<u32> = row.cells().map(|(c, _)| c).collect();
        assert_eq!(columns, vec![1, 4]);
        assert_eq!(Row::new().cell_count(), 0);
    }

    #[test]
    fn test_outline_level_bounds() {
        let mut row = Row::new();
        for level in 0..=MAX_OUTLINE_LEVEL {
            row.set_outline_level(level).unwrap();
            assert_eq!(row.outline_level(), level);
        }
        let err = row.set_outline_level(8).unwrap_err();
        assert!(matches!(err, Error::InvalidOutlineLevel(8)));
        assert_eq!(row.outline_level(), MAX_OUTLINE_LEVEL);
    }

    #[test]
    fn test_emptiness() {
        let mut row = Row::new();
        assert!(row.is_empty());
        row.set_outline_level(2).unwrap();
        assert!(!row.is_empty());
        assert!(!Row::from_values([""]).is_empty());
    }

    #[test]
    fn test_cell_count_at_last_column() {
        let row = Row::new().with_cell(u32::MAX, Cell::new(1));
        assert_eq!(row.last_column(), Some(u32::MAX));
        assert_eq!(row.cell_count(), u32::MAX);
        assert_eq!(Row::new().last_column(), None);
    }
}
