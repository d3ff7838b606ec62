//! Writer configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::sheet::Style;

use super::format::{MAX_COLUMNS, MAX_ROWS};

/// Width applied to an inclusive range of one-based column numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnWidth {
    pub min: u32,
    pub max: u32,
    pub width: f64,
}

impl ColumnWidth {
    pub fn new(min: u32, max: u32, width: f64) -> Result<Self> {
        let column_width = Self { min, max, width };
        column_width.validate()?;
        Ok(column_width)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.min == 0 || self.min > self.max || self.max > MAX_COLUMNS {
            return Err(Error::InvalidArgument(format!(
                "invalid column range {}..={}",
                self.min, self.max
            )));
        }
        if !self.width.is_finite() || self.width < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "invalid column width {}",
                self.width
            )));
        }
        Ok(())
    }

    /// Group zero-based column indexes into ranges of consecutive columns.
    ///
    /// ```
    /// use longan::ooxml::xlsx::ColumnWidth;
    ///
    /// let widths = ColumnWidth::grouped(20.0, [0, 1, 2, 5])?;
    /// assert_eq!(widths.len(), 2);
    /// assert_eq!((widths[0].min, widths[0].max), (1, 3));
    /// assert_eq!((widths[1].min, widths[1].max), (6, 6));
    /// # Ok::<(), longan::Error>(())
    /// ```
    pub fn grouped(width: f64, columns: impl IntoIterator<Item = u32>) -> Result<Vec<Self>> {
        let mut columns: Vec<u32> = columns.into_iter().collect();
        columns.sort_unstable();
        columns.dedup();
        if let Some(&column) = columns.last().filter(|column| **column >= MAX_COLUMNS) {
            return Err(Error::InvalidArgument(format!(
                "column index {} exceeds the limit of {} columns",
                column, MAX_COLUMNS
            )));
        }

        let mut ranges: Vec<(u32, u32)> = Vec::new();
        for column in columns {
            match ranges.last_mut() {
                Some((_, end)) if *end + 1 == column => *end = column,
                _ => ranges.push((column, column)),
            }
        }

        ranges
            .into_iter()
            .map(|(start, end)| Self::new(start + 1, end + 1, width))
            .collect()
    }
}

/// A rectangular merged region, zero-based and inclusive, on one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeCell {
    pub sheet_index: usize,
    pub start_column: u32,
    pub start_row: u32,
    pub end_column: u32,
    pub end_row: u32,
}

impl MergeCell {
    /// Build a region from any two opposite corners.
    ///
    /// Fails with `InvalidArgument` when a corner lies outside the sheet.
    pub fn new(
        sheet_index: usize,
        start_column: u32,
        start_row: u32,
        end_column: u32,
        end_row: u32,
    ) -> Result<Self> {
        let merge = Self {
            sheet_index,
            start_column: start_column.min(end_column),
            start_row: start_row.min(end_row),
            end_column: start_column.max(end_column),
            end_row: start_row.max(end_row),
        };
        merge.validate()?;
        Ok(merge)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.start_column > self.end_column || self.start_row > self.end_row {
            return Err(Error::InvalidArgument(format!(
                "merge corners are reversed: {:?}",
                self
            )));
        }
        if self.end_column >= MAX_COLUMNS {
            return Err(Error::InvalidArgument(format!(
                "merge column {} exceeds the limit of {} columns",
                self.end_column, MAX_COLUMNS
            )));
        }
        if self.end_row >= MAX_ROWS {
            return Err(Error::InvalidArgument(format!(
                "merge row {} exceeds the limit of {} rows",
                self.end_row, MAX_ROWS
            )));
        }
        Ok(())
    }
}

/// Options recognized by [`crate::XlsxWriter`].
///
/// Every option can be changed through the writer's setters until the writer
/// is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Write text inline in each cell instead of through the shared string table
    pub should_use_inline_strings: bool,
    /// Continue on a new sheet when the current one is full
    pub should_create_new_sheets_automatically: bool,
    /// Derive wrap-text and date formats from cell contents
    pub should_apply_extra_styles: bool,
    pub default_row_style: Style,
    pub default_column_width: Option<f64>,
    pub default_row_height: Option<f64>,
    /// Column widths applied to every new sheet
    pub column_widths: Vec<ColumnWidth>,
    pub merge_cells: Vec<MergeCell>,
    /// Parent of the staging directory, the OS temp directory when unset
    pub temp_folder: Option<PathBuf>,
    pub creator: Option<String>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            should_use_inline_strings: true,
            should_create_new_sheets_automatically: true,
            should_apply_extra_styles: true,
            default_row_style: default_style(),
            default_column_width: None,
            default_row_height: None,
            column_widths: Vec::new(),
            merge_cells: Vec::new(),
            temp_folder: None,
            creator: None,
        }
    }
}

/// The document's base style: Calibri 11, black.
pub fn default_style() -> Style {
    Style::new()
        .with_font_name("Calibri")
        .with_font_size(11.0)
        .with_font_color("FF000000")
}
