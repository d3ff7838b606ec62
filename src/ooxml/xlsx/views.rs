//! Worksheet view definitions for Excel.
//!
//! This module provides data structures for worksheet view settings such as
//! zoom, right-to-left mode, frozen panes and the active view type, and
//! renders them as the `<sheetViews>` element of a worksheet.

use std::fmt::Write as _;

use super::format::{MAX_COLUMNS, MAX_ROWS, cell_reference};
use crate::common::{Error, Result};

/// Worksheet view type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetViewType {
    /// Normal worksheet view.
    Normal,
    /// Page break preview view.
    PageBreakPreview,
    /// Page layout view.
    PageLayout,
}

impl SheetViewType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::PageBreakPreview => "pageBreakPreview",
            Self::PageLayout => "pageLayout",
        }
    }
}

/// Rows and columns kept visible while scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePanes {
    /// Number of rows to freeze from the top
    pub rows: u32,
    /// Number of columns to freeze from the left
    pub columns: u32,
}

/// Worksheet view configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetView {
    /// Show grid lines.
    pub show_grid_lines: Option<bool>,
    /// Show row/column headers.
    pub show_row_col_headers: Option<bool>,
    /// Show zero values.
    pub show_zeros: Option<bool>,
    /// Right-to-left display.
    pub right_to_left: Option<bool>,
    /// View type.
    pub view_type: Option<SheetViewType>,
    /// Zoom scale (10-400).
    pub zoom_scale: Option<u16>,
    pub freeze_panes: Option<FreezePanes>,
}

impl SheetView {
    /// Freeze the top `rows` rows and the left `columns` columns.
    pub fn freeze(&mut self, rows: u32, columns: u32) {
        self.freeze_panes = (rows > 0 || columns > 0).then_some(FreezePanes { rows, columns });
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(zoom) = self.zoom_scale.filter(|zoom| !(10..=400).contains(zoom)) {
            return Err(Error::InvalidArgument(format!(
                "zoom scale {} is outside 10..=400",
                zoom
            )));
        }
        match self.freeze_panes {
            Some(FreezePanes { rows, columns }) if rows >= MAX_ROWS || columns >= MAX_COLUMNS => {
                Err(Error::InvalidArgument(format!(
                    "frozen pane of {} rows and {} columns exceeds the sheet limits",
                    rows, columns
                )))
            },
            _ => Ok(()),
        }
    }

    /// Render `<sheetViews>` for a sheet.
    pub(crate) fn write_xml(&self, xml: &mut String, tab_selected: bool) -> Result<()> {
        xml.push_str("<sheetViews><sheetView workbookViewId=\"0\"");
        if tab_selected {
            xml.push_str(" tabSelected=\"1\"");
        }
        let flags = [
            ("showGridLines", self.show_grid_lines),
            ("showRowColHeaders", self.show_row_col_headers),
            ("showZeros", self.show_zeros),
            ("rightToLeft", self.right_to_left),
        ];
        for (name, value) in flags {
            if let Some(value) = value {
                write!(xml, r#" {}="{}""#, name, u8::from(value))?;
            }
        }
        if let Some(view_type) = self.view_type {
            write!(xml, r#" view="{}""#, view_type.as_str())?;
        }
        if let Some(zoom) = self.zoom_scale {
            write!(xml, r#" zoomScale="{}""#, zoom)?;
        }

        match self.freeze_panes {
            Some(FreezePanes { rows, columns }) => {
                xml.push('>');
                let active_pane = match (columns > 0, rows > 0) {
                    (true, true) => "bottomRight",
                    (true, false) => "topRight",
                    _ => "bottomLeft",
                };
                let top_left_cell = cell_reference(columns, rows + 1);
                xml.push_str("<pane");
                if columns > 0 {
                    write!(xml, r#" xSplit="{}""#, columns)?;
                }
                if rows > 0 {
                    write!(xml, r#" ySplit="{}""#, rows)?;
                }
                write!(
                    xml,
                    r#" topLeftCell="{}" activePane="{}" state="frozen"/>"#,
                    top_left_cell, active_pane
                )?;
                write!(
                    xml,
                    r#"<selection pane="{}" activeCell="{}" sqref="{}"/>"#,
                    active_pane, top_left_cell, top_left_cell
                )?;
                xml.push_str("</sheetView>");
            },
            None => xml.push_str("/>"),
        }

        xml.push_str("</sheetViews>");
        Ok(())
    }
}
