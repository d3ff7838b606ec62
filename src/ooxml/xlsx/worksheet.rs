//! User-facing worksheet definitions.
//!
//! A [`Sheet`] describes what the caller controls about a worksheet: its name,
//! visibility, view settings, column widths and merged regions. The streaming
//! state lives in the writer.

use super::options::{ColumnWidth, MergeCell};
use super::views::SheetView;
use crate::common::{Error, Result};

/// Longest sheet name accepted by spreadsheet applications.
pub const MAX_SHEET_NAME_LENGTH: usize = 31;

const FORBIDDEN_NAME_CHARS: [char; 7] = ['\\', '/', '?', '*', ':', '[', ']'];

/// Definition of one worksheet in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    index: usize,
    name: String,
    visible: bool,
    view: SheetView,
    column_widths: Vec<ColumnWidth>,
    merge_cells: Vec<MergeCell>,
}

impl Sheet {
    pub(crate) fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            visible: true,
            view: SheetView::default(),
            column_widths: Vec::new(),
            merge_cells: Vec::new(),
        }
    }

    /// Zero-based position in the workbook.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn view(&self) -> &SheetView {
        &self.view
    }

    pub fn column_widths(&self) -> &[ColumnWidth] {
        &self.column_widths
    }

    pub fn merge_cells(&self) -> &[MergeCell] {
        &self.merge_cells
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_view(&mut self, view: SheetView) {
        self.view = view;
    }

    pub(crate) fn add_column_widths(&mut self, widths: impl IntoIterator<Item = ColumnWidth>) {
        self.column_widths.extend(widths);
    }

    pub(crate) fn add_merge_cell(&mut self, merge: MergeCell) {
        if !self.merge_cells.contains(&merge) {
            self.merge_cells.push(merge);
        }
    }
}

/// Check `name` against the naming rules and the names already in use.
///
/// Names must be non-empty, at most 31 characters, free of `\ / ? * : [ ]`,
/// must not start or end with an apostrophe, and must be unique ignoring
/// case.
pub fn validate_sheet_name<'a>(
    name: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let reject = |reason: &str| Err(Error::InvalidSheetName(format!("{:?}: {}", name, reason)));

    if name.is_empty() {
        return reject("name is empty");
    }
    if name.chars().count() > MAX_SHEET_NAME_LENGTH {
        return reject("name is longer than 31 characters");
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return reject(&format!("name contains {:?}", c));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return reject("name starts or ends with an apostrophe");
    }
    let lowered = name.to_lowercase();
    if existing
        .into_iter()
        .any(|other| other.to_lowercase() == lowered)
    {
        return reject("name is already used by another sheet");
    }
    Ok(())
}
