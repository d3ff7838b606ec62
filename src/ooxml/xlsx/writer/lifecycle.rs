//! Writer lifecycle: configure, open, stream rows, close.
//!
//! [`XlsxWriter`] enforces the call order and the failure contract: when a
//! row cannot be written, every open handle is released, the staging
//! directory is removed and the target file is deleted before the error is
//! returned, so no half-written document is ever left behind.

use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::package::write_package;
use super::workbook::WorkbookManager;
use crate::common::{Error, Result};
use crate::ooxml::xlsx::format::MAX_COLUMNS;
use crate::ooxml::xlsx::options::{ColumnWidth, MergeCell, WriterOptions};
use crate::ooxml::xlsx::views::SheetView;
use crate::ooxml::xlsx::worksheet::Sheet;
use crate::sheet::{Row, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    New,
    Opened,
    Closed,
}

/// Streaming XLSX writer.
///
/// A writer goes through `new -> opened -> closed` exactly once; write another
/// document with a fresh writer.
///
/// # Examples
///
/// ```no_run
/// use longan::XlsxWriter;
/// use longan::sheet::{Row, Style};
///
/// let mut writer = XlsxWriter::new();
/// writer.set_should_use_inline_strings(false)?;
/// writer.open_to_file("report.xlsx")?;
///
/// writer.add_row(&Row::from_values(["Region", "Sales"]).with_style(Style::new().with_bold(true)))?;
/// writer.add_rows((1..=3).map(|n| Row::from_values([format!("R{}", n)])))?;
///
/// writer.close()?;
/// # Ok::<(), longan::Error>(())
/// ```
#[derive(Debug)]
pub struct XlsxWriter<W: Write + Seek = File> {
    options: WriterOptions,
    state: WriterState,
    workbook: Option<WorkbookManager>,
    output: Option<W>,
    /// File created by `open_to_file`, removed on failure
    target_path: Option<PathBuf>,
}

impl<W: Write + Seek> Default for XlsxWriter<W> {
    fn default() -> Self {
        Self::with_options(WriterOptions::default())
    }
}

impl XlsxWriter<File> {
    /// Create the file at `path` and open the writer on it.
    ///
    /// The file exists from this call on; it is removed again if writing
    /// fails.
    pub fn open_to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_can_open()?;
        let path = path.as_ref();
        let file = File::create(path)?;
        self.open_internal(file, Some(path.to_path_buf()))
    }
}

impl<W: Write + Seek> XlsxWriter<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WriterOptions) -> Self {
        Self {
            options,
            state: WriterState::New,
            workbook: None,
            output: None,
            target_path: None,
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    pub fn is_opened(&self) -> bool {
        self.state == WriterState::Opened
    }

    /// Open the writer on `writer`; the document is written into it at close.
    pub fn open_to_stream(&mut self, writer: W) -> Result<()> {
        self.ensure_can_open()?;
        self.open_internal(writer, None)
    }

    fn ensure_can_open(&self) -> Result<()> {
        match self.state {
            WriterState::New => Ok(()),
            WriterState::Opened => Err(Error::AlreadyOpened),
            WriterState::Closed => Err(Error::WriterClosed),
        }
    }

    fn open_internal(&mut self, output: W, target_path: Option<PathBuf>) -> Result<()> {
        match WorkbookManager::new(&self.options) {
            Ok(workbook) => {
                debug!(
                    "opened writer (inline strings: {}, extra styles: {})",
                    self.options.should_use_inline_strings, self.options.should_apply_extra_styles
                );
                self.workbook = Some(workbook);
                self.output = Some(output);
                self.target_path = target_path;
                self.state = WriterState::Opened;
                Ok(())
            },
            Err(err) => {
                drop(output);
                if let Some(path) = target_path {
                    remove_target(&path);
                }
                Err(err)
            },
        }
    }

    fn ensure_not_opened(&self) -> Result<()> {
        match self.state {
            WriterState::New => Ok(()),
            WriterState::Opened | WriterState::Closed => Err(Error::AlreadyOpened),
        }
    }

    /// Style every row starts from; registered as style 0 when opened.
    pub fn set_default_row_style(&mut self, style: Style) -> Result<()> {
        self.ensure_not_opened()?;
        self.options.default_row_style = style;
        Ok(())
    }

    pub fn set_should_use_inline_strings(&mut self, value: bool) -> Result<()> {
        self.ensure_not_opened()?;
        self.options.should_use_inline_strings = value;
        Ok(())
    }

    pub fn set_should_create_new_sheets_automatically(&mut self, value: bool) -> Result<()> {
        self.ensure_not_opened()?;
        self.options.should_create_new_sheets_automatically = value;
        Ok(())
    }

    pub fn set_should_apply_extra_styles(&mut self, value: bool) -> Result<()> {
        self.ensure_not_opened()?;
        self.options.should_apply_extra_styles = value;
        Ok(())
    }

    pub fn set_temp_folder(&mut self, folder: impl Into<PathBuf>) -> Result<()> {
        self.ensure_not_opened()?;
        self.options.temp_folder = Some(folder.into());
        Ok(())
    }

    pub fn set_default_column_width(&mut self, width: f64) -> Result<()> {
        self.ensure_not_opened()?;
        self.options.default_column_width = Some(width);
        Ok(())
    }

    pub fn set_default_row_height(&mut self, height: f64) -> Result<()> {
        self.ensure_not_opened()?;
        self.options.default_row_height = Some(height);
        Ok(())
    }

    pub fn set_creator(&mut self, creator: impl Into<String>) -> Result<()> {
        self.ensure_not_opened()?;
        self.options.creator = Some(creator.into());
        Ok(())
    }

    fn workbook(&self) -> Result<&WorkbookManager> {
        match (self.state, self.workbook.as_ref()) {
            (WriterState::Opened, Some(workbook)) => Ok(workbook),
            _ => Err(Error::NotOpened),
        }
    }

    fn workbook_mut(&mut self) -> Result<&mut WorkbookManager> {
        match (self.state, self.workbook.as_mut()) {
            (WriterState::Opened, Some(workbook)) => Ok(workbook),
            _ => Err(Error::NotOpened),
        }
    }

    /// Write one row to the current sheet.
    ///
    /// On failure the writer cleans up everything it created, including the
    /// target file, and can no longer be used.
    pub fn add_row(&mut self, row: &Row) -> Result<()> {
        let result = self.workbook_mut()?.add_row(row);
        if let Err(err) = result {
            self.cleanup_after_failure(&err);
            return Err(err);
        }
        Ok(())
    }

    /// Write rows one at a time.
    ///
    /// Rows before a failing one have already been streamed when the failure
    /// happens; the cleanup removes them together with everything else.
    pub fn add_rows<I: IntoIterator<Item = Row>>(&mut self, rows: I) -> Result<()> {
        self.workbook()?;
        for row in rows {
            self.add_row(&row)?;
        }
        Ok(())
    }

    pub fn add_new_sheet_and_make_it_current(&mut self) -> Result<&Sheet> {
        self.workbook_mut()?.add_new_sheet_and_make_it_current()
    }

    pub fn sheets(&self) -> Result<Vec<&Sheet>> {
        Ok(self.workbook()?.sheets().collect())
    }

    pub fn current_sheet(&self) -> Result<&Sheet> {
        Ok(self.workbook()?.current_sheet())
    }

    pub fn set_current_sheet(&mut self, index: usize) -> Result<()> {
        self.workbook_mut()?.set_current_sheet(index)
    }

    /// Rename the current sheet.
    pub fn set_sheet_name(&mut self, name: &str) -> Result<()> {
        self.workbook_mut()?.set_sheet_name(name)
    }

    pub fn set_sheet_visibility(&mut self, visible: bool) -> Result<()> {
        self.workbook_mut()?.set_sheet_visibility(visible)
    }

    /// Replace the current sheet's view settings. Only allowed before its
    /// first row is written.
    pub fn set_sheet_view(&mut self, view: SheetView) -> Result<()> {
        self.workbook_mut()?.set_sheet_view(view)
    }

    /// Set the width of zero-based `columns` on the current sheet.
    pub fn set_column_width(
        &mut self,
        width: f64,
        columns: impl IntoIterator<Item = u32>,
    ) -> Result<()> {
        let widths = ColumnWidth::grouped(width, columns)?;
        self.workbook_mut()?.add_column_widths(widths)
    }

    /// Set the width of zero-based columns `start..=end` on the current sheet.
    pub fn set_column_width_for_range(&mut self, width: f64, start: u32, end: u32) -> Result<()> {
        if start > end || end >= MAX_COLUMNS {
            return Err(Error::InvalidArgument(format!(
                "invalid column range {}..={} (limit {} columns)",
                start, end, MAX_COLUMNS
            )));
        }
        let range = ColumnWidth::new(start + 1, end + 1, width)?;
        self.workbook_mut()?.add_column_widths(vec![range])
    }

    /// Merge a zero-based, inclusive region of the current sheet.
    pub fn merge_cells(
        &mut self,
        start_column: u32,
        start_row: u32,
        end_column: u32,
        end_row: u32,
    ) -> Result<()> {
        let workbook = self.workbook_mut()?;
        let merge = MergeCell::new(
            workbook.current_sheet_index(),
            start_column,
            start_row,
            end_column,
            end_row,
        )?;
        workbook.add_merge_cell(merge)
    }

    /// Finish every part and assemble the document.
    ///
    /// Closing twice, or closing a writer that was never opened, does nothing.
    /// If packaging fails the partial output is removed and the error is
    /// returned; the writer is closed either way.
    pub fn close(&mut self) -> Result<()> {
        if self.state != WriterState::Opened {
            self.state = WriterState::Closed;
            return Ok(());
        }
        let (Some(mut workbook), Some(output)) = (self.workbook.take(), self.output.take()) else {
            self.state = WriterState::Closed;
            return Ok(());
        };

        let packaged = workbook.close().and_then(|()| {
            let mut output = write_package(output, &workbook, self.options.creator.as_deref())?;
            output.flush()?;
            Ok(output)
        });

        match packaged {
            Ok(output) => {
                self.output = Some(output);
                self.state = WriterState::Closed;
                if let Err(err) = workbook.remove_staging() {
                    warn!("could not remove staging directory: {}", err);
                }
                debug!("closed writer");
                Ok(())
            },
            Err(err) => {
                self.workbook = Some(workbook);
                self.cleanup_after_failure(&err);
                Err(err)
            },
        }
    }

    /// Close the writer if needed and return the output it wrote to.
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        self.output.take().ok_or(Error::NotOpened)
    }

    /// Release all handles and delete everything this writer created.
    fn cleanup_after_failure(&mut self, cause: &Error) {
        warn!("cleaning up after failed write: {}", cause);
        if let Some(mut workbook) = self.workbook.take() {
            workbook.abandon();
            if let Err(err) = workbook.remove_staging() {
                warn!("could not remove staging directory: {}", err);
            }
        }
        if let Some(path) = self.target_path.take() {
            // The file handle must be released before the file is removed.
            self.output = None;
            remove_target(&path);
        }
        self.state = WriterState::Closed;
    }
}

fn remove_target(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("removed partial output {}", path.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
        Err(err) => warn!("could not remove {}: {}", path.display(), err),
    }
}

impl<W: Write + Seek> Drop for XlsxWriter<W> {
    fn drop(&mut self) {
        if self.state == WriterState::Opened {
            let cause = Error::InvalidArgument("writer dropped without being closed".to_string());
            self.cleanup_after_failure(&cause);
        }
    }
}
