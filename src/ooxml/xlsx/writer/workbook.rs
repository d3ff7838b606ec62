//! Workbook-level state of a streaming document.
use std::path::Path;

use log::debug;
use tempfile::TempDir;

use super::sheet::{SheetWriterSettings, Worksheet, WorksheetManager, XlsxWorksheetManager};
use super::strings::SharedStringsWriter;
use super::styles::StyleManager;
use crate::common::{Error, Result};
use crate::ooxml::xlsx::format::MAX_ROWS;
use crate::ooxml::xlsx::options::{ColumnWidth, MergeCell, WriterOptions};
use crate::ooxml::xlsx::views::SheetView;
use crate::ooxml::xlsx::worksheet::{Sheet, validate_sheet_name};
use crate::sheet::Row;

const STAGING_PREFIX: &str = "longan-";

/// Owns the staging directory, the worksheets and the shared collaborators.
///
/// This is managed internally by [`crate::XlsxWriter`].
#[derive(Debug)]
pub struct WorkbookManager {
    staging_dir: TempDir,
    worksheets: Vec<Worksheet>,
    current_sheet_index: usize,
    worksheet_manager: XlsxWorksheetManager,
    should_create_new_sheets_automatically: bool,
    /// Applied to every new sheet
    column_widths: Vec<ColumnWidth>,
    /// Merges for sheets that do not exist yet
    pending_merge_cells: Vec<MergeCell>,
}

impl WorkbookManager {
    /// Create the staging directory and the first sheet.
    pub fn new(options: &WriterOptions) -> Result<Self> {
        for width in &options.column_widths {
            width.validate()?;
        }
        for merge in &options.merge_cells {
            merge.validate()?;
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let staging_dir = match options.temp_folder {
            Some(ref parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        debug!("staging parts in {}", staging_dir.path().display());

        let shared_strings =
            SharedStringsWriter::create(&staging_dir.path().join("sharedStrings.xml"))?;
        let style_manager = StyleManager::new(
            &options.default_row_style,
            options.should_apply_extra_styles,
        )?;
        let settings = SheetWriterSettings {
            should_use_inline_strings: options.should_use_inline_strings,
            default_column_width: options.default_column_width,
            default_row_height: options.default_row_height,
        };

        let mut workbook = Self {
            staging_dir,
            worksheets: Vec::new(),
            current_sheet_index: 0,
            worksheet_manager: XlsxWorksheetManager::new(settings, style_manager, shared_strings),
            should_create_new_sheets_automatically: options.should_create_new_sheets_automatically,
            column_widths: options.column_widths.clone(),
            pending_merge_cells: options.merge_cells.clone(),
        };
        workbook.add_new_sheet_and_make_it_current()?;
        Ok(workbook)
    }

    /// Append a sheet named `SheetN` and make it the target of new rows.
    pub fn add_new_sheet_and_make_it_current(&mut self) -> Result<&Sheet> {
        let index = self.worksheets.len();
        let name = (index + 1..)
            .map(|n| format!("Sheet{}", n))
            .find(|candidate| validate_sheet_name(candidate, self.sheet_names()).is_ok())
            .ok_or_else(|| Error::InvalidSheetName("no free default sheet name".to_string()))?;

        let mut sheet = Sheet::new(index, name);
        sheet.add_column_widths(self.column_widths.iter().copied());
        let (merges, pending): (Vec<_>, Vec<_>) = self
            .pending_merge_cells
            .drain(..)
            .partition(|merge| merge.sheet_index == index);
        self.pending_merge_cells = pending;
        for merge in merges {
            sheet.add_merge_cell(merge);
        }

        let path = self
            .staging_dir
            .path()
            .join(format!("sheet{}.xml", index + 1));
        let mut worksheet = Worksheet::new(sheet, path);
        self.worksheet_manager.start_sheet(&mut worksheet)?;
        self.worksheets.push(worksheet);
        self.current_sheet_index = index;
        Ok(self.worksheets[index].sheet())
    }

    /// Write `row` to the current sheet, moving on to a new sheet when full.
    pub fn add_row(&mut self, row: &Row) -> Result<()> {
        if self.current_worksheet().last_written_row_index() >= MAX_ROWS {
            if !self.should_create_new_sheets_automatically {
                return Err(Error::RowLimitReached(MAX_ROWS));
            }
            self.add_new_sheet_and_make_it_current()?;
        }
        let worksheet = &mut self.worksheets[self.current_sheet_index];
        self.worksheet_manager.add_row(worksheet, row)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.worksheets.iter().map(Worksheet::sheet)
    }

    fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.worksheets.iter().map(|ws| ws.sheet().name())
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    pub fn current_sheet(&self) -> &Sheet {
        self.current_worksheet().sheet()
    }

    pub fn current_sheet_index(&self) -> usize {
        self.current_sheet_index
    }

    fn current_worksheet(&self) -> &Worksheet {
        &self.worksheets[self.current_sheet_index]
    }

    fn current_worksheet_mut(&mut self) -> &mut Worksheet {
        &mut self.worksheets[self.current_sheet_index]
    }

    pub fn set_current_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetNotFound(index));
        }
        self.current_sheet_index = index;
        Ok(())
    }

    /// Rename the current sheet.
    pub fn set_sheet_name(&mut self, name: &str) -> Result<()> {
        let current = self.current_sheet_index;
        let others = self
            .worksheets
            .iter()
            .filter(|ws| ws.sheet().index() != current)
            .map(|ws| ws.sheet().name());
        validate_sheet_name(name, others)?;
        self.current_worksheet_mut()
            .sheet_mut_until_closed()?
            .set_name(name.to_string());
        Ok(())
    }

    /// Show or hide the current sheet. At least one sheet stays visible.
    pub fn set_sheet_visibility(&mut self, visible: bool) -> Result<()> {
        if !visible {
            let current = self.current_sheet_index;
            let others_visible = self
                .sheets()
                .any(|sheet| sheet.index() != current && sheet.is_visible());
            if !others_visible {
                return Err(Error::InvalidArgument(
                    "at least one sheet must stay visible".to_string(),
                ));
            }
        }
        self.current_worksheet_mut()
            .sheet_mut_until_closed()?
            .set_visible(visible);
        Ok(())
    }

    pub fn set_sheet_view(&mut self, view: SheetView) -> Result<()> {
        view.validate()?;
        self.current_worksheet_mut()
            .sheet_mut_before_data()?
            .set_view(view);
        Ok(())
    }

    pub fn add_column_widths(&mut self, widths: Vec<ColumnWidth>) -> Result<()> {
        self.current_worksheet_mut()
            .sheet_mut_before_data()?
            .add_column_widths(widths);
        Ok(())
    }

    /// Record a merged region on the sheet it names.
    pub fn add_merge_cell(&mut self, merge: MergeCell) -> Result<()> {
        merge.validate()?;
        match self.worksheets.get_mut(merge.sheet_index) {
            Some(worksheet) => worksheet.sheet_mut_until_closed()?.add_merge_cell(merge),
            None => self.pending_merge_cells.push(merge),
        }
        Ok(())
    }

    pub fn style_manager(&self) -> &StyleManager {
        self.worksheet_manager.style_manager()
    }

    pub fn shared_strings_path(&self) -> &Path {
        self.worksheet_manager.shared_strings().path()
    }

    pub fn staging_path(&self) -> &Path {
        self.staging_dir.path()
    }

    /// Finish every worksheet and the shared string table.
    pub fn close(&mut self) -> Result<()> {
        for worksheet in &mut self.worksheets {
            self.worksheet_manager.close(worksheet)?;
        }
        self.worksheet_manager.shared_strings_mut().close()?;
        Ok(())
    }

    /// Release every open handle without finishing the parts.
    pub fn abandon(&mut self) {
        for worksheet in &mut self.worksheets {
            worksheet.abandon();
        }
        self.worksheet_manager.shared_strings_mut().abandon();
    }

    /// Remove the staging directory and everything in it.
    pub fn remove_staging(self) -> Result<()> {
        let Self {
            staging_dir,
            worksheets,
            worksheet_manager,
            ..
        } = self;
        drop(worksheets);
        drop(worksheet_manager);
        staging_dir.close()?;
        Ok(())
    }
}
