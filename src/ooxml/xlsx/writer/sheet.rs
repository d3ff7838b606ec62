//! Streaming worksheet writer.
//!
//! Rows are turned into `<row>` elements one at a time and appended to the
//! worksheet's staging file; nothing beyond the current row is buffered. The
//! part header up to `<sheetData>` is written lazily on the first non-empty
//! row, and the `outlineLevelRow` attribute of `<sheetFormatPr>` is patched
//! in place whenever a deeper outline level shows up.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::debug;

use super::stream::PartWriter;
use super::strings::SharedStringsWriter;
use super::styles::StyleManager;
use crate::common::xml::{Escaper, escape_xml};
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::xlsx::format::{
    MAX_CELL_TEXT_LENGTH, MAX_COLUMNS, cell_reference, date_to_serial, datetime_to_serial,
    format_float, format_integer,
};
use crate::ooxml::xlsx::worksheet::Sheet;
use crate::sheet::{Cell, CellType, CellValue, Row, Style};

/// Room reserved in `<sheetFormatPr>` for ` outlineLevelRow="N"`.
const OUTLINE_PLACEHOLDER_LEN: usize = 24;

/// Row height used when none is configured.
const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Streaming state of one worksheet.
#[derive(Debug)]
pub struct Worksheet {
    sheet: Sheet,
    path: PathBuf,
    writer: Option<PartWriter<File>>,
    has_sheet_data_started: bool,
    is_closed: bool,
    /// One-based index of the last row written, empty rows included
    last_written_row_index: u32,
    max_outline_level: u8,
    outline_placeholder_offset: Option<u64>,
}

impl Worksheet {
    pub fn new(sheet: Sheet, path: PathBuf) -> Self {
        Self {
            sheet,
            path,
            writer: None,
            has_sheet_data_started: false,
            is_closed: false,
            last_written_row_index: 0,
            max_outline_level: 0,
            outline_placeholder_offset: None,
        }
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// Mutable access to the definition, refused once the body has started.
    pub fn sheet_mut_before_data(&mut self) -> Result<&mut Sheet> {
        if self.has_sheet_data_started || self.is_closed {
            return Err(Error::SheetDataStarted(self.sheet.name().to_string()));
        }
        Ok(&mut self.sheet)
    }

    /// Mutable access to the definition for changes allowed until close.
    pub fn sheet_mut_until_closed(&mut self) -> Result<&mut Sheet> {
        if self.is_closed {
            return Err(Error::WriterClosed);
        }
        Ok(&mut self.sheet)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_written_row_index(&self) -> u32 {
        self.last_written_row_index
    }

    pub fn max_outline_level(&self) -> u8 {
        self.max_outline_level
    }

    pub fn has_sheet_data_started(&self) -> bool {
        self.has_sheet_data_started
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    fn writer(&mut self) -> Result<&mut PartWriter<File>> {
        self.writer.as_mut().ok_or(Error::WriterClosed)
    }

    /// Drop the open handle without finishing the part.
    pub(crate) fn abandon(&mut self) {
        self.writer = None;
        self.is_closed = true;
    }
}

/// Per-format worksheet emission, selected once when the document is opened.
pub trait WorksheetManager {
    /// Open the worksheet's output and write the part preamble.
    fn start_sheet(&mut self, worksheet: &mut Worksheet) -> Result<()>;

    /// Write `row` and advance the worksheet's row counter.
    ///
    /// Rows without cells and without an outline level only advance the
    /// counter.
    fn add_row(&mut self, worksheet: &mut Worksheet, row: &Row) -> Result<()>;

    /// Finish the part and release its handle. Does nothing once closed.
    fn close(&mut self, worksheet: &mut Worksheet) -> Result<()>;
}

/// Settings the worksheet writer takes from the writer options.
#[derive(Debug, Clone)]
pub struct SheetWriterSettings {
    pub should_use_inline_strings: bool,
    pub default_column_width: Option<f64>,
    pub default_row_height: Option<f64>,
}

/// SpreadsheetML worksheet writer shared by all sheets of one document.
#[derive(Debug)]
pub struct XlsxWorksheetManager {
    settings: SheetWriterSettings,
    style_manager: StyleManager,
    shared_strings: SharedStringsWriter,
    escaper: Escaper,
    /// Registered style per (row style, cell style) canonical key pair
    merged_style_cache: HashMap<(String, String), Style>,
    empty_cell_style_cache: HashMap<u32, bool>,
}

impl XlsxWorksheetManager {
    pub fn new(
        settings: SheetWriterSettings,
        style_manager: StyleManager,
        shared_strings: SharedStringsWriter,
    ) -> Self {
        Self {
            settings,
            style_manager,
            shared_strings,
            escaper: Escaper::new(),
            merged_style_cache: HashMap::new(),
            empty_cell_style_cache: HashMap::new(),
        }
    }

    pub fn style_manager(&self) -> &StyleManager {
        &self.style_manager
    }

    pub fn shared_strings(&self) -> &SharedStringsWriter {
        &self.shared_strings
    }

    pub fn shared_strings_mut(&mut self) -> &mut SharedStringsWriter {
        &mut self.shared_strings
    }

    /// Write everything from `<sheetViews>` up to `<sheetData>` once.
    fn ensure_sheet_data_started(&mut self, worksheet: &mut Worksheet) -> Result<()> {
        if worksheet.has_sheet_data_started {
            return Ok(());
        }

        let mut xml = String::with_capacity(512);
        worksheet.sheet.view().write_xml(&mut xml, false)?;

        xml.push_str("<sheetFormatPr");
        if let Some(width) = self.settings.default_column_width {
            write!(xml, r#" defaultColWidth="{}""#, width)?;
        }
        match self.settings.default_row_height {
            Some(height) => write!(xml, r#" defaultRowHeight="{}" customHeight="1""#, height)?,
            None => write!(xml, r#" defaultRowHeight="{}""#, DEFAULT_ROW_HEIGHT)?,
        }
        let header_offset = xml.len() as u64;
        xml.push_str(&" ".repeat(OUTLINE_PLACEHOLDER_LEN));
        xml.push_str("/>");

        let widths = worksheet.sheet.column_widths();
        if !widths.is_empty() {
            xml.push_str("<cols>");
            for col in widths {
                write!(
                    xml,
                    r#"<col min="{}" max="{}" width="{}" customWidth="1"/>"#,
                    col.min, col.max, col.width
                )?;
            }
            xml.push_str("</cols>");
        }
        xml.push_str("<sheetData>");

        let writer = worksheet.writer()?;
        let offset = writer.position() + header_offset;
        writer.write_str(&xml)?;
        worksheet.outline_placeholder_offset = Some(offset);
        worksheet.has_sheet_data_started = true;
        Ok(())
    }

    fn write_row(&mut self, worksheet: &mut Worksheet, row: &Row) -> Result<()> {
        if let Some(column) = row.last_column().filter(|column| *column >= MAX_COLUMNS) {
            return Err(Error::InvalidArgument(format!(
                "column index {} exceeds the limit of {} columns",
                column, MAX_COLUMNS
            )));
        }
        self.ensure_sheet_data_started(worksheet)?;

        let row_index = worksheet.last_written_row_index + 1;
        let outline_level = row.outline_level();
        let mut xml = String::with_capacity(64 + row.cells().count() * 32);

        write!(xml, r#"<row r="{}""#, row_index)?;
        if row.has_cells() {
            write!(xml, r#" spans="1:{}""#, row.cell_count())?;
        }
        if let Some(height) = row.height() {
            write!(xml, r#" ht="{}" customHeight="1""#, height)?;
        }
        if outline_level > 0 {
            write!(xml, r#" outlineLevel="{}""#, outline_level)?;
        }

        if row.has_cells() {
            xml.push('>');
            let row_style = self.effective_row_style(row.style());
            let row_style_key = row_style.canonical_key()?;
            for (column, cell) in row.cells() {
                self.write_cell(&mut xml, row_index, column, cell, &row_style, &row_style_key)?;
            }
            xml.push_str("</row>");
        } else {
            xml.push_str("/>");
        }

        worksheet.writer()?.write_str(&xml)?;

        if outline_level > worksheet.max_outline_level {
            worksheet.max_outline_level = outline_level;
            if let Some(offset) = worksheet.outline_placeholder_offset {
                let attribute = format!(r#" outlineLevelRow="{}""#, outline_level);
                worksheet.writer()?.patch_at(offset, attribute.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Row style with the document default underneath.
    fn effective_row_style(&self, style: &Style) -> Style {
        match self.style_manager.default_style() {
            Some(default_style) => style.merge_with(default_style),
            None => style.clone(),
        }
    }

    /// Registered style for a cell, merged over its row style.
    fn resolve_cell_style(
        &mut self,
        cell: &Cell,
        row_style: &Style,
        row_style_key: &str,
    ) -> Result<Style> {
        let cell_style_key = if *cell.style() == Style::default() {
            String::new()
        } else {
            cell.style().canonical_key()?
        };
        let cache_key = (row_style_key.to_string(), cell_style_key);
        let merged = match self.merged_style_cache.get(&cache_key) {
            Some(style) => style.clone(),
            None => {
                let registered = self
                    .style_manager
                    .register_style(cell.style().merge_with(row_style))?;
                self.merged_style_cache
                    .insert(cache_key, registered.clone());
                registered
            },
        };

        match self
            .style_manager
            .apply_extra_styles_if_needed(cell.cell_type(), cell.value(), &merged)
        {
            Some(adjusted) => self.style_manager.register_style(adjusted),
            None => Ok(merged),
        }
    }

    fn should_apply_style_on_empty_cell(&mut self, style_id: u32) -> bool {
        let style_manager = &self.style_manager;
        *self
            .empty_cell_style_cache
            .entry(style_id)
            .or_insert_with(|| style_manager.should_apply_style_on_empty_cell(style_id))
    }

    fn write_cell(
        &mut self,
        xml: &mut String,
        row_index: u32,
        column: u32,
        cell: &Cell,
        row_style: &Style,
        row_style_key: &str,
    ) -> Result<()> {
        if column >= MAX_COLUMNS {
            return Err(Error::InvalidArgument(format!(
                "column index {} exceeds the limit of {} columns",
                column, MAX_COLUMNS
            )));
        }

        let style = self.resolve_cell_style(cell, row_style, row_style_key)?;
        let style_id = style.id().unwrap_or(0);
        let cell_ref = cell_reference(column, row_index);
        let mismatch = || {
            Error::InvalidArgument(format!(
                "cell {} has type {:?} but holds {:?}",
                cell_ref,
                cell.cell_type(),
                cell.value()
            ))
        };

        match (cell.cell_type(), cell.value()) {
            (CellType::String, CellValue::String(text)) => {
                if text.chars().count() > MAX_CELL_TEXT_LENGTH {
                    return Err(Error::InvalidArgument(format!(
                        "cell {} text exceeds {} characters",
                        cell_ref, MAX_CELL_TEXT_LENGTH
                    )));
                }
                if self.settings.should_use_inline_strings {
                    write!(
                        xml,
                        r#"<c r="{}" s="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        cell_ref,
                        style_id,
                        self.escaper.escape(text)
                    )?;
                } else {
                    let index = self.shared_strings.write_string(text)?;
                    write!(
                        xml,
                        r#"<c r="{}" s="{}" t="s"><v>{}</v></c>"#,
                        cell_ref, style_id, index
                    )?;
                }
            },
            (CellType::Boolean, CellValue::Bool(value)) => {
                write!(
                    xml,
                    r#"<c r="{}" s="{}" t="b"><v>{}</v></c>"#,
                    cell_ref,
                    style_id,
                    u8::from(*value)
                )?;
            },
            (CellType::Numeric, CellValue::Int(value)) => {
                write!(
                    xml,
                    r#"<c r="{}" s="{}"><v>{}</v></c>"#,
                    cell_ref,
                    style_id,
                    format_integer(*value)
                )?;
            },
            (CellType::Numeric, CellValue::Float(value)) => {
                write!(
                    xml,
                    r#"<c r="{}" s="{}"><v>{}</v></c>"#,
                    cell_ref,
                    style_id,
                    format_float(*value)?
                )?;
            },
            (CellType::Formula, CellValue::String(formula)) => {
                let formula = formula.strip_prefix('=').unwrap_or(formula);
                write!(
                    xml,
                    r#"<c r="{}" s="{}"><f>{}</f></c>"#,
                    cell_ref,
                    style_id,
                    escape_xml(formula)
                )?;
            },
            (CellType::Date, CellValue::Date(date)) => {
                write!(
                    xml,
                    r#"<c r="{}" s="{}"><v>{}</v></c>"#,
                    cell_ref,
                    style_id,
                    format_float(date_to_serial(*date)?)?
                )?;
            },
            (CellType::Date, CellValue::DateTime(datetime)) => {
                write!(
                    xml,
                    r#"<c r="{}" s="{}"><v>{}</v></c>"#,
                    cell_ref,
                    style_id,
                    format_float(datetime_to_serial(*datetime)?)?
                )?;
            },
            (CellType::Error, CellValue::String(text)) => {
                write!(
                    xml,
                    r#"<c r="{}" s="{}" t="e"><v>{}</v></c>"#,
                    cell_ref,
                    style_id,
                    escape_xml(text)
                )?;
            },
            // Only textual error codes can be represented.
            (CellType::Error, _) => {},
            (CellType::Empty, _) => {
                if self.should_apply_style_on_empty_cell(style_id) {
                    write!(xml, r#"<c r="{}" s="{}"/>"#, cell_ref, style_id)?;
                }
            },
            _ => return Err(mismatch()),
        }
        Ok(())
    }
}

impl WorksheetManager for XlsxWorksheetManager {
    fn start_sheet(&mut self, worksheet: &mut Worksheet) -> Result<()> {
        let mut writer = PartWriter::create(&worksheet.path)?;
        writer.write_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#)?;
        writer.write_str(&format!(
            r#"<worksheet xmlns="{}" xmlns:r="{}">"#,
            namespace::SML_MAIN,
            namespace::OFC_RELATIONSHIPS
        ))?;
        worksheet.writer = Some(writer);
        debug!(
            "started worksheet {:?} at {}",
            worksheet.sheet.name(),
            worksheet.path.display()
        );
        Ok(())
    }

    fn add_row(&mut self, worksheet: &mut Worksheet, row: &Row) -> Result<()> {
        if worksheet.is_closed {
            return Err(Error::WriterClosed);
        }
        if !row.is_empty() {
            self.write_row(worksheet, row)?;
        }
        worksheet.last_written_row_index += 1;
        Ok(())
    }

    fn close(&mut self, worksheet: &mut Worksheet) -> Result<()> {
        if worksheet.is_closed || worksheet.writer.is_none() {
            worksheet.is_closed = true;
            return Ok(());
        }
        self.ensure_sheet_data_started(worksheet)?;

        let mut xml = String::from("</sheetData>");
        let merges = worksheet.sheet.merge_cells();
        if !merges.is_empty() {
            write!(xml, r#"<mergeCells count="{}">"#, merges.len())?;
            for merge in merges {
                write!(
                    xml,
                    r#"<mergeCell ref="{}:{}"/>"#,
                    cell_reference(merge.start_column, merge.start_row + 1),
                    cell_reference(merge.end_column, merge.end_row + 1)
                )?;
            }
            xml.push_str("</mergeCells>");
        }
        xml.push_str("</worksheet>");

        let mut writer = worksheet.writer.take().ok_or(Error::WriterClosed)?;
        worksheet.is_closed = true;
        writer.write_str(&xml)?;
        writer.finish()?;
        debug!(
            "closed worksheet {:?} after {} rows",
            worksheet.sheet.name(),
            worksheet.last_written_row_index
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::options::{ColumnWidth, MergeCell, default_style};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        manager: XlsxWorksheetManager,
        worksheet: Worksheet,
    }

    fn fixture(should_use_inline_strings: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let shared_strings =
            SharedStringsWriter::create(&dir.path().join("sharedStrings.xml")).unwrap();
        let style_manager = StyleManager::new(&default_style(), true).unwrap();
        let settings = SheetWriterSettings {
            should_use_inline_strings,
            default_column_width: None,
            default_row_height: None,
        };
        let mut manager = XlsxWorksheetManager::new(settings, style_manager, shared_strings);
        let mut worksheet = Worksheet::new(
            Sheet::new(0, "Sheet1".to_string()),
            dir.path().join("sheet1.xml"),
        );
        manager.start_sheet(&mut worksheet).unwrap();
        Fixture {
            dir,
            manager,
            worksheet,
        }
    }

    fn finish(mut fixture: Fixture) -> String {
        fixture.manager.close(&mut fixture.worksheet).unwrap();
        std::fs::read_to_string(fixture.dir.path().join("sheet1.xml")).unwrap()
    }

    #[test]
    fn test_row_with_mixed_cells() {
        let mut fx = fixture(true);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let row = Row::new()
            .with_cell(0, Cell::new("A"))
            .with_cell(1, Cell::new(true))
            .with_cell(2, Cell::new(3.5))
            .with_cell(3, Cell::new(date));
        fx.manager.add_row(&mut fx.worksheet, &row).unwrap();
        assert_eq!(fx.worksheet.last_written_row_index(), 1);

        let xml = finish(fx);
        assert!(xml.contains(r#"<row r="1" spans="1:4">"#));
        assert!(xml.contains(
            r#"<c r="A1" s="0" t="inlineStr"><is><t xml:space="preserve">A</t></is></c>"#
        ));
        assert!(xml.contains(r#"<c r="B1" s="0" t="b"><v>1</v></c>"#));
        assert!(xml.contains(r#"<c r="C1" s="0"><v>3.5</v></c>"#));
        // Dates get the built-in date format as an extra style.
        assert!(xml.contains(r#"<c r="D1" s="1"><v>45292</v></c>"#));
        assert!(xml.ends_with("</sheetData></worksheet>"));
    }

    #[test]
    fn test_shared_string_cells() {
        let mut fx = fixture(false);
        let row = Row::from_values(["x", "y", "x"]);
        fx.manager.add_row(&mut fx.worksheet, &row).unwrap();
        assert_eq!(fx.manager.shared_strings().unique_count(), 2);
        let xml = finish(fx);
        assert!(xml.contains(r#"<c r="A1" s="0" t="s"><v>0</v></c>"#));
        assert!(xml.contains(r#"<c r="C1" s="0" t="s"><v>0</v></c>"#));
    }

    #[test]
    fn test_empty_rows_only_advance_counter() {
        let mut fx = fixture(true);
        fx.manager.add_row(&mut fx.worksheet, &Row::new()).unwrap();
        fx.manager
            .add_row(&mut fx.worksheet, &Row::from_values([1]))
            .unwrap();
        fx.manager.add_row(&mut fx.worksheet, &Row::new()).unwrap();
        assert_eq!(fx.worksheet.last_written_row_index(), 3);

        let xml = finish(fx);
        assert_eq!(xml.matches("<row ").count(), 1);
        assert!(xml.contains(r#"<row r="2" spans="1:1">"#));
    }

    #[test]
    fn test_outline_level_is_patched() {
        let mut fx = fixture(true);
        let mut grouped = Row::from_values(["child"]);
        grouped.set_outline_level(2).unwrap();
        let mut outline_only = Row::new();
        outline_only.set_outline_level(1).unwrap();

        fx.manager
            .add_row(&mut fx.worksheet, &Row::from_values(["parent"]))
            .unwrap();
        fx.manager.add_row(&mut fx.worksheet, &grouped).unwrap();
        fx.manager.add_row(&mut fx.worksheet, &outline_only).unwrap();
        assert_eq!(fx.worksheet.max_outline_level(), 2);

        let xml = finish(fx);
        assert!(xml.contains(r#"<sheetFormatPr defaultRowHeight="15" outlineLevelRow="2""#));
        assert!(xml.contains(r#"<row r="2" spans="1:1" outlineLevel="2">"#));
        assert!(xml.contains(r#"<row r="3" outlineLevel="1"/>"#));
    }

    #[test]
    fn test_oversized_text_is_rejected_without_output() {
        let mut fx = fixture(true);
        let row = Row::from_values(["ok".to_string(), "x".repeat(MAX_CELL_TEXT_LENGTH + 1)]);
        let err = fx.manager.add_row(&mut fx.worksheet, &row).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(fx.worksheet.last_written_row_index(), 0);

        let xml = finish(fx);
        assert!(!xml.contains("<row"));
        assert!(!xml.contains(r#"r="A1""#));
    }

    #[test]
    fn test_formula_and_error_cells() {
        let mut fx = fixture(true);
        let row = Row::new()
            .with_cell(0, Cell::new("=IF(A2<1,\"lo\",\"hi\")"))
            .with_cell(1, Cell::error("#DIV/0!"))
            .with_cell(2, Cell::with_type(5, CellType::Error));
        fx.manager.add_row(&mut fx.worksheet, &row).unwrap();
        let xml = finish(fx);
        assert!(xml.contains(r#"<f>IF(A2&lt;1,&quot;lo&quot;,&quot;hi&quot;)</f>"#));
        assert!(xml.contains(r#"<c r="B1" s="0" t="e"><v>#DIV/0!</v></c>"#));
        assert!(!xml.contains(r#"r="C1""#));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut fx = fixture(true);
        let row = Row::new().with_cell(0, Cell::with_type("soon", CellType::Date));
        let err = fx.manager.add_row(&mut fx.worksheet, &row).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        let row = Row::new().with_cell(MAX_COLUMNS, Cell::new(1));
        assert!(fx.manager.add_row(&mut fx.worksheet, &row).is_err());
    }

    #[test]
    fn test_out_of_range_column_is_rejected_before_output() {
        let mut fx = fixture(true);
        for column in [MAX_COLUMNS, 3_000_000_000, u32::MAX] {
            let row = Row::new().with_cell(column, Cell::new(1));
            let err = fx.manager.add_row(&mut fx.worksheet, &row).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
        }
        assert!(!fx.worksheet.has_sheet_data_started());
        assert_eq!(fx.worksheet.last_written_row_index(), 0);
    }

    #[test]
    fn test_empty_cells_need_visible_style() {
        let mut fx = fixture(true);
        let filled = Style::new().with_background_color("FFFFFF00");
        let row = Row::new()
            .with_cell(0, Cell::empty())
            .with_cell(1, Cell::empty().with_style(filled))
            .with_cell(2, Cell::new(""));
        fx.manager.add_row(&mut fx.worksheet, &row).unwrap();
        let xml = finish(fx);
        assert!(!xml.contains(r#"r="A1""#));
        assert!(xml.contains(r#"<c r="B1" s="1"/>"#));
        assert!(!xml.contains(r#"r="C1""#));
    }

    #[test]
    fn test_caller_row_is_not_mutated() {
        let mut fx = fixture(true);
        let row = Row::from_values(["multi\nline"]).with_style(Style::new().with_italic(true));
        let before = row.clone();
        fx.manager.add_row(&mut fx.worksheet, &row).unwrap();
        assert_eq!(row, before);
        assert_eq!(row.cell(0).unwrap().style().id(), None);
    }

    #[test]
    fn test_header_with_columns_and_merges() {
        let mut fx = fixture(true);
        {
            let sheet = fx.worksheet.sheet_mut_before_data().unwrap();
            sheet.add_column_widths(ColumnWidth::grouped(20.0, [0, 1]).unwrap());
        }
        fx.manager
            .add_row(&mut fx.worksheet, &Row::from_values(["a"]))
            .unwrap();
        assert!(matches!(
            fx.worksheet.sheet_mut_before_data(),
            Err(Error::SheetDataStarted(_))
        ));
        fx.worksheet
            .sheet_mut_until_closed()
            .unwrap()
            .add_merge_cell(MergeCell::new(0, 0, 0, 1, 0).unwrap());

        let xml = finish(fx);
        assert!(xml.contains(r#"<cols><col min="1" max="2" width="20" customWidth="1"/></cols><sheetData>"#));
        assert!(xml.contains(
            r#"</sheetData><mergeCells count="1"><mergeCell ref="A1:B1"/></mergeCells></worksheet>"#
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut fx = fixture(true);
        fx.manager.close(&mut fx.worksheet).unwrap();
        fx.manager.close(&mut fx.worksheet).unwrap();
        assert!(fx.worksheet.is_closed());
        assert!(matches!(
            fx.manager.add_row(&mut fx.worksheet, &Row::from_values([1])),
            Err(Error::WriterClosed)
        ));
    }
}
