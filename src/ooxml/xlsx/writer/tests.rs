//! End-to-end tests for the streaming writer
//!
//! Documents are written into memory or a temporary directory and read back
//! with `zip` and `quick-xml`.

use super::lifecycle::XlsxWriter;
use crate::common::Error;
use crate::common::xml::unescape_xml;
use crate::ooxml::xlsx::format::{MAX_COLUMNS, MAX_ROWS};
use crate::ooxml::xlsx::views::SheetView;
use crate::sheet::{Border, BorderLineStyle, Cell, CellType, CellValue, Row, Style};
use chrono::NaiveDate;
use proptest::prelude::*;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};

fn write_in_memory<F>(configure: F, rows: Vec<Row>) -> Vec<u8>
where
    F: FnOnce(&mut XlsxWriter<Cursor<Vec<u8>>>),
{
    let mut writer = XlsxWriter::new();
    configure(&mut writer);
    writer.open_to_stream(Cursor::new(Vec::new())).unwrap();
    writer.add_rows(rows).unwrap();
    writer.into_inner().unwrap().into_inner()
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut part)
        .unwrap();
    part
}

fn assert_well_formed(name: &str, xml: &str) {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => panic!("{} is not well-formed: {}", name, e),
        }
    }
}

fn sample_row() -> Row {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    Row::from_values([
        CellValue::from("A"),
        CellValue::from(true),
        CellValue::from(3.5),
        CellValue::from(date),
    ])
}

#[test]
fn test_write_inline_strings() {
    let bytes = write_in_memory(|_| {}, vec![sample_row()]);
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");

    assert!(sheet.contains(
        r#"<row r="1" spans="1:4"><c r="A1" s="0" t="inlineStr"><is><t xml:space="preserve">A</t></is></c>"#
    ));
    assert!(sheet.contains(r#"<c r="B1" s="0" t="b"><v>1</v></c>"#));
    assert!(sheet.contains(r#"<c r="C1" s="0"><v>3.5</v></c>"#));
    assert!(sheet.contains(r#"<c r="D1" s="1"><v>45352</v></c></row>"#));

    let styles = read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains(r#"<cellXfs count="2">"#));
    assert!(styles.contains(r#"numFmtId="14""#));

    let strings = read_part(&bytes, "xl/sharedStrings.xml");
    assert!(strings.contains(r#"count="0" uniqueCount="0""#));
}

#[test]
fn test_write_shared_strings() {
    let rows = vec![
        sample_row(),
        Row::from_values(["A", "B", "A"]),
    ];
    let bytes = write_in_memory(
        |writer| writer.set_should_use_inline_strings(false).unwrap(),
        rows,
    );
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="0" t="s"><v>0</v></c>"#));
    assert!(sheet.contains(r#"<c r="B2" s="0" t="s"><v>1</v></c>"#));
    assert!(sheet.contains(r#"<c r="C2" s="0" t="s"><v>0</v></c>"#));
    assert!(!sheet.contains("inlineStr"));

    let strings = read_part(&bytes, "xl/sharedStrings.xml");
    assert!(strings.contains(r#"count="4" uniqueCount="2""#));
    assert_eq!(strings.matches("<si>").count(), 2);
    assert_well_formed("xl/sharedStrings.xml", &strings);
}

#[test]
fn test_every_part_is_well_formed() {
    let mut outlined = Row::from_values(["detail"]);
    outlined.set_outline_level(2).unwrap();
    let rows = vec![
        sample_row().with_style(Style::new().with_bold(true)),
        outlined,
        Row::from_values(["<tag> & \"quotes\"", "=IF(A1<>\"\",1,0)"]),
    ];
    let bytes = write_in_memory(
        |writer| writer.set_creator("Data & Reports").unwrap(),
        rows,
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(&bytes[..])).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert_eq!(names.len(), 9);
    for name in names {
        let mut part = String::new();
        archive
            .by_name(&name)
            .unwrap()
            .read_to_string(&mut part)
            .unwrap();
        assert_well_formed(&name, &part);
    }
}

#[test]
fn test_failed_row_removes_everything() {
    let dir = tempfile::tempdir().unwrap();
    let staging = tempfile::tempdir().unwrap();
    let path = dir.path().join("failed.xlsx");

    let mut writer = XlsxWriter::new();
    writer.set_temp_folder(staging.path()).unwrap();
    writer.open_to_file(&path).unwrap();
    assert!(path.exists());
    writer.add_row(&Row::from_values(["ok"])).unwrap();

    let oversized = "x".repeat(32_768);
    let result = writer.add_row(&Row::from_values([oversized]));
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
    writer.close().unwrap();

    let mut retry = XlsxWriter::new();
    retry.open_to_file(&path).unwrap();
    retry.add_row(&Row::from_values(["x".repeat(32_767)])).unwrap();
    retry.close().unwrap();
    assert!(path.exists());
}

#[test]
fn test_type_mismatch_fails_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mismatch.xlsx");
    let mut writer = XlsxWriter::new();
    writer.open_to_file(&path).unwrap();
    writer.add_row(&Row::from_values(["before"])).unwrap();

    let row = Row::new().with_cell(0, Cell::with_type("yes", CellType::Boolean));
    assert!(matches!(writer.add_row(&row), Err(Error::InvalidArgument(_))));
    assert!(!writer.is_opened());
    assert!(!path.exists());

    let mut retry = XlsxWriter::new();
    retry.open_to_file(&path).unwrap();
    retry.add_row(&Row::from_values([true])).unwrap();
    retry.close().unwrap();
    assert!(path.exists());
}

#[test]
fn test_huge_column_index_fails_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.xlsx");
    let mut writer = XlsxWriter::new();
    writer.open_to_file(&path).unwrap();

    let row = Row::new().with_cell(3_000_000_000, Cell::new(1));
    assert!(matches!(writer.add_row(&row), Err(Error::InvalidArgument(_))));
    assert!(!writer.is_opened());
    assert!(!path.exists());

    let edge = write_in_memory(
        |_| {},
        vec![Row::new().with_cell(MAX_COLUMNS - 1, Cell::new(1))],
    );
    let sheet = read_part(&edge, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<row r="1" spans="1:16384">"#));
    assert!(sheet.contains(r#"<c r="XFD1""#));
}

#[test]
fn test_out_of_range_merges_are_rejected() {
    let mut writer: XlsxWriter<Cursor<Vec<u8>>> = XlsxWriter::new();
    writer.open_to_stream(Cursor::new(Vec::new())).unwrap();
    for (end_column, end_row) in [(1, u32::MAX), (1, 5_000_000), (1, MAX_ROWS), (MAX_COLUMNS, 1)] {
        assert!(matches!(
            writer.merge_cells(0, 0, end_column, end_row),
            Err(Error::InvalidArgument(_))
        ));
    }
    writer
        .merge_cells(0, 0, MAX_COLUMNS - 1, MAX_ROWS - 1)
        .unwrap();
    writer.add_row(&Row::from_values(["all"])).unwrap();

    let bytes = writer.into_inner().unwrap().into_inner();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(
        r#"<mergeCells count="1"><mergeCell ref="A1:XFD1048576"/></mergeCells>"#
    ));
    assert_well_formed("sheet1.xml", &sheet);
}

#[test]
fn test_open_twice_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = XlsxWriter::new();
    writer.open_to_file(dir.path().join("a.xlsx")).unwrap();
    assert!(matches!(
        writer.open_to_file(dir.path().join("b.xlsx")),
        Err(Error::AlreadyOpened)
    ));
    assert!(!dir.path().join("b.xlsx").exists());
    writer.close().unwrap();
}

#[test]
fn test_empty_rows_only_advance_index() {
    let rows = vec![Row::new(), Row::new(), Row::from_values([7])];
    let bytes = write_in_memory(|_| {}, rows);
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(!sheet.contains(r#"<row r="1""#));
    assert!(!sheet.contains(r#"<row r="2""#));
    assert!(sheet.contains(r#"<row r="3" spans="1:1"><c r="A3" s="0"><v>7</v></c></row>"#));
}

#[test]
fn test_outline_levels() {
    let mut grouped = Row::new();
    grouped.set_outline_level(3).unwrap();
    let mut nested = Row::from_values(["leaf"]);
    nested.set_outline_level(1).unwrap();

    let bytes = write_in_memory(|_| {}, vec![Row::from_values(["top"]), grouped, nested]);
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"outlineLevelRow="3""#));
    assert!(sheet.contains(r#"<row r="2" outlineLevel="3"/>"#));
    assert!(sheet.contains(r#"<row r="3" spans="1:1" outlineLevel="1">"#));
    assert_well_formed("sheet1.xml", &sheet);

    let mut row = Row::new();
    assert!(matches!(
        row.set_outline_level(8),
        Err(Error::InvalidOutlineLevel(8))
    ));
}

#[test]
fn test_equal_styles_share_an_id() {
    let first = Style::new().with_bold(true).with_background_color("FFFFFF00");
    let second = Style::new().with_background_color("FFFFFF00").with_bold(true);
    let rows = vec![
        Row::new()
            .with_cell(0, Cell::new("a").with_style(first))
            .with_cell(1, Cell::new("b").with_style(second)),
    ];
    let bytes = write_in_memory(|_| {}, rows);
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="1""#));
    assert!(sheet.contains(r#"<c r="B1" s="1""#));
    let styles = read_part(&bytes, "xl/styles.xml");
    assert!(styles.contains(r#"<cellXfs count="2">"#));
}

#[test]
fn test_cell_style_overrides_row_style() {
    let row = Row::new()
        .with_style(Style::new().with_bold(true))
        .with_cell(0, Cell::new("bold"))
        .with_cell(1, Cell::new("plain").with_style(Style::new().with_bold(false)));
    let bytes = write_in_memory(|_| {}, vec![row]);
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="1""#));
    assert!(sheet.contains(r#"<c r="B1" s="2""#));
    let styles = read_part(&bytes, "xl/styles.xml");
    assert_eq!(styles.matches("<b/>").count(), 1);
}

#[test]
fn test_empty_cells_need_visible_style() {
    let boxed = Style::new().with_border(Border::all(BorderLineStyle::Thin, None));
    let row = Row::new()
        .with_cell(0, Cell::empty())
        .with_cell(1, Cell::empty().with_style(boxed))
        .with_cell(2, Cell::new(""));
    let bytes = write_in_memory(|_| {}, vec![row]);
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(!sheet.contains(r#"r="A1""#));
    assert!(sheet.contains(r#"<c r="B1" s="1"/>"#));
    assert!(!sheet.contains(r#"r="C1""#));
}

#[test]
fn test_extra_styles_can_be_disabled() {
    let rows = vec![Row::from_values([
        CellValue::from("two\nlines"),
        CellValue::from(NaiveDate::from_ymd_opt(1900, 3, 1).unwrap()),
    ])];
    let with_extra = write_in_memory(|_| {}, rows.clone());
    let sheet = read_part(&with_extra, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="1""#));
    assert!(sheet.contains(r#"<c r="B1" s="2"><v>61</v></c>"#));
    assert!(read_part(&with_extra, "xl/styles.xml").contains(r#"wrapText="1""#));

    let plain = write_in_memory(
        |writer| writer.set_should_apply_extra_styles(false).unwrap(),
        rows,
    );
    let sheet = read_part(&plain, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="0""#));
    assert!(sheet.contains(r#"<c r="B1" s="0"><v>61</v></c>"#));
}

#[test]
fn test_formula_and_error_cells() {
    let row = Row::new()
        .with_cell(0, Cell::new("=A2&\"<x>\""))
        .with_cell(1, Cell::error("#N/A"));
    let bytes = write_in_memory(|_| {}, vec![row]);
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<c r="A1" s="0"><f>A2&amp;&quot;&lt;x&gt;&quot;</f></c>"#));
    assert!(sheet.contains(r#"<c r="B1" s="0" t="e"><v>#N/A</v></c>"#));
}

#[test]
fn test_multiple_sheets() {
    let mut writer: XlsxWriter<Cursor<Vec<u8>>> = XlsxWriter::new();
    writer.open_to_stream(Cursor::new(Vec::new())).unwrap();
    writer.set_sheet_name("Summary").unwrap();
    writer.add_row(&Row::from_values(["total"])).unwrap();

    let sheet = writer.add_new_sheet_and_make_it_current().unwrap();
    assert_eq!(sheet.name(), "Sheet2");
    writer.set_sheet_name("Raw <data>").unwrap();
    writer.add_row(&Row::from_values(["raw"])).unwrap();
    writer.set_sheet_visibility(false).unwrap();

    writer.set_current_sheet(0).unwrap();
    writer.add_row(&Row::from_values(["second"])).unwrap();
    assert!(matches!(
        writer.set_current_sheet(2),
        Err(Error::SheetNotFound(2))
    ));
    let names: Vec<String> = writer
        .sheets()
        .unwrap()
        .iter()
        .map(|sheet| sheet.name().to_string())
        .collect();
    assert_eq!(names, vec!["Summary", "Raw <data>"]);

    let bytes = writer.into_inner().unwrap().into_inner();
    let workbook = read_part(&bytes, "xl/workbook.xml");
    assert!(workbook.contains(r#"activeTab="0""#));
    assert!(workbook.contains(r#"<sheet name="Summary" sheetId="1" r:id="rId1"/>"#));
    assert!(workbook.contains(
        r#"<sheet name="Raw &lt;data&gt;" sheetId="2" state="hidden" r:id="rId2"/>"#
    ));

    let first = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(first.contains(r#"<row r="2" spans="1:1">"#));
    let second = read_part(&bytes, "xl/worksheets/sheet2.xml");
    assert!(second.contains(r#"<c r="A1" s="0" t="inlineStr"><is><t xml:space="preserve">raw</t>"#));
}

#[test]
fn test_sheet_settings() {
    let mut writer: XlsxWriter<Cursor<Vec<u8>>> = XlsxWriter::new();
    writer.set_default_row_height(18.0).unwrap();
    writer.open_to_stream(Cursor::new(Vec::new())).unwrap();

    let mut view = SheetView::default();
    view.freeze(1, 0);
    writer.set_sheet_view(view).unwrap();
    writer.set_column_width(20.0, [0, 1, 4]).unwrap();
    writer.set_column_width_for_range(8.5, 6, 9).unwrap();
    writer.merge_cells(2, 0, 0, 1).unwrap();
    writer.add_row(&Row::from_values(["header"]).with_height(30.0)).unwrap();

    assert!(matches!(
        writer.set_column_width(10.0, [3]),
        Err(Error::SheetDataStarted(_))
    ));
    writer.merge_cells(0, 3, 1, 3).unwrap();

    let bytes = writer.into_inner().unwrap().into_inner();
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/>"#));
    assert!(sheet.contains(r#"defaultRowHeight="18" customHeight="1""#));
    assert!(sheet.contains(r#"<col min="1" max="2" width="20" customWidth="1"/>"#));
    assert!(sheet.contains(r#"<col min="5" max="5" width="20" customWidth="1"/>"#));
    assert!(sheet.contains(r#"<col min="7" max="10" width="8.5" customWidth="1"/>"#));
    assert!(sheet.contains(r#"<row r="1" spans="1:1" ht="30" customHeight="1">"#));
    assert!(sheet.contains(
        r#"<mergeCells count="2"><mergeCell ref="A1:C2"/><mergeCell ref="A4:B4"/></mergeCells>"#
    ));
    assert_well_formed("sheet1.xml", &sheet);
}

#[test]
fn test_close_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("twice.xlsx");
    let mut writer = XlsxWriter::new();
    writer.open_to_file(&path).unwrap();
    writer.add_row(&Row::from_values([1, 2, 3])).unwrap();
    writer.close().unwrap();
    let first = std::fs::read(&path).unwrap();
    writer.close().unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), first);
}

#[test]
fn test_empty_document() {
    let bytes = write_in_memory(|_| {}, Vec::new());
    let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<sheetData></sheetData></worksheet>"));
    assert_well_formed("sheet1.xml", &sheet);
}

proptest! {
    #[test]
    fn test_inline_text_survives(text in "[a-zA-Z0-9 &<>\"'\n;#]{1,40}") {
        let bytes = write_in_memory(|_| {}, vec![Row::from_values([text.as_str()])]);
        let sheet = read_part(&bytes, "xl/worksheets/sheet1.xml");
        assert_well_formed("sheet1.xml", &sheet);

        let open = r#"<t xml:space="preserve">"#;
        let start = sheet.find(open).unwrap() + open.len();
        let end = start + sheet[start..].find("</t>").unwrap();
        prop_assert_eq!(unescape_xml(&sheet[start..end]), text);
    }
}
