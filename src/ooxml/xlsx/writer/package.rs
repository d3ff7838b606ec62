//! XLSX package assembly.
//!
//! This module provides the final packaging step: it generates the small
//! package-level parts (content types, relationships, document properties,
//! workbook and styles) and copies the staged worksheet and shared string
//! parts into a ZIP archive without loading them into memory.

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::debug;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::workbook::WorkbookManager;
use crate::common::Result;
use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::{content_type, namespace, relationship_type};

const APPLICATION_NAME: &str = "Longan";

/// Builder for the ZIP container of an XLSX document.
pub struct PackageWriter<W: Write + Seek> {
    zip_writer: ZipWriter<W>,
}

impl<W: Write + Seek> PackageWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip_writer: ZipWriter::new(writer),
        }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
    }

    /// Add a part from memory.
    pub fn add_part(&mut self, path: &str, content: &str) -> Result<()> {
        self.zip_writer.start_file(path, Self::options())?;
        self.zip_writer.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Add a part by streaming a staged file.
    pub fn add_part_from_file(&mut self, path: &str, source: &Path) -> Result<()> {
        let mut file = File::open(source)?;
        self.zip_writer.start_file(path, Self::options())?;
        std::io::copy(&mut file, &mut self.zip_writer)?;
        Ok(())
    }

    /// Write the central directory and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip_writer.finish()?)
    }
}

/// Assemble the complete document from a closed workbook.
pub fn write_package<W: Write + Seek>(
    out: W,
    workbook: &WorkbookManager,
    creator: Option<&str>,
) -> Result<W> {
    let sheet_count = workbook.worksheets().len();
    let mut package = PackageWriter::new(out);

    package.add_part("[Content_Types].xml", &content_types_xml(sheet_count)?)?;
    package.add_part("_rels/.rels", &root_rels_xml()?)?;
    package.add_part("docProps/app.xml", &app_xml()?)?;
    package.add_part("docProps/core.xml", &core_xml(creator, Utc::now())?)?;
    package.add_part("xl/workbook.xml", &workbook_xml(workbook)?)?;
    package.add_part("xl/_rels/workbook.xml.rels", &workbook_rels_xml(sheet_count)?)?;
    package.add_part("xl/styles.xml", &workbook.style_manager().styles_xml()?)?;
    package.add_part_from_file("xl/sharedStrings.xml", workbook.shared_strings_path())?;
    for (i, worksheet) in workbook.worksheets().iter().enumerate() {
        package.add_part_from_file(&format!("xl/worksheets/sheet{}.xml", i + 1), worksheet.path())?;
    }

    debug!("packaged {} worksheets", sheet_count);
    package.finish()
}

fn xml_declaration() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#
}

fn content_types_xml(sheet_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(xml_declaration());
    write!(xml, r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES)?;
    write!(
        xml,
        r#"<Default Extension="rels" ContentType="{}"/>"#,
        content_type::OPC_RELATIONSHIPS
    )?;
    write!(
        xml,
        r#"<Default Extension="xml" ContentType="{}"/>"#,
        content_type::XML
    )?;

    let overrides = [
        ("/xl/workbook.xml", content_type::SML_SHEET_MAIN),
        ("/xl/styles.xml", content_type::SML_STYLES),
        ("/xl/sharedStrings.xml", content_type::SML_SHARED_STRINGS),
        ("/docProps/core.xml", content_type::OPC_CORE_PROPERTIES),
        ("/docProps/app.xml", content_type::OFC_EXTENDED_PROPERTIES),
    ];
    for (part, kind) in overrides {
        write!(xml, r#"<Override PartName="{}" ContentType="{}"/>"#, part, kind)?;
    }
    for n in 1..=sheet_count {
        write!(
            xml,
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="{}"/>"#,
            n,
            content_type::SML_WORKSHEET
        )?;
    }
    xml.push_str("</Types>");
    Ok(xml)
}

fn root_rels_xml() -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(xml_declaration());
    write!(xml, r#"<Relationships xmlns="{}">"#, namespace::OPC_RELATIONSHIPS)?;
    let rels = [
        (relationship_type::OFFICE_DOCUMENT, "xl/workbook.xml"),
        (relationship_type::CORE_PROPERTIES, "docProps/core.xml"),
        (relationship_type::EXTENDED_PROPERTIES, "docProps/app.xml"),
    ];
    for (i, (kind, target)) in rels.iter().enumerate() {
        write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{}" Target="{}"/>"#,
            i + 1,
            kind,
            target
        )?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

fn app_xml() -> Result<String> {
    let mut xml = String::with_capacity(256);
    xml.push_str(xml_declaration());
    write!(
        xml,
        r#"<Properties xmlns="{}"><Application>{}</Application></Properties>"#,
        namespace::OFC_EXTENDED_PROPERTIES,
        APPLICATION_NAME
    )?;
    Ok(xml)
}

fn core_xml(creator: Option<&str>, created: DateTime<Utc>) -> Result<String> {
    let timestamp = created.format("%Y-%m-%dT%H:%M:%SZ");
    let mut xml = String::with_capacity(512);
    xml.push_str(xml_declaration());
    write!(
        xml,
        r#"<cp:coreProperties xmlns:cp="{}" xmlns:dc="{}" xmlns:dcterms="{}" xmlns:xsi="{}">"#,
        namespace::OPC_CORE_PROPERTIES,
        namespace::DC_ELEMENTS,
        namespace::DC_TERMS,
        namespace::XSI
    )?;
    if let Some(creator) = creator {
        write!(xml, "<dc:creator>{}</dc:creator>", escape_xml(creator))?;
    }
    write!(
        xml,
        r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
        timestamp
    )?;
    write!(
        xml,
        r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
        timestamp
    )?;
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

fn workbook_xml(workbook: &WorkbookManager) -> Result<String> {
    let current = workbook.current_sheet_index();
    let active_tab = workbook
        .sheets()
        .find(|sheet| sheet.index() == current && sheet.is_visible())
        .or_else(|| workbook.sheets().find(|sheet| sheet.is_visible()))
        .map_or(0, |sheet| sheet.index());

    let mut xml = String::with_capacity(1024);
    xml.push_str(xml_declaration());
    write!(
        xml,
        r#"<workbook xmlns="{}" xmlns:r="{}">"#,
        namespace::SML_MAIN,
        namespace::OFC_RELATIONSHIPS
    )?;
    write!(
        xml,
        r#"<bookViews><workbookView activeTab="{}"/></bookViews>"#,
        active_tab
    )?;
    xml.push_str("<sheets>");
    for (i, sheet) in workbook.sheets().enumerate() {
        write!(
            xml,
            r#"<sheet name="{}" sheetId="{}""#,
            escape_xml(sheet.name()),
            i + 1
        )?;
        if !sheet.is_visible() {
            xml.push_str(r#" state="hidden""#);
        }
        write!(xml, r#" r:id="rId{}"/>"#, i + 1)?;
    }
    xml.push_str("</sheets></workbook>");
    Ok(xml)
}

fn workbook_rels_xml(sheet_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(xml_declaration());
    write!(xml, r#"<Relationships xmlns="{}">"#, namespace::OPC_RELATIONSHIPS)?;
    for n in 1..=sheet_count {
        write!(
            xml,
            r#"<Relationship Id="rId{}" Type="{}" Target="worksheets/sheet{}.xml"/>"#,
            n,
            relationship_type::WORKSHEET,
            n
        )?;
    }
    write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{}" Target="styles.xml"/>"#,
        sheet_count + 1,
        relationship_type::STYLES
    )?;
    write!(
        xml,
        r#"<Relationship Id="rId{}" Type="{}" Target="sharedStrings.xml"/>"#,
        sheet_count + 2,
        relationship_type::SHARED_STRINGS
    )?;
    xml.push_str("</Relationships>");
    Ok(xml)
}
