//! Style registry and styles.xml generator for XLSX files.
//!
//! The registry deduplicates [`Style`] values by their canonical serialized
//! form and assigns each distinct style a dense, zero-based id in first-seen
//! order. Registration also resolves the sub-records the formatting table
//! needs (fonts, fills, borders, number formats), so the styles part can be
//! rendered at close without revisiting any cell.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use phf::phf_map;

use crate::common::xml::escape_xml;
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::namespace;
use crate::sheet::{Border, BorderSide, CellType, CellValue, Font, Style};

/// Number formats every spreadsheet application knows by id.
static BUILTIN_NUMBER_FORMATS: phf::Map<&'static str, u32> = phf_map! {
    "General" => 0,
    "0" => 1,
    "0.00" => 2,
    "#,##0" => 3,
    "#,##0.00" => 4,
    "0%" => 9,
    "0.00%" => 10,
    "0.00E+00" => 11,
    "# ?/?" => 12,
    "# ??/??" => 13,
    "mm-dd-yy" => 14,
    "d-mmm-yy" => 15,
    "d-mmm" => 16,
    "mmm-yy" => 17,
    "h:mm AM/PM" => 18,
    "h:mm:ss AM/PM" => 19,
    "h:mm" => 20,
    "h:mm:ss" => 21,
    "m/d/yy h:mm" => 22,
    "#,##0 ;(#,##0)" => 37,
    "#,##0 ;[Red](#,##0)" => 38,
    "#,##0.00;(#,##0.00)" => 39,
    "#,##0.00;[Red](#,##0.00)" => 40,
    "mm:ss" => 45,
    "[h]:mm:ss" => 46,
    "mmss.0" => 47,
    "##0.0E+0" => 48,
    "@" => 49,
};

/// Custom number formats start at index 164.
const FIRST_CUSTOM_NUMBER_FORMAT_ID: u32 = 164;

pub(crate) const DATE_FORMAT: &str = "mm-dd-yy";
pub(crate) const DATE_TIME_FORMAT: &str = "m/d/yy h:mm";

/// Cell format (XF) record of a registered style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellXf {
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    num_fmt_id: u32,
}

/// Deduplicating registry of styles and their formatting sub-records.
#[derive(Debug)]
pub struct StyleRegistry {
    /// Registered styles, indexed by id
    styles: Vec<Style>,
    /// Canonical key -> id
    serialized_to_id: HashMap<String, u32>,
    cell_xfs: Vec<CellXf>,
    fonts: Vec<Font>,
    font_map: HashMap<String, usize>,
    /// Solid fill colors; ids 0 and 1 are the two required default fills
    fills: Vec<String>,
    fill_map: HashMap<String, usize>,
    borders: Vec<Border>,
    border_map: HashMap<String, usize>,
    custom_number_formats: Vec<String>,
    number_format_map: HashMap<String, u32>,
}

impl StyleRegistry {
    /// Create a registry whose style 0 is `default_style`.
    pub fn new(default_style: &Style) -> Result<Self> {
        let mut registry = Self {
            styles: Vec::new(),
            serialized_to_id: HashMap::new(),
            cell_xfs: Vec::new(),
            fonts: Vec::new(),
            font_map: HashMap::new(),
            fills: Vec::new(),
            fill_map: HashMap::new(),
            borders: Vec::new(),
            border_map: HashMap::new(),
            custom_number_formats: Vec::new(),
            number_format_map: HashMap::new(),
        };
        // Border 0 is the empty border, required by Excel
        registry.add_border(&Border::default())?;
        registry.register_style(default_style.clone())?;
        Ok(registry)
    }

    /// Return the registered equivalent of `style`, registering it if unseen.
    pub fn register_style(&mut self, style: Style) -> Result<Style> {
        let key = style.canonical_key()?;
        if let Some(&id) = self.serialized_to_id.get(&key) {
            return Ok(self.styles[id as usize].clone());
        }

        let id = u32::try_from(self.styles.len())
            .map_err(|_| Error::InvalidArgument("too many styles".to_string()))?;
        let xf = CellXf {
            font_id: self.add_font(style.font())?,
            fill_id: style
                .background_color()
                .map_or(0, |color| self.add_fill(color)),
            border_id: match style.border() {
                Some(border) if style.has_custom_border() => self.add_border(border)?,
                _ => 0,
            },
            num_fmt_id: style
                .number_format()
                .map_or(0, |format| self.add_number_format(format)),
        };

        let registered = style.registered_as(id);
        self.styles.push(registered.clone());
        self.cell_xfs.push(xf);
        self.serialized_to_id.insert(key, id);
        Ok(registered)
    }

    /// All registered styles in id order.
    pub fn registered_styles(&self) -> &[Style] {
        &self.styles
    }

    pub fn style(&self, id: u32) -> Option<&Style> {
        self.styles.get(id as usize)
    }

    /// Whether an empty cell with this style must still be written.
    pub fn has_visible_background_or_border(&self, id: u32) -> bool {
        self.cell_xfs
            .get(id as usize)
            .is_some_and(|xf| xf.fill_id != 0 || xf.border_id != 0)
    }

    fn add_font(&mut self, font: &Font) -> Result<usize> {
        let key = serde_json::to_string(font)?;
        if let Some(&index) = self.font_map.get(&key) {
            return Ok(index);
        }
        let index = self.fonts.len();
        self.fonts.push(font.clone());
        self.font_map.insert(key, index);
        Ok(index)
    }

    fn add_fill(&mut self, color: &str) -> usize {
        if let Some(&index) = self.fill_map.get(color) {
            return index;
        }
        // Fills 0 (none) and 1 (gray125) come first
        let index = self.fills.len() + 2;
        self.fills.push(color.to_string());
        self.fill_map.insert(color.to_string(), index);
        index
    }

    fn add_border(&mut self, border: &Border) -> Result<usize> {
        let key = serde_json::to_string(border)?;
        if let Some(&index) = self.border_map.get(&key) {
            return Ok(index);
        }
        let index = self.borders.len();
        self.borders.push(border.clone());
        self.border_map.insert(key, index);
        Ok(index)
    }

    fn add_number_format(&mut self, format: &str) -> u32 {
        if let Some(&id) = BUILTIN_NUMBER_FORMATS.get(format) {
            return id;
        }
        if let Some(&id) = self.number_format_map.get(format) {
            return id;
        }
        let id = FIRST_CUSTOM_NUMBER_FORMAT_ID + self.custom_number_formats.len() as u32;
        self.custom_number_formats.push(format.to_string());
        self.number_format_map.insert(format.to_string(), id);
        id
    }

    /// Generate the complete styles.xml content.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(xml, r#"<styleSheet xmlns="{}">"#, namespace::SML_MAIN)?;

        if !self.custom_number_formats.is_empty() {
            write!(
                xml,
                r#"<numFmts count="{}">"#,
                self.custom_number_formats.len()
            )?;
            for (i, num_fmt) in self.custom_number_formats.iter().enumerate() {
                write!(
                    xml,
                    r#"<numFmt numFmtId="{}" formatCode="{}"/>"#,
                    FIRST_CUSTOM_NUMBER_FORMAT_ID as usize + i,
                    escape_xml(num_fmt)
                )?;
            }
            xml.push_str("</numFmts>");
        }

        write!(xml, r#"<fonts count="{}">"#, self.fonts.len())?;
        for font in &self.fonts {
            write_font(&mut xml, font)?;
        }
        xml.push_str("</fonts>");

        write!(xml, r#"<fills count="{}">"#, self.fills.len() + 2)?;
        xml.push_str(r#"<fill><patternFill patternType="none"/></fill>"#);
        xml.push_str(r#"<fill><patternFill patternType="gray125"/></fill>"#);
        for color in &self.fills {
            write!(
                xml,
                r#"<fill><patternFill patternType="solid"><fgColor rgb="{}"/></patternFill></fill>"#,
                escape_xml(color)
            )?;
        }
        xml.push_str("</fills>");

        write!(xml, r#"<borders count="{}">"#, self.borders.len())?;
        for border in &self.borders {
            write_border(&mut xml, border)?;
        }
        xml.push_str("</borders>");

        // Write cell style XFs (required, even if empty)
        xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

        write!(xml, r#"<cellXfs count="{}">"#, self.cell_xfs.len())?;
        for (xf, style) in self.cell_xfs.iter().zip(&self.styles) {
            write!(
                xml,
                r#"<xf numFmtId="{}" fontId="{}" fillId="{}" borderId="{}" xfId="0""#,
                xf.num_fmt_id, xf.font_id, xf.fill_id, xf.border_id
            )?;
            if xf.font_id != 0 {
                xml.push_str(r#" applyFont="1""#);
            }
            if xf.fill_id != 0 {
                xml.push_str(r#" applyFill="1""#);
            }
            if xf.border_id != 0 {
                xml.push_str(r#" applyBorder="1""#);
            }
            if xf.num_fmt_id != 0 {
                xml.push_str(r#" applyNumberFormat="1""#);
            }
            write_alignment(&mut xml, style)?;
        }
        xml.push_str("</cellXfs>");

        // Write cell styles (required, even if minimal)
        xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);
        xml.push_str("</styleSheet>");

        Ok(xml)
    }
}

fn write_font(xml: &mut String, font: &Font) -> Result<()> {
    xml.push_str("<font>");
    if font.bold == Some(true) {
        xml.push_str("<b/>");
    }
    if font.italic == Some(true) {
        xml.push_str("<i/>");
    }
    if font.underline == Some(true) {
        xml.push_str("<u/>");
    }
    if font.strikethrough == Some(true) {
        xml.push_str("<strike/>");
    }
    write!(xml, r#"<sz val="{}"/>"#, font.size.unwrap_or(11.0))?;
    if let Some(ref color) = font.color {
        write!(xml, r#"<color rgb="{}"/>"#, escape_xml(color))?;
    }
    write!(
        xml,
        r#"<name val="{}"/>"#,
        escape_xml(font.name.as_deref().unwrap_or("Calibri"))
    )?;
    xml.push_str("</font>");
    Ok(())
}

fn write_border(xml: &mut String, border: &Border) -> Result<()> {
    xml.push_str("<border>");
    write_border_side(xml, "left", border.left.as_ref())?;
    write_border_side(xml, "right", border.right.as_ref())?;
    write_border_side(xml, "top", border.top.as_ref())?;
    write_border_side(xml, "bottom", border.bottom.as_ref())?;
    write_border_side(xml, "diagonal", border.diagonal.as_ref())?;
    xml.push_str("</border>");
    Ok(())
}

fn write_border_side(xml: &mut String, side: &str, border_side: Option<&BorderSide>) -> Result<()> {
    match border_side {
        Some(bs) => {
            write!(xml, r#"<{} style="{}">"#, side, bs.style.as_str())?;
            if let Some(ref color) = bs.color {
                write!(xml, r#"<color rgb="{}"/>"#, escape_xml(color))?;
            }
            write!(xml, "</{}>", side)?;
        },
        None => write!(xml, "<{}/>", side)?,
    }
    Ok(())
}

fn write_alignment(xml: &mut String, style: &Style) -> Result<()> {
    let wrap = style.wrap_text() == Some(true);
    if style.horizontal_alignment().is_none() && style.vertical_alignment().is_none() && !wrap {
        xml.push_str("/>");
        return Ok(());
    }
    xml.push_str(r#" applyAlignment="1"><alignment"#);
    if let Some(horizontal) = style.horizontal_alignment() {
        write!(xml, r#" horizontal="{}""#, horizontal.as_str())?;
    }
    if let Some(vertical) = style.vertical_alignment() {
        write!(xml, r#" vertical="{}""#, vertical.as_str())?;
    }
    if wrap {
        xml.push_str(r#" wrapText="1""#);
    }
    xml.push_str("/></xf>");
    Ok(())
}

/// Façade over the registry that also derives the extra styles some cell
/// contents need to display correctly.
#[derive(Debug)]
pub struct StyleManager {
    registry: StyleRegistry,
    should_apply_extra_styles: bool,
}

impl StyleManager {
    pub fn new(default_style: &Style, should_apply_extra_styles: bool) -> Result<Self> {
        Ok(Self {
            registry: StyleRegistry::new(default_style)?,
            should_apply_extra_styles,
        })
    }

    pub fn register_style(&mut self, style: Style) -> Result<Style> {
        self.registry.register_style(style)
    }

    pub fn registered_styles(&self) -> &[Style] {
        self.registry.registered_styles()
    }

    pub fn default_style(&self) -> Option<&Style> {
        self.registry.style(0)
    }

    /// Style adjusted for the cell's contents, or `None` when `style` already
    /// fits.
    ///
    /// Text containing a line break gets wrap text unless the style decides
    /// otherwise; dates without a number format get the built-in date or
    /// date-time format.
    pub fn apply_extra_styles_if_needed(
        &self,
        cell_type: CellType,
        value: &CellValue,
        style: &Style,
    ) -> Option<Style> {
        if !self.should_apply_extra_styles {
            return None;
        }
        match (cell_type, value) {
            (CellType::String, CellValue::String(text))
                if style.wrap_text().is_none() && text.contains('\n') =>
            {
                Some(style.clone().with_wrap_text(true))
            },
            (CellType::Date, CellValue::Date(_)) if style.number_format().is_none() => {
                Some(style.clone().with_number_format(DATE_FORMAT))
            },
            (CellType::Date, CellValue::DateTime(_)) if style.number_format().is_none() => {
                Some(style.clone().with_number_format(DATE_TIME_FORMAT))
            },
            _ => None,
        }
    }

    /// Whether an empty cell styled with `id` still has to be emitted.
    pub fn should_apply_style_on_empty_cell(&self, id: u32) -> bool {
        self.registry.has_visible_background_or_border(id)
    }

    /// Render `xl/styles.xml`.
    pub fn styles_xml(&self) -> Result<String> {
        self.registry.to_xml()
    }
}
