//! Cell and row formatting descriptors.
//!
//! A [`Style`] is a plain value until it is registered with the writer's
//! style registry, which assigns it a stable integer id. Two styles whose
//! canonical serialized forms are identical always resolve to the same id,
//! no matter how they were built.
//!
//! ```
//! use longan::sheet::{Border, BorderLineStyle, HorizontalAlignment, Style};
//!
//! let header = Style::new()
//!     .with_bold(true)
//!     .with_font_size(12.0)
//!     .with_background_color("FFDDEBF7")
//!     .with_horizontal_alignment(HorizontalAlignment::Center)
//!     .with_border(Border::all(BorderLineStyle::Thin, None));
//! assert!(header.id().is_none());
//! ```

pub mod border;
pub mod font;

pub use border::{Border, BorderLineStyle, BorderSide};
pub use font::Font;

use serde::{Deserialize, Serialize};

use crate::common::Result;

/// Horizontal cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAlignment {
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
}

impl HorizontalAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Fill => "fill",
            Self::Justify => "justify",
        }
    }
}

/// Vertical cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    Justify,
}

impl VerticalAlignment {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
            Self::Justify => "justify",
        }
    }
}

/// Formatting descriptor for a cell or a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Registry id, excluded from the canonical form.
    #[serde(skip)]
    id: Option<u32>,
    #[serde(default, skip_serializing_if = "font_is_unset")]
    font: Font,
    #[serde(skip_serializing_if = "Option::is_none")]
    wrap_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    horizontal_alignment: Option<HorizontalAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vertical_alignment: Option<VerticalAlignment>,
    /// ARGB hex color of a solid background fill
    #[serde(skip_serializing_if = "Option::is_none")]
    background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    border: Option<Border>,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_format: Option<String>,
}

fn font_is_unset(font: &Font) -> bool {
    !font.is_set()
}

impl Style {
    /// Create an empty style that inherits everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id assigned by the style registry, `None` until registered.
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    pub fn is_registered(&self) -> bool {
        self.id.is_some()
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn wrap_text(&self) -> Option<bool> {
        self.wrap_text
    }

    pub fn horizontal_alignment(&self) -> Option<HorizontalAlignment> {
        self.horizontal_alignment
    }

    pub fn vertical_alignment(&self) -> Option<VerticalAlignment> {
        self.vertical_alignment
    }

    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    pub fn border(&self) -> Option<&Border> {
        self.border.as_ref()
    }

    pub fn number_format(&self) -> Option<&str> {
        self.number_format.as_deref()
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self.unregistered()
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.font.bold = Some(bold);
        self.unregistered()
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.font.italic = Some(italic);
        self.unregistered()
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.font.underline = Some(underline);
        self.unregistered()
    }

    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.font.strikethrough = Some(strikethrough);
        self.unregistered()
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font.size = Some(size);
        self.unregistered()
    }

    pub fn with_font_color(mut self, color: impl Into<String>) -> Self {
        self.font.color = Some(color.into());
        self.unregistered()
    }

    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font.name = Some(name.into());
        self.unregistered()
    }

    pub fn with_wrap_text(mut self, wrap: bool) -> Self {
        self.wrap_text = Some(wrap);
        self.unregistered()
    }

    pub fn with_horizontal_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.horizontal_alignment = Some(alignment);
        self.unregistered()
    }

    pub fn with_vertical_alignment(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical_alignment = Some(alignment);
        self.unregistered()
    }

    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self.unregistered()
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self.unregistered()
    }

    pub fn with_number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = Some(format.into());
        self.unregistered()
    }

    fn unregistered(mut self) -> Self {
        self.id = None;
        self
    }

    /// Overlay this style on `base`.
    ///
    /// Properties set on `self` win; unset ones are taken from `base`. Neither
    /// input is modified and the result is unregistered.
    pub fn merge_with(&self, base: &Style) -> Style {
        Style {
            id: None,
            font: self.font.merge_with(&base.font),
            wrap_text: self.wrap_text.or(base.wrap_text),
            horizontal_alignment: self.horizontal_alignment.or(base.horizontal_alignment),
            vertical_alignment: self.vertical_alignment.or(base.vertical_alignment),
            background_color: self
                .background_color
                .clone()
                .or_else(|| base.background_color.clone()),
            border: self.border.clone().or_else(|| base.border.clone()),
            number_format: self
                .number_format
                .clone()
                .or_else(|| base.number_format.clone()),
        }
    }

    /// Canonical serialized form used as the deduplication key.
    pub(crate) fn canonical_key(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub(crate) fn registered_as(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether a border with at least one visible side is set.
    pub(crate) fn has_custom_border(&self) -> bool {
        self.border.as_ref().is_some_and(|border| {
            [
                &border.left,
                &border.right,
                &border.top,
                &border.bottom,
                &border.diagonal,
            ]
            .iter()
            .any(|side| {
                side.as_ref()
                    .is_some_and(|s| s.style != BorderLineStyle::None)
            })
        })
    }
}
