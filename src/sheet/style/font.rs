//! Font properties of a cell style.

use serde::{Deserialize, Serialize};

/// Font properties for a cell.
///
/// Every property is optional: an unset property is inherited from the row
/// style and then from the document's default style when styles are merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    /// ARGB hex color, e.g. `FF000000`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Font {
    /// Overlay `self` on `base`: properties set on `self` win.
    pub fn merge_with(&self, base: &Font) -> Font {
        Font {
            name: self.name.clone().or_else(|| base.name.clone()),
            size: self.size.or(base.size),
            bold: self.bold.or(base.bold),
            italic: self.italic.or(base.italic),
            underline: self.underline.or(base.underline),
            strikethrough: self.strikethrough.or(base.strikethrough),
            color: self.color.clone().or_else(|| base.color.clone()),
        }
    }

    /// Whether any property is set.
    pub fn is_set(&self) -> bool {
        *self != Font::default()
    }
}
