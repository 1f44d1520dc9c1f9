//! Layout options shared by the site-wide defaults and per-section overrides

use serde::{Deserialize, Serialize};

/// Horizontal alignment of a section's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Whether a section is constrained to the content column or spans the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthMode {
    #[default]
    Contained,
    Full,
}

/// Site-wide fallbacks applied by renderers when a section sets no override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDefaults {
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub width: WidthMode,
    #[serde(default)]
    pub full_height: bool,
    #[serde(default = "default_mobile_center")]
    pub mobile_center: bool,
}

fn default_mobile_center() -> bool {
    true
}

impl Default for LayoutDefaults {
    fn default() -> Self {
        Self {
            alignment: Alignment::default(),
            width: WidthMode::default(),
            full_height: false,
            mobile_center: default_mobile_center(),
        }
    }
}

/// Presentation fields every section may carry next to its typed content.
///
/// All optional: an absent field means "use the site layout defaults"
/// (or the renderer's built-in heading for `section_heading`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionLayout {
    /// Heading shown on the page (distinct from the admin-facing title)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<WidthMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_height: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_center: Option<bool>,
}

impl SectionLayout {
    /// Resolve this section's overrides against the site defaults
    pub fn resolve(&self, defaults: &LayoutDefaults) -> LayoutDefaults {
        LayoutDefaults {
            alignment: self.alignment.unwrap_or(defaults.alignment),
            width: self.width.unwrap_or(defaults.width),
            full_height: self.full_height.unwrap_or(defaults.full_height),
            mobile_center: self.mobile_center.unwrap_or(defaults.mobile_center),
        }
    }
}
