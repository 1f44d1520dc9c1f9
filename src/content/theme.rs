//! Theme data: palette, page background and font pair

use serde::{Deserialize, Serialize};

/// A named visual configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub colors: ThemeColors,
    pub background: Background,
    pub fonts: FontPair,
}

/// Semantic color roles. The first five are reflected into style variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub surface: String,
    pub text: String,
    pub text_muted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<String>,
}

/// Page background, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Background {
    Solid {
        value: String,
    },
    /// CSS gradient expression
    Gradient {
        value: String,
    },
    /// URL or data URI, optionally dimmed by an overlay color
    Image {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        overlay: Option<String>,
    },
}

impl Background {
    pub fn value(&self) -> &str {
        match self {
            Background::Solid { value }
            | Background::Gradient { value }
            | Background::Image { value, .. } => value,
        }
    }

    /// CSS `background` shorthand for this variant
    pub fn to_css(&self) -> String {
        match self {
            Background::Solid { value } | Background::Gradient { value } => value.clone(),
            Background::Image {
                value,
                overlay: Some(overlay),
            } => format!(
                "linear-gradient({overlay}, {overlay}), url(\"{value}\") center / cover no-repeat"
            ),
            Background::Image {
                value,
                overlay: None,
            } => format!("url(\"{value}\") center / cover no-repeat"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontPair {
    pub heading: String,
    pub body: String,
}

impl Theme {
    /// The five roles pushed into global style variables, in reflection order
    pub fn primary_roles(&self) -> [&str; 5] {
        [
            &self.colors.primary,
            &self.colors.secondary,
            &self.colors.accent,
            &self.colors.background,
            &self.colors.surface,
        ]
    }
}
