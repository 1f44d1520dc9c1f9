//! Theme registry: the compiled-in preset themes offered for one-click activation

use crate::content::{Background, FontPair, Theme, ThemeColors};

/// Id of the theme used when nothing else is stored
pub const DEFAULT_THEME_ID: &str = "cyberpunk";

#[allow(clippy::too_many_arguments)]
fn palette(
    primary: &str,
    secondary: &str,
    accent: &str,
    background: &str,
    surface: &str,
    text: &str,
    text_muted: &str,
) -> ThemeColors {
    ThemeColors {
        primary: primary.to_string(),
        secondary: secondary.to_string(),
        accent: accent.to_string(),
        background: background.to_string(),
        surface: surface.to_string(),
        text: text.to_string(),
        text_muted: text_muted.to_string(),
        muted: None,
        highlight: None,
    }
}

fn fonts(heading: &str, body: &str) -> FontPair {
    FontPair {
        heading: heading.to_string(),
        body: body.to_string(),
    }
}

fn gradient(value: &str) -> Background {
    Background::Gradient {
        value: value.to_string(),
    }
}

pub fn default_theme() -> Theme {
    Theme {
        id: DEFAULT_THEME_ID.to_string(),
        name: "Cyberpunk".to_string(),
        colors: palette("#00FFFF", "#BF00FF", "#FF00FF", "#050508", "#0A0A14", "#FFFFFF", "#94A3B8"),
        background: Background::Image {
            value: "/cyberpunk-bg.jpg".to_string(),
            overlay: Some("rgba(5, 5, 8, 0.7)".to_string()),
        },
        fonts: fonts("Orbitron", "Rajdhani"),
    }
}

/// All presets, default first
pub fn all() -> Vec<Theme> {
    vec![
        default_theme(),
        Theme {
            id: "midnight".to_string(),
            name: "Midnight Blue".to_string(),
            colors: palette("#3B82F6", "#6366F1", "#8B5CF6", "#0F172A", "#1E293B", "#F8FAFC", "#94A3B8"),
            background: gradient("linear-gradient(135deg, #0F172A 0%, #1E293B 100%)"),
            fonts: fonts("Inter", "Inter"),
        },
        Theme {
            id: "sunset".to_string(),
            name: "Neon Sunset".to_string(),
            colors: palette("#F97316", "#EC4899", "#FBBF24", "#1A0A00", "#2D1810", "#FFF7ED", "#FDBA74"),
            background: gradient("linear-gradient(135deg, #1A0A00 0%, #4A1810 100%)"),
            fonts: fonts("Orbitron", "Rajdhani"),
        },
        Theme {
            id: "matrix".to_string(),
            name: "Matrix Green".to_string(),
            colors: palette("#00FF41", "#008F11", "#003B00", "#000000", "#0D0208", "#00FF41", "#008F11"),
            background: Background::Solid {
                value: "#000000".to_string(),
            },
            fonts: fonts("Courier New", "Courier New"),
        },
        Theme {
            id: "elegant".to_string(),
            name: "Elegant Dark".to_string(),
            colors: palette("#D4AF37", "#8B7355", "#C0C0C0", "#0A0A0A", "#1A1A1A", "#F5F5F5", "#A0A0A0"),
            background: gradient("linear-gradient(135deg, #0A0A0A 0%, #1A1A1A 50%, #0A0A0A 100%)"),
            fonts: fonts("Playfair Display", "Inter"),
        },
    ]
}

/// Look up a preset by id
pub fn get(id: &str) -> Option<Theme> {
    all().into_iter().find(|theme| theme.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_theme_is_first() {
        assert_eq!(all()[0], default_theme());
        assert_eq!(default_theme().id, DEFAULT_THEME_ID);
    }

    #[test]
    fn test_ids_are_unique() {
        let presets = all();
        let ids: HashSet<_> = presets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), presets.len());
    }

    #[test]
    fn test_get_known_and_unknown() {
        let matrix = get("matrix").unwrap();
        assert_eq!(matrix.name, "Matrix Green");
        assert_eq!(matrix.colors.primary, "#00FF41");
        assert!(get("not-a-real-id").is_none());
    }
}
