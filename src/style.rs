//! Theme reflection into global style variables
//!
//! One-way projection: the store pushes the active theme's five primary color
//! roles into a [`StyleSink`]; nothing is ever read back.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use crate::constants::style;
use crate::content::Theme;

/// Receiver of global style variables (a document root, a stylesheet file…)
pub trait StyleSink: Send + Sync {
    fn set_property(&self, name: &str, value: &str);
}

/// Variable names in the same order as [`Theme::primary_roles`]
pub const VARIABLES: [&str; 5] = [
    style::PRIMARY,
    style::SECONDARY,
    style::ACCENT,
    style::BACKGROUND,
    style::SURFACE,
];

/// Push the theme's primary roles into `sink`
pub fn reflect_theme(sink: &dyn StyleSink, theme: &Theme) {
    for (name, value) in VARIABLES.iter().zip(theme.primary_roles()) {
        sink.set_property(name, value);
    }
    debug!(theme = %theme.id, "reflected theme into style variables");
}

/// In-memory variable table; cheap to clone, clones share the table
#[derive(Debug, Clone, Default)]
pub struct StyleVariables {
    vars: Arc<Mutex<BTreeMap<String, String>>>,
}

impl StyleVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    /// Render as a `:root` rule
    pub fn to_css(&self) -> String {
        let vars = self.lock();
        let mut css = String::from(":root {\n");
        for (name, value) in vars.iter() {
            let _ = writeln!(css, "  {name}: {value};");
        }
        css.push_str("}\n");
        css
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.vars.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StyleSink for StyleVariables {
    fn set_property(&self, name: &str, value: &str) {
        self.lock().insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes;

    #[test]
    fn test_reflect_sets_five_variables() {
        let vars = StyleVariables::new();
        let matrix = themes::get("matrix").unwrap();
        reflect_theme(&vars, &matrix);

        let snapshot = vars.snapshot();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(vars.get("--neon-cyan").as_deref(), Some(matrix.colors.primary.as_str()));
        assert_eq!(vars.get("--neon-purple").as_deref(), Some(matrix.colors.secondary.as_str()));
        assert_eq!(vars.get("--neon-pink").as_deref(), Some(matrix.colors.accent.as_str()));
        assert_eq!(vars.get("--cyber-dark").as_deref(), Some(matrix.colors.background.as_str()));
        assert_eq!(vars.get("--cyber-panel").as_deref(), Some(matrix.colors.surface.as_str()));
    }

    #[test]
    fn test_to_css() {
        let vars = StyleVariables::new();
        vars.set_property("--neon-pink", "#ff00ff");
        vars.set_property("--cyber-dark", "#050505");
        assert_eq!(
            vars.to_css(),
            ":root {\n  --cyber-dark: #050505;\n  --neon-pink: #ff00ff;\n}\n"
        );
    }

    #[test]
    fn test_clones_share_table() {
        let vars = StyleVariables::new();
        let other = vars.clone();
        other.set_property("--neon-cyan", "#00f0ff");
        assert_eq!(vars.get("--neon-cyan").as_deref(), Some("#00f0ff"));
    }
}
