//! Backup export and restore
//!
//! The document is one JSON object with `sections`, `theme`, `site`,
//! `navigation` and `footer`. On import `sections` and `theme` are required
//! and replace their slices wholesale; each of the other three, when present,
//! is merged over its defaults and replaces the current record.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use super::ContentStore;
use crate::content::{FooterConfig, NavConfig, Section, SiteConfig, Theme};
use crate::defaults;
use crate::merge;
use crate::persistence::Slice;

/// Why an import document was rejected. The store is untouched in every case.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import data is not valid JSON")]
    Malformed(#[source] serde_json::Error),

    #[error("import data must be a JSON object")]
    NotAnObject,

    #[error("import data is missing `{0}`")]
    MissingField(&'static str),

    #[error("import field `{field}` is invalid")]
    InvalidField {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    sections: &'a [Section],
    theme: &'a Theme,
    site: &'a SiteConfig,
    navigation: &'a NavConfig,
    footer: &'a FooterConfig,
}

/// A validated import, ready to swap in
struct ImportDocument {
    sections: Vec<Section>,
    theme: Theme,
    site: Option<SiteConfig>,
    navigation: Option<NavConfig>,
    footer: Option<FooterConfig>,
}

impl ImportDocument {
    fn parse(json: &str) -> Result<Self, ImportError> {
        let value: Value = serde_json::from_str(json).map_err(ImportError::Malformed)?;
        let Value::Object(mut doc) = value else {
            return Err(ImportError::NotAnObject);
        };

        let sections = required(&mut doc, "sections")?;
        let theme = required(&mut doc, "theme")?;

        Ok(Self {
            sections: parse_field("sections", sections)?,
            theme: parse_field("theme", theme)?,
            site: merged_field(&mut doc, "site", &defaults::site_config())?,
            navigation: merged_field(&mut doc, "navigation", &defaults::navigation_config())?,
            footer: merged_field(&mut doc, "footer", &defaults::footer_config())?,
        })
    }

    fn touches_global(&self) -> bool {
        self.site.is_some() || self.navigation.is_some() || self.footer.is_some()
    }
}

fn required(doc: &mut Map<String, Value>, field: &'static str) -> Result<Value, ImportError> {
    match doc.remove(field) {
        None | Some(Value::Null) => Err(ImportError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn parse_field<T: serde::de::DeserializeOwned>(
    field: &'static str,
    value: Value,
) -> Result<T, ImportError> {
    serde_json::from_value(value).map_err(|source| ImportError::InvalidField { field, source })
}

/// Optional record merged over `default`; absent or null means "keep current"
fn merged_field<T>(
    doc: &mut Map<String, Value>,
    field: &'static str,
    default: &T,
) -> Result<Option<T>, ImportError>
where
    T: Serialize + serde::de::DeserializeOwned,
{
    match doc.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Object(_)) => merge::try_merge_with_defaults(default, value)
            .map(Some)
            .map_err(|source| ImportError::InvalidField { field, source }),
        Some(_) => Err(ImportError::InvalidField {
            field,
            source: serde::de::Error::custom("expected a JSON object"),
        }),
    }
}

impl ContentStore {
    /// Serialize all slices as a pretty-printed backup document
    pub fn export_data(&self) -> Result<String> {
        let state = self.state();
        let doc = ExportDocument {
            sections: &state.sections,
            theme: &state.theme,
            site: &state.global.site,
            navigation: &state.global.navigation,
            footer: &state.global.footer,
        };
        serde_json::to_string_pretty(&doc).context("Failed to serialize export document")
    }

    /// Restore from a backup document, reporting whether it was accepted
    pub fn import_data(&self, json: &str) -> bool {
        match self.try_import_data(json) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "import rejected");
                false
            }
        }
    }

    /// Restore from a backup document. On error nothing changes.
    pub fn try_import_data(&self, json: &str) -> Result<(), ImportError> {
        let doc = ImportDocument::parse(json)?;

        let mut slices = vec![Slice::Sections, Slice::Theme];
        if doc.touches_global() {
            slices.push(Slice::Global);
        }

        let section_count = doc.sections.len();
        let theme_id = doc.theme.id.clone();
        self.replace_with(&slices, |state| {
            state.sections = doc.sections;
            state.theme = doc.theme;
            if let Some(site) = doc.site {
                state.global.site = site;
            }
            if let Some(navigation) = doc.navigation {
                state.global.navigation = navigation;
            }
            if let Some(footer) = doc.footer {
                state.global.footer = footer;
            }
        });

        info!(sections = section_count, theme = %theme_id, "import applied");
        Ok(())
    }
}
