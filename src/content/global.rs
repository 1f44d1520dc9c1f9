//! Site branding, navigation and footer records
//!
//! These three are persisted together as one slice ([`GlobalConfig`]).
//! Each has a matching `*Patch` type for shallow partial updates.

use serde::{Deserialize, Serialize};

use super::layout::LayoutDefaults;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub site_name: String,
    pub tagline: String,
    /// Empty means "use the default mark"
    pub logo_url: String,
    #[serde(default)]
    pub layout_defaults: LayoutDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLink {
    pub label: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

impl NavLink {
    /// Links without an explicit flag are shown
    pub fn visible(&self) -> bool {
        self.is_visible.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavConfig {
    pub items: Vec<NavLink>,
    pub cta_label: String,
    pub admin_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterLink {
    pub label: String,
    pub href: String,
}

/// Social profile link; `label` drives icon lookup unless `icon` overrides it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterConfig {
    pub brand_name: String,
    pub tagline: String,
    pub about_text: String,
    pub copyright_prefix: String,
    pub built_with_text: String,
    pub nav_links: Vec<FooterLink>,
    pub system_links: Vec<FooterLink>,
    pub social_links: Vec<SocialLink>,
    pub status_rows: Vec<StatusRow>,
}

/// The combined site / navigation / footer slice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub site: SiteConfig,
    pub navigation: NavConfig,
    pub footer: FooterConfig,
}

/// Partial update for [`SiteConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SitePatch {
    pub site_name: Option<String>,
    pub tagline: Option<String>,
    pub logo_url: Option<String>,
    pub layout_defaults: Option<LayoutDefaults>,
}

impl SitePatch {
    pub fn apply_to(self, site: &mut SiteConfig) {
        if let Some(site_name) = self.site_name {
            site.site_name = site_name;
        }
        if let Some(tagline) = self.tagline {
            site.tagline = tagline;
        }
        if let Some(logo_url) = self.logo_url {
            site.logo_url = logo_url;
        }
        if let Some(layout_defaults) = self.layout_defaults {
            site.layout_defaults = layout_defaults;
        }
    }
}

/// Partial update for [`NavConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct NavPatch {
    pub items: Option<Vec<NavLink>>,
    pub cta_label: Option<String>,
    pub admin_label: Option<String>,
}

impl NavPatch {
    pub fn apply_to(self, navigation: &mut NavConfig) {
        if let Some(items) = self.items {
            navigation.items = items;
        }
        if let Some(cta_label) = self.cta_label {
            navigation.cta_label = cta_label;
        }
        if let Some(admin_label) = self.admin_label {
            navigation.admin_label = admin_label;
        }
    }
}

/// Partial update for [`FooterConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FooterPatch {
    pub brand_name: Option<String>,
    pub tagline: Option<String>,
    pub about_text: Option<String>,
    pub copyright_prefix: Option<String>,
    pub built_with_text: Option<String>,
    pub nav_links: Option<Vec<FooterLink>>,
    pub system_links: Option<Vec<FooterLink>>,
    pub social_links: Option<Vec<SocialLink>>,
    pub status_rows: Option<Vec<StatusRow>>,
}

impl FooterPatch {
    pub fn apply_to(self, footer: &mut FooterConfig) {
        if let Some(v) = self.brand_name {
            footer.brand_name = v;
        }
        if let Some(v) = self.tagline {
            footer.tagline = v;
        }
        if let Some(v) = self.about_text {
            footer.about_text = v;
        }
        if let Some(v) = self.copyright_prefix {
            footer.copyright_prefix = v;
        }
        if let Some(v) = self.built_with_text {
            footer.built_with_text = v;
        }
        if let Some(v) = self.nav_links {
            footer.nav_links = v;
        }
        if let Some(v) = self.system_links {
            footer.system_links = v;
        }
        if let Some(v) = self.social_links {
            footer.social_links = v;
        }
        if let Some(v) = self.status_rows {
            footer.status_rows = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_patch_is_shallow() {
        let mut site = crate::defaults::site_config();
        let patch: SitePatch = serde_json::from_value(json!({ "tagline": "DATA_WRANGLER" })).unwrap();
        patch.apply_to(&mut site);
        assert_eq!(site.tagline, "DATA_WRANGLER");
        assert_eq!(site.site_name, "ALEX.MORGAN");
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result = serde_json::from_value::<NavPatch>(json!({ "ctaLabl": "GO" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_footer_patch_replaces_lists_wholesale() {
        let mut footer = crate::defaults::footer_config();
        FooterPatch {
            status_rows: Some(vec![StatusRow {
                label: "UPTIME".to_string(),
                value: "100%".to_string(),
            }]),
            ..Default::default()
        }
        .apply_to(&mut footer);
        assert_eq!(footer.status_rows.len(), 1);
        assert_eq!(footer.social_links.len(), 4);
    }

    #[test]
    fn test_nav_link_visibility_defaults_to_shown() {
        let link: NavLink = serde_json::from_value(json!({ "label": "HOME", "href": "#hero" })).unwrap();
        assert!(link.visible());
        assert!(serde_json::to_value(&link).unwrap().get("isVisible").is_none());
    }
}
