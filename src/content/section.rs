//! Page sections
//!
//! A section's `type` and `content` are stored side by side in JSON. In memory
//! they collapse into one tagged union, [`SectionContent`], so the type can
//! never disagree with the content schema.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::items::{ExperienceItem, ProjectItem, SkillCategory, SkillItem, Stat, TestimonialItem};
use super::layout::SectionLayout;

/// Closed set of section kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Hero,
    About,
    Skills,
    Projects,
    Experience,
    Testimonials,
    Contact,
    Custom,
}

impl SectionType {
    /// Built-in page sections in their default render order
    pub const CANONICAL: [SectionType; 7] = [
        SectionType::Hero,
        SectionType::About,
        SectionType::Skills,
        SectionType::Projects,
        SectionType::Experience,
        SectionType::Testimonials,
        SectionType::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Hero => "hero",
            SectionType::About => "about",
            SectionType::Skills => "skills",
            SectionType::Projects => "projects",
            SectionType::Experience => "experience",
            SectionType::Testimonials => "testimonials",
            SectionType::Contact => "contact",
            SectionType::Custom => "custom",
        }
    }

    /// Admin-facing label used for the built-in sections
    pub fn default_title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} Section", first.to_ascii_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hero" => Ok(SectionType::Hero),
            "about" => Ok(SectionType::About),
            "skills" => Ok(SectionType::Skills),
            "projects" => Ok(SectionType::Projects),
            "experience" => Ok(SectionType::Experience),
            "testimonials" => Ok(SectionType::Testimonials),
            "contact" => Ok(SectionType::Contact),
            "custom" => Ok(SectionType::Custom),
            other => Err(anyhow::anyhow!("unknown section type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroContent {
    pub name: String,
    pub title: String,
    pub description: String,
    pub cta_primary: String,
    pub cta_secondary: String,
    pub image_url: String,
    #[serde(flatten)]
    pub layout: SectionLayout,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutContent {
    pub bio: String,
    pub stats: Vec<Stat>,
    pub profile_image: String,
    #[serde(flatten)]
    pub layout: SectionLayout,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsContent {
    pub items: Vec<SkillItem>,
    pub categories: Vec<SkillCategory>,
    #[serde(flatten)]
    pub layout: SectionLayout,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsContent {
    pub items: Vec<ProjectItem>,
    #[serde(flatten)]
    pub layout: SectionLayout,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceContent {
    pub items: Vec<ExperienceItem>,
    #[serde(flatten)]
    pub layout: SectionLayout,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialsContent {
    pub items: Vec<TestimonialItem>,
    #[serde(flatten)]
    pub layout: SectionLayout,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactContent {
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(flatten)]
    pub layout: SectionLayout,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed content of a section, one variant per [`SectionType`].
///
/// Serializes as the bare content object; the `type` tag is written by
/// [`Section`] next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionContent {
    Hero(HeroContent),
    About(AboutContent),
    Skills(SkillsContent),
    Projects(ProjectsContent),
    Experience(ExperienceContent),
    Testimonials(TestimonialsContent),
    Contact(ContactContent),
    /// Free-form document for user-defined sections
    Custom(Map<String, Value>),
}

impl SectionContent {
    /// Empty content for a section type (what a fresh section starts with)
    pub fn empty(kind: SectionType) -> Self {
        match kind {
            SectionType::Hero => SectionContent::Hero(HeroContent::default()),
            SectionType::About => SectionContent::About(AboutContent::default()),
            SectionType::Skills => SectionContent::Skills(SkillsContent::default()),
            SectionType::Projects => SectionContent::Projects(ProjectsContent::default()),
            SectionType::Experience => SectionContent::Experience(ExperienceContent::default()),
            SectionType::Testimonials => {
                SectionContent::Testimonials(TestimonialsContent::default())
            }
            SectionType::Contact => SectionContent::Contact(ContactContent::default()),
            SectionType::Custom => SectionContent::Custom(Map::new()),
        }
    }

    pub fn section_type(&self) -> SectionType {
        match self {
            SectionContent::Hero(_) => SectionType::Hero,
            SectionContent::About(_) => SectionType::About,
            SectionContent::Skills(_) => SectionType::Skills,
            SectionContent::Projects(_) => SectionType::Projects,
            SectionContent::Experience(_) => SectionType::Experience,
            SectionContent::Testimonials(_) => SectionType::Testimonials,
            SectionContent::Contact(_) => SectionType::Contact,
            SectionContent::Custom(_) => SectionType::Custom,
        }
    }

    /// Read a stored content document as the schema for `kind`.
    ///
    /// Missing fields take their empty values. A document that cannot be read
    /// as that schema at all is replaced by the empty content for `kind`.
    pub fn from_value(kind: SectionType, value: Value) -> Self {
        if value.is_null() {
            return Self::empty(kind);
        }
        match Self::try_from_value(kind, value) {
            Ok(content) => content,
            Err(e) => {
                warn!(section_type = %kind, error = %e, "section content does not match its type, using empty content");
                Self::empty(kind)
            }
        }
    }

    /// Strict variant of [`SectionContent::from_value`]
    pub fn try_from_value(kind: SectionType, value: Value) -> serde_json::Result<Self> {
        Ok(match kind {
            SectionType::Hero => SectionContent::Hero(serde_json::from_value(value)?),
            SectionType::About => SectionContent::About(serde_json::from_value(value)?),
            SectionType::Skills => SectionContent::Skills(serde_json::from_value(value)?),
            SectionType::Projects => SectionContent::Projects(serde_json::from_value(value)?),
            SectionType::Experience => SectionContent::Experience(serde_json::from_value(value)?),
            SectionType::Testimonials => {
                SectionContent::Testimonials(serde_json::from_value(value)?)
            }
            SectionType::Contact => SectionContent::Contact(serde_json::from_value(value)?),
            SectionType::Custom => SectionContent::Custom(serde_json::from_value(value)?),
        })
    }

    /// Presentation overrides, if this content kind carries them
    pub fn layout(&self) -> Option<&SectionLayout> {
        match self {
            SectionContent::Hero(c) => Some(&c.layout),
            SectionContent::About(c) => Some(&c.layout),
            SectionContent::Skills(c) => Some(&c.layout),
            SectionContent::Projects(c) => Some(&c.layout),
            SectionContent::Experience(c) => Some(&c.layout),
            SectionContent::Testimonials(c) => Some(&c.layout),
            SectionContent::Contact(c) => Some(&c.layout),
            SectionContent::Custom(_) => None,
        }
    }
}

/// One configurable block of the public page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSection")]
pub struct Section {
    pub id: String,
    /// Admin-facing label
    pub title: String,
    pub content: SectionContent,
    pub is_visible: bool,
    pub order: i64,
}

impl Section {
    pub fn section_type(&self) -> SectionType {
        self.content.section_type()
    }

    /// Built-in section with empty content, keyed by its type
    pub fn builtin(kind: SectionType, order: i64) -> Self {
        Self {
            id: kind.as_str().to_string(),
            title: kind.default_title(),
            content: SectionContent::empty(kind),
            is_visible: true,
            order,
        }
    }
}

/// Stored shape of a section: `type` and `content` as separate fields
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSection {
    id: String,
    #[serde(rename = "type")]
    kind: SectionType,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: Value,
    #[serde(default = "default_visible")]
    is_visible: bool,
    #[serde(default)]
    order: i64,
}

fn default_visible() -> bool {
    true
}

impl From<RawSection> for Section {
    fn from(raw: RawSection) -> Self {
        Self {
            content: SectionContent::from_value(raw.kind, raw.content),
            id: raw.id,
            title: raw.title,
            is_visible: raw.is_visible,
            order: raw.order,
        }
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Section", 6)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("type", &self.section_type())?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("content", &self.content)?;
        s.serialize_field("isVisible", &self.is_visible)?;
        s.serialize_field("order", &self.order)?;
        s.end()
    }
}

/// A section before the store assigns its id
#[derive(Debug, Clone, PartialEq)]
pub struct NewSection {
    pub title: String,
    pub content: SectionContent,
    pub is_visible: bool,
    pub order: i64,
}

impl NewSection {
    /// Visible section of `kind` with empty content
    pub fn new(kind: SectionType, title: impl Into<String>, order: i64) -> Self {
        Self {
            title: title.into(),
            content: SectionContent::empty(kind),
            is_visible: true,
            order,
        }
    }

    pub fn with_id(self, id: String) -> Section {
        Section {
            id,
            title: self.title,
            content: self.content,
            is_visible: self.is_visible,
            order: self.order,
        }
    }
}

/// Partial update for a section. `None` fields are left untouched.
///
/// There is deliberately no way to change a section's type: replacement
/// content must be of the same kind as the section it lands in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionPatch {
    pub title: Option<String>,
    pub content: Option<SectionContent>,
    pub is_visible: Option<bool>,
    pub order: Option<i64>,
}

impl SectionPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn visibility(is_visible: bool) -> Self {
        Self {
            is_visible: Some(is_visible),
            ..Default::default()
        }
    }

    pub fn content(content: SectionContent) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    /// Parse a JSON patch (`{"title": …, "content": …, "isVisible": …, "order": …}`)
    /// for a section of type `kind`
    pub fn from_json(kind: SectionType, value: &Value) -> anyhow::Result<Self> {
        let Some(object) = value.as_object() else {
            anyhow::bail!("section patch must be a JSON object");
        };

        let mut patch = SectionPatch::default();
        if let Some(title) = object.get("title") {
            patch.title = Some(serde_json::from_value(title.clone())?);
        }
        if let Some(content) = object.get("content") {
            patch.content = Some(SectionContent::try_from_value(kind, content.clone())?);
        }
        if let Some(visible) = object.get("isVisible") {
            patch.is_visible = Some(serde_json::from_value(visible.clone())?);
        }
        if let Some(order) = object.get("order") {
            patch.order = Some(serde_json::from_value(order.clone())?);
        }
        Ok(patch)
    }

    /// Merge this patch into `section`, returning true if anything was applied
    pub fn apply_to(self, section: &mut Section) -> bool {
        let mut applied = false;
        if let Some(title) = self.title {
            section.title = title;
            applied = true;
        }
        if let Some(content) = self.content {
            if content.section_type() == section.section_type() {
                section.content = content;
                applied = true;
            } else {
                warn!(
                    section = %section.id,
                    expected = %section.section_type(),
                    got = %content.section_type(),
                    "ignoring content of a different section type"
                );
            }
        }
        if let Some(is_visible) = self.is_visible {
            section.is_visible = is_visible;
            applied = true;
        }
        if let Some(order) = self.order {
            section.order = order;
            applied = true;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_builtin_section_shape() {
        let section = Section::builtin(SectionType::Testimonials, 5);
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value["id"], "testimonials");
        assert_eq!(value["type"], "testimonials");
        assert_eq!(value["title"], "Testimonials Section");
        assert_eq!(value["isVisible"], true);
        assert_eq!(value["order"], 5);
        assert!(value["content"]["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_empty_content() {
        let section: Section = serde_json::from_value(json!({
            "id": "hero",
            "type": "hero",
            "title": "Hero Section",
            "content": {},
            "isVisible": true,
            "order": 0
        }))
        .unwrap();
        assert_eq!(section.content, SectionContent::Hero(HeroContent::default()));
    }

    #[test]
    fn test_deserialize_typed_content_with_layout() {
        let section: Section = serde_json::from_value(json!({
            "id": "contact",
            "type": "contact",
            "title": "Contact Section",
            "content": {
                "email": "a@example.com",
                "sectionHeading": "GET_IN_TOUCH",
                "alignment": "left",
                "calendlyUrl": "https://cal.example.com"
            },
            "isVisible": false,
            "order": 6
        }))
        .unwrap();

        let SectionContent::Contact(contact) = &section.content else {
            panic!("expected contact content");
        };
        assert_eq!(contact.email, "a@example.com");
        assert_eq!(contact.layout.section_heading.as_deref(), Some("GET_IN_TOUCH"));
        assert_eq!(contact.layout.alignment, Some(crate::content::Alignment::Left));
        assert_eq!(contact.extra.get("calendlyUrl"), Some(&json!("https://cal.example.com")));
        assert!(!section.is_visible);

        // Unknown fields are written back out unchanged
        let back = serde_json::to_value(&section).unwrap();
        assert_eq!(back["content"]["calendlyUrl"], "https://cal.example.com");
        assert_eq!(back["content"]["sectionHeading"], "GET_IN_TOUCH");
    }

    #[test]
    fn test_mismatched_content_falls_back_to_empty() {
        let section: Section = serde_json::from_value(json!({
            "id": "skills",
            "type": "skills",
            "title": "Skills",
            "content": { "items": "not a list" },
            "isVisible": true,
            "order": 2
        }))
        .unwrap();
        assert_eq!(section.content, SectionContent::empty(SectionType::Skills));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = serde_json::from_value::<Section>(json!({
            "id": "x",
            "type": "gallery",
            "content": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_content_is_open() {
        let section: Section = serde_json::from_value(json!({
            "id": "c1",
            "type": "custom",
            "title": "Press",
            "content": { "html": "<p>hi</p>", "nested": { "a": 1 } },
            "isVisible": true,
            "order": 9
        }))
        .unwrap();
        let back = serde_json::to_value(&section).unwrap();
        assert_eq!(back["content"], json!({ "html": "<p>hi</p>", "nested": { "a": 1 } }));
    }

    #[test]
    fn test_patch_rejects_foreign_content() {
        let mut section = Section::builtin(SectionType::Hero, 0);
        let applied = SectionPatch::content(SectionContent::empty(SectionType::Contact))
            .apply_to(&mut section);
        assert!(!applied);
        assert_eq!(section.section_type(), SectionType::Hero);
    }

    #[test]
    fn test_patch_from_json() {
        let patch = SectionPatch::from_json(
            SectionType::Contact,
            &json!({ "title": "Reach me", "content": { "email": "x@y.z" }, "order": 3 }),
        )
        .unwrap();
        assert_eq!(patch.title.as_deref(), Some("Reach me"));
        assert_eq!(patch.order, Some(3));
        assert!(patch.is_visible.is_none());

        let mut section = Section::builtin(SectionType::Contact, 6);
        assert!(patch.apply_to(&mut section));
        assert_eq!(section.title, "Reach me");
        assert_eq!(section.order, 3);
    }

    #[test]
    fn test_section_type_parsing() {
        assert_eq!("Skills".parse::<SectionType>().unwrap(), SectionType::Skills);
        assert!("gallery".parse::<SectionType>().is_err());
        assert_eq!(SectionType::Hero.default_title(), "Hero Section");
    }
}
