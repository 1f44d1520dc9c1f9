//! Collection items held by list-style sections (skills, projects, experience, testimonials)

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::section::{SectionContent, SectionType};
use crate::constants::validation::{MAX_RATING, MAX_SKILL_LEVEL};

/// An item living in one section's homogeneous collection.
///
/// The implementing type picks the owning section type and knows how to
/// reach its collection inside that section's content.
pub trait CollectionItem: Clone + Serialize + DeserializeOwned {
    /// Section type that owns collections of this item
    const SECTION: SectionType;

    /// Prefix for freshly generated ids (`skill-…`, `proj-…`)
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn collection(content: &SectionContent) -> Option<&Vec<Self>>;

    fn collection_mut(content: &mut SectionContent) -> Option<&mut Vec<Self>>;

    /// Bring field values into their valid ranges before storing
    fn normalize(&mut self) {}
}

/// Labelled statistic shown in the about section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillItem {
    pub id: String,
    pub name: String,
    /// Proficiency percentage (0-100)
    pub level: u8,
    pub icon: String,
    pub category: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Named group of skill labels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectItem {
    pub id: String,
    pub title: String,
    pub short_desc: String,
    pub description: String,
    pub image: String,
    pub tech: Vec<String>,
    pub impact: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub period: String,
    /// Employment kind label (`FULL_TIME`, `CONTRACT`, …)
    #[serde(rename = "type")]
    pub employment: String,
    pub description: String,
    pub achievements: Vec<String>,
    pub tech: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialItem {
    pub id: String,
    pub quote: String,
    pub author: String,
    pub role: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CollectionItem for SkillItem {
    const SECTION: SectionType = SectionType::Skills;
    const ID_PREFIX: &'static str = "skill";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection(content: &SectionContent) -> Option<&Vec<Self>> {
        match content {
            SectionContent::Skills(skills) => Some(&skills.items),
            _ => None,
        }
    }

    fn collection_mut(content: &mut SectionContent) -> Option<&mut Vec<Self>> {
        match content {
            SectionContent::Skills(skills) => Some(&mut skills.items),
            _ => None,
        }
    }

    fn normalize(&mut self) {
        if self.level > MAX_SKILL_LEVEL {
            warn!(skill = %self.name, level = self.level, max = MAX_SKILL_LEVEL, "skill level exceeds maximum, clamping");
            self.level = MAX_SKILL_LEVEL;
        }
    }
}

impl CollectionItem for ProjectItem {
    const SECTION: SectionType = SectionType::Projects;
    const ID_PREFIX: &'static str = "proj";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection(content: &SectionContent) -> Option<&Vec<Self>> {
        match content {
            SectionContent::Projects(projects) => Some(&projects.items),
            _ => None,
        }
    }

    fn collection_mut(content: &mut SectionContent) -> Option<&mut Vec<Self>> {
        match content {
            SectionContent::Projects(projects) => Some(&mut projects.items),
            _ => None,
        }
    }
}

impl CollectionItem for ExperienceItem {
    const SECTION: SectionType = SectionType::Experience;
    const ID_PREFIX: &'static str = "exp";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection(content: &SectionContent) -> Option<&Vec<Self>> {
        match content {
            SectionContent::Experience(experience) => Some(&experience.items),
            _ => None,
        }
    }

    fn collection_mut(content: &mut SectionContent) -> Option<&mut Vec<Self>> {
        match content {
            SectionContent::Experience(experience) => Some(&mut experience.items),
            _ => None,
        }
    }
}

impl CollectionItem for TestimonialItem {
    const SECTION: SectionType = SectionType::Testimonials;
    const ID_PREFIX: &'static str = "test";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection(content: &SectionContent) -> Option<&Vec<Self>> {
        match content {
            SectionContent::Testimonials(testimonials) => Some(&testimonials.items),
            _ => None,
        }
    }

    fn collection_mut(content: &mut SectionContent) -> Option<&mut Vec<Self>> {
        match content {
            SectionContent::Testimonials(testimonials) => Some(&mut testimonials.items),
            _ => None,
        }
    }

    fn normalize(&mut self) {
        if let Some(rating) = self.rating {
            if rating > MAX_RATING {
                warn!(author = %self.author, rating, max = MAX_RATING, "testimonial rating exceeds maximum, clamping");
                self.rating = Some(MAX_RATING);
            }
        }
    }
}
