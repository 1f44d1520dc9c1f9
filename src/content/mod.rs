//! Content data model
//!
//! Everything the store persists and hands to renderers:
//! - **section**: page sections with strongly typed, per-type content
//! - **items**: the homogeneous collections held by list-style sections
//! - **theme**: palette, background and font pair
//! - **global**: site branding, navigation and footer records
//!
//! JSON field names follow the export format (camelCase), so a serialized
//! value is byte-compatible with backups produced by older builds.

pub mod global;
pub mod items;
pub mod layout;
pub mod section;
pub mod theme;

pub use global::{
    FooterConfig, FooterLink, FooterPatch, GlobalConfig, NavConfig, NavLink, NavPatch,
    SiteConfig, SitePatch, SocialLink, StatusRow,
};
pub use items::{
    CollectionItem, ExperienceItem, ProjectItem, SkillCategory, SkillItem, Stat, TestimonialItem,
};
pub use layout::{Alignment, LayoutDefaults, SectionLayout, WidthMode};
pub use section::{
    AboutContent, ContactContent, ExperienceContent, HeroContent, NewSection, ProjectsContent,
    Section, SectionContent, SectionPatch, SectionType, SkillsContent, TestimonialsContent,
};
pub use theme::{Background, FontPair, Theme, ThemeColors};
