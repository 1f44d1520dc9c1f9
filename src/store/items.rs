//! Collection helpers for list-style sections
//!
//! Scoped to the first section whose type owns the item kind. These add no
//! state of their own: each call edits that section's content and persists
//! the sections slice like any other section update.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{unique_id, ContentStore};
use crate::content::CollectionItem;
use crate::persistence::Slice;

impl ContentStore {
    /// Items of the first section owning `T`, empty if there is none
    pub fn items<T: CollectionItem>(&self) -> Vec<T> {
        self.state()
            .sections
            .iter()
            .find(|s| s.section_type() == T::SECTION)
            .and_then(|s| T::collection(&s.content))
            .cloned()
            .unwrap_or_default()
    }

    /// Append `item`, returning its id.
    ///
    /// An empty or already used id is replaced with a generated one. Returns
    /// `None` when no section owns this item kind.
    pub fn add_item<T: CollectionItem>(&self, mut item: T) -> Option<String> {
        let id = self.edit_collection::<T, String>(|items| {
            if item.id().is_empty() || items.iter().any(|existing| existing.id() == item.id()) {
                let fresh = unique_id(T::ID_PREFIX, |candidate| {
                    items.iter().any(|existing| existing.id() == candidate)
                });
                item.set_id(fresh);
            }
            item.normalize();
            let id = item.id().to_string();
            items.push(item);
            Some(id)
        });

        match &id {
            Some(id) => info!(section_type = %T::SECTION, item = %id, "item added"),
            None => warn!(section_type = %T::SECTION, "no section to add the item to"),
        }
        id
    }

    /// Shallow-merge the fields of `patch` (a JSON object) into the item with
    /// `item_id`. The `id` key is ignored. Returns false when the item does
    /// not exist or the result is not a valid item.
    pub fn update_item<T: CollectionItem>(&self, item_id: &str, patch: &Value) -> bool {
        let Some(fields) = patch.as_object() else {
            warn!(item = %item_id, "item patch must be a JSON object");
            return false;
        };

        let updated = self.edit_collection::<T, ()>(|items| {
            let slot = items.iter_mut().find(|item| item.id() == item_id)?;

            let mut merged = match serde_json::to_value(&*slot) {
                Ok(Value::Object(map)) => map,
                _ => return None,
            };
            for (key, value) in fields {
                if key != "id" {
                    merged.insert(key.clone(), value.clone());
                }
            }

            match serde_json::from_value::<T>(Value::Object(merged)) {
                Ok(mut item) => {
                    item.normalize();
                    *slot = item;
                    Some(())
                }
                Err(e) => {
                    warn!(item = %item_id, error = %e, "item patch does not fit the item shape");
                    None
                }
            }
        });

        if updated.is_none() {
            debug!(section_type = %T::SECTION, item = %item_id, "item update had no effect");
        }
        updated.is_some()
    }

    /// Remove the item with `item_id`. Unknown ids are a no-op.
    pub fn delete_item<T: CollectionItem>(&self, item_id: &str) -> bool {
        let deleted = self.edit_collection::<T, ()>(|items| {
            let pos = items.iter().position(|item| item.id() == item_id)?;
            items.remove(pos);
            Some(())
        });

        if deleted.is_some() {
            info!(section_type = %T::SECTION, item = %item_id, "item deleted");
        }
        deleted.is_some()
    }

    /// Edit the collection of the first section owning `T`; persists when
    /// `edit` returns `Some`
    fn edit_collection<T, R>(&self, edit: impl FnOnce(&mut Vec<T>) -> Option<R>) -> Option<R>
    where
        T: CollectionItem,
    {
        let mut result = None;
        self.commit(Slice::Sections, |state| {
            let items = state
                .sections
                .iter_mut()
                .find(|s| s.section_type() == T::SECTION)
                .and_then(|s| T::collection_mut(&mut s.content));
            result = items.and_then(edit);
            result.is_some()
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ExperienceItem, ProjectItem, SkillItem, TestimonialItem};
    use crate::persistence::MemoryOrigin;
    use crate::style::StyleVariables;
    use serde_json::json;
    use std::sync::Arc;

    fn open_store(origin: &MemoryOrigin) -> ContentStore {
        ContentStore::new(Arc::new(origin.context()), Arc::new(StyleVariables::new()))
    }

    fn skill(id: &str, name: &str, level: u8) -> SkillItem {
        SkillItem {
            id: id.to_string(),
            name: name.to_string(),
            level,
            ..Default::default()
        }
    }

    #[test]
    fn test_items_empty_by_default() {
        let origin = MemoryOrigin::new();
        let store = open_store(&origin);
        assert!(store.items::<SkillItem>().is_empty());
        assert!(store.items::<ProjectItem>().is_empty());
    }

    #[test]
    fn test_add_item_keeps_ids_unique() {
        let origin = MemoryOrigin::new();
        let store = open_store(&origin);

        let first = store.add_item(skill("skill-1", "Rust", 90)).unwrap();
        assert_eq!(first, "skill-1");

        let clash = store.add_item(skill("skill-1", "Go", 70)).unwrap();
        assert_ne!(clash, "skill-1");
        assert!(clash.starts_with("skill-"));

        let blank = store.add_item(skill("", "SQL", 60)).unwrap();
        assert!(blank.starts_with("skill-"));

        let items = store.items::<SkillItem>();
        let names: Vec<&str> = items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Go", "SQL"]);
        assert_eq!(items[0].id, "skill-1");
        assert_eq!(items[1].id, clash);
    }

    #[test]
    fn test_add_item_clamps_and_persists() {
        let origin = MemoryOrigin::new();
        let store = open_store(&origin);
        store.add_item(skill("s", "Python", 250));
        assert_eq!(store.items::<SkillItem>()[0].level, 100);

        let reloaded = open_store(&origin);
        assert_eq!(reloaded.items::<SkillItem>(), store.items::<SkillItem>());
    }

    #[test]
    fn test_add_item_without_owning_section() {
        let origin = MemoryOrigin::new();
        let store = open_store(&origin);
        assert!(store.delete_section("projects"));
        let project = ProjectItem {
            id: "proj-1".to_string(),
            ..Default::default()
        };
        assert_eq!(store.add_item(project), None);
        assert!(store.items::<ProjectItem>().is_empty());
    }

    #[test]
    fn test_update_item_merges_fields() {
        let origin = MemoryOrigin::new();
        let store = open_store(&origin);
        let id = store
            .add_item(ExperienceItem {
                id: "exp-1".to_string(),
                title: "Analyst".to_string(),
                company: "Acme".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert!(store.update_item::<ExperienceItem>(
            &id,
            &json!({ "company": "Globex", "id": "hijack", "type": "Contract" })
        ));
        let items = store.items::<ExperienceItem>();
        assert_eq!(items[0].id, "exp-1");
        assert_eq!(items[0].title, "Analyst");
        assert_eq!(items[0].company, "Globex");
        assert_eq!(items[0].employment, "Contract");
    }

    #[test]
    fn test_update_item_misses_and_bad_patches() {
        let origin = MemoryOrigin::new();
        let store = open_store(&origin);
        store.add_item(skill("skill-1", "Rust", 90));
        let before = store.sections();

        assert!(!store.update_item::<SkillItem>("nope", &json!({ "name": "x" })));
        assert!(!store.update_item::<SkillItem>("skill-1", &json!("name")));
        assert!(!store.update_item::<SkillItem>("skill-1", &json!({ "level": "high" })));
        assert_eq!(store.sections(), before);

        assert!(store.update_item::<SkillItem>("skill-1", &json!({ "level": 101 })));
        assert_eq!(store.items::<SkillItem>()[0].level, 100);
    }

    #[test]
    fn test_delete_item() {
        let origin = MemoryOrigin::new();
        let store = open_store(&origin);
        let keep = store
            .add_item(TestimonialItem {
                id: "test-1".to_string(),
                quote: "Great".to_string(),
                ..Default::default()
            })
            .unwrap();
        let drop_id = store
            .add_item(TestimonialItem {
                id: "test-2".to_string(),
                ..Default::default()
            })
            .unwrap();

        assert!(store.delete_item::<TestimonialItem>(&drop_id));
        assert!(!store.delete_item::<TestimonialItem>(&drop_id));
        let items = store.items::<TestimonialItem>();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, keep);
    }

    #[test]
    fn test_items_follow_first_owning_section() {
        let origin = MemoryOrigin::new();
        let store = open_store(&origin);
        store.load_demo_data();
        let demo_projects = store.items::<ProjectItem>();
        assert!(!demo_projects.is_empty());

        store.add_item(ProjectItem {
            id: String::new(),
            title: "New".to_string(),
            ..Default::default()
        });
        let projects = store.items::<ProjectItem>();
        assert_eq!(projects.len(), demo_projects.len() + 1);
        assert_eq!(projects.last().map(|p| p.title.as_str()), Some("New"));
    }
}
