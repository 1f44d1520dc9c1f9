//! Content store
//!
//! Owns the in-memory slices (sections, theme, global), persists every
//! mutation as a whole-slice write, reflects the active theme into style
//! variables and follows changes other contexts make to the same storage.
//!
//! Locking: `persist_lock` serializes local mutations end to end (mutate,
//! then write) so slices reach storage in the order they were changed. The
//! state lock is only held while the slices are touched, never across a
//! storage call, because storage delivers other contexts' listeners
//! synchronously and those may be stores sharing this thread. A change from
//! another context that lands between a mutation and its write is settled
//! afterwards by re-reading the slice from storage.

mod items;
mod transfer;

pub use transfer::ImportError;

use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::content::{
    FooterConfig, FooterPatch, GlobalConfig, NavConfig, NavPatch, NewSection, Section,
    SectionPatch, SiteConfig, SitePatch, Theme,
};
use crate::persistence::{Persistence, Slice, SliceStore, StorageEvent, Subscription};
use crate::style::{reflect_theme, StyleSink};
use crate::{defaults, merge, themes};

/// Everything the store holds
#[derive(Debug, Clone, PartialEq)]
pub struct ContentState {
    pub sections: Vec<Section>,
    pub theme: Theme,
    pub global: GlobalConfig,
}

impl Default for ContentState {
    fn default() -> Self {
        Self {
            sections: defaults::sections(),
            theme: defaults::theme(),
            global: defaults::global_config(),
        }
    }
}

impl ContentState {
    /// Read every slice from storage, healing against the defaults
    pub fn load(storage: &dyn Persistence) -> Self {
        Self {
            sections: storage.read_slice(Slice::Sections, &defaults::sections()),
            theme: storage.read_slice(Slice::Theme, &defaults::theme()),
            global: storage.read_slice(Slice::Global, &defaults::global_config()),
        }
    }

    /// The populated demo portfolio
    pub fn demo() -> Self {
        Self {
            sections: defaults::demo_sections(),
            theme: themes::default_theme(),
            global: defaults::demo_global(),
        }
    }

    fn slice(&self, slice: Slice) -> SliceValue {
        match slice {
            Slice::Sections => SliceValue::Sections(self.sections.clone()),
            Slice::Theme => SliceValue::Theme(self.theme.clone()),
            Slice::Global => SliceValue::Global(self.global.clone()),
        }
    }

    /// Replace one slice, reflecting a new theme into `style`
    fn install(&mut self, value: SliceValue, style: &dyn StyleSink) {
        match value {
            SliceValue::Sections(sections) => self.sections = sections,
            SliceValue::Theme(theme) => {
                self.theme = theme;
                reflect_theme(style, &self.theme);
            }
            SliceValue::Global(global) => self.global = global,
        }
    }
}

/// Owned copy of one slice, taken under the state lock and written after it
enum SliceValue {
    Sections(Vec<Section>),
    Theme(Theme),
    Global(GlobalConfig),
}

impl SliceValue {
    fn read(storage: &dyn Persistence, slice: Slice) -> Self {
        match slice {
            Slice::Sections => Self::Sections(storage.read_slice(slice, &defaults::sections())),
            Slice::Theme => Self::Theme(storage.read_slice(slice, &defaults::theme())),
            Slice::Global => Self::Global(storage.read_slice(slice, &defaults::global_config())),
        }
    }

    fn slice(&self) -> Slice {
        match self {
            SliceValue::Sections(_) => Slice::Sections,
            SliceValue::Theme(_) => Slice::Theme,
            SliceValue::Global(_) => Slice::Global,
        }
    }

    /// Whether `state` still holds this value
    fn is_current(&self, state: &ContentState) -> bool {
        match self {
            SliceValue::Sections(sections) => state.sections == *sections,
            SliceValue::Theme(theme) => state.theme == *theme,
            SliceValue::Global(global) => state.global == *global,
        }
    }

    fn persist(&self, storage: &dyn Persistence) {
        match self {
            SliceValue::Sections(sections) => storage.write_slice(Slice::Sections, sections),
            SliceValue::Theme(theme) => storage.write_slice(Slice::Theme, theme),
            SliceValue::Global(global) => storage.write_slice(Slice::Global, global),
        }
    }
}

/// The application's single source of portfolio content.
///
/// Construct one per storage context and pass it to every consumer.
pub struct ContentStore {
    state: Arc<Mutex<ContentState>>,
    persist_lock: Mutex<()>,
    storage: Arc<dyn Persistence>,
    style: Arc<dyn StyleSink>,
    _subscription: Subscription,
}

impl ContentStore {
    /// Load every slice from `storage`, reflect the theme into `style` and
    /// start following changes made by other contexts
    pub fn new(storage: Arc<dyn Persistence>, style: Arc<dyn StyleSink>) -> Self {
        let state = Arc::new(Mutex::new(ContentState::default()));

        // Subscribe before loading: an event racing the load is either
        // applied and then superseded by the load, or read by the load itself
        let weak: Weak<Mutex<ContentState>> = Arc::downgrade(&state);
        let sink = Arc::clone(&style);
        let subscription = storage.subscribe(Arc::new(move |event: &StorageEvent| {
            if let Some(state) = weak.upgrade() {
                apply_external_change(&state, sink.as_ref(), event);
            }
        }));

        let loaded = ContentState::load(storage.as_ref());
        {
            let mut guard = lock(&state);
            *guard = loaded;
            reflect_theme(style.as_ref(), &guard.theme);
            info!(
                sections = guard.sections.len(),
                theme = %guard.theme.id,
                "content store loaded"
            );
        }

        Self {
            state,
            persist_lock: Mutex::new(()),
            storage,
            style,
            _subscription: subscription,
        }
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    /// Current sections in storage order (not sorted by `order`)
    pub fn sections(&self) -> Vec<Section> {
        self.state().sections.clone()
    }

    pub fn section(&self, id: &str) -> Option<Section> {
        self.state().sections.iter().find(|s| s.id == id).cloned()
    }

    /// Visible sections sorted by `order`, as the public page renders them
    pub fn visible_sections(&self) -> Vec<Section> {
        let mut visible: Vec<Section> = self
            .state()
            .sections
            .iter()
            .filter(|s| s.is_visible)
            .cloned()
            .collect();
        visible.sort_by_key(|s| s.order);
        visible
    }

    pub fn theme(&self) -> Theme {
        self.state().theme.clone()
    }

    pub fn site(&self) -> SiteConfig {
        self.state().global.site.clone()
    }

    pub fn navigation(&self) -> NavConfig {
        self.state().global.navigation.clone()
    }

    pub fn footer(&self) -> FooterConfig {
        self.state().global.footer.clone()
    }

    pub fn global(&self) -> GlobalConfig {
        self.state().global.clone()
    }

    pub fn snapshot(&self) -> ContentState {
        self.state().clone()
    }

    // ==========================================================================
    // Sections
    // ==========================================================================

    /// Merge `patch` into the section with `id`. Unknown ids are a no-op.
    pub fn update_section(&self, id: &str, patch: SectionPatch) -> bool {
        self.edit_section(id, |section| patch.apply_to(section))
    }

    /// Append a section under a fresh id and return that id
    pub fn add_section(&self, section: NewSection) -> String {
        let mut new_id = String::new();
        self.commit(Slice::Sections, |state| {
            new_id = unique_id("section", |candidate| {
                state.sections.iter().any(|s| s.id == candidate)
            });
            state.sections.push(section.with_id(new_id.clone()));
            true
        });
        info!(section = %new_id, "section added");
        new_id
    }

    /// Remove the section with `id`. Unknown ids are a no-op.
    pub fn delete_section(&self, id: &str) -> bool {
        let deleted = self.commit(Slice::Sections, |state| {
            let before = state.sections.len();
            state.sections.retain(|s| s.id != id);
            state.sections.len() != before
        });
        if deleted {
            info!(section = %id, "section deleted");
        } else {
            debug!(section = %id, "delete: no such section");
        }
        deleted
    }

    /// Rebuild the section list in the order of `ids`, with `order` set to
    /// each section's position.
    ///
    /// Sections not named in `ids` are dropped. Unknown ids and repeats of an
    /// id already placed are skipped.
    pub fn reorder_sections<S: AsRef<str>>(&self, ids: &[S]) {
        self.commit(Slice::Sections, |state| {
            let mut remaining = std::mem::take(&mut state.sections);
            let mut reordered = Vec::with_capacity(ids.len());
            for id in ids {
                let id = id.as_ref();
                match remaining.iter().position(|s| s.id == id) {
                    Some(pos) => {
                        let mut section = remaining.remove(pos);
                        section.order = reordered.len() as i64;
                        reordered.push(section);
                    }
                    None => debug!(section = %id, "reorder: skipping unknown or repeated id"),
                }
            }
            if !remaining.is_empty() {
                let dropped: Vec<&str> = remaining.iter().map(|s| s.id.as_str()).collect();
                warn!(?dropped, "reorder dropped sections missing from the new order");
            }
            state.sections = reordered;
            true
        });
    }

    // ==========================================================================
    // Theme
    // ==========================================================================

    /// Replace the active theme and reflect it into style variables
    pub fn update_theme(&self, theme: Theme) {
        let id = theme.id.clone();
        self.commit(Slice::Theme, |state| {
            state.theme = theme;
            true
        });
        info!(theme = %id, "theme updated");
    }

    /// Activate a preset by id. Unknown ids are a no-op.
    pub fn apply_preset_theme(&self, id: &str) -> bool {
        match themes::get(id) {
            Some(theme) => {
                self.update_theme(theme);
                true
            }
            None => {
                debug!(theme = %id, "no preset theme with this id");
                false
            }
        }
    }

    // ==========================================================================
    // Site / navigation / footer
    // ==========================================================================

    pub fn update_site(&self, patch: SitePatch) {
        self.commit(Slice::Global, |state| {
            patch.apply_to(&mut state.global.site);
            true
        });
        debug!("site settings updated");
    }

    pub fn update_navigation(&self, patch: NavPatch) {
        self.commit(Slice::Global, |state| {
            patch.apply_to(&mut state.global.navigation);
            true
        });
        debug!("navigation updated");
    }

    pub fn update_footer(&self, patch: FooterPatch) {
        self.commit(Slice::Global, |state| {
            patch.apply_to(&mut state.global.footer);
            true
        });
        debug!("footer updated");
    }

    // ==========================================================================
    // Whole-store replacement
    // ==========================================================================

    /// Replace every slice with the demo portfolio
    pub fn load_demo_data(&self) {
        self.replace_all(ContentState::demo());
        info!("demo content loaded");
    }

    /// Restore the compiled-in defaults for every slice
    pub fn reset_to_defaults(&self) {
        self.replace_all(ContentState::default());
        info!("content reset to defaults");
    }

    // ==========================================================================
    // Internals
    // ==========================================================================

    fn state(&self) -> MutexGuard<'_, ContentState> {
        lock(&self.state)
    }

    /// Run `mutate` on the section with `id`; persist if it reports a change
    fn edit_section(&self, id: &str, mutate: impl FnOnce(&mut Section) -> bool) -> bool {
        let changed = self.commit(Slice::Sections, |state| {
            match state.sections.iter_mut().find(|s| s.id == id) {
                Some(section) => mutate(section),
                None => false,
            }
        });
        if changed {
            debug!(section = %id, "section updated");
        } else {
            debug!(section = %id, "section update had no effect");
        }
        changed
    }

    /// Apply `mutate` to the state and, if it returns true, write `slice`
    /// (reflecting the theme when that is the slice written)
    fn commit(&self, slice: Slice, mutate: impl FnOnce(&mut ContentState) -> bool) -> bool {
        let _persist = self.persist_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let value = {
            let mut state = self.state();
            if !mutate(&mut *state) {
                return false;
            }
            if slice == Slice::Theme {
                reflect_theme(self.style.as_ref(), &state.theme);
            }
            state.slice(slice)
        };

        value.persist(self.storage.as_ref());
        self.settle(&value);
        true
    }

    /// Apply a multi-slice replacement, persisting the slices named in `slices`
    fn replace_with(&self, slices: &[Slice], update: impl FnOnce(&mut ContentState)) {
        let _persist = self.persist_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let values: Vec<SliceValue> = {
            let mut state = self.state();
            update(&mut *state);
            reflect_theme(self.style.as_ref(), &state.theme);
            slices.iter().map(|slice| state.slice(*slice)).collect()
        };

        for value in &values {
            value.persist(self.storage.as_ref());
        }
        for value in &values {
            self.settle(value);
        }
    }

    /// Re-read a just-written slice if another context replaced it in memory
    /// while the write was in flight; storage decides which value is current.
    /// Called with `persist_lock` held.
    fn settle(&self, written: &SliceValue) {
        if written.is_current(&self.state()) {
            return;
        }
        let slice = written.slice();
        let stored = SliceValue::read(self.storage.as_ref(), slice);
        debug!(slice = %slice, "slice changed during write, reloading from storage");
        self.state().install(stored, self.style.as_ref());
    }

    fn replace_all(&self, next: ContentState) {
        self.replace_with(&Slice::ALL, |state| *state = next);
    }
}

fn lock(state: &Mutex<ContentState>) -> MutexGuard<'_, ContentState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `{prefix}-{uuid}` not rejected by `taken`
pub(crate) fn unique_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let candidate = format!("{prefix}-{}", Uuid::new_v4());
        if !taken(&candidate) {
            return candidate;
        }
    }
}

/// Replace one slice from another context's write.
///
/// Malformed payloads and removals leave the current state alone.
fn apply_external_change(state: &Mutex<ContentState>, style: &dyn StyleSink, event: &StorageEvent) {
    let Some(slice) = Slice::from_key(&event.key) else {
        return;
    };
    let Some(raw) = event.new_value.as_deref() else {
        debug!(slice = %slice, "slice removed by another context, keeping current state");
        return;
    };

    match parse_external(slice, raw) {
        Ok(update) => {
            lock(state).install(update, style);
            info!(slice = %slice, "applied change from another context");
        }
        Err(e) => {
            warn!(slice = %slice, error = %e, "ignoring malformed change from another context");
        }
    }
}

fn parse_external(slice: Slice, raw: &str) -> Result<SliceValue> {
    Ok(match slice {
        Slice::Sections => SliceValue::Sections(serde_json::from_str(raw)?),
        Slice::Theme => SliceValue::Theme(serde_json::from_str(raw)?),
        Slice::Global => {
            let value: serde_json::Value = serde_json::from_str(raw)?;
            if !value.is_object() {
                anyhow::bail!("global record must be a JSON object");
            }
            SliceValue::Global(merge::merge_with_defaults(&defaults::global_config(), value))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Background, SectionContent, SectionType};
    use crate::persistence::{ListenerSet, MemoryOrigin};
    use std::collections::HashMap;
    use crate::style::StyleVariables;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store_on(origin: &MemoryOrigin) -> (ContentStore, StyleVariables) {
        let style = StyleVariables::new();
        let store = ContentStore::new(Arc::new(origin.context()), Arc::new(style.clone()));
        (store, style)
    }

    fn ids(sections: &[Section]) -> Vec<String> {
        sections.iter().map(|s| s.id.clone()).collect()
    }

    fn ids_by_order(mut sections: Vec<Section>) -> Vec<String> {
        sections.sort_by_key(|s| s.order);
        ids(&sections)
    }

    #[test]
    fn test_fresh_store_uses_defaults_and_reflects_theme() {
        let origin = MemoryOrigin::new();
        let (store, style) = store_on(&origin);

        assert_eq!(store.sections(), defaults::sections());
        assert_eq!(store.theme(), defaults::theme());
        assert_eq!(store.global(), defaults::global_config());
        assert_eq!(
            style.get("--neon-cyan").as_deref(),
            Some(defaults::theme().colors.primary.as_str())
        );
        // Loading alone never writes
        assert_eq!(origin.get(Slice::Sections.key()), None);
    }

    #[test]
    fn test_global_healing_on_load() {
        let origin = MemoryOrigin::new();
        origin.seed(
            Slice::Global.key(),
            &json!({
                "footer": { "brandName": "JANE.DOE", "aboutText": "Hi there" },
                "navigation": { "items": "broken" }
            })
            .to_string(),
        );
        let (store, _) = store_on(&origin);

        let footer = store.footer();
        assert_eq!(footer.status_rows, defaults::footer_config().status_rows);
        assert_eq!(footer.brand_name, "JANE.DOE");
        assert_eq!(footer.about_text, "Hi there");
        assert_eq!(store.navigation().items, defaults::navigation_config().items);
        assert_eq!(store.site(), defaults::site_config());
    }

    #[test]
    fn test_corrupt_sections_fall_back() {
        let origin = MemoryOrigin::new();
        origin.seed(Slice::Sections.key(), "[{\"id\": \"hero\", ");
        let (store, _) = store_on(&origin);
        assert_eq!(store.sections(), defaults::sections());
    }

    #[test]
    fn test_reorder_sections() {
        let origin = MemoryOrigin::new();
        let abc: Vec<Section> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(idx, id)| NewSection::new(SectionType::Custom, *id, idx as i64).with_id(id.to_string()))
            .collect();
        origin.seed(Slice::Sections.key(), &serde_json::to_string(&abc).unwrap());
        let (store, _) = store_on(&origin);

        store.reorder_sections(&["c", "a", "b"]);
        assert_eq!(ids_by_order(store.sections()), vec!["c", "a", "b"]);
        let orders: Vec<i64> = store.sections().iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        store.reorder_sections(&["c", "a"]);
        assert_eq!(ids_by_order(store.sections()), vec!["c", "a"]);
        assert!(store.section("b").is_none());
    }

    #[test]
    fn test_reorder_skips_unknown_and_repeated_ids() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        store.reorder_sections(&["contact", "hero", "nope", "hero", "about"]);
        assert_eq!(ids(&store.sections()), vec!["contact", "hero", "about"]);
        assert_eq!(ids_by_order(store.sections()), vec!["contact", "hero", "about"]);
    }

    #[test]
    fn test_reorder_persists() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        store.reorder_sections(&["about", "hero"]);

        let (reloaded, _) = store_on(&origin);
        assert_eq!(reloaded.sections(), store.sections());
    }

    #[test]
    fn test_update_missing_section_is_noop() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        let before = store.sections();

        assert!(!store.update_section("nonexistent", SectionPatch::title("x")));
        assert_eq!(store.sections(), before);
        assert!(store.sections().iter().all(|s| s.title != "x"));
        assert!(!store.delete_section("nonexistent"));
        assert_eq!(store.sections(), before);
    }

    #[test]
    fn test_update_section_merges_and_persists() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        let content = SectionContent::from_value(
            SectionType::Hero,
            json!({ "name": "Jane Doe", "title": "Engineer" }),
        );

        assert!(store.update_section(
            "hero",
            SectionPatch {
                title: Some("Welcome".to_string()),
                content: Some(content.clone()),
                ..Default::default()
            }
        ));

        let hero = store.section("hero").unwrap();
        assert_eq!(hero.title, "Welcome");
        assert_eq!(hero.content, content);
        assert!(hero.is_visible);

        let stored: serde_json::Value =
            serde_json::from_str(&origin.get(Slice::Sections.key()).unwrap()).unwrap();
        assert_eq!(stored[0]["title"], "Welcome");
        assert_eq!(stored[0]["content"]["name"], "Jane Doe");
    }

    #[test]
    fn test_update_section_rejects_other_content_type() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        let patch = SectionPatch::content(SectionContent::empty(SectionType::Contact));
        assert!(!store.update_section("hero", patch));
        assert_eq!(store.section("hero").unwrap().section_type(), SectionType::Hero);
    }

    #[test]
    fn test_add_section_assigns_unique_id() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        let new = NewSection::new(SectionType::Custom, "New", 99);

        let first = store.add_section(new.clone());
        let second = store.add_section(new);
        assert_ne!(first, second);

        let sections = store.sections();
        assert_eq!(sections.len(), 9);
        let matching: Vec<&Section> = sections.iter().filter(|s| s.id == first).collect();
        assert_eq!(matching.len(), 1);
        let added = matching[0];
        assert_eq!(added.section_type(), SectionType::Custom);
        assert_eq!(added.title, "New");
        assert_eq!(added.content, SectionContent::Custom(Default::default()));
        assert!(added.is_visible);
        assert_eq!(added.order, 99);
        assert!(defaults::sections().iter().all(|s| s.id != first));
    }

    #[test]
    fn test_visible_sections_sorted() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        store.update_section("about", SectionPatch::visibility(false));
        store.update_section(
            "hero",
            SectionPatch {
                order: Some(50),
                ..Default::default()
            },
        );

        let visible = ids(&store.visible_sections());
        assert_eq!(
            visible,
            vec!["skills", "projects", "experience", "testimonials", "contact", "hero"]
        );
    }

    #[test]
    fn test_apply_preset_theme_reflects() {
        let origin = MemoryOrigin::new();
        let (store, style) = store_on(&origin);
        let matrix = themes::get("matrix").unwrap();

        assert!(store.apply_preset_theme("matrix"));
        assert_eq!(store.theme(), matrix);
        assert_eq!(style.get("--neon-cyan").as_deref(), Some(matrix.colors.primary.as_str()));
        assert_eq!(style.get("--neon-purple").as_deref(), Some(matrix.colors.secondary.as_str()));
        assert_eq!(style.get("--neon-pink").as_deref(), Some(matrix.colors.accent.as_str()));
        assert_eq!(style.get("--cyber-dark").as_deref(), Some(matrix.colors.background.as_str()));
        assert_eq!(style.get("--cyber-panel").as_deref(), Some(matrix.colors.surface.as_str()));

        let vars_before = style.snapshot();
        let stored_before = origin.get(Slice::Theme.key());
        assert!(!store.apply_preset_theme("not-a-real-id"));
        assert_eq!(store.theme(), matrix);
        assert_eq!(style.snapshot(), vars_before);
        assert_eq!(origin.get(Slice::Theme.key()), stored_before);
    }

    #[test]
    fn test_theme_reflected_on_load() {
        let origin = MemoryOrigin::new();
        let sunset = themes::get("sunset").unwrap();
        origin.seed(Slice::Theme.key(), &serde_json::to_string(&sunset).unwrap());

        let (store, style) = store_on(&origin);
        assert_eq!(store.theme(), sunset);
        assert_eq!(style.get("--neon-pink").as_deref(), Some(sunset.colors.accent.as_str()));
    }

    #[test]
    fn test_image_theme_without_overlay_survives_reload() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        let mut theme = themes::get("matrix").unwrap();
        theme.background = Background::Image {
            value: "/me.jpg".to_string(),
            overlay: None,
        };
        store.update_theme(theme.clone());

        let (reopened, _) = store_on(&origin);
        assert_eq!(reopened.theme(), theme);
        assert_eq!(reopened.theme().background, theme.background);
    }

    #[test]
    fn test_bad_footer_list_keeps_site_on_load() {
        let origin = MemoryOrigin::new();
        origin.seed(
            Slice::Global.key(),
            &json!({
                "site": { "siteName": "JANE.DOE" },
                "footer": { "socialLinks": [{ "label": "GitHub" }] }
            })
            .to_string(),
        );
        let (store, _) = store_on(&origin);

        assert_eq!(store.site().site_name, "JANE.DOE");
        assert_eq!(store.footer().social_links, defaults::footer_config().social_links);
        assert_eq!(store.navigation(), defaults::navigation_config());
    }

    /// Storage where another writer's value for a key is stored and delivered
    /// just before this context's own write to that key lands
    #[derive(Default)]
    struct InterleavedStorage {
        values: Mutex<HashMap<String, String>>,
        listeners: Arc<ListenerSet>,
        pending: Mutex<Option<String>>,
    }

    impl Persistence for InterleavedStorage {
        fn read_raw(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn write_raw(&self, key: &str, value: &str) -> Result<()> {
            let other = self.pending.lock().unwrap().take();
            if let Some(other) = other {
                self.values.lock().unwrap().insert(key.to_string(), other.clone());
                self.listeners.notify(
                    None,
                    &StorageEvent {
                        key: key.to_string(),
                        new_value: Some(other),
                    },
                );
            }
            self.values.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn subscribe(&self, listener: crate::persistence::Listener) -> Subscription {
            self.listeners.add(0, listener)
        }
    }

    #[test]
    fn test_change_during_write_settles_on_stored_value() {
        let storage = Arc::new(InterleavedStorage::default());
        let style = StyleVariables::new();
        let store = ContentStore::new(
            Arc::clone(&storage) as Arc<dyn Persistence>,
            Arc::new(style.clone()),
        );
        let sunset = themes::get("sunset").unwrap();
        let matrix = themes::get("matrix").unwrap();
        *storage.pending.lock().unwrap() = Some(serde_json::to_string(&sunset).unwrap());

        assert!(store.apply_preset_theme("matrix"));

        let stored: Theme =
            serde_json::from_str(&storage.read_raw(Slice::Theme.key()).unwrap().unwrap()).unwrap();
        assert_eq!(stored, matrix);
        assert_eq!(store.theme(), matrix);
        assert_eq!(style.get("--neon-cyan").as_deref(), Some(matrix.colors.primary.as_str()));
    }

    #[test]
    fn test_update_global_records() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);

        store.update_site(SitePatch {
            site_name: Some("JANE.DOE".to_string()),
            ..Default::default()
        });
        store.update_navigation(NavPatch {
            cta_label: Some("HIRE ME".to_string()),
            ..Default::default()
        });
        store.update_footer(FooterPatch {
            status_rows: Some(Vec::new()),
            ..Default::default()
        });

        assert_eq!(store.site().site_name, "JANE.DOE");
        assert_eq!(store.site().tagline, defaults::site_config().tagline);
        assert_eq!(store.navigation().cta_label, "HIRE ME");
        assert_eq!(store.navigation().items, defaults::navigation_config().items);
        assert!(store.footer().status_rows.is_empty());

        let (reloaded, _) = store_on(&origin);
        assert_eq!(reloaded.global(), store.global());
    }

    #[test]
    fn test_demo_and_reset() {
        let origin = MemoryOrigin::new();
        let (store, style) = store_on(&origin);
        store.apply_preset_theme("elegant");

        store.load_demo_data();
        assert_eq!(store.snapshot(), ContentState::demo());
        assert_eq!(
            style.get("--neon-cyan").as_deref(),
            Some(themes::default_theme().colors.primary.as_str())
        );
        let (reloaded, _) = store_on(&origin);
        assert_eq!(reloaded.snapshot(), ContentState::demo());

        store.reset_to_defaults();
        assert_eq!(store.snapshot(), ContentState::default());
    }

    #[test]
    fn test_cross_context_sync() {
        let origin = MemoryOrigin::new();
        let (tab_a, _) = store_on(&origin);
        let (tab_b, style_b) = store_on(&origin);

        tab_a.apply_preset_theme("midnight");
        tab_a.update_section("hero", SectionPatch::title("Hello"));
        tab_a.update_site(SitePatch {
            tagline: Some("tagline from A".to_string()),
            ..Default::default()
        });

        let midnight = themes::get("midnight").unwrap();
        assert_eq!(tab_b.theme(), midnight);
        assert_eq!(style_b.get("--neon-cyan").as_deref(), Some(midnight.colors.primary.as_str()));
        assert_eq!(tab_b.section("hero").unwrap().title, "Hello");
        assert_eq!(tab_b.site().tagline, "tagline from A");

        // And back the other way
        tab_b.delete_section("contact");
        assert!(tab_a.section("contact").is_none());
    }

    #[test]
    fn test_malformed_external_change_ignored() {
        let origin = MemoryOrigin::new();
        let (store, style) = store_on(&origin);
        store.apply_preset_theme("matrix");
        let before = store.snapshot();
        let vars = style.snapshot();

        origin.write_external(Slice::Sections.key(), "not json");
        origin.write_external(Slice::Theme.key(), "{\"id\": 3}");
        origin.write_external(Slice::Global.key(), "[]");
        origin.remove_external(Slice::Theme.key());
        origin.write_external("unrelated_key", "{}");

        assert_eq!(store.snapshot(), before);
        assert_eq!(style.snapshot(), vars);
    }

    #[test]
    fn test_external_global_change_is_healed() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        origin.write_external(
            Slice::Global.key(),
            &json!({ "footer": { "brandName": "OTHER" } }).to_string(),
        );
        assert_eq!(store.footer().brand_name, "OTHER");
        assert_eq!(store.footer().status_rows, defaults::footer_config().status_rows);
        assert_eq!(store.navigation(), defaults::navigation_config());
    }

    #[test]
    fn test_dropping_store_unsubscribes() {
        let origin = MemoryOrigin::new();
        let (store, _) = store_on(&origin);
        assert_eq!(origin.listener_count(), 1);
        drop(store);
        assert_eq!(origin.listener_count(), 0);
    }

    #[test]
    fn test_unique_id_retries_until_free() {
        let attempts = std::cell::Cell::new(0);
        let id = unique_id("section", |_| {
            attempts.set(attempts.get() + 1);
            attempts.get() < 3
        });
        assert_eq!(attempts.get(), 3);
        assert!(id.starts_with("section-"));
    }
}
