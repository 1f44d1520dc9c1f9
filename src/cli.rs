//! Command-line interface definitions and command execution

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::content::{
    ExperienceItem, FooterPatch, NavPatch, NewSection, ProjectItem, Section, SectionPatch,
    SectionType, SitePatch, SkillItem, TestimonialItem, Theme,
};
use crate::persistence::{FileStorage, Persistence, StorageEvent};
use crate::store::ContentStore;
use crate::style::StyleVariables;
use crate::themes;

/// Portfolio content store CLI
#[derive(Parser, Debug)]
#[command(name = "portfolio-cms", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Directory holding the content slices (overrides the config file)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL and the config file)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Config file path
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect and edit page sections
    Sections {
        #[command(subcommand)]
        action: SectionsAction,
    },

    /// Edit the collection of a list-style section
    Items {
        #[command(subcommand)]
        action: ItemsAction,
    },

    /// Inspect and switch the active theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Site branding and layout defaults
    Site {
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Navigation bar
    Nav {
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Footer
    Footer {
        #[command(subcommand)]
        action: RecordAction,
    },

    /// Write a backup of all content
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Restore content from a backup file
    Import {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Render the theme's style variables as CSS
    Css {
        /// Write to a file (defaults to `cssOutput` from the config, else stdout)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Replace all content with the demo portfolio
    Demo,

    /// Restore the built-in defaults
    Reset,

    /// Print changes other processes make to the data dir until interrupted
    Watch,

    /// Show or save the effective settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the settings in effect, command-line overrides included
    Show,
    /// Write the settings in effect to the config file
    Save,
}

#[derive(Subcommand, Debug)]
pub enum SectionsAction {
    /// List sections by order
    List {
        /// Only sections shown on the public page
        #[arg(long)]
        visible: bool,
    },

    /// Print one section as JSON
    Show { id: String },

    /// Add a section and print its id
    Add {
        /// hero, about, skills, projects, experience, testimonials, contact or custom
        kind: SectionType,
        title: String,
        /// Position; defaults to after the last section
        #[arg(long)]
        order: Option<i64>,
        /// Create the section hidden
        #[arg(long)]
        hidden: bool,
    },

    /// Apply a JSON patch (`title`, `content`, `isVisible`, `order`)
    Update { id: String, patch: String },

    Delete { id: String },

    /// Set the section order; sections not listed are removed
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show or hide a section
    Visibility {
        id: String,
        #[arg(action = clap::ArgAction::Set)]
        visible: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Skills,
    Projects,
    Experience,
    Testimonials,
}

#[derive(Subcommand, Debug)]
pub enum ItemsAction {
    List { kind: ItemKind },

    /// Add an item given as JSON and print its id
    Add { kind: ItemKind, item: String },

    /// Merge a JSON object into an item
    Update {
        kind: ItemKind,
        id: String,
        patch: String,
    },

    Delete { kind: ItemKind, id: String },
}

#[derive(Subcommand, Debug)]
pub enum ThemeAction {
    /// List preset themes
    List,
    /// Print the active theme as JSON
    Current,
    /// Activate a preset by id
    Apply { id: String },
    /// Activate a theme read from a JSON file
    Set {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecordAction {
    /// Print as JSON
    Show,
    /// Merge a JSON object of fields
    Set { patch: String },
}

/// Everything a command runs against
pub struct Session {
    pub config: AppConfig,
    /// Where `config save` writes
    pub config_path: PathBuf,
    pub storage: Arc<FileStorage>,
    pub style: StyleVariables,
    pub store: ContentStore,
}

impl Session {
    pub fn open(config: AppConfig) -> Result<Self> {
        let storage = Arc::new(FileStorage::open(config.data_dir())?);
        let style = StyleVariables::new();
        let store = ContentStore::new(
            Arc::clone(&storage) as Arc<dyn Persistence>,
            Arc::new(style.clone()),
        );
        Ok(Self {
            config,
            config_path: AppConfig::path(),
            storage,
            style,
            store,
        })
    }
}

/// Run the item-kind specific `$body` with `$item` bound to the item type
macro_rules! with_item_type {
    ($kind:expr, $item:ident => $body:expr) => {
        match $kind {
            ItemKind::Skills => {
                type $item = SkillItem;
                $body
            }
            ItemKind::Projects => {
                type $item = ProjectItem;
                $body
            }
            ItemKind::Experience => {
                type $item = ExperienceItem;
                $body
            }
            ItemKind::Testimonials => {
                type $item = TestimonialItem;
                $body
            }
        }
    };
}

pub fn run(command: Command, session: &Session) -> Result<()> {
    let store = &session.store;
    match command {
        Command::Sections { action } => run_sections(store, action),
        Command::Items { action } => run_items(store, action),
        Command::Theme { action } => run_theme(store, action),
        Command::Site { action } => match action {
            RecordAction::Show => print_json(&store.site()),
            RecordAction::Set { patch } => {
                store.update_site(parse_patch::<SitePatch>(&patch)?);
                print_json(&store.site())
            }
        },
        Command::Nav { action } => match action {
            RecordAction::Show => print_json(&store.navigation()),
            RecordAction::Set { patch } => {
                store.update_navigation(parse_patch::<NavPatch>(&patch)?);
                print_json(&store.navigation())
            }
        },
        Command::Footer { action } => match action {
            RecordAction::Show => print_json(&store.footer()),
            RecordAction::Set { patch } => {
                store.update_footer(parse_patch::<FooterPatch>(&patch)?);
                print_json(&store.footer())
            }
        },
        Command::Export { output } => {
            let exported = store.export_data()?;
            write_output(output.as_deref(), &exported)
        }
        Command::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            store
                .try_import_data(&json)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            println!("imported {}", file.display());
            Ok(())
        }
        Command::Css { output } => {
            let target = output.or_else(|| session.config.css_output.clone());
            write_output(target.as_deref(), &session.style.to_css())
        }
        Command::Demo => {
            store.load_demo_data();
            println!("demo content loaded");
            Ok(())
        }
        Command::Reset => {
            store.reset_to_defaults();
            println!("content reset to defaults");
            Ok(())
        }
        Command::Watch => watch(session),
        Command::Config { action } => match action {
            ConfigAction::Show => print_json(&session.config),
            ConfigAction::Save => {
                session.config.save_to(&session.config_path)?;
                println!("saved {}", session.config_path.display());
                Ok(())
            }
        },
    }
}

fn run_sections(store: &ContentStore, action: SectionsAction) -> Result<()> {
    match action {
        SectionsAction::List { visible } => {
            let sections = if visible {
                store.visible_sections()
            } else {
                let mut all = store.sections();
                all.sort_by_key(|s| s.order);
                all
            };
            for section in &sections {
                println!("{}", section_row(section));
            }
            Ok(())
        }
        SectionsAction::Show { id } => print_json(&find_section(store, &id)?),
        SectionsAction::Add {
            kind,
            title,
            order,
            hidden,
        } => {
            let order = order.unwrap_or_else(|| {
                store
                    .sections()
                    .iter()
                    .map(|s| s.order.saturating_add(1))
                    .max()
                    .unwrap_or(0)
            });
            let mut section = NewSection::new(kind, title, order);
            section.is_visible = !hidden;
            println!("{}", store.add_section(section));
            Ok(())
        }
        SectionsAction::Update { id, patch } => {
            let section = find_section(store, &id)?;
            let value: Value = serde_json::from_str(&patch).context("Patch is not valid JSON")?;
            let patch = SectionPatch::from_json(section.section_type(), &value)
                .with_context(|| format!("Invalid patch for section {id}"))?;
            if !store.update_section(&id, patch) {
                bail!("patch changed nothing in section {id}");
            }
            print_json(&find_section(store, &id)?)
        }
        SectionsAction::Delete { id } => {
            if !store.delete_section(&id) {
                bail!("no section with id {id}");
            }
            println!("deleted {id}");
            Ok(())
        }
        SectionsAction::Reorder { ids } => {
            store.reorder_sections(&ids);
            for section in &store.sections() {
                println!("{}", section_row(section));
            }
            Ok(())
        }
        SectionsAction::Visibility { id, visible } => {
            if !store.update_section(&id, SectionPatch::visibility(visible)) {
                bail!("no section with id {id}");
            }
            println!("{}", section_row(&find_section(store, &id)?));
            Ok(())
        }
    }
}

fn run_items(store: &ContentStore, action: ItemsAction) -> Result<()> {
    match action {
        ItemsAction::List { kind } => with_item_type!(kind, T => print_json(&store.items::<T>())),
        ItemsAction::Add { kind, item } => with_item_type!(kind, T => {
            let item: T = serde_json::from_str(&item).context("Item is not valid JSON for this kind")?;
            match store.add_item(item) {
                Some(id) => {
                    println!("{id}");
                    Ok(())
                }
                None => bail!("no {kind:?} section to add the item to"),
            }
        }),
        ItemsAction::Update { kind, id, patch } => with_item_type!(kind, T => {
            let patch: Value = serde_json::from_str(&patch).context("Patch is not valid JSON")?;
            if !store.update_item::<T>(&id, &patch) {
                bail!("could not update item {id}");
            }
            print_json(&store.items::<T>().into_iter().find(|item| item.id == id))
        }),
        ItemsAction::Delete { kind, id } => with_item_type!(kind, T => {
            if !store.delete_item::<T>(&id) {
                bail!("no item with id {id}");
            }
            println!("deleted {id}");
            Ok(())
        }),
    }
}

fn run_theme(store: &ContentStore, action: ThemeAction) -> Result<()> {
    match action {
        ThemeAction::List => {
            let active = store.theme().id;
            for theme in themes::all() {
                let marker = if theme.id == active { "*" } else { " " };
                println!("{marker} {:<10} {}", theme.id, theme.name);
            }
            Ok(())
        }
        ThemeAction::Current => print_json(&store.theme()),
        ThemeAction::Apply { id } => {
            if !store.apply_preset_theme(&id) {
                bail!("no preset theme named {id}");
            }
            println!("applied {id}");
            Ok(())
        }
        ThemeAction::Set { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let theme: Theme = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse theme from {}", file.display()))?;
            let id = theme.id.clone();
            store.update_theme(theme);
            println!("applied {id}");
            Ok(())
        }
    }
}

#[cfg(unix)]
fn interrupt_flag() -> Result<Arc<std::sync::atomic::AtomicBool>> {
    use signal_hook::consts::{SIGINT, SIGTERM};

    let flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&flag))
            .context("Failed to register signal handler")?;
    }
    Ok(flag)
}

#[cfg(not(unix))]
fn interrupt_flag() -> Result<Arc<std::sync::atomic::AtomicBool>> {
    Ok(Arc::new(std::sync::atomic::AtomicBool::new(false)))
}

fn watch(session: &Session) -> Result<()> {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    let stop = interrupt_flag()?;
    let _printer = session.storage.subscribe(Arc::new(|event: &StorageEvent| {
        match &event.new_value {
            Some(value) => println!("{} changed ({} bytes)", event.key, value.len()),
            None => println!("{} removed", event.key),
        }
    }));
    session.storage.watch()?;

    println!("watching {} (Ctrl-C to stop)", session.storage.dir().display());
    while !stop.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(crate::constants::watch::POLL_INTERVAL_MS));
    }

    info!("watch interrupted, exiting");
    Ok(())
}

fn find_section(store: &ContentStore, id: &str) -> Result<Section> {
    store
        .section(id)
        .with_context(|| format!("no section with id {id}"))
}

fn section_row(section: &Section) -> String {
    format!(
        "{:>3}  {:<8} {:<40} {:<13} {}",
        section.order,
        if section.is_visible { "visible" } else { "hidden" },
        section.id,
        section.section_type(),
        section.title
    )
}

fn parse_patch<T: serde::de::DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).context("Patch is not a valid JSON object for this record")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
            Ok(())
        }
        None => {
            print!("{contents}");
            if !contents.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}
