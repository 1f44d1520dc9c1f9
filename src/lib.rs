//! Client-side content store for a single-admin portfolio site
//!
//! - [`store::ContentStore`]: sections, theme and site/navigation/footer
//!   records, persisted slice by slice and kept in sync across contexts
//! - [`persistence`]: storage backends (in-memory origin, data directory)
//! - [`style`]: projection of the active theme into style variables
//! - [`themes`] / [`defaults`]: compiled-in presets, defaults and demo content

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod content;
pub mod defaults;
pub mod merge;
pub mod persistence;
pub mod store;
pub mod style;
pub mod themes;
