//! Configuration for the command-line tool
//!
//! The library itself takes no configuration: storage and style sink are
//! passed to [`crate::store::ContentStore`] directly. The binary reads
//! [`AppConfig`] to decide where storage lives and how loudly to log.

pub mod app;

pub use app::AppConfig;
