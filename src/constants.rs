//! Application-wide constants
//!
//! Storage keys, style variable names and file locations live here so the
//! store, the backends and the CLI agree on a single source of truth.

/// Persisted slice keys (one per independently stored slice)
pub mod keys {
    /// Ordered list of page sections
    pub const SECTIONS: &str = "portfolio_sections";

    /// Active theme
    pub const THEME: &str = "portfolio_theme";

    /// Combined site / navigation / footer record
    pub const GLOBAL: &str = "portfolio_global";
}

/// Document-level style variables fed by theme reflection
pub mod style {
    /// Receives `colors.primary`
    pub const PRIMARY: &str = "--neon-cyan";

    /// Receives `colors.secondary`
    pub const SECONDARY: &str = "--neon-purple";

    /// Receives `colors.accent`
    pub const ACCENT: &str = "--neon-pink";

    /// Receives `colors.background`
    pub const BACKGROUND: &str = "--cyber-dark";

    /// Receives `colors.surface`
    pub const SURFACE: &str = "--cyber-panel";
}

/// On-disk locations
pub mod paths {
    /// Directory name under the platform config/data dirs
    pub const APP_DIR: &str = "portfolio-cms";

    /// Settings file inside the config dir
    pub const CONFIG_FILENAME: &str = "config.json";

    /// Extension used for slice files in the data dir
    pub const SLICE_EXTENSION: &str = "json";

    /// Suffix for the temp file a slice is written to before rename
    pub const TEMP_SUFFIX: &str = "tmp";
}

/// Content validation bounds
pub mod validation {
    /// Highest skill proficiency accepted (percentage)
    pub const MAX_SKILL_LEVEL: u8 = 100;

    /// Highest testimonial star rating
    pub const MAX_RATING: u8 = 5;
}

/// Timing of the `watch` command
pub mod watch {
    /// How often the `watch` command checks for an interrupt (milliseconds)
    pub const POLL_INTERVAL_MS: u64 = 250;
}
