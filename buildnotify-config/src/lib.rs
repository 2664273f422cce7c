// ABOUTME: Persistent configuration for the BuildNotify build-status notifier.
// ABOUTME: Server records, global preferences, the settings backends they live in, and the version string.

mod config;
mod error;
mod preferences;
mod server;
mod store;
mod version;

pub use config::{
    Config, DEFAULT_CUSTOM_SCRIPT, DEFAULT_INTERVAL_IN_SECONDS, DEFAULT_TIMEOUT_IN_SECONDS,
};
pub use error::{Result, SettingsError};
pub use preferences::{Notification, Preferences};
pub use server::{ServerConfig, clean_url};
pub use store::{FileStore, MemoryStore, SettingValue, SettingsStore};
pub use version::{BUILD_NUMBER_VAR, version, version_from, version_with_build};

/// Organization and application names scoping the default settings file.
pub const ORGANIZATION: &str = "buildnotify";
pub const APPLICATION: &str = "buildnotify";
