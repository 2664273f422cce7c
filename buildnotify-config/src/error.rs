// ABOUTME: Error type for settings backends that touch the filesystem.
// ABOUTME: Reads are tolerant and never fail; only flushing a store can.

use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = result::Result<T, SettingsError>;
