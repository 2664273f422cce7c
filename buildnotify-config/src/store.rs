// ABOUTME: Key-value settings backends: an in-memory store and a TOML file store.
// ABOUTME: Keys are flat "section/name" strings; values are bools, integers, text, or text lists.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single stored setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::List(value)
    }
}

/// Backend a [`crate::Config`] reads from and writes to.
///
/// Writes may be buffered; `sync` makes them durable.
pub trait SettingsStore {
    fn value(&self, key: &str) -> Option<SettingValue>;

    fn set_value(&mut self, key: &str, value: SettingValue);

    /// Remove a key, returning its previous value.
    fn remove(&mut self, key: &str) -> Option<SettingValue>;

    /// All stored keys in sorted order.
    fn keys(&self) -> Vec<String>;

    fn sync(&mut self) -> Result<()>;
}

/// Volatile store, used for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, SettingValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn value(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: SettingValue) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.values.remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Settings persisted as a single flat TOML table.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, SettingValue>,
    /// Entries that are not a [`SettingValue`]; written back untouched.
    unrecognized: toml::Table,
    dirty: bool,
}

/// Contents of a settings file split into usable and unusable entries.
#[derive(Debug, Default)]
struct Loaded {
    values: BTreeMap<String, SettingValue>,
    unrecognized: toml::Table,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file yields an
    /// empty store. A file that is not valid TOML is copied aside to
    /// `<path>.bak` before the store starts empty. Single entries of an
    /// unexpected type are skipped on read and preserved on write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loaded = load_values(&path);
        Self {
            path,
            values: loaded.values,
            unrecognized: loaded.unrecognized,
            dirty: false,
        }
    }

    /// Open the organization/application scoped store under the user's
    /// config directory.
    pub fn open_default(organization: &str, application: &str) -> Self {
        Self::open(Self::default_path(organization, application))
    }

    /// `$XDG_CONFIG_HOME/<organization>/<application>.toml`, falling back
    /// to `$HOME/.config`.
    pub fn default_path(organization: &str, application: &str) -> PathBuf {
        let xdg_config = std::env::var("XDG_CONFIG_HOME")
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                format!("{home}/.config")
            });
        Path::new(&xdg_config)
            .join(organization)
            .join(format!("{application}.toml"))
    }

    /// Where a settings file that failed to parse is copied.
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(contents: &str) -> Result<Loaded> {
        let table: toml::Table = toml::from_str(contents)?;
        let mut loaded = Loaded::default();
        for (key, raw) in table {
            match raw.clone().try_into::<SettingValue>() {
                Ok(value) => {
                    loaded.values.insert(key, value);
                }
                Err(_) => {
                    tracing::warn!("Skipping setting {key}: unsupported value {raw}");
                    loaded.unrecognized.insert(key, raw);
                }
            }
        }
        Ok(loaded)
    }

    fn to_table(&self) -> Result<toml::Table> {
        let mut table = self.unrecognized.clone();
        for (key, value) in &self.values {
            table.insert(key.clone(), toml::Value::try_from(value)?);
        }
        Ok(table)
    }
}

fn load_values(path: &Path) -> Loaded {
    match fs::read_to_string(path) {
        Ok(contents) => match FileStore::parse(&contents) {
            Ok(loaded) => {
                tracing::info!(
                    "Loaded {} settings from {}",
                    loaded.values.len(),
                    path.display()
                );
                loaded
            }
            Err(e) => {
                let backup = FileStore::backup_path(path);
                match fs::copy(path, &backup) {
                    Ok(_) => tracing::warn!(
                        "Corrupt settings file {} ({e}), saved a copy at {}",
                        path.display(),
                        backup.display()
                    ),
                    Err(copy_err) => tracing::warn!(
                        "Corrupt settings file {} ({e}), backup failed: {copy_err}",
                        path.display()
                    ),
                }
                Loaded::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No settings file at {}, starting fresh", path.display());
            Loaded::default()
        }
        Err(e) => {
            tracing::warn!("Failed to read settings (will start fresh): {e}");
            Loaded::default()
        }
    }
}

impl SettingsStore for FileStore {
    fn value(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: SettingValue) {
        self.unrecognized.remove(key);
        self.values.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn remove(&mut self, key: &str) -> Option<SettingValue> {
        let dropped_unrecognized = self.unrecognized.remove(key).is_some();
        let previous = self.values.remove(key);
        if previous.is_some() || dropped_unrecognized {
            self.dirty = true;
        }
        previous
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn sync(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(&self.to_table()?)?;
        fs::write(&self.path, contents)?;

        // Server passwords live in this file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        self.dirty = false;
        tracing::info!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_and_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.value("sort/name"), None);

        store.set_value("sort/name", true.into());
        assert_eq!(store.value("sort/name"), Some(SettingValue::Bool(true)));

        assert_eq!(store.remove("sort/name"), Some(SettingValue::Bool(true)));
        assert_eq!(store.value("sort/name"), None);
        assert!(store.keys().is_empty());
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.toml"));
        assert!(store.keys().is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut store = FileStore::open(&path);
        store.set_value("connection/urls", vec!["http://ci".to_string()].into());
        store.set_value("connection/excludes/http://ci", SettingValue::List(Vec::new()));
        store.set_value("values/interval_in_seconds", 300i64.into());
        store.set_value("script/value", "/bin/sh".into());
        store.set_value("script/enabled", true.into());
        store.sync().unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(
            reopened.value("connection/urls"),
            Some(SettingValue::List(vec!["http://ci".to_string()]))
        );
        assert_eq!(
            reopened.value("connection/excludes/http://ci"),
            Some(SettingValue::List(Vec::new()))
        );
        assert_eq!(reopened.value("values/interval_in_seconds"), Some(SettingValue::Int(300)));
        assert_eq!(reopened.value("script/value"), Some(SettingValue::Text("/bin/sh".to_string())));
        assert_eq!(reopened.value("script/enabled"), Some(SettingValue::Bool(true)));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut store = FileStore::open(&path);
        store.set_value("connection/password/http://ci", "secret".into());
        store.sync().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_store_corrupt_file_opens_empty_and_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let mut store = FileStore::open(&path);
        assert!(store.keys().is_empty());

        store.set_value("sort/name", true.into());
        store.sync().unwrap();
        let backup = fs::read_to_string(FileStore::backup_path(&path)).unwrap();
        assert_eq!(backup, "this is = = not toml");
    }

    #[test]
    fn file_store_keeps_good_entries_next_to_a_mistyped_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            concat!(
                "\"connection/urls\" = [\"http://ci\"]\n",
                "\"connection/password/http://ci\" = \"pw\"\n",
                "\"values/interval_in_seconds\" = 1.5\n",
                "\"values/ports\" = [1, 2]\n",
            ),
        )
        .unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(
            store.value("connection/urls"),
            Some(SettingValue::List(vec!["http://ci".to_string()]))
        );
        assert_eq!(
            store.value("connection/password/http://ci"),
            Some(SettingValue::Text("pw".to_string()))
        );
        assert_eq!(store.value("values/interval_in_seconds"), None);

        store.set_value("sort/name", true.into());
        store.sync().unwrap();

        let written: toml::Table = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["connection/password/http://ci"].as_str(), Some("pw"));
        assert_eq!(written["values/interval_in_seconds"].as_float(), Some(1.5));
        assert_eq!(written["values/ports"].as_array().map(Vec::len), Some(2));
        assert_eq!(written["sort/name"].as_bool(), Some(true));
    }

    #[test]
    fn overwriting_a_mistyped_entry_replaces_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "\"values/interval_in_seconds\" = 1.5\n").unwrap();

        let mut store = FileStore::open(&path);
        store.set_value("values/interval_in_seconds", 90i64.into());
        store.sync().unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.value("values/interval_in_seconds"), Some(SettingValue::Int(90)));
    }

    #[test]
    fn file_store_sync_without_changes_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let mut store = FileStore::open(&path);
        store.sync().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn default_path_is_scoped_by_organization_and_application() {
        let path = FileStore::default_path("buildnotify", "buildnotify");
        assert!(path.ends_with("buildnotify/buildnotify.toml"));
    }
}
