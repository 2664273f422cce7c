// ABOUTME: Typed façade over a settings store for servers and global preferences.
// ABOUTME: Every read is tolerant: unset or mistyped keys resolve to documented defaults.

use crate::error::Result;
use crate::preferences::{Notification, Preferences};
use crate::server::{ServerConfig, clean_url};
use crate::store::{SettingValue, SettingsStore};

const URLS: &str = "connection/urls";
const EXCLUDES: &str = "connection/excludes";
const TIMEZONE: &str = "connection/timezone";
const DISPLAY_PREFIX: &str = "connection/display_prefix";
const USERNAME: &str = "connection/username";
const PASSWORD: &str = "connection/password";
const SKIP_SSL_VERIFICATION: &str = "connection/skip_ssl_verification";
const INTERVAL: &str = "values/interval_in_seconds";
const TIMEOUT: &str = "values/timeout_in_seconds";
const SCRIPT: &str = "script/value";
const SCRIPT_ENABLED: &str = "script/enabled";
const SORT_BY_NAME: &str = "sort/name";
const SORT_BY_LAST_BUILD_TIME: &str = "sort/lastbuildtime";

const PER_SERVER_SECTIONS: [&str; 6] = [
    EXCLUDES,
    TIMEZONE,
    DISPLAY_PREFIX,
    USERNAME,
    PASSWORD,
    SKIP_SSL_VERIFICATION,
];

pub const DEFAULT_INTERVAL_IN_SECONDS: u64 = 120;
pub const DEFAULT_TIMEOUT_IN_SECONDS: u64 = 10;
pub const DEFAULT_CUSTOM_SCRIPT: &str = "echo #status# #projects# >> /tmp/buildnotify.log";

fn server_key(section: &str, url: &str) -> String {
    format!("{section}/{url}")
}

/// Application configuration backed by an injected [`SettingsStore`].
#[derive(Debug)]
pub struct Config<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> Config<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Flush pending writes to the backend.
    pub fn sync(&mut self) -> Result<()> {
        self.store.sync()
    }

    fn typed<T>(&self, key: &str, extract: impl FnOnce(&SettingValue) -> Option<T>) -> Option<T> {
        let value = self.store.value(key)?;
        let typed = extract(&value);
        if typed.is_none() {
            tracing::debug!("Ignoring {key}: unexpected value {value:?}");
        }
        typed
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.typed(key, |v| v.as_text().map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.typed(key, SettingValue::as_bool).unwrap_or(default)
    }

    fn get_seconds(&self, key: &str, default: u64) -> u64 {
        self.typed(key, |v| v.as_int().and_then(|i| u64::try_from(i).ok()))
            .unwrap_or(default)
    }

    fn get_list(&self, key: &str) -> Vec<String> {
        self.typed(key, |v| v.as_list().map(<[String]>::to_vec))
            .unwrap_or_default()
    }

    fn set_seconds(&mut self, key: &str, seconds: u64) {
        let value = i64::try_from(seconds).unwrap_or(i64::MAX);
        self.store.set_value(key, value.into());
    }

    /// Registered server urls in registration order.
    pub fn get_urls(&self) -> Vec<String> {
        self.get_list(URLS)
    }

    pub fn update_urls(&mut self, urls: &[String]) {
        self.store.set_value(URLS, urls.to_vec().into());
    }

    pub fn set_project_excludes(&mut self, url: &str, projects: &[String]) {
        self.store
            .set_value(&server_key(EXCLUDES, url), projects.to_vec().into());
    }

    pub fn get_project_excludes(&self, url: &str) -> Vec<String> {
        self.get_list(&server_key(EXCLUDES, url))
    }

    pub fn get_project_timezone(&self, url: &str) -> String {
        self.get_string(&server_key(TIMEZONE, url), "")
    }

    pub fn get_display_prefix(&self, url: &str) -> String {
        self.get_string(&server_key(DISPLAY_PREFIX, url), "")
    }

    pub fn get_skip_ssl_verification(&self, url: &str) -> bool {
        self.get_bool(&server_key(SKIP_SSL_VERIFICATION, url), false)
    }

    /// Persist every field of `server` and register its url if new. The
    /// url is normalized the same way `ServerConfig::new` does it.
    pub fn save_server_config(&mut self, server: &ServerConfig) {
        let url = clean_url(&server.url);
        let url = url.as_str();
        let mut urls = self.get_urls();
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
            self.update_urls(&urls);
        }

        self.set_project_excludes(url, &server.excluded_projects);
        self.store
            .set_value(&server_key(TIMEZONE, url), server.timezone.as_str().into());
        self.store
            .set_value(&server_key(DISPLAY_PREFIX, url), server.prefix.as_str().into());
        self.store
            .set_value(&server_key(USERNAME, url), server.username.as_str().into());
        self.store
            .set_value(&server_key(PASSWORD, url), server.password.as_str().into());
        self.store.set_value(
            &server_key(SKIP_SSL_VERIFICATION, url),
            server.skip_ssl_verification.into(),
        );
        tracing::info!("Saved server config for {url}");
    }

    /// Look up a server by url. Unknown urls give a record with blank fields.
    pub fn get_server_config(&self, url: &str) -> ServerConfig {
        ServerConfig {
            url: url.to_string(),
            excluded_projects: self.get_project_excludes(url),
            timezone: self.get_project_timezone(url),
            prefix: self.get_display_prefix(url),
            username: self.get_string(&server_key(USERNAME, url), ""),
            password: self.get_string(&server_key(PASSWORD, url), ""),
            skip_ssl_verification: self.get_skip_ssl_verification(url),
        }
    }

    pub fn get_server_configs(&self) -> Vec<ServerConfig> {
        self.get_urls()
            .iter()
            .map(|url| self.get_server_config(url))
            .collect()
    }

    /// Unregister a server and erase its stored fields. Returns whether the
    /// url was registered.
    pub fn remove_server(&mut self, url: &str) -> bool {
        let mut urls = self.get_urls();
        let before = urls.len();
        urls.retain(|u| u != url);
        let registered = urls.len() != before;
        if registered {
            self.update_urls(&urls);
        }

        for section in PER_SERVER_SECTIONS {
            self.store.remove(&server_key(section, url));
        }
        if registered {
            tracing::info!("Removed server {url}");
        }
        registered
    }

    pub fn get_interval_in_seconds(&self) -> u64 {
        self.get_seconds(INTERVAL, DEFAULT_INTERVAL_IN_SECONDS)
    }

    pub fn set_interval_in_seconds(&mut self, seconds: u64) {
        self.set_seconds(INTERVAL, seconds);
    }

    /// HTTP timeout used when fetching server status.
    pub fn get_timeout_in_seconds(&self) -> u64 {
        self.get_seconds(TIMEOUT, DEFAULT_TIMEOUT_IN_SECONDS)
    }

    pub fn set_timeout_in_seconds(&mut self, seconds: u64) {
        self.set_seconds(TIMEOUT, seconds);
    }

    pub fn get_custom_script(&self) -> String {
        self.get_string(SCRIPT, DEFAULT_CUSTOM_SCRIPT)
    }

    pub fn set_custom_script(&mut self, script: &str) {
        self.store.set_value(SCRIPT, script.into());
    }

    pub fn get_custom_script_enabled(&self) -> bool {
        self.get_bool(SCRIPT_ENABLED, false)
    }

    pub fn set_custom_script_enabled(&mut self, enabled: bool) {
        self.store.set_value(SCRIPT_ENABLED, enabled.into());
    }

    pub fn get_sort_by_last_build_time(&self) -> bool {
        self.get_bool(SORT_BY_LAST_BUILD_TIME, false)
    }

    pub fn get_sort_by_name(&self) -> bool {
        self.get_bool(SORT_BY_NAME, true)
    }

    pub fn get_notification(&self, kind: Notification) -> bool {
        self.get_bool(kind.key(), kind.default_enabled())
    }

    pub fn set_notification(&mut self, kind: Notification, enabled: bool) {
        self.store.set_value(kind.key(), enabled.into());
    }

    /// Apply every field of `preferences`.
    pub fn update_preferences(&mut self, preferences: &Preferences) {
        self.update_urls(&preferences.urls);
        self.set_interval_in_seconds(preferences.interval_in_seconds);
        self.set_custom_script(&preferences.custom_script);
        self.set_custom_script_enabled(preferences.custom_script_enabled);
        self.store.set_value(
            SORT_BY_LAST_BUILD_TIME,
            preferences.sort_by_last_build_time.into(),
        );
        self.store
            .set_value(SORT_BY_NAME, preferences.sort_by_name.into());
        for &(kind, enabled) in &preferences.selected_notifications {
            self.set_notification(kind, enabled);
        }
        tracing::info!("Preferences updated");
    }

    /// Snapshot of the global preferences, every notification kind included.
    pub fn preferences(&self) -> Preferences {
        Preferences {
            urls: self.get_urls(),
            interval_in_seconds: self.get_interval_in_seconds(),
            custom_script: self.get_custom_script(),
            custom_script_enabled: self.get_custom_script_enabled(),
            sort_by_last_build_time: self.get_sort_by_last_build_time(),
            sort_by_name: self.get_sort_by_name(),
            selected_notifications: Notification::ALL
                .into_iter()
                .map(|kind| (kind, self.get_notification(kind)))
                .collect(),
        }
    }
}
