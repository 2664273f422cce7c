// ABOUTME: Per-server configuration record for a monitored build server.
// ABOUTME: Normalizes the server url so it always carries a scheme.

use serde::{Deserialize, Serialize};

/// One monitored build server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    #[serde(default)]
    pub excluded_projects: Vec<String>,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub skip_ssl_verification: bool,
}

impl ServerConfig {
    pub fn new(
        url: &str,
        excluded_projects: Vec<String>,
        timezone: &str,
        prefix: &str,
        username: &str,
        password: &str,
    ) -> Self {
        Self {
            url: clean_url(url),
            excluded_projects,
            timezone: timezone.to_string(),
            prefix: prefix.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            skip_ssl_verification: false,
        }
    }

    pub fn with_skip_ssl_verification(mut self, skip: bool) -> Self {
        self.skip_ssl_verification = skip;
        self
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

/// Prefix `http://` unless the url already names a scheme.
pub fn clean_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}
