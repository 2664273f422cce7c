// ABOUTME: Executes one CLI command against a Config and writes the result.
// ABOUTME: Write commands flush the settings store before returning.

use std::io::Write;

use buildnotify_config::{Config, ServerConfig, SettingsStore, clean_url, version};
use serde::Serialize;

use crate::DynError;
use crate::cli::Commands;

/// Server listing without the password.
#[derive(Serialize)]
struct ServerSummary<'a> {
    url: &'a str,
    prefix: &'a str,
    timezone: &'a str,
    username: &'a str,
    excluded_projects: &'a [String],
    skip_ssl_verification: bool,
}

impl<'a> From<&'a ServerConfig> for ServerSummary<'a> {
    fn from(server: &'a ServerConfig) -> Self {
        Self {
            url: &server.url,
            prefix: &server.prefix,
            timezone: &server.timezone,
            username: &server.username,
            excluded_projects: &server.excluded_projects,
            skip_ssl_verification: server.skip_ssl_verification,
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

pub fn execute<S: SettingsStore>(
    cmd: Commands,
    config: &mut Config<S>,
    out: &mut impl Write,
) -> Result<(), DynError> {
    match cmd {
        Commands::Version => {
            writeln!(out, "{}", version())?;
        }
        Commands::Servers { json } => {
            let servers = config.get_server_configs();
            if json {
                let summaries: Vec<_> = servers.iter().map(ServerSummary::from).collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&summaries)?)?;
            } else {
                for server in &servers {
                    let user = if server.has_credentials() { server.username.as_str() } else { "-" };
                    writeln!(
                        out,
                        "{}\tprefix={}\ttimezone={}\tuser={}\texcluded={}",
                        server.url,
                        server.prefix,
                        server.timezone,
                        user,
                        server.excluded_projects.join(",")
                    )?;
                }
            }
        }
        Commands::AddServer {
            url,
            prefix,
            timezone,
            username,
            password,
            excludes,
            skip_ssl_verification,
        } => {
            let server = ServerConfig::new(&url, excludes, &timezone, &prefix, &username, &password)
                .with_skip_ssl_verification(skip_ssl_verification);
            config.save_server_config(&server);
            config.sync()?;
            writeln!(out, "Saved {}", server.url)?;
        }
        Commands::RemoveServer { url } => {
            let url = clean_url(&url);
            if config.remove_server(&url) {
                config.sync()?;
                writeln!(out, "Removed {url}")?;
            } else {
                return Err(format!("No server registered for {url}").into());
            }
        }
        Commands::Excludes { url, projects, clear } => {
            let url = clean_url(&url);
            if clear || !projects.is_empty() {
                config.set_project_excludes(&url, &projects);
                config.sync()?;
            }
            for project in config.get_project_excludes(&url) {
                writeln!(out, "{project}")?;
            }
        }
        Commands::Preferences { json } => {
            let preferences = config.preferences();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&preferences)?)?;
            } else {
                writeln!(out, "urls: {}", preferences.urls.join(", "))?;
                writeln!(out, "interval_in_seconds: {}", preferences.interval_in_seconds)?;
                writeln!(out, "timeout_in_seconds: {}", config.get_timeout_in_seconds())?;
                writeln!(out, "custom_script: {}", preferences.custom_script)?;
                writeln!(out, "custom_script_enabled: {}", preferences.custom_script_enabled)?;
                writeln!(out, "sort_by_last_build_time: {}", preferences.sort_by_last_build_time)?;
                writeln!(out, "sort_by_name: {}", preferences.sort_by_name)?;
                writeln!(out, "notifications:")?;
                for (kind, enabled) in &preferences.selected_notifications {
                    writeln!(out, "  {kind}: {}", on_off(*enabled))?;
                }
            }
        }
        Commands::SetInterval { seconds } => {
            if seconds == 0 {
                return Err("Poll interval must be at least one second".into());
            }
            config.set_interval_in_seconds(seconds);
            config.sync()?;
        }
        Commands::SetScript { command, disable } => {
            config.set_custom_script(&command);
            config.set_custom_script_enabled(!disable);
            config.sync()?;
        }
        Commands::Notify { kind, state } => {
            config.set_notification(kind, state.enabled());
            config.sync()?;
            writeln!(out, "{kind}: {}", on_off(state.enabled()))?;
        }
    }
    Ok(())
}
