// ABOUTME: Command-line interface definition for the buildnotify settings tool.
// ABOUTME: One subcommand per settings operation; --settings overrides the store location.

use std::path::PathBuf;

use buildnotify_config::Notification;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[clap(
    name = "buildnotify",
    version,
    about = "Inspect and edit BuildNotify settings"
)]
pub struct CliArgs {
    /// Settings file to use instead of the per-user default.
    #[clap(long, env = "BUILDNOTIFY_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    #[clap(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[clap(name = "version", about = "Print the application version")]
    Version,
    #[clap(name = "servers", about = "List monitored build servers")]
    Servers {
        #[clap(long)]
        json: bool,
    },
    #[clap(name = "add-server", about = "Add a build server or update an existing one")]
    AddServer {
        url: String,
        #[clap(long, default_value = "")]
        prefix: String,
        #[clap(long, default_value = "")]
        timezone: String,
        #[clap(long, default_value = "")]
        username: String,
        #[clap(long, default_value = "")]
        password: String,
        /// Project to hide from this server; repeatable.
        #[clap(long = "exclude")]
        excludes: Vec<String>,
        #[clap(long)]
        skip_ssl_verification: bool,
    },
    #[clap(name = "remove-server", about = "Stop monitoring a build server")]
    RemoveServer { url: String },
    #[clap(
        name = "excludes",
        about = "Show or replace the projects excluded for a server"
    )]
    Excludes {
        url: String,
        projects: Vec<String>,
        /// Remove every exclusion for the server.
        #[clap(long, conflicts_with = "projects")]
        clear: bool,
    },
    #[clap(name = "preferences", about = "Show global preferences")]
    Preferences {
        #[clap(long)]
        json: bool,
    },
    #[clap(name = "set-interval", about = "Set the poll interval in seconds")]
    SetInterval { seconds: u64 },
    #[clap(name = "set-script", about = "Set the command run after each poll")]
    SetScript {
        command: String,
        /// Store the command but leave it switched off.
        #[clap(long)]
        disable: bool,
    },
    #[clap(name = "notify", about = "Turn a notification kind on or off")]
    Notify { kind: Notification, state: Toggle },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_server_with_repeated_excludes() {
        let args = CliArgs::try_parse_from([
            "buildnotify",
            "add-server",
            "ci.example.com",
            "--prefix",
            "[ci]",
            "--exclude",
            "docs",
            "--exclude",
            "nightly",
            "--skip-ssl-verification",
        ])
        .unwrap();

        match args.cmd {
            Commands::AddServer {
                url,
                prefix,
                excludes,
                skip_ssl_verification,
                username,
                ..
            } => {
                assert_eq!(url, "ci.example.com");
                assert_eq!(prefix, "[ci]");
                assert_eq!(excludes, vec!["docs", "nightly"]);
                assert!(skip_ssl_verification);
                assert_eq!(username, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_notify_kind_and_state() {
        let args =
            CliArgs::try_parse_from(["buildnotify", "notify", "successful-build", "on"]).unwrap();
        match args.cmd {
            Commands::Notify { kind, state } => {
                assert_eq!(kind, Notification::SuccessfulBuild);
                assert!(state.enabled());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_notification_kind() {
        assert!(CliArgs::try_parse_from(["buildnotify", "notify", "exploded", "on"]).is_err());
    }

    #[test]
    fn settings_flag_is_global() {
        let args = CliArgs::try_parse_from([
            "buildnotify",
            "servers",
            "--settings",
            "/tmp/bn.toml",
        ])
        .unwrap();
        assert_eq!(args.settings, Some(PathBuf::from("/tmp/bn.toml")));
    }

    #[test]
    fn clear_conflicts_with_projects() {
        assert!(
            CliArgs::try_parse_from(["buildnotify", "excludes", "http://ci", "docs", "--clear"])
                .is_err()
        );
    }
}
