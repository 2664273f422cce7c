// ABOUTME: Application-wide preferences and the notification kinds a user can toggle.
// ABOUTME: A Preferences value is applied to a Config in bulk via update_preferences.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Build events that can raise a desktop notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notification {
    SuccessfulBuild,
    BrokenBuild,
    FixedBuild,
    StillFailingBuild,
    StillSuccessfulBuild,
    ConnectivityIssues,
}

impl Notification {
    pub const ALL: [Notification; 6] = [
        Notification::SuccessfulBuild,
        Notification::BrokenBuild,
        Notification::FixedBuild,
        Notification::StillFailingBuild,
        Notification::StillSuccessfulBuild,
        Notification::ConnectivityIssues,
    ];

    /// Settings key holding this toggle.
    pub fn key(self) -> &'static str {
        match self {
            Notification::SuccessfulBuild => "notifications/successfulbuild",
            Notification::BrokenBuild => "notifications/brokenbuild",
            Notification::FixedBuild => "notifications/fixedbuild",
            Notification::StillFailingBuild => "notifications/stillfailingbuild",
            Notification::StillSuccessfulBuild => "notifications/stillsuccessfulbuild",
            Notification::ConnectivityIssues => "notifications/connectivityissues",
        }
    }

    /// Whether the notification is on before the user touches it.
    pub fn default_enabled(self) -> bool {
        !matches!(
            self,
            Notification::SuccessfulBuild | Notification::StillSuccessfulBuild
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::SuccessfulBuild => write!(f, "successful-build"),
            Notification::BrokenBuild => write!(f, "broken-build"),
            Notification::FixedBuild => write!(f, "fixed-build"),
            Notification::StillFailingBuild => write!(f, "still-failing-build"),
            Notification::StillSuccessfulBuild => write!(f, "still-successful-build"),
            Notification::ConnectivityIssues => write!(f, "connectivity-issues"),
        }
    }
}

impl std::str::FromStr for Notification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Notification::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| format!("Unknown notification kind: {s}"))
    }
}

/// Global settings edited together in the preferences dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub urls: Vec<String>,
    pub interval_in_seconds: u64,
    pub custom_script: String,
    pub custom_script_enabled: bool,
    pub sort_by_last_build_time: bool,
    pub sort_by_name: bool,
    /// Notification toggles to apply; kinds not listed keep their stored value.
    #[serde(default)]
    pub selected_notifications: Vec<(Notification, bool)>,
}

impl Preferences {
    pub fn new(
        urls: Vec<String>,
        interval_in_seconds: u64,
        custom_script: &str,
        custom_script_enabled: bool,
        sort_by_last_build_time: bool,
        sort_by_name: bool,
        selected_notifications: Vec<(Notification, bool)>,
    ) -> Self {
        Self {
            urls,
            interval_in_seconds,
            custom_script: custom_script.to_string(),
            custom_script_enabled,
            sort_by_last_build_time,
            sort_by_name,
            selected_notifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_notifications_are_off_by_default() {
        let enabled: Vec<_> = Notification::ALL
            .into_iter()
            .filter(|kind| kind.default_enabled())
            .collect();
        assert_eq!(
            enabled,
            vec![
                Notification::BrokenBuild,
                Notification::FixedBuild,
                Notification::StillFailingBuild,
                Notification::ConnectivityIssues,
            ]
        );
    }

    #[test]
    fn notification_display_and_parse() {
        for kind in Notification::ALL {
            assert_eq!(kind.to_string().parse::<Notification>().unwrap(), kind);
        }
        assert!("exploded-build".parse::<Notification>().is_err());
    }

    #[test]
    fn notification_serializes_like_display() {
        let json = serde_json::to_string(&Notification::StillFailingBuild).unwrap();
        assert_eq!(json, "\"still-failing-build\"");
    }

    #[test]
    fn notification_keys_are_distinct() {
        let mut keys: Vec<_> = Notification::ALL.into_iter().map(Notification::key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), Notification::ALL.len());
    }
}
