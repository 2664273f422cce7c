// ABOUTME: Formats the application version string.
// ABOUTME: CI builds get a ".devN" suffix taken from the CircleCI build number.

/// Environment variable carrying the CI build number.
pub const BUILD_NUMBER_VAR: &str = "CIRCLE_BUILD_NUM";

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `MAJOR.MINOR.PATCH`, or `MAJOR.MINOR.PATCH.devN` when built in CI.
pub fn version() -> String {
    version_from(|name| std::env::var(name).ok())
}

/// Same as [`version`], reading variables through `lookup`.
pub fn version_from(lookup: impl FnOnce(&str) -> Option<String>) -> String {
    let build = lookup(BUILD_NUMBER_VAR);
    version_with_build(build.as_deref())
}

pub fn version_with_build(build: Option<&str>) -> String {
    match build.map(str::trim) {
        Some(number) if !number.is_empty() => format!("{VERSION}.dev{number}"),
        _ => VERSION.to_string(),
    }
}
