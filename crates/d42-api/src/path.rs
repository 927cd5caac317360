// Request path normalization
//
// Device42 routes almost every resource with a trailing slash and redirects
// (or 404s) without one. A handful of routes reject the slash instead, so the
// rule is "append unless already present", minus a per-prefix exception table.

/// Resource path prefixes whose reads must not receive a trailing slash.
pub const DEFAULT_NO_TRAILING_SLASH: &[&str] = &["patch_panel_ports"];

/// Which API root a resource lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    /// `/api/1.0/{path}` -- almost everything.
    #[default]
    V1,
    /// `/api/{path}` -- device and IP writes.
    Unversioned,
}

impl ApiVersion {
    /// Path prefix below the host root, always with a trailing slash.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::V1 => "api/1.0/",
            Self::Unversioned => "api/",
        }
    }
}

/// Normalize a resource path: strip leading slashes, then append a trailing
/// slash unless the path already has one or starts with an exception prefix.
pub fn normalize(path: &str, no_trailing_slash: &[String]) -> String {
    let path = path.trim_start_matches('/');
    if path.ends_with('/')
        || no_trailing_slash
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    {
        path.to_owned()
    } else {
        format!("{path}/")
    }
}
