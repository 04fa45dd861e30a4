//! Login-view navigation helpers shared by the request pipeline and the route guards.

/// Path of the login view.
pub const LOGIN_PATH: &str = "/login";

/// Something that can move the client to another view.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Login path that remembers where the user was trying to go.
///
/// `login_path(Some("/dashboard/manage-users"))` yields
/// `/login?from=%2Fdashboard%2Fmanage-users`.
pub fn login_path(from: Option<&str>) -> String {
    match from.filter(|from| is_local_path(from)) {
        Some(from) if from != LOGIN_PATH => {
            format!("{LOGIN_PATH}?from={}", urlencoding::encode(from))
        }
        _ => LOGIN_PATH.to_string(),
    }
}

/// Where to go after a successful login.
///
/// Accepts the raw or percent-encoded `from` value and only honours same-site
/// paths; anything else falls back to `/`.
pub fn return_path(from: Option<&str>) -> String {
    let Some(from) = from.map(str::trim).filter(|from| !from.is_empty()) else {
        return "/".to_string();
    };
    let decoded = urlencoding::decode(from)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| from.to_string());
    if is_local_path(&decoded) && !decoded.starts_with(LOGIN_PATH) {
        decoded
    } else {
        "/".to_string()
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains("://")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_path_preserves_destination() {
        assert_eq!(login_path(None), "/login");
        assert_eq!(
            login_path(Some("/dashboard/manage-users")),
            "/login?from=%2Fdashboard%2Fmanage-users"
        );
        assert_eq!(login_path(Some("/login")), "/login");
        assert_eq!(login_path(Some("https://evil.example")), "/login");
    }

    #[test]
    fn test_return_path() {
        assert_eq!(return_path(None), "/");
        assert_eq!(return_path(Some("")), "/");
        assert_eq!(return_path(Some("%2Fdashboard%2Fpayments")), "/dashboard/payments");
        assert_eq!(return_path(Some("/profile")), "/profile");
        assert_eq!(return_path(Some("//evil.example")), "/");
        assert_eq!(return_path(Some("https%3A%2F%2Fevil.example")), "/");
        assert_eq!(return_path(Some("/login")), "/");
    }
}
