//! Typed accessors for the few values the client persists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::KeyValueStore;

/// Key holding the colour scheme.
pub const THEME_KEY: &str = "theme";
/// Key holding the identity provider's refresh token.
pub const REFRESH_TOKEN_KEY: &str = "session.refresh";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme {other:?}")),
        }
    }
}

/// Stored theme, or the default when nothing (valid) is stored.
pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring stored theme");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read theme");
            Theme::default()
        }
    }
}

pub fn save_theme(store: &dyn KeyValueStore, theme: Theme) {
    if let Err(e) = store.set(THEME_KEY, theme.as_str()) {
        tracing::warn!(error = %e, "Could not persist theme");
    }
}

/// Flip the stored theme and return the new value.
pub fn toggle_theme(store: &dyn KeyValueStore) -> Theme {
    let theme = load_theme(store).toggled();
    save_theme(store, theme);
    theme
}

pub fn load_refresh_token(store: &dyn KeyValueStore) -> Option<String> {
    match store.get(REFRESH_TOKEN_KEY) {
        Ok(token) => token.filter(|t| !t.trim().is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read refresh token");
            None
        }
    }
}

/// Persist the refresh token, or forget it when signed out.
pub fn save_refresh_token(store: &dyn KeyValueStore, token: Option<&str>) {
    let result = match token {
        Some(token) => store.set(REFRESH_TOKEN_KEY, token),
        None => store.remove(REFRESH_TOKEN_KEY),
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "Could not persist refresh token");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_theme_defaults_and_toggles() {
        let store = MemoryStore::new();
        assert_eq!(load_theme(&store), Theme::Light);

        assert_eq!(toggle_theme(&store), Theme::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(load_theme(&store), Theme::Dark);

        assert_eq!(toggle_theme(&store), Theme::Light);
    }

    #[test]
    fn test_garbage_theme_falls_back() {
        let store = MemoryStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn test_refresh_token_lifecycle() {
        let store = MemoryStore::new();
        assert_eq!(load_refresh_token(&store), None);
        save_refresh_token(&store, Some("r-1"));
        assert_eq!(load_refresh_token(&store).as_deref(), Some("r-1"));
        save_refresh_token(&store, None);
        assert_eq!(load_refresh_token(&store), None);
    }
}
