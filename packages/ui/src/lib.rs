//! This crate contains all shared UI for the workspace.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod context;
pub use context::{make_prefs, use_app, AppContext};

mod navigator;
pub use navigator::{NavigationBridge, RouterNavigator};

mod session;
pub use session::{use_has_role, use_role, use_session, LogoutButton, SessionProvider};

mod guard;
pub use guard::{AdminRoute, Forbidden, Loader, LoginRedirect, PrivateRoute, RiderRoute, RoleRoute};

mod theme;
pub use theme::{apply_theme, load_theme_from_storage, ThemeProvider, ThemeSignal, ThemeToggle};

mod notifications;
pub use notifications::{
    notify, use_notifications, Notice, NoticeLevel, NotificationProvider, Notifications,
};

mod navbar;
pub use navbar::{Navbar, UserDropdown, DEFAULT_AVATAR};
