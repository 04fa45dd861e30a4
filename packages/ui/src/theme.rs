//! Light/dark theme, persisted in client storage.

use dioxus::prelude::*;
use store::{KeyValueStore, Theme};

use crate::use_app;

/// Current theme, provided by [`ThemeProvider`].
pub type ThemeSignal = Signal<Theme>;

pub fn load_theme_from_storage(prefs: &dyn KeyValueStore) -> Theme {
    store::load_theme(prefs)
}

/// Reflect `theme` on the document root so stylesheets can key off `data-theme`.
pub fn apply_theme(theme: Theme) {
    let _ = document::eval(&format!(
        "document.documentElement.setAttribute('data-theme', '{}');",
        theme.as_str()
    ));
}

/// Reads the stored theme at start-up and provides it as a [`ThemeSignal`].
#[component]
pub fn ThemeProvider(children: Element) -> Element {
    let app = use_app();
    let theme: ThemeSignal = use_signal(|| load_theme_from_storage(app.prefs.as_ref()));
    use_context_provider(|| theme);

    use_effect(move || apply_theme(theme()));

    rsx! {
        {children}
    }
}

#[component]
pub fn ThemeToggle() -> Element {
    let app = use_app();
    let mut theme = use_context::<ThemeSignal>();

    let label = match theme() {
        Theme::Light => "Dark mode",
        Theme::Dark => "Light mode",
    };

    rsx! {
        button {
            class: "btn btn-ghost theme-toggle",
            title: "{label}",
            onclick: move |_| {
                let next = store::toggle_theme(app.prefs.as_ref());
                theme.set(next);
            },
            "{label}"
        }
    }
}
