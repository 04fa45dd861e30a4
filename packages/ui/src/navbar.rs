use dioxus::prelude::*;
use dioxus_free_icons::icons::fa_solid_icons::FaCarSide;
use dioxus_free_icons::Icon;

use crate::{use_session, LogoutButton, ThemeToggle};

pub const DEFAULT_AVATAR: &str = "https://i.ibb.co.com/TM9j0Rqd/icon-7797704-640.png";

/// Top bar: brand, the `children` links, theme toggle and the account menu.
#[component]
pub fn Navbar(children: Element) -> Element {
    let session = use_session();

    rsx! {
        nav {
            class: "navbar",
            Link {
                to: "/",
                class: "navbar-brand",
                Icon { icon: FaCarSide, width: 22, height: 22 }
                span { "CarRental" }
            }
            div {
                class: "navbar-links",
                {children}
            }
            div {
                class: "navbar-end",
                ThemeToggle {}
                if session().loading {
                    span { class: "loader-spinner loader-small" }
                } else if session().is_authenticated() {
                    UserDropdown {}
                } else {
                    Link { to: "/login", class: "btn btn-outline", "Login" }
                    Link { to: "/register", class: "btn btn-outline", "Register" }
                }
            }
        }
    }
}

/// Avatar button with profile, dashboard and logout entries.
#[component]
pub fn UserDropdown() -> Element {
    let session = use_session();
    let mut open = use_signal(|| false);

    let Some(principal) = session().principal else {
        return rsx! {};
    };
    let avatar = principal
        .photo_url
        .clone()
        .unwrap_or_else(|| DEFAULT_AVATAR.to_string());
    let name = principal.display_name().to_string();

    rsx! {
        div {
            class: "dropdown",
            button {
                class: "btn btn-ghost avatar",
                title: "{name}",
                onclick: move |_| open.toggle(),
                img {
                    src: "{avatar}",
                    alt: "profile",
                    referrerpolicy: "no-referrer",
                }
            }
            if open() {
                ul {
                    class: "dropdown-menu",
                    onclick: move |_| open.set(false),
                    li { class: "dropdown-header", "{name}" }
                    li { Link { to: "/profile", "Profile" } }
                    li { Link { to: "/dashboard", "Dashboard" } }
                    li { LogoutButton { class: "btn-link" } }
                }
            }
        }
    }
}
