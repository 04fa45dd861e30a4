//! Email and password sign-in.

use api::return_path;
use dioxus::prelude::*;
use ui::{notify, use_app, use_notifications, use_session, NoticeLevel};

use crate::Route;

/// Login page. `from` is the view the visitor was sent here from.
#[component]
pub fn Login(from: String) -> Element {
    let app = use_app();
    let session = use_session();
    let nav = use_navigator();
    let mut notices = use_notifications();

    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(|| false);

    let target = return_path(Some(&from));

    // Already signed in: go straight to where the visitor was heading.
    let redirect = target.clone();
    use_effect(move || {
        let current = session.read();
        if !current.loading && current.is_authenticated() {
            nav.replace(redirect.clone());
        }
    });

    let handle_login = move |evt: FormEvent| {
        evt.prevent_default();
        let app = app.clone();
        let target = target.clone();
        spawn(async move {
            error.set(None);

            let e = email().trim().to_string();
            let p = password();
            if e.is_empty() || p.is_empty() {
                error.set(Some("Email and password are required".to_string()));
                return;
            }

            submitting.set(true);
            match app.session.sign_in_user(&e, &p).await {
                Ok(principal) => {
                    if let Err(err) = app.users.record_sign_in(&principal).await {
                        tracing::warn!("Could not record sign-in: {}", err);
                    }
                    notify(&mut notices, NoticeLevel::Success, "Signed in");
                    nav.replace(target);
                }
                Err(err) => {
                    submitting.set(false);
                    error.set(Some(err.to_string()));
                }
            }
        });
    };

    rsx! {
        section {
            class: "auth-page",
            h1 { "Welcome back" }
            p { class: "muted", "Sign in to manage your rentals." }

            form {
                class: "auth-form",
                onsubmit: handle_login,

                if let Some(err) = error() {
                    div { class: "alert alert-error", "{err}" }
                }

                input {
                    class: "input",
                    r#type: "email",
                    placeholder: "Email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                input {
                    class: "input",
                    r#type: "password",
                    placeholder: "Password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                Link { to: Route::ForgotPassword {}, class: "link small", "Forgot password?" }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Signing in..." } else { "Sign in" }
                }
            }

            p {
                class: "muted",
                "New here? "
                Link { to: Route::Register {}, class: "link", "Create an account" }
            }
        }
    }
}
