//! Password reset request.

use dioxus::prelude::*;
use ui::{notify, use_app, use_notifications, NoticeLevel};

use crate::Route;

#[component]
pub fn ForgotPassword() -> Element {
    let app = use_app();
    let nav = use_navigator();
    let mut notices = use_notifications();

    let mut email = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut sending = use_signal(|| false);

    let handle_reset = move |evt: FormEvent| {
        evt.prevent_default();
        let app = app.clone();
        spawn(async move {
            error.set(None);
            let e = email().trim().to_string();
            if e.is_empty() {
                error.set(Some("Please enter your email address".to_string()));
                return;
            }

            sending.set(true);
            let result = app.session.reset_password(&e).await;
            sending.set(false);
            match result {
                Ok(()) => {
                    notify(
                        &mut notices,
                        NoticeLevel::Success,
                        "A password reset link has been sent to your email address.",
                    );
                    nav.replace(Route::Login { from: String::new() });
                }
                Err(err) => error.set(Some(err.to_string())),
            }
        });
    };

    rsx! {
        section {
            class: "auth-page",
            h1 { "Reset your password" }
            p { class: "muted", "We will email you a link to choose a new one." }

            form {
                class: "auth-form",
                onsubmit: handle_reset,

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
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: sending(),
                    if sending() { "Sending..." } else { "Send reset link" }
                }
            }

            Link { to: Route::Login { from: String::new() }, class: "link", "Back to sign in" }
        }
    }
}
