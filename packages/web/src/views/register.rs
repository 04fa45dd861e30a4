//! Account creation with an optional profile photo.

use api::ProfileUpdate;
use dioxus::prelude::*;
use ui::{notify, use_app, use_notifications, use_session, NoticeLevel};

use crate::Route;

/// Reject passwords without a lower-case letter, an upper-case letter, a digit and
/// one of `@$!%*?&`.
fn password_problem(password: &str) -> Option<&'static str> {
    if password.chars().count() < 6 {
        return Some("Password must be at least 6 characters");
    }
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let special = password.chars().any(|c| "@$!%*?&".contains(c));
    if lower && upper && digit && special {
        None
    } else {
        Some("Password must have uppercase, lowercase, number & special character")
    }
}

/// Read the first file picked in a file input.
pub(crate) async fn first_file(evt: &FormEvent) -> Option<(String, Vec<u8>)> {
    let files = evt.files()?;
    let name = files.files().into_iter().next()?;
    let bytes = files.read_file(&name).await?;
    Some((name, bytes))
}

#[component]
pub fn Register() -> Element {
    let app = use_app();
    let session = use_session();
    let nav = use_navigator();
    let mut notices = use_notifications();

    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut photo = use_signal(|| Option::<(String, Vec<u8>)>::None);
    let mut error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(|| false);

    use_effect(move || {
        let current = session.read();
        if !current.loading && current.is_authenticated() && !submitting() {
            nav.replace(Route::Home {});
        }
    });

    let handle_register = move |evt: FormEvent| {
        evt.prevent_default();
        let app = app.clone();
        spawn(async move {
            error.set(None);

            let n = name().trim().to_string();
            let e = email().trim().to_string();
            let p = password();
            if n.is_empty() {
                error.set(Some("Name is required".to_string()));
                return;
            }
            if let Some(problem) = password_problem(&p) {
                error.set(Some(problem.to_string()));
                return;
            }

            submitting.set(true);
            let principal = match app.session.register_user(&e, &p).await {
                Ok(principal) => principal,
                Err(err) => {
                    submitting.set(false);
                    error.set(Some(err.to_string()));
                    return;
                }
            };

            let mut photo_url = None;
            if let Some((file, bytes)) = photo() {
                match app.images.upload(&bytes).await {
                    Ok(url) => photo_url = Some(url),
                    Err(err) => {
                        tracing::warn!(%file, "Photo upload failed: {}", err);
                        notify(&mut notices, NoticeLevel::Error, "Photo upload failed");
                    }
                }
            }

            let update = ProfileUpdate {
                display_name: Some(n),
                photo_url,
            };
            let principal = match app.session.update_user_profile(update).await {
                Ok(updated) => updated,
                Err(err) => {
                    tracing::warn!("Profile update after registration failed: {}", err);
                    principal
                }
            };
            if let Err(err) = app.users.record_sign_in(&principal).await {
                tracing::warn!("Could not save the new account: {}", err);
            }

            notify(&mut notices, NoticeLevel::Success, "Your account has been created");
            submitting.set(false);
            nav.replace(Route::Home {});
        });
    };

    let choose_photo = move |evt: FormEvent| async move {
        photo.set(first_file(&evt).await);
    };

    rsx! {
        section {
            class: "auth-page",
            h1 { "Create an account" }
            p { class: "muted", "Register to rent or share cars." }

            form {
                class: "auth-form",
                onsubmit: handle_register,

                if let Some(err) = error() {
                    div { class: "alert alert-error", "{err}" }
                }

                input {
                    class: "input",
                    r#type: "text",
                    placeholder: "Name",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
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
                label {
                    class: "label",
                    "Profile photo"
                    input {
                        class: "file-input",
                        r#type: "file",
                        accept: "image/*",
                        onchange: choose_photo,
                    }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Creating account..." } else { "Register" }
                }
            }

            p {
                class: "muted",
                "Already have an account? "
                Link { to: Route::Login { from: String::new() }, class: "link", "Sign in" }
            }
        }
    }
}
