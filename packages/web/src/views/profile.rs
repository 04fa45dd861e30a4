//! The signed-in user's own profile.

use api::ProfileUpdate;
use dioxus::prelude::*;
use ui::{notify, use_app, use_notifications, use_role, use_session, NoticeLevel, DEFAULT_AVATAR};

use super::register::first_file;

#[component]
pub fn Profile() -> Element {
    let app = use_app();
    let session = use_session();
    let role = use_role();
    let mut notices = use_notifications();

    let mut name = use_signal(|| {
        session
            .peek()
            .principal
            .as_ref()
            .and_then(|p| p.display_name.clone())
            .unwrap_or_default()
    });
    let mut photo = use_signal(|| Option::<(String, Vec<u8>)>::None);
    let mut saving = use_signal(|| false);

    let Some(principal) = session().principal else {
        return rsx! {};
    };

    let avatar = principal
        .photo_url
        .clone()
        .unwrap_or_else(|| DEFAULT_AVATAR.to_string());
    let display = principal.display_name().to_string();
    let email = principal.email.clone().unwrap_or_default();
    let role_label = if role.loading {
        "...".to_string()
    } else {
        role.role.to_string()
    };

    let handle_save = move |evt: FormEvent| {
        evt.prevent_default();
        let app = app.clone();
        spawn(async move {
            saving.set(true);

            let mut update = ProfileUpdate {
                display_name: Some(name().trim().to_string()).filter(|n| !n.is_empty()),
                photo_url: None,
            };
            if let Some((file, bytes)) = photo() {
                match app.images.upload(&bytes).await {
                    Ok(url) => update.photo_url = Some(url),
                    Err(err) => {
                        tracing::warn!(%file, "Photo upload failed: {}", err);
                        notify(&mut notices, NoticeLevel::Error, &err.to_string());
                        saving.set(false);
                        return;
                    }
                }
            }

            match app.session.update_user_profile(update.clone()).await {
                Ok(_) => {
                    if let Err(err) = app.users.sync_profile(&update).await {
                        tracing::warn!("Could not sync profile to the backend: {}", err);
                    }
                    photo.set(None);
                    notify(&mut notices, NoticeLevel::Success, "Profile updated");
                }
                Err(err) => notify(&mut notices, NoticeLevel::Error, &err.to_string()),
            }
            saving.set(false);
        });
    };

    let choose_photo = move |evt: FormEvent| async move {
        photo.set(first_file(&evt).await);
    };

    rsx! {
        section {
            class: "profile",
            div {
                class: "profile-card",
                img { class: "avatar avatar-lg", src: "{avatar}", alt: "Profile photo" }
                h1 { "{display}" }
                p { class: "muted", "{email}" }
                span { class: "badge", "{role_label}" }
            }

            form {
                class: "profile-form",
                onsubmit: handle_save,
                label {
                    class: "label",
                    "Display name"
                    input {
                        class: "input",
                        r#type: "text",
                        value: name(),
                        oninput: move |evt: FormEvent| name.set(evt.value()),
                    }
                }
                label {
                    class: "label",
                    "New photo"
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
                    disabled: saving(),
                    if saving() { "Saving..." } else { "Save changes" }
                }
            }
        }
    }
}
