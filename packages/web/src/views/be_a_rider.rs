//! Rider application form.

use api::RiderApplication;
use dioxus::prelude::*;
use ui::{notify, use_app, use_notifications, use_session, NoticeLevel};

const DIVISIONS: &[&str] = &[
    "Dhaka",
    "Chattogram",
    "Rajshahi",
    "Khulna",
    "Barishal",
    "Sylhet",
    "Rangpur",
    "Mymensingh",
];

#[component]
pub fn BeARider() -> Element {
    let app = use_app();
    let session = use_session();
    let mut notices = use_notifications();

    let (initial_name, initial_email) = {
        let current = session.peek();
        let principal = current.principal.as_ref();
        (
            principal.and_then(|p| p.display_name.clone()).unwrap_or_default(),
            principal.and_then(|p| p.email.clone()).unwrap_or_default(),
        )
    };
    let mut name = use_signal(|| initial_name);
    let mut email = use_signal(|| initial_email);
    let mut contact = use_signal(String::new);
    let mut division = use_signal(String::new);
    let mut district = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(|| false);

    let handle_apply = move |evt: FormEvent| {
        evt.prevent_default();
        let app = app.clone();
        spawn(async move {
            error.set(None);
            let application = RiderApplication::pending(
                name(),
                email(),
                contact(),
                division(),
                district(),
                description(),
            );
            if let Some(field) = application.missing_field() {
                error.set(Some(format!("{field} is required")));
                return;
            }

            submitting.set(true);
            let result = app.riders.apply(&application).await;
            submitting.set(false);
            match result {
                Ok(written) if written.inserted.is_some() => {
                    notify(
                        &mut notices,
                        NoticeLevel::Success,
                        "Your rider application has been sent for admin review.",
                    );
                    contact.set(String::new());
                    division.set(String::new());
                    district.set(String::new());
                    description.set(String::new());
                }
                Ok(_) => notify(
                    &mut notices,
                    NoticeLevel::Info,
                    "You have already applied. An admin will review your application.",
                ),
                Err(err) => {
                    tracing::warn!("Rider application failed: {}", err);
                    error.set(Some(err.to_string()));
                }
            }
        });
    };

    rsx! {
        section {
            class: "rider-apply",
            h1 { "Be a rider" }
            p {
                class: "muted",
                "Submit your application to become a verified rider. Our admin team will review it."
            }

            form {
                class: "rider-form",
                onsubmit: handle_apply,

                if let Some(err) = error() {
                    div { class: "alert alert-error", "{err}" }
                }

                input {
                    class: "input",
                    placeholder: "Full name",
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
                    r#type: "tel",
                    placeholder: "Contact number",
                    value: contact(),
                    oninput: move |evt: FormEvent| contact.set(evt.value()),
                }
                select {
                    class: "input",
                    value: division(),
                    onchange: move |evt: FormEvent| division.set(evt.value()),
                    option { value: "", "Select division" }
                    for d in DIVISIONS.iter() {
                        option { value: "{d}", "{d}" }
                    }
                }
                input {
                    class: "input",
                    placeholder: "District",
                    value: district(),
                    oninput: move |evt: FormEvent| district.set(evt.value()),
                }
                textarea {
                    class: "input",
                    placeholder: "Tell us about your driving experience",
                    value: description(),
                    oninput: move |evt: FormEvent| description.set(evt.value()),
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Submitting..." } else { "Apply" }
                }
            }
        }
    }
}
