//! Rider form for listing a new car. Listings start out pending admin approval.

use api::NewCar;
use dioxus::prelude::*;
use ui::{notify, use_app, use_notifications, use_session, NoticeLevel};

use super::register::first_file;

const CAR_TYPES: &[&str] = &["Sedan", "SUV", "Hatchback", "Microbus", "Pickup"];

/// Parse the fee field; blanks and non-numbers read as zero.
fn parse_fee(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

#[component]
pub fn AddACar() -> Element {
    let app = use_app();
    let session = use_session();
    let mut notices = use_notifications();

    let mut name = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut car_type = use_signal(String::new);
    let mut location = use_signal(String::new);
    let mut fee = use_signal(String::new);
    let mut banner = use_signal(|| Option::<(String, Vec<u8>)>::None);
    let mut error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(|| false);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let app = app.clone();
        spawn(async move {
            error.set(None);
            let Some(owner) = session.peek().principal.clone() else {
                return;
            };
            let Some((file, bytes)) = banner() else {
                error.set(Some("Banner image is required".to_string()));
                return;
            };

            let mut car = NewCar {
                car_name: name().trim().to_string(),
                description: description().trim().to_string(),
                car_type: car_type(),
                location: location().trim().to_string(),
                rental_fee: parse_fee(&fee()),
                banner_image: file.clone(),
            };
            if let Some(field) = car.missing_field() {
                error.set(Some(format!("{field} is required")));
                return;
            }

            submitting.set(true);
            car.banner_image = match app.images.upload(&bytes).await {
                Ok(url) => url,
                Err(err) => {
                    tracing::warn!(%file, "Banner upload failed: {}", err);
                    submitting.set(false);
                    error.set(Some("Banner upload failed".to_string()));
                    return;
                }
            };

            let result = app.cars.add(&car, &owner).await;
            submitting.set(false);
            match result {
                Ok(result) if result.inserted.is_some() => {
                    notify(
                        &mut notices,
                        NoticeLevel::Success,
                        "Car submitted. It is awaiting admin approval.",
                    );
                    name.set(String::new());
                    description.set(String::new());
                    car_type.set(String::new());
                    location.set(String::new());
                    fee.set(String::new());
                    banner.set(None);
                }
                Ok(_) => notify(
                    &mut notices,
                    NoticeLevel::Error,
                    "Submission failed. Please try again.",
                ),
                Err(err) => {
                    tracing::warn!("Car submission failed: {}", err);
                    error.set(Some(err.to_string()));
                }
            }
        });
    };

    rsx! {
        section {
            class: "add-car",
            h1 { "Add a new car" }

            form {
                class: "car-form",
                onsubmit: handle_submit,

                if let Some(err) = error() {
                    div { class: "alert alert-error", "{err}" }
                }

                input {
                    class: "input",
                    placeholder: "Car name",
                    value: name(),
                    oninput: move |evt: FormEvent| name.set(evt.value()),
                }
                textarea {
                    class: "input",
                    placeholder: "Write a short description",
                    value: description(),
                    oninput: move |evt: FormEvent| description.set(evt.value()),
                }
                select {
                    class: "input",
                    value: car_type(),
                    onchange: move |evt: FormEvent| car_type.set(evt.value()),
                    option { value: "", "Select car type" }
                    for kind in CAR_TYPES.iter() {
                        option { value: "{kind}", "{kind}" }
                    }
                }
                input {
                    class: "input",
                    placeholder: "Pickup location",
                    value: location(),
                    oninput: move |evt: FormEvent| location.set(evt.value()),
                }
                input {
                    class: "input",
                    r#type: "number",
                    min: "1",
                    placeholder: "Rental fee per day",
                    value: fee(),
                    oninput: move |evt: FormEvent| fee.set(evt.value()),
                }
                label {
                    class: "file-label",
                    "Banner image"
                    input {
                        r#type: "file",
                        accept: "image/*",
                        onchange: move |evt: FormEvent| async move {
                            banner.set(first_file(&evt).await);
                        },
                    }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Submitting..." } else { "Submit car" }
                }
            }
        }
    }
}
