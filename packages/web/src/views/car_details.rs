//! Single car page: details, checkout and the return from the payment page.

use api::Car;
use dioxus::prelude::*;
use ui::{notify, use_app, use_notifications, use_session, Icon, Loader, NoticeLevel};

use crate::Route;

/// Query value the payment page appends when checkout succeeded.
const PAYMENT_SUCCESS: &str = "success";

/// Label and state of the booking button.
fn book_button(car: &Car, busy: bool) -> (&'static str, bool) {
    if car.is_booked {
        ("Already booked", true)
    } else if busy {
        ("Processing...", true)
    } else {
        ("Rent now", false)
    }
}

/// Script that leaves the app for the hosted checkout page.
fn redirect_script(url: &str) -> String {
    let target = serde_json::Value::String(url.to_string());
    format!("window.location.assign({target});")
}

#[component]
pub fn CarDetails(id: String, payment: String) -> Element {
    let app = use_app();
    let session = use_session();
    let nav = use_navigator();
    let mut notices = use_notifications();
    let mut busy = use_signal(|| false);
    let mut confirmed = use_signal(|| false);

    let catalog = app.cars.clone();
    let mut car = use_resource(use_reactive!(|(id,)| {
        let catalog = catalog.clone();
        async move { catalog.get(&id).await }
    }));

    // Back from checkout: record the payment and the rental once, then drop the query.
    let finishing = app.cars.clone();
    use_effect(use_reactive!(|(payment,)| {
        if payment != PAYMENT_SUCCESS || *confirmed.peek() {
            return;
        }
        let Some(Ok(Some(booked))) = car.cloned() else {
            return;
        };
        if !session.read().is_authenticated() {
            return;
        }
        confirmed.set(true);
        let catalog = finishing.clone();
        spawn(async move {
            busy.set(true);
            match catalog.finish_rental(&booked).await {
                Ok(()) => {
                    notify(&mut notices, NoticeLevel::Success, "Your car is booked.");
                    nav.replace(Route::CarDetails {
                        id: booked.id.clone(),
                        payment: String::new(),
                    });
                    car.restart();
                }
                Err(err) => {
                    tracing::error!(car = %booked.id, "Booking failed: {}", err);
                    notify(&mut notices, NoticeLevel::Error, "Booking failed.");
                }
            }
            busy.set(false);
        });
    }));

    let checkout = app.cars.clone();
    let handle_book = move |_| {
        let Some(Ok(Some(target))) = car.cloned() else {
            return;
        };
        if !session.peek().is_authenticated() {
            let here = Route::CarDetails {
                id: target.id.clone(),
                payment: String::new(),
            };
            nav.push(api::login_path(Some(&here.to_string())));
            return;
        }
        let catalog = checkout.clone();
        spawn(async move {
            busy.set(true);
            match catalog.start_rental(&target).await {
                Ok(Some(url)) => {
                    // Stay busy: the page is about to unload.
                    let _ = document::eval(&redirect_script(&url));
                    return;
                }
                Ok(None) => notify(&mut notices, NoticeLevel::Error, "Checkout is unavailable."),
                Err(err) => {
                    tracing::warn!(car = %target.id, "Checkout failed: {}", err);
                    notify(&mut notices, NoticeLevel::Error, &err.to_string());
                }
            }
            busy.set(false);
        });
    };

    let content = match &*car.read() {
        None => rsx! { Loader {} },
        Some(Err(e)) => rsx! {
            div { class: "alert alert-error", "Could not load the car: {e}" }
        },
        Some(Ok(None)) => rsx! {
            p { class: "muted", "Car not found" }
        },
        Some(Ok(Some(details))) => {
            let (label, disabled) = book_button(details, busy());
            let (badge, badge_class) = if details.is_booked {
                ("Booked", "badge badge-warning")
            } else {
                ("Available", "badge badge-success")
            };
            let image = details
                .banner_image
                .clone()
                .unwrap_or_else(|| "/placeholder.jpg".to_string());
            let fee = details.fee_label();
            let owner = details.owner().to_string();
            rsx! {
                article {
                    class: "car-details",
                    img { src: "{image}", alt: "{details.name}" }
                    div {
                        class: "car-details-body",
                        div {
                            class: "car-details-title",
                            h1 { "{details.name}" }
                            span { class: "{badge_class}", "{badge}" }
                        }
                        p { "{details.description}" }
                        ul {
                            class: "car-facts",
                            li {
                                Icon { icon: ui::icons::FaCarSide, width: 14, height: 14 }
                                span { "{details.car_type}" }
                            }
                            li {
                                Icon { icon: ui::icons::FaLocationDot, width: 14, height: 14 }
                                span { "{details.location}" }
                            }
                            li {
                                Icon { icon: ui::icons::FaMoneyBill, width: 14, height: 14 }
                                span { "{fee}" }
                            }
                            li {
                                Icon { icon: ui::icons::FaUser, width: 14, height: 14 }
                                span { "{owner}" }
                            }
                        }
                        button {
                            class: "btn btn-primary",
                            disabled: disabled,
                            onclick: handle_book,
                            "{label}"
                        }
                    }
                }
            }
        }
    };

    rsx! {
        section {
            class: "car-page",
            {content}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(booked: bool) -> Car {
        serde_json::from_value(serde_json::json!({ "_id": "c1", "isBooked": booked })).unwrap()
    }

    #[test]
    fn test_book_button_states() {
        assert_eq!(book_button(&car(false), false), ("Rent now", false));
        assert_eq!(book_button(&car(false), true), ("Processing...", true));
        assert_eq!(book_button(&car(true), false), ("Already booked", true));
    }

    #[test]
    fn test_redirect_script_quotes_url() {
        assert_eq!(
            redirect_script("https://pay.test/s?id=1&x=\"y\""),
            r#"window.location.assign("https://pay.test/s?id=1&x=\"y\"");"#
        );
    }
}
