//! Public pages: landing, car listing and the catch-all.

use api::{Car, ReviewStatus};
use dioxus::prelude::*;
use ui::{Icon, Loader};

use crate::Route;

#[component]
pub fn Home() -> Element {
    let session = ui::use_session();

    rsx! {
        section {
            class: "hero",
            div {
                class: "hero-body",
                Icon { icon: ui::icons::FaCarSide, width: 48, height: 48 }
                h1 { "Rent a car, or share yours" }
                p { "Browse cars approved by our admins, book a ride, or apply to manage cars as a rider." }
                div {
                    class: "hero-actions",
                    Link { to: Route::Cars {}, class: "btn btn-primary", "Browse cars" }
                    if session().is_authenticated() {
                        Link { to: Route::DashboardHome {}, class: "btn", "Go to dashboard" }
                    } else {
                        Link { to: Route::Register {}, class: "btn", "Create an account" }
                    }
                }
            }
        }
        section {
            class: "how-it-works",
            h2 { "How it works" }
            ol {
                li { "Sign up with your email." }
                li { "Pick an approved car and pay the rental fee." }
                li { "Become a rider to list and manage cars of your own." }
            }
        }
    }
}

/// One approved car as shown on the listing.
#[derive(Debug, Clone, PartialEq)]
struct CarCard {
    id: String,
    name: String,
    kind: String,
    fee: String,
    location: String,
    rider: String,
    image: String,
    booked: bool,
    badge: &'static str,
    badge_class: &'static str,
}

impl CarCard {
    fn from_car(car: &Car) -> Self {
        let (badge, badge_class) = if car.is_booked {
            ("Booked", "badge badge-warning")
        } else {
            ("Available", "badge badge-success")
        };
        let filled = |value: &str, fallback: &str| {
            if value.trim().is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            id: car.id.clone(),
            name: car.name.clone(),
            kind: filled(&car.car_type, "General"),
            fee: car.fee_label(),
            location: filled(&car.location, "Location not specified"),
            rider: car.owner().to_string(),
            image: car
                .banner_image
                .clone()
                .unwrap_or_else(|| "/placeholder.jpg".to_string()),
            booked: car.is_booked,
            badge,
            badge_class,
        }
    }
}

/// Approved cars matching `search`.
fn approved_cars(cars: &[Car], search: &str) -> Vec<CarCard> {
    cars.iter()
        .filter(|car| car.status == ReviewStatus::Approved && car.matches(search))
        .map(CarCard::from_car)
        .collect()
}

#[component]
pub fn Cars() -> Element {
    let app = ui::use_app();
    let mut search = use_signal(String::new);

    let cars = use_resource(move || {
        let catalog = app.cars.clone();
        async move { catalog.list(None).await }
    });

    let content = match &*cars.read() {
        None => rsx! { Loader {} },
        Some(Err(e)) => rsx! {
            div { class: "alert alert-error", "Could not load cars: {e}" }
        },
        Some(Ok(listed)) => {
            let cards = approved_cars(listed, &search());
            if cards.is_empty() {
                rsx! { p { class: "muted", "No cars match your search." } }
            } else {
                rsx! {
                    div {
                        class: "car-grid",
                        for car in cards {
                            Link {
                                key: "{car.id}",
                                to: Route::CarDetails {
                                    id: car.id.clone(),
                                    payment: String::new(),
                                },
                                class: "car-card",
                                img { src: "{car.image}", alt: "{car.name}" }
                                span { class: "{car.badge_class}", "{car.badge}" }
                                h3 { "{car.name}" }
                                p { class: "car-fee", "Fee: {car.fee}" }
                                p { "{car.kind}" }
                                p { class: "muted", "{car.location}" }
                                p { class: "muted", "Rider: {car.rider}" }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        section {
            class: "cars",
            h1 { "Available cars" }
            input {
                class: "input",
                r#type: "search",
                placeholder: "Search by name, type or location...",
                value: search(),
                oninput: move |evt: FormEvent| search.set(evt.value()),
            }
            {content}
        }
    }
}

#[component]
pub fn NotFound(segments: Vec<String>) -> Element {
    let path = format!("/{}", segments.join("/"));

    rsx! {
        section {
            class: "not-found",
            h1 { "404" }
            p { "Nothing lives at {path}." }
            Link { to: Route::Home {}, class: "btn btn-primary", "Back home" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_approved_cars_filters_status_and_search() {
        let cars: Vec<Car> = serde_json::from_value(json!([
            {"_id": "1", "carName": "Toyota Axio", "status": "approved", "isBooked": true},
            {"_id": "2", "carName": "Honda Civic", "status": "pending"},
            {"_id": "3", "carName": "Toyota Premio", "status": "approved", "rentalFee": "2500"},
        ]))
        .unwrap();

        let all = approved_cars(&cars, "");
        assert_eq!(all.len(), 2);
        assert!(all[0].booked);
        assert_eq!(all[0].badge, "Booked");
        assert_eq!(all[0].fee, "N/A");
        assert_eq!(all[1].kind, "General");
        assert_eq!(all[1].image, "/placeholder.jpg");
        assert_eq!(all[1].fee, "2500 / day");

        let premio = approved_cars(&cars, "  PREMIO ");
        assert_eq!(premio.len(), 1);
        assert_eq!(premio[0].id, "3");
    }
}
