//! Admin review queues: rider applications, cars awaiting approval and the full car list.

use api::{Car, ReviewStatus, RiderApplication};
use dioxus::prelude::*;
use ui::{notify, use_app, use_notifications, Icon, Loader, NoticeLevel};

fn decision_message(subject: &str, status: ReviewStatus) -> String {
    match status {
        ReviewStatus::Approved => format!("{subject} approved"),
        ReviewStatus::Rejected => format!("{subject} rejected"),
        ReviewStatus::Pending => format!("{subject} left pending"),
    }
}

fn status_badge(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Approved => "badge badge-success",
        ReviewStatus::Pending => "badge badge-warning",
        ReviewStatus::Rejected => "badge badge-danger",
    }
}

/// Pending applications matching `search`, with display fields precomputed.
fn application_rows(
    applications: &[RiderApplication],
    search: &str,
) -> Vec<(usize, RiderApplication, String)> {
    applications
        .iter()
        .filter(|application| application.matches(search))
        .enumerate()
        .map(|(index, application)| {
            let area = format!("{}, {}", application.district, application.division);
            (index + 1, application.clone(), area)
        })
        .collect()
}

#[component]
pub fn PendingRiderRequests() -> Element {
    let app = use_app();
    let mut notices = use_notifications();
    let mut search = use_signal(String::new);

    let desk = app.riders.clone();
    let mut applications = use_resource(move || {
        let desk = desk.clone();
        async move { desk.pending().await }
    });

    let decide = move |(application, status): (RiderApplication, ReviewStatus)| {
        let desk = app.riders.clone();
        spawn(async move {
            match desk.review(&application, status).await {
                Ok(_) => {
                    let message = decision_message(&application.name, status);
                    notify(&mut notices, NoticeLevel::Success, &message);
                    applications.restart();
                }
                Err(err) => {
                    tracing::warn!(email = %application.email, "Review failed: {}", err);
                    notify(&mut notices, NoticeLevel::Error, "Failed to update rider status");
                }
            }
        });
    };

    let content = match &*applications.read() {
        None => rsx! { Loader {} },
        Some(Err(e)) => rsx! {
            div { class: "alert alert-error", "Could not load applications: {e}" }
        },
        Some(Ok(pending)) => {
            let rows = application_rows(pending, &search());
            if rows.is_empty() {
                rsx! { p { class: "muted", "No pending rider applications" } }
            } else {
                rsx! {
                    table {
                        thead {
                            tr {
                                th { "#" }
                                th { "Name" }
                                th { "Email" }
                                th { "Contact" }
                                th { "Location" }
                                th { "Applied" }
                                th { "" }
                            }
                        }
                        tbody {
                            for (number, application, area) in rows {
                                tr {
                                    key: "{application.email}",
                                    td { "{number}" }
                                    td { "{application.name}" }
                                    td { "{application.email}" }
                                    td { "{application.contact}" }
                                    td { "{area}" }
                                    td { {application.applied_on()} }
                                    td {
                                        class: "row-actions",
                                        button {
                                            class: "btn btn-sm",
                                            title: "Approve",
                                            onclick: {
                                                let application = application.clone();
                                                let decide = decide.clone();
                                                move |_| decide((application.clone(), ReviewStatus::Approved))
                                            },
                                            Icon { icon: ui::icons::FaCheck, width: 12, height: 12 }
                                        }
                                        button {
                                            class: "btn btn-danger btn-sm",
                                            title: "Reject",
                                            onclick: {
                                                let application = application.clone();
                                                let decide = decide.clone();
                                                move |_| decide((application.clone(), ReviewStatus::Rejected))
                                            },
                                            Icon { icon: ui::icons::FaXmark, width: 12, height: 12 }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        section {
            class: "rider-requests",
            h1 { "Pending rider applications" }
            input {
                class: "input",
                r#type: "search",
                placeholder: "Search by name or email",
                value: search(),
                oninput: move |evt: FormEvent| search.set(evt.value()),
            }
            {content}
        }
    }
}

#[component]
pub fn WaitingForApproval() -> Element {
    let app = use_app();
    let mut notices = use_notifications();

    let catalog = app.cars.clone();
    let mut cars = use_resource(move || {
        let catalog = catalog.clone();
        async move { catalog.list(Some(ReviewStatus::Pending)).await }
    });

    let decide = move |(car, status): (Car, ReviewStatus)| {
        let catalog = app.cars.clone();
        spawn(async move {
            match catalog.set_status(&car.id, status).await {
                Ok(_) => {
                    let message = decision_message(&car.name, status);
                    notify(&mut notices, NoticeLevel::Success, &message);
                    cars.restart();
                }
                Err(err) => {
                    tracing::warn!(car = %car.id, "Car review failed: {}", err);
                    notify(&mut notices, NoticeLevel::Error, "Failed to update car status");
                }
            }
        });
    };

    let content = match &*cars.read() {
        None => rsx! { Loader {} },
        Some(Err(e)) => rsx! {
            div { class: "alert alert-error", "Could not load cars: {e}" }
        },
        Some(Ok(pending)) if pending.is_empty() => rsx! {
            p { class: "muted", "No cars are waiting for approval" }
        },
        Some(Ok(pending)) => {
            let rows: Vec<(Car, String, String)> = pending
                .iter()
                .map(|car| (car.clone(), car.fee_label(), car.owner().to_string()))
                .collect();
            rsx! {
                table {
                    thead {
                        tr {
                            th { "Car" }
                            th { "Type" }
                            th { "Location" }
                            th { "Fee" }
                            th { "Rider" }
                            th { "" }
                        }
                    }
                    tbody {
                        for (car, fee, owner) in rows {
                            tr {
                                key: "{car.id}",
                                td { "{car.name}" }
                                td { "{car.car_type}" }
                                td { "{car.location}" }
                                td { "{fee}" }
                                td { "{owner}" }
                                td {
                                    class: "row-actions",
                                    button {
                                        class: "btn btn-sm",
                                        title: "Approve",
                                        onclick: {
                                            let car = car.clone();
                                            let decide = decide.clone();
                                            move |_| decide((car.clone(), ReviewStatus::Approved))
                                        },
                                        Icon { icon: ui::icons::FaCheck, width: 12, height: 12 }
                                    }
                                    button {
                                        class: "btn btn-danger btn-sm",
                                        title: "Reject",
                                        onclick: {
                                            let car = car.clone();
                                            let decide = decide.clone();
                                            move |_| decide((car.clone(), ReviewStatus::Rejected))
                                        },
                                        Icon { icon: ui::icons::FaXmark, width: 12, height: 12 }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        section {
            class: "car-approvals",
            h1 { "Cars waiting for approval" }
            {content}
        }
    }
}

#[component]
pub fn ManageCars() -> Element {
    let app = use_app();
    let mut notices = use_notifications();

    let catalog = app.cars.clone();
    let mut cars = use_resource(move || {
        let catalog = catalog.clone();
        async move { catalog.list(None).await }
    });

    let remove_car = move |car: Car| {
        let catalog = app.cars.clone();
        spawn(async move {
            match catalog.remove(&car.id).await {
                Ok(()) => {
                    let message = format!("Deleted {}", car.name);
                    notify(&mut notices, NoticeLevel::Success, &message);
                    cars.restart();
                }
                Err(err) => notify(&mut notices, NoticeLevel::Error, &err.to_string()),
            }
        });
    };

    let content = match &*cars.read() {
        None => rsx! { Loader {} },
        Some(Err(e)) => rsx! {
            div { class: "alert alert-error", "Could not load cars: {e}" }
        },
        Some(Ok(listed)) if listed.is_empty() => rsx! {
            p { class: "muted", "No cars listed yet." }
        },
        Some(Ok(listed)) => {
            let rows: Vec<(Car, &'static str, String)> = listed
                .iter()
                .map(|car| (car.clone(), status_badge(car.status), car.fee_label()))
                .collect();
            rsx! {
                table {
                    thead {
                        tr {
                            th { "Car" }
                            th { "Rider" }
                            th { "Fee" }
                            th { "Status" }
                            th { "" }
                        }
                    }
                    tbody {
                        for (car, badge, fee) in rows {
                            tr {
                                key: "{car.id}",
                                td { "{car.name}" }
                                td { {car.owner().to_string()} }
                                td { "{fee}" }
                                td {
                                    span { class: "{badge}", "{car.status}" }
                                }
                                td {
                                    button {
                                        class: "btn btn-danger btn-sm",
                                        title: "Delete",
                                        onclick: {
                                            let car = car.clone();
                                            let remove_car = remove_car.clone();
                                            move |_| remove_car(car.clone())
                                        },
                                        Icon { icon: ui::icons::FaTrash, width: 12, height: 12 }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        section {
            class: "manage-cars",
            h1 { "Manage cars" }
            {content}
        }
    }
}
