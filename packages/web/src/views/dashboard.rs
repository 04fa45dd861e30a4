//! Dashboard pages. The overview adapts to the signed-in user's role.

use api::{ApiError, Role, SecureClient};
use dioxus::prelude::*;
use serde_json::Value;
use ui::{use_app, use_role, use_session, Loader};

use super::records::{cell, RecordTable};

/// Summary counter; missing or null values count as zero.
fn stat(summary: &Value, key: &str) -> String {
    match cell(summary, key).as_str() {
        "-" => "0".to_string(),
        value => value.to_string(),
    }
}

async fn fetch_summary(client: &SecureClient, path: &str) -> Result<Value, ApiError> {
    let summary: Option<Value> = client.get_json(path).await?;
    Ok(summary.unwrap_or(Value::Null))
}

fn columns(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(label, key)| (label.to_string(), key.to_string()))
        .collect()
}

/// Cards for the `(label, key)` counters of the summary at `path`.
#[component]
fn StatsPanel(title: String, path: String, stats: Vec<(String, String)>) -> Element {
    let app = use_app();
    let summary = use_resource(move || {
        let client = app.client.clone();
        let path = path.clone();
        async move { fetch_summary(&client, &path).await }
    });

    let content = match &*summary.read() {
        None => rsx! { Loader {} },
        Some(Err(e)) => rsx! {
            div { class: "alert alert-error", "Could not load {title}: {e}" }
        },
        Some(Ok(summary)) => {
            let cards: Vec<(String, String)> = stats
                .iter()
                .map(|(label, key)| (label.clone(), stat(summary, key)))
                .collect();
            rsx! {
                div {
                    class: "stats",
                    for (label, value) in cards {
                        div {
                            class: "stat",
                            div { class: "stat-title", "{label}" }
                            div { class: "stat-value", "{value}" }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        div {
            class: "stats-panel",
            h3 { "{title}" }
            {content}
        }
    }
}

#[component]
pub fn DashboardHome() -> Element {
    let session = use_session();
    let role = use_role();

    if role.loading {
        return rsx! { Loader {} };
    }

    let greeting = session()
        .principal
        .map(|p| p.display_name().to_string())
        .unwrap_or_default();

    let panels = match role.role {
        Role::Admin => rsx! {
            StatsPanel {
                title: "Platform",
                path: "/admin/dashboard-stats",
                stats: columns(&[
                    ("Total users", "totalUsers"),
                    ("Total cars", "totalCars"),
                    ("Pending cars", "pendingCars"),
                    ("Approved cars", "approvedCars"),
                    ("Rejected cars", "rejectedCars"),
                    ("Payments", "totalPayments"),
                    ("Revenue", "totalRevenue"),
                ]),
            }
        },
        Role::Rider => rsx! {
            StatsPanel {
                title: "Cars",
                path: "/rider/car-summary",
                stats: columns(&[
                    ("Total cars", "totalCars"),
                    ("Active cars", "activeCars"),
                    ("Pending cars", "pendingCars"),
                ]),
            }
            StatsPanel {
                title: "Rentals",
                path: "/rider/rental-stats",
                stats: columns(&[
                    ("Total rentals", "totalRentals"),
                    ("Active rentals", "activeRentals"),
                    ("Cancelled", "cancelledRentals"),
                ]),
            }
            StatsPanel {
                title: "Earnings",
                path: "/rider/earnings-summary",
                stats: columns(&[
                    ("Today", "todayEarnings"),
                    ("This month", "monthlyEarnings"),
                ]),
            }
        },
        Role::User => rsx! {
            StatsPanel {
                title: "Your activity",
                path: "/user/dashboard-stats",
                stats: columns(&[
                    ("Active rentals", "activeRentals"),
                    ("Total rentals", "totalRentals"),
                    ("Payments", "totalPayments"),
                    ("Total spent", "totalSpent"),
                ]),
            }
        },
    };

    rsx! {
        h1 { "Welcome, {greeting}" }
        p { class: "muted", "Signed in as {role.role}." }
        {panels}
    }
}

#[component]
pub fn PaymentHistory() -> Element {
    rsx! {
        RecordTable {
            title: "Payment history",
            path: "/payments/history",
            columns: columns(&[
                ("Transaction", "transactionId"),
                ("Car", "carName"),
                ("Email", "userEmail"),
                ("Amount", "amount"),
                ("Paid at", "paidAt"),
            ]),
            empty: "You have not made any payments yet.",
        }
    }
}

#[component]
pub fn AllPayments() -> Element {
    rsx! {
        RecordTable {
            title: "All payments",
            path: "/admin/payments",
            columns: columns(&[
                ("Email", "userEmail"),
                ("Amount", "amount"),
                ("Transaction", "transactionId"),
                ("Type", "paymentType"),
                ("Paid at", "paidAt"),
                ("Status", "status"),
            ]),
        }
    }
}

#[component]
pub fn MyManagedCars() -> Element {
    rsx! {
        RecordTable {
            title: "My managed cars",
            path: "/my-cars",
            columns: columns(&[
                ("Car", "carName"),
                ("Status", "status"),
                ("Type", "carType"),
                ("Fee", "rentalFee"),
                ("Location", "location"),
            ]),
            empty: "You are not managing any cars yet.",
        }
    }
}

#[component]
pub fn RiderPayments() -> Element {
    rsx! {
        RecordTable {
            title: "Rider payments",
            path: "/rider/payments",
            columns: columns(&[
                ("Type", "paymentType"),
                ("Email", "userEmail"),
                ("Amount", "amount"),
                ("Transaction", "transactionId"),
                ("Paid at", "paidAt"),
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stat_defaults_to_zero() {
        let summary = json!({"totalUsers": 12, "totalRevenue": null});
        assert_eq!(stat(&summary, "totalUsers"), "12");
        assert_eq!(stat(&summary, "totalRevenue"), "0");
        assert_eq!(stat(&summary, "pendingCars"), "0");
        assert_eq!(stat(&Value::Null, "totalCars"), "0");
    }
}
