//! Route layouts: the public shell, the guarded areas and the dashboard frame.

use api::Role;
use dioxus::prelude::*;
use ui::{
    use_role, use_session, AdminRoute, Icon, NavigationBridge, Navbar, PrivateRoute, RiderRoute,
};

use crate::Route;

/// Navbar, page body and footer shared by every view.
#[component]
pub fn AppLayout() -> Element {
    let session = use_session();

    rsx! {
        NavigationBridge {}
        Navbar {
            Link { to: Route::Home {}, active_class: "active", "Home" }
            Link { to: Route::Cars {}, active_class: "active", "Cars" }
            Link { to: Route::BeARider {}, active_class: "active", "Be a Rider" }
            if session().is_authenticated() {
                Link { to: Route::DashboardHome {}, active_class: "active", "Dashboard" }
            }
        }
        main {
            class: "page",
            Outlet::<Route> {}
        }
        footer {
            class: "footer",
            "CarRental: shared cars, shared rides."
        }
    }
}

/// Views for any signed-in user.
#[component]
pub fn PrivateLayout() -> Element {
    let route = use_route::<Route>();

    rsx! {
        PrivateRoute {
            from: route.to_string(),
            Outlet::<Route> {}
        }
    }
}

#[component]
pub fn AdminLayout() -> Element {
    let route = use_route::<Route>();

    rsx! {
        AdminRoute {
            from: route.to_string(),
            Outlet::<Route> {}
        }
    }
}

#[component]
pub fn RiderLayout() -> Element {
    let route = use_route::<Route>();

    rsx! {
        RiderRoute {
            from: route.to_string(),
            Outlet::<Route> {}
        }
    }
}

/// Dashboard frame with a sidebar whose entries follow the user's role.
#[component]
pub fn DashboardLayout() -> Element {
    let role = use_role();

    rsx! {
        div {
            class: "dashboard",
            aside {
                class: "dashboard-sidebar",
                Link { to: Route::DashboardHome {}, class: "sidebar-link",
                    Icon { icon: ui::icons::FaGauge, width: 14, height: 14 }
                    span { "Overview" }
                }
                Link { to: Route::PaymentHistory {}, class: "sidebar-link",
                    Icon { icon: ui::icons::FaReceipt, width: 14, height: 14 }
                    span { "My payments" }
                }
                if !role.loading && role.role == Role::Admin {
                    Link { to: Route::ManageUsers {}, class: "sidebar-link",
                        Icon { icon: ui::icons::FaUsers, width: 14, height: 14 }
                        span { "Manage users" }
                    }
                    Link { to: Route::ManageCars {}, class: "sidebar-link",
                        Icon { icon: ui::icons::FaCarSide, width: 14, height: 14 }
                        span { "Manage cars" }
                    }
                    Link { to: Route::WaitingForApproval {}, class: "sidebar-link",
                        Icon { icon: ui::icons::FaHourglass, width: 14, height: 14 }
                        span { "Waiting for approval" }
                    }
                    Link { to: Route::PendingRiderRequests {}, class: "sidebar-link",
                        Icon { icon: ui::icons::FaUserCheck, width: 14, height: 14 }
                        span { "Rider requests" }
                    }
                    Link { to: Route::AllPayments {}, class: "sidebar-link",
                        Icon { icon: ui::icons::FaMoneyBill, width: 14, height: 14 }
                        span { "All payments" }
                    }
                }
                if !role.loading && role.role == Role::Rider {
                    Link { to: Route::MyManagedCars {}, class: "sidebar-link",
                        Icon { icon: ui::icons::FaCar, width: 14, height: 14 }
                        span { "My managed cars" }
                    }
                    Link { to: Route::AddACar {}, class: "sidebar-link",
                        Icon { icon: ui::icons::FaPlus, width: 14, height: 14 }
                        span { "Add a car" }
                    }
                    Link { to: Route::RiderPayments {}, class: "sidebar-link",
                        Icon { icon: ui::icons::FaWallet, width: 14, height: 14 }
                        span { "Rider payments" }
                    }
                }
            }
            section {
                class: "dashboard-content",
                Outlet::<Route> {}
            }
        }
    }
}
