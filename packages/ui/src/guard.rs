//! Route guard components.

use std::cell::RefCell;
use std::rc::Rc;

use api::{login_path, GuardInputs, GuardState, GuardTrace, Requirement, Role, RoleStatus};
use dioxus::prelude::*;

use crate::{use_role, use_session};

/// Full-area spinner shown while identity or role is still being determined.
#[component]
pub fn Loader() -> Element {
    rsx! {
        div {
            class: "loader",
            role: "status",
            div { class: "loader-spinner" }
            span { class: "sr-only", "Loading..." }
        }
    }
}

/// Shown to signed-in users who lack the privilege a view requires.
#[component]
pub fn Forbidden() -> Element {
    rsx! {
        div {
            class: "forbidden",
            h1 { "403" }
            h2 { "Access denied" }
            p { "You do not have permission to view this page." }
            Link { to: "/dashboard", class: "btn btn-primary", "Back to dashboard" }
        }
    }
}

/// Sends the visitor to the login view, remembering `from`.
#[component]
pub fn LoginRedirect(from: String) -> Element {
    let nav = use_navigator();
    let target = login_path(Some(&from));

    use_effect(move || {
        nav.replace(target.clone());
    });

    rsx! {
        Loader {}
    }
}

/// Renders `children`, a loader, the forbidden view or a login redirect for `inputs`.
///
/// `from` is the path being guarded; it is carried through the login redirect so a
/// successful sign-in can return there.
#[component]
fn GuardView(
    requirement: Requirement,
    inputs: GuardInputs,
    from: String,
    children: Element,
) -> Element {
    let trace = use_hook(|| Rc::new(RefCell::new(GuardTrace::new())));

    let previous = trace.borrow().current();
    let state = trace.borrow_mut().observe(requirement, inputs);
    if previous != Some(state) {
        tracing::debug!(path = %from, ?requirement, %state, "Guard state");
    }

    match state {
        GuardState::Loading => rsx! { Loader {} },
        GuardState::Allowed => rsx! { {children} },
        GuardState::Denied => rsx! { Forbidden {} },
        GuardState::Redirect => rsx! { LoginRedirect { from: from } },
    }
}

/// Any signed-in principal. The role is never consulted.
#[component]
pub fn PrivateRoute(from: String, children: Element) -> Element {
    let session = use_session();
    let inputs = GuardInputs::new(&session.read(), RoleStatus::resolved(Role::User));

    rsx! {
        GuardView {
            requirement: Requirement::Authenticated,
            inputs: inputs,
            from: from,
            {children}
        }
    }
}

/// Signed-in principals whose resolved role is `role`.
#[component]
pub fn RoleRoute(role: Role, from: String, children: Element) -> Element {
    let session = use_session();
    let status = use_role();
    let inputs = GuardInputs::new(&session.read(), status);

    rsx! {
        GuardView {
            requirement: Requirement::Role(role),
            inputs: inputs,
            from: from,
            {children}
        }
    }
}

#[component]
pub fn AdminRoute(from: String, children: Element) -> Element {
    rsx! {
        RoleRoute { role: Role::Admin, from: from, {children} }
    }
}

#[component]
pub fn RiderRoute(from: String, children: Element) -> Element {
    rsx! {
        RoleRoute { role: Role::Rider, from: from, {children} }
    }
}
