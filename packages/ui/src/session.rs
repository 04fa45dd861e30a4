//! Session context and hooks for the UI.

use std::rc::Rc;
use std::sync::Arc;

use api::{Role, RoleStatus, Session};
use dioxus::prelude::*;

use crate::{use_app, AppContext};

/// Get the current session.
/// Returns a signal that updates when the user signs in or out.
pub fn use_session() -> Signal<Session> {
    use_context::<Signal<Session>>()
}

/// Provider component that owns the session lifecycle.
///
/// On mount it subscribes the [`SessionStore`](api::SessionStore) to the identity
/// provider and installs the request interceptors; on unmount it undoes both. The
/// store's state is mirrored into a `Signal<Session>` for [`use_session`].
#[component]
pub fn SessionProvider(context: AppContext, children: Element) -> Element {
    let app = use_context_provider(|| context.clone());

    let installed = use_hook(|| {
        app.session.start();
        Rc::new(
            app.client
                .install(&app.session, Arc::new(app.navigator.clone())),
        )
    });

    let mut session = use_signal(|| app.session.snapshot());
    use_context_provider(|| session);

    let watched = app.clone();
    use_future(move || {
        let app = watched.clone();
        async move {
            let mut updates = app.session.watch();
            loop {
                let snapshot = updates.borrow_and_update().clone();
                app.roles.observe_identity(snapshot.identifier());
                if *session.peek() != snapshot {
                    tracing::debug!(
                        signed_in = snapshot.is_authenticated(),
                        loading = snapshot.loading,
                        "Session changed"
                    );
                    session.set(snapshot);
                }
                if updates.changed().await.is_err() {
                    break;
                }
            }
        }
    });

    let teardown = app.clone();
    use_drop(move || {
        installed.eject();
        teardown.session.shutdown();
    });

    rsx! {
        {children}
    }
}

/// Role of the signed-in principal, resolved through the shared cache.
///
/// Reports `loading` until the lookup for the current identifier has settled, and
/// resolves again whenever the resolver drops cached roles.
pub fn use_role() -> RoleStatus {
    let app = use_app();
    let session = use_session();

    let mut revision = use_signal(|| app.roles.revision());
    let watched = app.roles.clone();
    use_future(move || {
        let mut changes = watched.changes();
        async move {
            while changes.changed().await.is_ok() {
                let latest = *changes.borrow_and_update();
                revision.set(latest);
            }
        }
    });

    let roles = app.roles.clone();
    let lookup = use_resource(move || {
        let roles = roles.clone();
        let identifier = session.read().identifier().map(str::to_string);
        let requested_at = revision();
        async move {
            let role = roles.resolve(identifier.as_deref()).await;
            (identifier, requested_at, role)
        }
    });

    let current = session.read();
    if current.loading {
        return RoleStatus::pending();
    }
    let identifier = current.identifier();
    let status = match &*lookup.read() {
        Some((resolved_for, requested_at, role))
            if resolved_for.as_deref() == identifier && *requested_at == revision() =>
        {
            RoleStatus::resolved(*role)
        }
        _ => app.roles.status(identifier),
    };
    status
}

/// `true` once the signed-in principal is known to hold `role`.
pub fn use_has_role(role: Role) -> bool {
    let status = use_role();
    !status.loading && status.role == role
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Logout".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let app = use_app();
    let nav = use_navigator();
    let mut notices = crate::use_notifications();

    let onclick = move |_| {
        let session = app.session.clone();
        async move {
            match session.logout().await {
                Ok(()) => {
                    nav.replace(api::LOGIN_PATH);
                }
                Err(e) => {
                    tracing::error!("Logout failed: {}", e);
                    crate::notify(&mut notices, crate::NoticeLevel::Error, &e.to_string());
                }
            }
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
