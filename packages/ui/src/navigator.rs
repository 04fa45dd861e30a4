//! Bridges non-UI code (the request pipeline) to the Dioxus router.

use std::sync::Arc;

use api::Navigator;
use dioxus::prelude::*;
use tokio::sync::watch;

use crate::use_app;

/// [`Navigator`] that queues a target for [`NavigationBridge`] to act on.
#[derive(Clone)]
pub struct RouterNavigator {
    target: Arc<watch::Sender<Option<String>>>,
}

impl Default for RouterNavigator {
    fn default() -> Self {
        let (target, _) = watch::channel(None);
        Self {
            target: Arc::new(target),
        }
    }
}

impl RouterNavigator {
    /// Receiver that sees every navigation requested from now on.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.target.subscribe()
    }
}

impl Navigator for RouterNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(path, "Navigation requested");
        self.target.send_replace(Some(path.to_string()));
    }
}

impl PartialEq for RouterNavigator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.target, &other.target)
    }
}

/// Performs queued navigations. Must be rendered inside the router.
#[component]
pub fn NavigationBridge() -> Element {
    let app = use_app();
    let nav = use_navigator();

    use_future(move || {
        let mut requests = app.navigator.subscribe();
        async move {
            while requests.changed().await.is_ok() {
                let target = requests.borrow_and_update().clone();
                if let Some(path) = target {
                    nav.replace(path);
                }
            }
        }
    });

    rsx! {}
}
