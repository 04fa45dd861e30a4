//! Application-wide services, shared through Dioxus context.

use std::sync::Arc;

use api::{CarCatalog, ImageHost, RiderDesk, RoleResolver, SecureClient, SessionStore, UserDirectory};
use dioxus::prelude::*;
use store::KeyValueStore;

use crate::navigator::RouterNavigator;

/// Everything views need to talk to the identity provider and the backend.
///
/// Built once at start-up and handed to [`SessionProvider`](crate::SessionProvider).
#[derive(Clone)]
pub struct AppContext {
    pub session: SessionStore,
    pub roles: RoleResolver,
    pub client: SecureClient,
    pub users: UserDirectory,
    pub cars: CarCatalog,
    pub riders: RiderDesk,
    pub images: ImageHost,
    pub navigator: RouterNavigator,
    pub prefs: Arc<dyn KeyValueStore>,
}

impl AppContext {
    /// Wire the role resolver and the backend endpoint groups onto `client`.
    pub fn new(
        session: SessionStore,
        client: SecureClient,
        images: ImageHost,
        prefs: Arc<dyn KeyValueStore>,
    ) -> Self {
        let roles = RoleResolver::new(Arc::new(client.clone()));
        let users = UserDirectory::new(client.clone(), roles.clone());
        let cars = CarCatalog::new(client.clone());
        let riders = RiderDesk::new(client.clone(), roles.clone());
        Self {
            session,
            roles,
            client,
            users,
            cars,
            riders,
            images,
            navigator: RouterNavigator::default(),
            prefs,
        }
    }
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        self.session == other.session
            && self.roles == other.roles
            && self.client == other.client
            && Arc::ptr_eq(&self.prefs, &other.prefs)
    }
}

/// The services installed by the nearest [`SessionProvider`](crate::SessionProvider).
pub fn use_app() -> AppContext {
    use_context::<AppContext>()
}

/// Platform-appropriate persistent key-value store.
///
/// - **Web** (WASM + `web` feature): the browser's `localStorage`
/// - **Native**: files under `<data_dir>/carrental/`
pub fn make_prefs() -> Arc<dyn KeyValueStore> {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        Arc::new(store::LocalStorage::new())
    }
    #[cfg(all(target_arch = "wasm32", not(feature = "web")))]
    {
        Arc::new(store::MemoryStore::new())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let base = dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("carrental");
        Arc::new(store::FileStore::new(base))
    }
}
