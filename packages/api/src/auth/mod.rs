//! Authentication: the identity-provider seam, its implementations, and the session store.

mod error;
#[cfg(test)]
mod memory;
mod provider;
mod rest;
mod session;

pub use error::IdentityError;
#[cfg(test)]
pub(crate) use memory::MemoryIdentityProvider;
pub use provider::{AuthStateListener, IdentityProvider};
pub use rest::{IdentityEndpoints, RestIdentityProvider, REFRESH_MARGIN_SECS};
pub use session::SessionStore;
