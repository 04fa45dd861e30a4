//! Data models shared by the session core and the UI.

mod principal;
mod review;
mod role;
mod session;
mod user;

pub use principal::{FederatedCredential, Principal, ProfileUpdate, TokenSource};
pub use review::ReviewStatus;
pub use role::{Role, RoleResponse, UnknownRole};
pub use session::Session;
pub use user::{UserRecord, UserUpsert};
