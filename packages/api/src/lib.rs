//! # API crate — session and authorization core for the car-rental client
//!
//! Everything the frontends need to know about *who* is using the app and *what* they
//! may do lives here, free of any UI framework so it can be tested on its own.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Identity-provider seam, its REST implementation and the [`SessionStore`] |
//! | [`client`] | [`SecureClient`]: bearer-token injection and global 401 handling for backend calls |
//! | [`role`] | [`RoleResolver`]: cached, deduplicated role lookup per principal identifier |
//! | [`guard`] | Pure render decisions for protected views |
//! | [`navigation`] | Login redirect paths and the [`Navigator`] seam |
//! | [`users`] | Backend account endpoints used by the profile and admin views |
//! | [`cars`] | [`CarCatalog`]: listings, moderation and rental checkout |
//! | [`riders`] | [`RiderDesk`]: rider applications and their review |
//! | [`image_host`] | Profile-photo uploads |
//! | [`settings`] | Runtime configuration |
//! | [`models`] | Principals, roles, session snapshots and account records |
//! | [`subscription`] | Drop-to-cancel handles shared by listeners and interceptors |
//!
//! ## Data flow
//!
//! identity provider → [`SessionStore`] → [`RoleResolver`] → guards and [`SecureClient`] → backend.

pub mod auth;
pub mod cars;
pub mod client;
pub mod guard;
pub mod image_host;
pub mod models;
pub mod navigation;
pub mod riders;
pub mod role;
pub mod settings;
pub mod subscription;
pub mod users;

pub use auth::{
    IdentityEndpoints, IdentityError, IdentityProvider, RestIdentityProvider, SessionStore,
};
pub use cars::{Car, CarCatalog, NewCar};
pub use client::{ApiError, ReqwestTransport, SecureClient};
pub use guard::{GuardInputs, GuardState, GuardTrace, Requirement};
pub use image_host::ImageHost;
pub use models::{Principal, ProfileUpdate, ReviewStatus, Role, Session, UserRecord};
pub use navigation::{login_path, return_path, Navigator, LOGIN_PATH};
pub use riders::{RiderApplication, RiderDesk};
pub use role::{RoleResolver, RoleStatus};
pub use settings::Settings;
pub use subscription::Subscription;
pub use users::UserDirectory;
