//! Application services and external integrations.

pub mod auth;
pub mod blob;
pub mod email;

pub use auth::{AuthError, AuthService, IssuedToken};
pub use blob::FsBlobStore;
pub use email::ConsoleNotificationService;
