//! HTTP route handlers.

pub mod attachments;
pub mod auth;
pub mod checklists;
pub mod directory;
pub mod health;
pub mod incidents;
pub mod reports;
pub mod workflows;
