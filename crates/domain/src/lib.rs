//! Domain layer for the patrol operations backend.
//!
//! This crate contains:
//! - Domain models (workflows, checklists, attachments, directory records)
//! - The workflow and checklist state machines
//! - Lifecycle, directory and reporting services
//! - The entity store contract and its in-memory implementation
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::{DomainError, DomainResult};
