//! Shared utilities for the patrol operations backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Digest helpers and one-time code generation
//! - Bearer token issuing and verification
//! - Password hashing with Argon2id
//! - Field-level validation and timestamp parsing

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
