//! Vendure Storefront Core - Shared types library.
//!
//! This crate provides the types passed between the storefront gateway, its
//! client session, and the browser:
//! - session tokens (opaque, redacted in logs)
//! - the JSON error envelope every route answers with
//! - the auth status snapshot served by `/api/auth/status`
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The
//! commerce entities themselves belong to the Vendure backend and are passed
//! through mostly untouched.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers and response shapes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
