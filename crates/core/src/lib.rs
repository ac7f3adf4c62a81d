//! ShopSphere Core - Shared types library.
//!
//! This crate provides common types used across all ShopSphere components:
//! - `client` - Session recovery, transport and state for the REST backend
//! - `cli` - Command-line storefront built on the client
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, statuses
//!   and recent searches

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
