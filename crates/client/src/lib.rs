//! ShopSphere client library.
//!
//! Client-side state for the ShopSphere storefront REST backend. All business
//! logic stays on the server; this crate keeps a session alive, talks to the
//! backend and mirrors server-owned lists.
//!
//! # Architecture
//!
//! - [`session`] restores authentication from a persisted token and never
//!   evicts it on an ambiguous failure
//! - [`transport`] attaches the bearer token and recovers the session once
//!   on a 401 before replaying the request
//! - [`sync`] re-fetches orders, cart and wishlist with bounded backoff until
//!   the backend has caught up
//! - [`state`] holds all client state behind a single-writer [`Store`]
//! - [`ShopSphere`] ties them together for front ends
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shopsphere_client::{ClientConfig, FileStore, ShopSphere};
//!
//! let config = ClientConfig::from_env()?;
//! let client = ShopSphere::new(config, Arc::new(FileStore::new("credentials.json")))?;
//! client.bootstrap().await?;
//! client.add_to_cart(product_id, 1).await?;
//! let orders = client.sync_orders().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
pub mod sync;
pub mod transport;

pub use client::{Registration, ShopSphere};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Result};
pub use session::{InvalidTokenPolicy, RestoreError, RestoredSession, SessionRecovery};
pub use state::{Action, AppState, Notice, Route, Store};
pub use storage::{CredentialStore, FileStore, MemoryStore, PersistedState, StorageError};
pub use sync::{ListSynchronizer, SyncHandle, SyncOutcome, SyncPolicy};
pub use transport::{ApiRequest, Transport};
