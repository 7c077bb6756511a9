//! # rbac-store - Role-Based Access Control Store
//!
//! `rbac-store` decides whether a user may perform an action on a resource,
//! using a static graph of users → roles → permissions. It provides:
//!
//! - **Durable state** in any relational store reachable through [`Executor`]
//!   (SQLite via [`SqliteExecutor`] out of the box)
//! - **Write-through cache**: every lookup is answered from memory, and the
//!   cache is updated only after the storage write succeeded
//! - **Idempotent mutations**: creates deduplicate on their business key,
//!   assigns and revokes are set operations, deletes cascade
//! - **Auto-provisioning** of permissions from request handlers' declared
//!   per-action role policies
//!
//! ## Quick Start
//!
//! ```rust
//! use rbac_store::{Action, Result, RoleCode, StaticHandler, StoreBuilder};
//!
//! # fn main() -> Result<()> {
//! let store = StoreBuilder::new().open()?; // in-memory SQLite
//!
//! let admin = store.create_role("role-admin", RoleCode::new(b'a'), "Admin", "")?;
//! let editor = store.create_role("role-editor", RoleCode::new(b'e'), "Editor", "")?;
//!
//! // Derive permissions from a handler's access policy
//! let invoice = StaticHandler::new("invoice")
//!     .allow(Action::READ, [admin.code, editor.code])
//!     .allow(Action::UPDATE, [admin.code]);
//! store.register(&invoice)?;
//!
//! store.assign_role("u1", &editor.id)?;
//! assert!(store.has_permission("u1", "invoice", Action::READ)?);
//! assert!(!store.has_permission("u1", "invoice", Action::UPDATE)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! A [`Store`] is `Send + Sync`; share one instance behind an `Arc`. Lookups
//! run concurrently, mutations are serialized.

pub mod core;
pub mod error;

pub use crate::core::{
    cache::Snapshot,
    config::{RoleSeed, StorageConfig, StoreBuilder, StoreConfig},
    executor::{Executor, Row, RowIter, Value},
    log::LogSink,
    sqlite::SqliteExecutor,
    store::{Handler, RolePolicy, StaticHandler, Store},
    types::{Action, Permission, Role, RoleCode},
};
pub use crate::error::{RbacError, Result, StorageError};
