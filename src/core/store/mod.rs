//! The RBAC store
//!
//! A [`Store`] owns one backing-store handle and one cache behind a single
//! reader/writer lock:
//!
//! - lookups take the lock shared and never touch storage
//! - every mutation takes the lock exclusively for its storage write plus
//!   cache update, and updates the cache only after storage succeeded
//!
//! Share a store between threads with `Arc<Store<E>>`.

mod mutation;
mod query;
mod register;

pub use register::{Handler, RolePolicy, StaticHandler};

use super::cache::RbacCache;
use super::executor::Executor;
use super::loader;
use super::log::{DiagnosticLog, LogSink};
use crate::error::Result;
use parking_lot::RwLock;
use std::fmt;
use tracing::info;

/// Role/permission store with a write-through cache
pub struct Store<E: Executor> {
    exec: E,
    cache: RwLock<RbacCache>,
    log: DiagnosticLog,
}

impl<E: Executor> Store<E> {
    /// Ensure the schema exists and load every relation into the cache
    ///
    /// Fails with the first storage error; no store is returned in that case.
    pub fn new(exec: E) -> Result<Self> {
        loader::ensure_schema(&exec)?;
        let cache = loader::load_cache(&exec)?;

        info!(
            roles = cache.role_count(),
            permissions = cache.permission_count(),
            "RBAC store ready"
        );

        Ok(Store {
            exec,
            cache: RwLock::new(cache),
            log: DiagnosticLog::new(None),
        })
    }

    /// Install or remove the diagnostic sink
    pub fn set_log(&self, sink: Option<LogSink>) {
        self.log.set(sink);
    }

    /// The backing store handle
    pub fn executor(&self) -> &E {
        &self.exec
    }
}

impl<E: Executor> fmt::Debug for Store<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.cache.read();
        f.debug_struct("Store")
            .field("roles", &cache.role_count())
            .field("permissions", &cache.permission_count())
            .field("role_permissions", &cache.role_permission_count())
            .field("user_roles", &cache.user_role_count())
            .field("log", &self.log)
            .finish()
    }
}

#[cfg(test)]
mod tests;
