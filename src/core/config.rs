//! Store configuration and builder
//!
//! Configuration is plain TOML:
//!
//! ```toml
//! [storage]
//! path = "/var/lib/app/rbac.db"   # omit for an in-memory database
//! foreign_keys = true
//! busy_timeout_ms = 5000
//!
//! [[roles]]
//! id = "role-admin"
//! code = "a"
//! name = "Admin"
//! description = "Full access"
//! ```

use super::executor::Executor;
use super::log::LogSink;
use super::sqlite::SqliteExecutor;
use super::store::Store;
use super::types::RoleCode;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

fn default_foreign_keys() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// SQLite storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file; `None` opens a private in-memory database
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Enforce foreign keys so deletes cascade in storage
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,

    /// How long SQLite waits on a locked database
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: None,
            foreign_keys: true,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// A role created at startup if its code is not taken yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSeed {
    pub id: String,
    pub code: RoleCode,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Complete store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub roles: Vec<RoleSeed>,
}

impl StoreConfig {
    /// Parse from a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Builder for constructing a [`Store`]
///
/// # Examples
///
/// ```
/// use rbac_store::{RoleCode, StoreBuilder};
///
/// let store = StoreBuilder::new()
///     .seed_role("role-admin", RoleCode::new(b'a'), "Admin", "Full access")
///     .open()?;
///
/// assert!(store.get_role_by_code(RoleCode::new(b'a')).is_some());
/// # Ok::<(), rbac_store::RbacError>(())
/// ```
pub struct StoreBuilder {
    config: StoreConfig,
    log_sink: Option<LogSink>,
}

impl StoreBuilder {
    /// Create a builder with an in-memory storage config and no seeds
    pub fn new() -> Self {
        StoreBuilder {
            config: StoreConfig::default(),
            log_sink: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a database file for [`open`](Self::open)
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.storage.path = Some(path.into());
        self
    }

    /// Add a role to create after the cache is loaded
    pub fn seed_role<S: Into<String>>(
        mut self,
        id: S,
        code: RoleCode,
        name: S,
        description: S,
    ) -> Self {
        self.config.roles.push(RoleSeed {
            id: id.into(),
            code,
            name: name.into(),
            description: description.into(),
        });
        self
    }

    /// Install a diagnostic sink
    pub fn log_sink(mut self, sink: LogSink) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Build against a caller-supplied backing store
    pub fn build<E: Executor>(self, exec: E) -> Result<Store<E>> {
        let store = Store::new(exec)?;
        store.set_log(self.log_sink);

        for seed in &self.config.roles {
            store.create_role(&seed.id, seed.code, &seed.name, &seed.description)?;
        }
        if !self.config.roles.is_empty() {
            info!(seeds = self.config.roles.len(), "Applied role seeds");
        }

        Ok(store)
    }

    /// Open the configured SQLite database and build on top of it
    pub fn open(self) -> Result<Store<SqliteExecutor>> {
        let exec = SqliteExecutor::from_config(&self.config.storage)?;
        self.build(exec)
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
