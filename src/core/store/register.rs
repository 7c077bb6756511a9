//! Auto-provisioning from handler access policies
//!
//! A request handler may declare, per CRUD action, which role codes may
//! perform it. [`Store::register`] turns that declaration into permission
//! records keyed by (handler name, action) and links them to the existing
//! roles with those codes. Roles are never created here.

use super::Store;
use crate::core::executor::Executor;
use crate::core::types::{Action, RoleCode};
use crate::core::validation::generate_id;
use crate::error::Result;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Role codes allowed per action
pub trait RolePolicy {
    /// Codes allowed to perform `action`; empty when the action does not apply
    fn allowed_roles(&self, action: Action) -> &[RoleCode];
}

/// A handler descriptor with optional capabilities
///
/// Both capabilities default to absent. A handler lacking either one is
/// skipped by [`Store::register`] without error.
pub trait Handler {
    /// Stable name used as the permission resource
    fn handler_name(&self) -> Option<&str> {
        None
    }

    /// Declared per-action role policy
    fn role_policy(&self) -> Option<&dyn RolePolicy> {
        None
    }
}

/// Handler descriptor built from a name and a fixed policy table
///
/// # Examples
///
/// ```
/// use rbac_store::{Action, RoleCode, StaticHandler};
///
/// let invoice = StaticHandler::new("invoice")
///     .allow(Action::READ, [RoleCode::new(b'a'), RoleCode::new(b'e')])
///     .allow(Action::UPDATE, [RoleCode::new(b'a')]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticHandler {
    name: String,
    roles: HashMap<Action, Vec<RoleCode>>,
}

impl StaticHandler {
    pub fn new<S: Into<String>>(name: S) -> Self {
        StaticHandler {
            name: name.into(),
            roles: HashMap::new(),
        }
    }

    /// Allow `codes` to perform `action`, in addition to any codes already allowed
    pub fn allow<I: IntoIterator<Item = RoleCode>>(mut self, action: Action, codes: I) -> Self {
        let entry = self.roles.entry(action).or_default();
        for code in codes {
            if !entry.contains(&code) {
                entry.push(code);
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl RolePolicy for StaticHandler {
    fn allowed_roles(&self, action: Action) -> &[RoleCode] {
        self.roles.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Handler for StaticHandler {
    fn handler_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn role_policy(&self) -> Option<&dyn RolePolicy> {
        Some(self)
    }
}

impl<E: Executor> Store<E> {
    /// Provision permissions for one handler
    ///
    /// For each canonical action with a non-empty code set, creates (or finds)
    /// the permission `(handler name, action)` and grants it to every cached
    /// role whose code is listed. Unknown codes are skipped. Calling this
    /// again with the same handler changes nothing.
    ///
    /// The first failing storage call aborts with its error; actions already
    /// processed stay committed.
    pub fn register(&self, handler: &dyn Handler) -> Result<()> {
        let resource = match handler.handler_name() {
            Some(name) if !name.is_empty() => name,
            _ => {
                debug!("Skipping handler without a name");
                return Ok(());
            }
        };
        let Some(policy) = handler.role_policy() else {
            debug!(resource, "Skipping handler without a role policy");
            return Ok(());
        };

        for action in Action::CRUD {
            let codes = policy.allowed_roles(action);
            if codes.is_empty() {
                continue;
            }

            let name = format!("{}:{}", resource, action);
            let permission = self
                .create_permission(&generate_id(), &name, resource, action)
                .inspect_err(|e| warn!(resource, %action, error = %e, "Register failed"))?;

            for &code in codes {
                let Some(role) = self.get_role_by_code(code) else {
                    debug!(resource, %code, "Skipping unknown role code");
                    continue;
                };
                self.assign_permission(&role.id, &permission.id)
                    .inspect_err(|e| warn!(resource, %action, error = %e, "Register failed"))?;
            }
        }

        debug!(resource, "Handler registered");
        Ok(())
    }

    /// Register handlers in order, stopping at the first error
    pub fn register_all(&self, handlers: &[&dyn Handler]) -> Result<()> {
        for handler in handlers {
            self.register(*handler)?;
        }
        Ok(())
    }
}
