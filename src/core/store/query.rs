//! Cache-only lookups
//!
//! None of these touch storage. A miss is `None`, not an error.

use super::Store;
use crate::core::cache::Snapshot;
use crate::core::executor::Executor;
use crate::core::types::{Action, Permission, Role, RoleCode};
use crate::core::validation::validate_user_id;
use crate::error::Result;
use std::collections::HashSet;

impl<E: Executor> Store<E> {
    pub fn get_role(&self, id: &str) -> Option<Role> {
        self.cache.read().role(id).cloned()
    }

    pub fn get_role_by_code(&self, code: RoleCode) -> Option<Role> {
        self.cache.read().role_by_code(code).cloned()
    }

    /// All roles, in no particular order
    pub fn list_roles(&self) -> Vec<Role> {
        self.cache.read().roles().cloned().collect()
    }

    pub fn get_permission(&self, id: &str) -> Option<Permission> {
        self.cache.read().permission(id).cloned()
    }

    /// Look a permission up by its (resource, action) key
    pub fn get_permission_by_key(&self, resource: &str, action: Action) -> Option<Permission> {
        self.cache.read().permission_by_key(resource, action).cloned()
    }

    /// All permissions, in no particular order
    pub fn list_permissions(&self) -> Vec<Permission> {
        self.cache.read().permissions().cloned().collect()
    }

    /// Permissions granted to one role, sorted by id
    pub fn get_role_permissions(&self, role_id: &str) -> Vec<Permission> {
        let mut permissions: Vec<Permission> =
            self.cache.read().role_permissions(role_id).cloned().collect();
        permissions.sort_by(|a, b| a.id.cmp(&b.id));
        permissions
    }

    /// Roles held by a user, sorted by id
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty user id.
    pub fn get_user_roles(&self, user_id: &str) -> Result<Vec<Role>> {
        validate_user_id(user_id)?;
        let mut roles: Vec<Role> = self.cache.read().user_roles(user_id).cloned().collect();
        roles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(roles)
    }

    /// Codes of the roles held by a user, sorted
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty user id.
    pub fn get_user_role_codes(&self, user_id: &str) -> Result<Vec<RoleCode>> {
        validate_user_id(user_id)?;
        let mut codes: Vec<RoleCode> = self
            .cache
            .read()
            .user_roles(user_id)
            .map(|r| r.code)
            .collect();
        codes.sort();
        Ok(codes)
    }

    /// Whether any of the user's roles grants exactly (resource, action)
    ///
    /// There is no wildcard or hierarchy matching. Callers should treat an
    /// error as a denial.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty user id.
    pub fn has_permission(&self, user_id: &str, resource: &str, action: Action) -> Result<bool> {
        validate_user_id(user_id)?;
        let cache = self.cache.read();

        let mut seen = HashSet::new();
        for role in cache.user_roles(user_id) {
            for permission in cache.role_permissions(&role.id) {
                if !seen.insert(permission.id.as_str()) {
                    continue;
                }
                if permission.matches(resource, action) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Sorted copy of every cached role, permission and edge
    pub fn snapshot(&self) -> Snapshot {
        self.cache.read().snapshot()
    }
}
