//! In-memory mirror of the four RBAC relations
//!
//! The cache is owned by the [`Store`](crate::Store) and only mutated after
//! the matching storage write has committed. Edge sets never keep empty
//! entries, so two caches holding the same rows compare equal.

use super::types::{Action, Permission, Role, RoleCode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Role, permission and edge indices
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RbacCache {
    roles: HashMap<String, Role>,
    role_ids_by_code: HashMap<RoleCode, String>,
    permissions: HashMap<String, Permission>,
    permission_ids_by_key: HashMap<(String, Action), String>,
    /// role id -> permission ids
    role_permissions: HashMap<String, HashSet<String>>,
    /// user id -> role ids
    user_roles: HashMap<String, HashSet<String>>,
}

fn insert_edge(edges: &mut HashMap<String, HashSet<String>>, from: &str, to: &str) {
    edges
        .entry(from.to_string())
        .or_default()
        .insert(to.to_string());
}

fn remove_edge(edges: &mut HashMap<String, HashSet<String>>, from: &str, to: &str) {
    if let Some(set) = edges.get_mut(from) {
        set.remove(to);
        if set.is_empty() {
            edges.remove(from);
        }
    }
}

/// Drop `target` from every edge set, pruning sets left empty
fn remove_target(edges: &mut HashMap<String, HashSet<String>>, target: &str) {
    edges.retain(|_, set| {
        set.remove(target);
        !set.is_empty()
    });
}

impl RbacCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a role under both its id and its code
    pub fn put_role(&mut self, role: Role) {
        if let Some(previous) = self.roles.get(&role.id) {
            if previous.code != role.code {
                self.role_ids_by_code.remove(&previous.code);
            }
        }
        if let Some(stale_id) = self.role_ids_by_code.get(&role.code) {
            if *stale_id != role.id {
                let stale_id = stale_id.clone();
                self.roles.remove(&stale_id);
            }
        }
        self.role_ids_by_code.insert(role.code, role.id.clone());
        self.roles.insert(role.id.clone(), role);
    }

    /// Remove a role and every edge that references it
    pub fn remove_role(&mut self, id: &str) -> Option<Role> {
        let role = self.roles.remove(id);
        if let Some(role) = &role {
            self.role_ids_by_code.remove(&role.code);
        }
        self.remove_role_grants(id);
        self.remove_role_holders(id);
        role
    }

    /// Drop every (user, role) edge pointing at `role_id`
    pub fn remove_role_holders(&mut self, role_id: &str) {
        remove_target(&mut self.user_roles, role_id);
    }

    /// Drop every (role, permission) edge starting at `role_id`
    pub fn remove_role_grants(&mut self, role_id: &str) {
        self.role_permissions.remove(role_id);
    }

    pub fn role(&self, id: &str) -> Option<&Role> {
        self.roles.get(id)
    }

    pub fn role_by_code(&self, code: RoleCode) -> Option<&Role> {
        self.role_ids_by_code
            .get(&code)
            .and_then(|id| self.roles.get(id))
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Insert or replace a permission under both its id and its key
    pub fn put_permission(&mut self, permission: Permission) {
        if let Some(previous) = self.permissions.get(&permission.id) {
            if previous.resource != permission.resource || previous.action != permission.action {
                let key = (previous.resource.clone(), previous.action);
                self.permission_ids_by_key.remove(&key);
            }
        }
        let key = (permission.resource.clone(), permission.action);
        if let Some(stale_id) = self.permission_ids_by_key.get(&key) {
            if *stale_id != permission.id {
                let stale_id = stale_id.clone();
                self.permissions.remove(&stale_id);
            }
        }
        self.permission_ids_by_key.insert(key, permission.id.clone());
        self.permissions.insert(permission.id.clone(), permission);
    }

    /// Remove a permission and every role edge that references it
    pub fn remove_permission(&mut self, id: &str) -> Option<Permission> {
        let permission = self.permissions.remove(id);
        if let Some(permission) = &permission {
            let key = (permission.resource.clone(), permission.action);
            self.permission_ids_by_key.remove(&key);
        }
        self.remove_permission_grants(id);
        permission
    }

    /// Drop every (role, permission) edge pointing at `permission_id`
    pub fn remove_permission_grants(&mut self, permission_id: &str) {
        remove_target(&mut self.role_permissions, permission_id);
    }

    pub fn permission(&self, id: &str) -> Option<&Permission> {
        self.permissions.get(id)
    }

    pub fn permission_by_key(&self, resource: &str, action: Action) -> Option<&Permission> {
        self.permission_ids_by_key
            .get(&(resource.to_string(), action))
            .and_then(|id| self.permissions.get(id))
    }

    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.values()
    }

    pub fn add_user_role(&mut self, user_id: &str, role_id: &str) {
        insert_edge(&mut self.user_roles, user_id, role_id);
    }

    pub fn remove_user_role(&mut self, user_id: &str, role_id: &str) {
        remove_edge(&mut self.user_roles, user_id, role_id);
    }

    pub fn add_role_permission(&mut self, role_id: &str, permission_id: &str) {
        insert_edge(&mut self.role_permissions, role_id, permission_id);
    }

    pub fn remove_role_permission(&mut self, role_id: &str, permission_id: &str) {
        remove_edge(&mut self.role_permissions, role_id, permission_id);
    }

    /// Roles held by a user; edges to uncached roles are skipped
    pub fn user_roles(&self, user_id: &str) -> impl Iterator<Item = &Role> {
        self.user_roles
            .get(user_id)
            .into_iter()
            .flatten()
            .filter_map(|role_id| self.roles.get(role_id))
    }

    /// Permissions granted to a role; edges to uncached permissions are skipped
    pub fn role_permissions(&self, role_id: &str) -> impl Iterator<Item = &Permission> {
        self.role_permissions
            .get(role_id)
            .into_iter()
            .flatten()
            .filter_map(|permission_id| self.permissions.get(permission_id))
    }

    /// Number of (role, permission) edges
    pub fn role_permission_count(&self) -> usize {
        self.role_permissions.values().map(HashSet::len).sum()
    }

    /// Number of (user, role) edges
    pub fn user_role_count(&self) -> usize {
        self.user_roles.values().map(HashSet::len).sum()
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    pub fn permission_count(&self) -> usize {
        self.permissions.len()
    }

    /// Clear every index
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Check if the cache holds nothing at all
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
            && self.permissions.is_empty()
            && self.role_permissions.is_empty()
            && self.user_roles.is_empty()
    }

    /// Sorted copy of the whole cache
    pub fn snapshot(&self) -> Snapshot {
        let mut roles: Vec<Role> = self.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.id.cmp(&b.id));

        let mut permissions: Vec<Permission> = self.permissions.values().cloned().collect();
        permissions.sort_by(|a, b| a.id.cmp(&b.id));

        Snapshot {
            roles,
            permissions,
            role_permissions: flatten_edges(&self.role_permissions),
            user_roles: flatten_edges(&self.user_roles),
        }
    }
}

fn flatten_edges(edges: &HashMap<String, HashSet<String>>) -> Vec<(String, String)> {
    let mut flat: Vec<(String, String)> = edges
        .iter()
        .flat_map(|(from, set)| set.iter().map(move |to| (from.clone(), to.clone())))
        .collect();
    flat.sort();
    flat
}

/// Point-in-time, order-stable view of the cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    /// (role id, permission id)
    pub role_permissions: Vec<(String, String)>,
    /// (user id, role id)
    pub user_roles: Vec<(String, String)>,
}

impl Snapshot {
    /// Render as pretty JSON for diagnostics
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
