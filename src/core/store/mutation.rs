//! Create, delete, assign and revoke
//!
//! Each operation writes to storage first and touches the cache only once
//! the write returned `Ok`, all under the exclusive lock. The diagnostic sink
//! runs after the lock is released, so it may read the store.

use super::Store;
use crate::core::executor::{Executor, Value};
use crate::core::schema;
use crate::core::types::{Action, Permission, Role, RoleCode};
use crate::error::Result;
use tracing::debug;

impl<E: Executor> Store<E> {
    /// Create a role unless its code is already taken, and cache the
    /// canonical row for that code
    ///
    /// The first writer of a code wins: a later call with the same code but a
    /// different id or name leaves the existing role unchanged and returns it.
    pub fn create_role(
        &self,
        id: &str,
        code: RoleCode,
        name: &str,
        description: &str,
    ) -> Result<Role> {
        let mut cache = self.cache.write();

        self.exec.execute(
            schema::INSERT_ROLE,
            &[id.into(), code.into(), name.into(), description.into()],
        )?;
        let row = self.exec.query_row(schema::SELECT_ROLE_BY_CODE, &[code.into()])?;
        let role = Role::from_row(&row)?;

        debug!(id = %role.id, code = %role.code, requested_id = id, "Role created");
        cache.put_role(role.clone());
        drop(cache);

        self.log
            .emit(|| format!("rbac: role {} ({}) created", role.id, role.code));
        Ok(role)
    }

    /// Create a permission unless its (resource, action) pair already
    /// exists, and cache the canonical row for that pair
    pub fn create_permission(
        &self,
        id: &str,
        name: &str,
        resource: &str,
        action: Action,
    ) -> Result<Permission> {
        let mut cache = self.cache.write();

        self.exec.execute(
            schema::INSERT_PERMISSION,
            &[id.into(), name.into(), resource.into(), action.into()],
        )?;
        let row = self.exec.query_row(
            schema::SELECT_PERMISSION_BY_KEY,
            &[resource.into(), action.into()],
        )?;
        let permission = Permission::from_row(&row)?;

        debug!(
            id = %permission.id,
            resource = %permission.resource,
            action = %permission.action,
            "Permission created"
        );
        cache.put_permission(permission.clone());
        drop(cache);

        self.log.emit(|| {
            format!(
                "rbac: permission {} ({}:{}) created",
                permission.id, permission.resource, permission.action
            )
        });
        Ok(permission)
    }

    /// Delete a role; edges referencing it go with it. Deleting an unknown
    /// id succeeds.
    pub fn delete_role(&self, id: &str) -> Result<()> {
        let mut cache = self.cache.write();
        let params = [Value::from(id)];

        // Each committed step is mirrored before the next one runs
        self.exec
            .execute(schema::DELETE_USER_ROLES_FOR_ROLE, &params)?;
        cache.remove_role_holders(id);
        self.exec
            .execute(schema::DELETE_ROLE_PERMISSIONS_FOR_ROLE, &params)?;
        cache.remove_role_grants(id);
        self.exec.execute(schema::DELETE_ROLE, &params)?;

        let existed = cache.remove_role(id).is_some();
        drop(cache);

        debug!(id, existed, "Role deleted");
        self.log.emit(|| format!("rbac: role {} deleted", id));
        Ok(())
    }

    /// Delete a permission; role edges referencing it go with it. Deleting an
    /// unknown id succeeds.
    pub fn delete_permission(&self, id: &str) -> Result<()> {
        let mut cache = self.cache.write();
        let params = [Value::from(id)];

        self.exec
            .execute(schema::DELETE_ROLE_PERMISSIONS_FOR_PERMISSION, &params)?;
        cache.remove_permission_grants(id);
        self.exec.execute(schema::DELETE_PERMISSION, &params)?;

        let existed = cache.remove_permission(id).is_some();
        drop(cache);

        debug!(id, existed, "Permission deleted");
        self.log.emit(|| format!("rbac: permission {} deleted", id));
        Ok(())
    }

    /// Give a user a role. Assigning twice keeps a single edge.
    pub fn assign_role(&self, user_id: &str, role_id: &str) -> Result<()> {
        let mut cache = self.cache.write();

        self.exec
            .execute(schema::INSERT_USER_ROLE, &[user_id.into(), role_id.into()])?;

        cache.add_user_role(user_id, role_id);
        drop(cache);

        debug!(user_id, role_id, "Role assigned");
        self.log
            .emit(|| format!("rbac: role {} assigned to user {}", role_id, user_id));
        Ok(())
    }

    /// Take a role away from a user. Revoking an absent edge succeeds.
    pub fn revoke_role(&self, user_id: &str, role_id: &str) -> Result<()> {
        let mut cache = self.cache.write();

        self.exec
            .execute(schema::DELETE_USER_ROLE, &[user_id.into(), role_id.into()])?;

        cache.remove_user_role(user_id, role_id);
        drop(cache);

        debug!(user_id, role_id, "Role revoked");
        self.log
            .emit(|| format!("rbac: role {} revoked from user {}", role_id, user_id));
        Ok(())
    }

    /// Grant a permission to a role. Granting twice keeps a single edge.
    pub fn assign_permission(&self, role_id: &str, permission_id: &str) -> Result<()> {
        let mut cache = self.cache.write();

        self.exec.execute(
            schema::INSERT_ROLE_PERMISSION,
            &[role_id.into(), permission_id.into()],
        )?;

        cache.add_role_permission(role_id, permission_id);
        drop(cache);

        debug!(role_id, permission_id, "Permission assigned");
        self.log.emit(|| {
            format!(
                "rbac: permission {} assigned to role {}",
                permission_id, role_id
            )
        });
        Ok(())
    }

    /// Withdraw a permission from a role. Revoking an absent edge succeeds.
    pub fn revoke_permission(&self, role_id: &str, permission_id: &str) -> Result<()> {
        let mut cache = self.cache.write();

        self.exec.execute(
            schema::DELETE_ROLE_PERMISSION,
            &[role_id.into(), permission_id.into()],
        )?;

        cache.remove_role_permission(role_id, permission_id);
        drop(cache);

        debug!(role_id, permission_id, "Permission revoked");
        self.log.emit(|| {
            format!(
                "rbac: permission {} revoked from role {}",
                permission_id, role_id
            )
        });
        Ok(())
    }
}
