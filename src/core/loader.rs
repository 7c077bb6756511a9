//! Schema bootstrap and full cache load
//!
//! Runs once per [`Store`](crate::Store). Any failure aborts construction
//! with the storage error unchanged; later stages are not attempted.

use super::cache::RbacCache;
use super::executor::{Executor, Row};
use super::schema;
use super::types::{edge_from_row, Permission, Role};
use crate::error::StorageError;
use tracing::debug;

/// Execute every DDL statement in order, stopping at the first failure
pub fn ensure_schema<E: Executor + ?Sized>(exec: &E) -> Result<(), StorageError> {
    for ddl in schema::SCHEMA {
        exec.execute(ddl, &[])?;
    }
    debug!("RBAC schema ensured");
    Ok(())
}

/// Scan one relation, handing each decoded row to `apply`
fn scan<E, T>(
    exec: &E,
    sql: &str,
    decode: fn(&Row) -> Result<T, StorageError>,
    mut apply: impl FnMut(T),
) -> Result<usize, StorageError>
where
    E: Executor + ?Sized,
{
    let mut count = 0;
    for row in exec.query(sql, &[])? {
        apply(decode(&row?)?);
        count += 1;
    }
    Ok(count)
}

/// Load roles, permissions, role-permission edges and user-role edges, in
/// that order
pub fn load_cache<E: Executor + ?Sized>(exec: &E) -> Result<RbacCache, StorageError> {
    let mut cache = RbacCache::new();

    let roles = scan(exec, schema::SELECT_ROLES, Role::from_row, |role| {
        cache.put_role(role)
    })?;
    let permissions = scan(exec, schema::SELECT_PERMISSIONS, Permission::from_row, |p| {
        cache.put_permission(p)
    })?;
    let role_permissions = scan(exec, schema::SELECT_ROLE_PERMISSIONS, edge_from_row, |(r, p)| {
        cache.add_role_permission(&r, &p)
    })?;
    let user_roles = scan(exec, schema::SELECT_USER_ROLES, edge_from_row, |(u, r)| {
        cache.add_user_role(&u, &r)
    })?;

    debug!(
        roles,
        permissions, role_permissions, user_roles, "RBAC cache loaded"
    );
    Ok(cache)
}
