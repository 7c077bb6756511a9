//! Relational schema and the statements run against it
//!
//! Every value is bound through a `$N` placeholder. Insert statements are
//! silent no-ops on their dedup key so that creates and assigns are
//! idempotent; the canonical row is re-read afterwards. Deletes remove
//! referencing edge rows explicitly, so storage cascades even when the
//! engine does not enforce foreign keys.

/// Idempotent DDL, executed in order at construction
pub const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS rbac_roles (
        id TEXT PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS rbac_permissions (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        resource TEXT NOT NULL,
        action TEXT NOT NULL,
        UNIQUE(resource, action)
    )",
    "CREATE TABLE IF NOT EXISTS rbac_role_permissions (
        role_id TEXT NOT NULL REFERENCES rbac_roles(id) ON DELETE CASCADE,
        permission_id TEXT NOT NULL REFERENCES rbac_permissions(id) ON DELETE CASCADE,
        UNIQUE(role_id, permission_id)
    )",
    "CREATE TABLE IF NOT EXISTS rbac_user_roles (
        user_id TEXT NOT NULL,
        role_id TEXT NOT NULL REFERENCES rbac_roles(id) ON DELETE CASCADE,
        UNIQUE(user_id, role_id)
    )",
];

// Full loads, in load order
pub const SELECT_ROLES: &str = "SELECT id, code, name, description FROM rbac_roles";
pub const SELECT_PERMISSIONS: &str = "SELECT id, name, resource, action FROM rbac_permissions";
pub const SELECT_ROLE_PERMISSIONS: &str =
    "SELECT role_id, permission_id FROM rbac_role_permissions";
pub const SELECT_USER_ROLES: &str = "SELECT user_id, role_id FROM rbac_user_roles";

// Roles
pub const INSERT_ROLE: &str = "INSERT INTO rbac_roles (id, code, name, description)
    VALUES ($1, $2, $3, $4) ON CONFLICT (code) DO NOTHING";
pub const SELECT_ROLE_BY_CODE: &str =
    "SELECT id, code, name, description FROM rbac_roles WHERE code = $1";
pub const DELETE_ROLE: &str = "DELETE FROM rbac_roles WHERE id = $1";
pub const DELETE_USER_ROLES_FOR_ROLE: &str = "DELETE FROM rbac_user_roles WHERE role_id = $1";
pub const DELETE_ROLE_PERMISSIONS_FOR_ROLE: &str =
    "DELETE FROM rbac_role_permissions WHERE role_id = $1";

// Permissions
pub const INSERT_PERMISSION: &str = "INSERT INTO rbac_permissions (id, name, resource, action)
    VALUES ($1, $2, $3, $4) ON CONFLICT (resource, action) DO NOTHING";
pub const SELECT_PERMISSION_BY_KEY: &str =
    "SELECT id, name, resource, action FROM rbac_permissions WHERE resource = $1 AND action = $2";
pub const DELETE_PERMISSION: &str = "DELETE FROM rbac_permissions WHERE id = $1";
pub const DELETE_ROLE_PERMISSIONS_FOR_PERMISSION: &str =
    "DELETE FROM rbac_role_permissions WHERE permission_id = $1";

// Edges
pub const INSERT_USER_ROLE: &str = "INSERT INTO rbac_user_roles (user_id, role_id)
    VALUES ($1, $2) ON CONFLICT (user_id, role_id) DO NOTHING";
pub const DELETE_USER_ROLE: &str =
    "DELETE FROM rbac_user_roles WHERE user_id = $1 AND role_id = $2";
pub const INSERT_ROLE_PERMISSION: &str =
    "INSERT INTO rbac_role_permissions (role_id, permission_id)
    VALUES ($1, $2) ON CONFLICT (role_id, permission_id) DO NOTHING";
pub const DELETE_ROLE_PERMISSION: &str =
    "DELETE FROM rbac_role_permissions WHERE role_id = $1 AND permission_id = $2";
