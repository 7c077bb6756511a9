#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rbac_store::{Action, RoleCode, SqliteExecutor, StaticHandler, Store};
use std::sync::Arc;

#[derive(Debug, Arbitrary)]
enum Op {
    CreateRole { id: u8, code: u8 },
    DeleteRole { id: u8 },
    CreatePermission { id: u8, resource: u8, action: u8 },
    DeletePermission { id: u8 },
    AssignRole { user: u8, role: u8 },
    RevokeRole { user: u8, role: u8 },
    AssignPermission { role: u8, permission: u8 },
    RevokePermission { role: u8, permission: u8 },
    Register { resource: u8, read: Vec<u8> },
    Check { user: u8, resource: u8, action: u8 },
}

// Whatever the sequence, the cache must match a cache rebuilt from storage
fuzz_target!(|ops: Vec<Op>| {
    let exec = match SqliteExecutor::open_in_memory() {
        Ok(exec) => Arc::new(exec),
        Err(_) => return,
    };
    let store = match Store::new(exec.clone()) {
        Ok(store) => store,
        Err(_) => return,
    };

    for op in ops.iter().take(64) {
        let _ = match op {
            Op::CreateRole { id, code } => store
                .create_role(&format!("r{}", id % 8), RoleCode::new(*code), "r", "")
                .map(|_| ()),
            Op::DeleteRole { id } => store.delete_role(&format!("r{}", id % 8)),
            Op::CreatePermission { id, resource, action } => store
                .create_permission(
                    &format!("p{}", id % 8),
                    "p",
                    &format!("res{}", resource % 4),
                    Action::new(*action),
                )
                .map(|_| ()),
            Op::DeletePermission { id } => store.delete_permission(&format!("p{}", id % 8)),
            Op::AssignRole { user, role } => {
                store.assign_role(&format!("u{}", user % 4), &format!("r{}", role % 8))
            }
            Op::RevokeRole { user, role } => {
                store.revoke_role(&format!("u{}", user % 4), &format!("r{}", role % 8))
            }
            Op::AssignPermission { role, permission } => store
                .assign_permission(&format!("r{}", role % 8), &format!("p{}", permission % 8)),
            Op::RevokePermission { role, permission } => store
                .revoke_permission(&format!("r{}", role % 8), &format!("p{}", permission % 8)),
            Op::Register { resource, read } => {
                let handler = StaticHandler::new(format!("res{}", resource % 4))
                    .allow(Action::READ, read.iter().map(|c| RoleCode::new(*c)));
                store.register(&handler)
            }
            Op::Check { user, resource, action } => store
                .has_permission(
                    &format!("u{}", user % 4),
                    &format!("res{}", resource % 4),
                    Action::new(*action),
                )
                .map(|_| ()),
        };
    }

    let rebuilt = match Store::new(exec) {
        Ok(store) => store,
        Err(_) => return,
    };
    assert_eq!(store.snapshot(), rebuilt.snapshot());
});
