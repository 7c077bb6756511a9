#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rbac_store::{Action, Permission, Role, RoleCode, Row, Value};

#[derive(Debug, Arbitrary)]
enum Cell {
    Null,
    Integer(i64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Null => Value::Null,
            Cell::Integer(i) => Value::Integer(i),
            Cell::Text(s) => Value::Text(s),
            Cell::Blob(b) => Value::Blob(b),
        }
    }
}

// Malformed rows must decode to an error, never panic
fuzz_target!(|cells: Vec<Cell>| {
    let row = Row::new(cells.into_iter().map(Value::from).collect());

    if let Ok(role) = Role::from_row(&row) {
        let text = String::from(role.code);
        assert_eq!(RoleCode::try_from(text).ok(), Some(role.code));
    }

    if let Ok(permission) = Permission::from_row(&row) {
        let text = String::from(permission.action);
        assert_eq!(Action::try_from(text).ok(), Some(permission.action));
    }
});
