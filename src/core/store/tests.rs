//! Store tests against a scriptable mock executor

use super::*;
use crate::core::executor::{Row, RowIter, Value};
use crate::core::types::{Action, RoleCode};
use crate::error::{RbacError, StorageError};
use parking_lot::Mutex;
use std::sync::Arc;

type StorageResult<T> = std::result::Result<T, StorageError>;

type ExecFn = Box<dyn Fn(&str, &[Value]) -> StorageResult<()> + Send + Sync>;
type QueryRowFn = Box<dyn Fn(&str, &[Value]) -> StorageResult<Row> + Send + Sync>;
type QueryFn = Box<dyn Fn(&str) -> StorageResult<Vec<StorageResult<Row>>> + Send + Sync>;

#[derive(Default)]
struct MockExecutor {
    exec_fn: Mutex<Option<ExecFn>>,
    query_row_fn: Mutex<Option<QueryRowFn>>,
    query_fn: Mutex<Option<QueryFn>>,
    executed: Mutex<Vec<String>>,
    queried: Mutex<Vec<String>>,
}

impl MockExecutor {
    fn on_execute(
        &self,
        f: impl Fn(&str, &[Value]) -> StorageResult<()> + Send + Sync + 'static,
    ) {
        *self.exec_fn.lock() = Some(Box::new(f));
    }

    fn on_query_row(
        &self,
        f: impl Fn(&str, &[Value]) -> StorageResult<Row> + Send + Sync + 'static,
    ) {
        *self.query_row_fn.lock() = Some(Box::new(f));
    }

    fn on_query(
        &self,
        f: impl Fn(&str) -> StorageResult<Vec<StorageResult<Row>>> + Send + Sync + 'static,
    ) {
        *self.query_fn.lock() = Some(Box::new(f));
    }

    fn executed_matching(&self, needle: &str) -> usize {
        self.executed
            .lock()
            .iter()
            .filter(|sql| sql.contains(needle))
            .count()
    }

    fn executed_count(&self) -> usize {
        self.executed.lock().len()
    }
}

impl Executor for MockExecutor {
    fn execute(&self, sql: &str, params: &[Value]) -> StorageResult<()> {
        self.executed.lock().push(sql.to_string());
        match &*self.exec_fn.lock() {
            Some(f) => f(sql, params),
            None => Err(StorageError::backend(format!("unexpected execute: {}", sql))),
        }
    }

    fn query_row(&self, sql: &str, params: &[Value]) -> StorageResult<Row> {
        match &*self.query_row_fn.lock() {
            Some(f) => f(sql, params),
            None => Err(StorageError::backend(format!("unexpected query_row: {}", sql))),
        }
    }

    fn query(&self, sql: &str, _params: &[Value]) -> StorageResult<RowIter<'_>> {
        self.queried.lock().push(sql.to_string());
        match &*self.query_fn.lock() {
            Some(f) => Ok(Box::new(f(sql)?.into_iter())),
            None => Err(StorageError::backend(format!("unexpected query: {}", sql))),
        }
    }
}

fn row(columns: &[&str]) -> Row {
    Row::new(columns.iter().map(|c| Value::from(*c)).collect())
}

fn text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        other => panic!("expected text param, got {:?}", other),
    }
}

/// Mock whose DDL and load queries succeed with empty relations
fn new_mock() -> Arc<MockExecutor> {
    let mock = Arc::new(MockExecutor::default());
    mock.on_execute(|_, _| Ok(()));
    mock.on_query(|_| Ok(Vec::new()));
    mock
}

fn new_mock_store() -> (Store<Arc<MockExecutor>>, Arc<MockExecutor>) {
    let mock = new_mock();
    let store = Store::new(Arc::clone(&mock)).unwrap();
    (store, mock)
}

/// Confirming reads return a canonical row derived only from the dedup key,
/// the way a real table would after an ignored duplicate insert
fn echo_canonical_rows(mock: &MockExecutor) {
    mock.on_query_row(|sql, params| {
        if sql.contains("FROM rbac_roles") {
            let code = text(&params[0]);
            Ok(row(&[&format!("rid-{}", code), &code, "Role", "Desc"]))
        } else {
            let resource = text(&params[0]);
            let action = text(&params[1]);
            Ok(row(&[
                &format!("pid-{}-{}", resource, action),
                &format!("{}:{}", resource, action),
                &resource,
                &action,
            ]))
        }
    });
}

fn code(c: u8) -> RoleCode {
    RoleCode::new(c)
}

// Construction

#[test]
fn test_new_fails_on_first_ddl_verbatim() {
    let mock = Arc::new(MockExecutor::default());
    mock.on_execute(|sql, _| {
        if sql.contains("CREATE TABLE IF NOT EXISTS rbac_roles") {
            Err(StorageError::backend("ddl error"))
        } else {
            Ok(())
        }
    });

    let err = Store::new(Arc::clone(&mock)).unwrap_err();
    assert_eq!(err.to_string(), "ddl error");
    assert_eq!(mock.executed_count(), 1);
    assert!(mock.queried.lock().is_empty());
}

#[test]
fn test_new_fails_at_each_load_stage() {
    let stages = [
        ("FROM rbac_roles", "query error roles", 1),
        ("FROM rbac_permissions", "query error perms", 2),
        ("FROM rbac_role_permissions", "query error role_perms", 3),
        ("FROM rbac_user_roles", "query error user_roles", 4),
    ];

    for (needle, message, attempted) in stages {
        let mock = Arc::new(MockExecutor::default());
        mock.on_execute(|_, _| Ok(()));
        mock.on_query(move |sql| {
            if sql.contains(needle) {
                Err(StorageError::backend(message))
            } else {
                Ok(Vec::new())
            }
        });

        let err = Store::new(Arc::clone(&mock)).unwrap_err();
        assert_eq!(err.to_string(), message);
        assert_eq!(mock.queried.lock().len(), attempted, "stage {}", needle);
    }
}

#[test]
fn test_new_fails_on_row_decode_at_each_stage() {
    for needle in [
        "FROM rbac_roles",
        "FROM rbac_permissions",
        "FROM rbac_role_permissions",
        "FROM rbac_user_roles",
    ] {
        let mock = Arc::new(MockExecutor::default());
        mock.on_execute(|_, _| Ok(()));
        mock.on_query(move |sql| {
            if sql.contains(needle) {
                // One column short for every relation
                Ok(vec![Ok(Row::new(vec![Value::Integer(1)]))])
            } else {
                Ok(Vec::new())
            }
        });

        let err = Store::new(Arc::clone(&mock)).unwrap_err();
        assert!(
            matches!(err, RbacError::Storage(StorageError::Decode { .. })),
            "stage {}: {:?}",
            needle,
            err
        );
    }
}

#[test]
fn test_new_fails_on_iteration_error() {
    let mock = Arc::new(MockExecutor::default());
    mock.on_execute(|_, _| Ok(()));
    mock.on_query(|sql| {
        if sql.contains("FROM rbac_roles") {
            Ok(vec![Err(StorageError::backend("rows err roles"))])
        } else {
            Ok(Vec::new())
        }
    });

    let err = Store::new(Arc::clone(&mock)).unwrap_err();
    assert_eq!(err.to_string(), "rows err roles");
    assert_eq!(mock.queried.lock().len(), 1);
}

#[test]
fn test_new_loads_rows() {
    let mock = Arc::new(MockExecutor::default());
    mock.on_execute(|_, _| Ok(()));
    mock.on_query(|sql| {
        let rows = if sql.contains("FROM rbac_roles") {
            vec![row(&["rid1", "a", "Admin", "Desc"])]
        } else if sql.contains("FROM rbac_permissions") {
            vec![row(&["pid1", "p1", "r1", "x"])]
        } else if sql.contains("FROM rbac_role_permissions") {
            vec![row(&["rid1", "pid1"])]
        } else {
            vec![row(&["uid1", "rid1"])]
        };
        Ok(rows.into_iter().map(Ok).collect())
    });

    let store = Store::new(mock).unwrap();
    assert!(store.get_role("rid1").is_some());
    assert!(store.get_permission("pid1").is_some());
    assert!(store.has_permission("uid1", "r1", Action::new(b'x')).unwrap());
}

// Mutations

#[test]
fn test_mutations_propagate_exec_error_without_touching_cache() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("ignored", code(b'a'), "Admin", "Desc").unwrap();
    store.assign_role("u", "rid-a").unwrap();
    let before = store.snapshot();

    mock.on_execute(|_, _| Err(StorageError::backend("exec error")));

    assert!(store.create_role("id", code(b'x'), "N", "D").is_err());
    assert!(store.delete_role("rid-a").is_err());
    assert!(store.create_permission("id", "n", "r", Action::new(b'x')).is_err());
    assert!(store.delete_permission("id").is_err());
    assert!(store.assign_role("u", "r").is_err());
    assert!(store.revoke_role("u", "rid-a").is_err());
    assert!(store.assign_permission("r", "p").is_err());
    assert!(store.revoke_permission("r", "p").is_err());

    assert_eq!(store.snapshot(), before);
}

#[test]
fn test_create_role_confirm_read_error() {
    let (store, mock) = new_mock_store();
    mock.on_query_row(|_, _| Err(StorageError::backend("scan error")));

    let err = store.create_role("id", code(b'x'), "N", "D").unwrap_err();
    assert_eq!(err.to_string(), "scan error");
    assert!(store.list_roles().is_empty());
}

#[test]
fn test_create_permission_confirm_read_error() {
    let (store, mock) = new_mock_store();
    mock.on_query_row(|_, _| Err(StorageError::backend("scan error")));

    assert!(store
        .create_permission("pid", "n", "r", Action::new(b'x'))
        .is_err());
    assert!(store.list_permissions().is_empty());
}

#[test]
fn test_create_role_first_writer_wins() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);

    let first = store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();
    let second = store
        .create_role("rid_new", code(b'a'), "Other", "Other")
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(store.list_roles().len(), 1);
    assert_eq!(store.get_role_by_code(code(b'a')).unwrap().id, "rid-a");
    assert!(store.get_role("rid_new").is_none());
}

#[test]
fn test_assign_twice_keeps_one_edge() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid", code(b'a'), "Admin", "Desc").unwrap();
    let perm = store
        .create_permission("pid", "p", "r", Action::new(b'x'))
        .unwrap();

    store.assign_role("uid", "rid-a").unwrap();
    store.assign_role("uid", "rid-a").unwrap();
    store.assign_permission("rid-a", &perm.id).unwrap();
    store.assign_permission("rid-a", &perm.id).unwrap();

    assert_eq!(store.get_user_roles("uid").unwrap().len(), 1);
    assert_eq!(store.get_role_permissions("rid-a").len(), 1);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.user_roles.len(), 1);
    assert_eq!(snapshot.role_permissions.len(), 1);
}

#[test]
fn test_delete_and_revoke_absent_succeed() {
    let (store, _mock) = new_mock_store();

    store.delete_role("nonexistent").unwrap();
    store.delete_permission("nonexistent").unwrap();
    store.revoke_role("uid", "rid").unwrap();
    store.revoke_permission("rid", "pid").unwrap();
}

#[test]
fn test_revoke_other_permission_keeps_edge() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid", code(b'a'), "Admin", "Desc").unwrap();
    let perm = store
        .create_permission("pid", "p", "r", Action::new(b'x'))
        .unwrap();
    store.assign_permission("rid-a", &perm.id).unwrap();

    store.revoke_permission("rid-a", "pid2").unwrap();

    assert_eq!(store.get_role_permissions("rid-a").len(), 1);
}

#[test]
fn test_delete_role_keeps_other_user_roles() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();
    store.create_role("rid2", code(b'b'), "Editor", "Desc").unwrap();
    let perm = store
        .create_permission("pid", "p", "doc", Action::READ)
        .unwrap();
    store.assign_permission("rid-a", &perm.id).unwrap();
    store.assign_role("uid", "rid-a").unwrap();
    store.assign_role("uid", "rid-b").unwrap();

    store.delete_role("rid-a").unwrap();

    let roles = store.get_user_roles("uid").unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].id, "rid-b");
    assert!(store.get_role_by_code(code(b'a')).is_none());
    assert!(store.get_permission(&perm.id).is_some());
    assert!(store.snapshot().role_permissions.is_empty());
}

#[test]
fn test_delete_permission_keeps_other_grants() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid", code(b'a'), "Admin", "Desc").unwrap();
    let p1 = store
        .create_permission("pid1", "p1", "r", Action::new(b'x'))
        .unwrap();
    let p2 = store
        .create_permission("pid2", "p2", "r", Action::new(b'y'))
        .unwrap();
    store.assign_permission("rid-a", &p1.id).unwrap();
    store.assign_permission("rid-a", &p2.id).unwrap();
    store.assign_role("uid", "rid-a").unwrap();

    store.delete_permission(&p1.id).unwrap();

    assert!(store.has_permission("uid", "r", Action::new(b'y')).unwrap());
    assert!(!store.has_permission("uid", "r", Action::new(b'x')).unwrap());
    assert!(store.get_permission_by_key("r", Action::new(b'x')).is_none());
}

#[test]
fn test_delete_role_removes_edge_rows_before_the_role() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid", code(b'a'), "Admin", "Desc").unwrap();

    store.delete_role("rid-a").unwrap();

    let executed = mock.executed.lock().clone();
    let deletes: Vec<_> = executed
        .iter()
        .filter(|sql| sql.starts_with("DELETE"))
        .collect();
    assert_eq!(deletes.len(), 3);
    assert!(deletes[0].contains("rbac_user_roles"));
    assert!(deletes[1].contains("rbac_role_permissions"));
    assert!(deletes[2].contains("rbac_roles"));
}

#[test]
fn test_delete_role_mirrors_committed_steps_on_failure() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid", code(b'a'), "Admin", "Desc").unwrap();
    let perm = store
        .create_permission("pid", "p", "doc", Action::READ)
        .unwrap();
    store.assign_permission("rid-a", &perm.id).unwrap();
    store.assign_role("uid", "rid-a").unwrap();

    mock.on_execute(|sql, _| {
        if sql.starts_with("DELETE FROM rbac_role_permissions") {
            Err(StorageError::backend("grant delete error"))
        } else {
            Ok(())
        }
    });

    let err = store.delete_role("rid-a").unwrap_err();
    assert_eq!(err.to_string(), "grant delete error");

    // Holders were removed in storage, grants and the role were not
    assert!(store.get_user_roles("uid").unwrap().is_empty());
    assert!(store.get_role("rid-a").is_some());
    assert_eq!(store.get_role_permissions("rid-a"), vec![perm]);
}

// Queries

#[test]
fn test_lookups_miss_without_error() {
    let (store, _mock) = new_mock_store();
    assert!(store.get_role("nope").is_none());
    assert!(store.get_role_by_code(code(b'z')).is_none());
    assert!(store.get_permission("nope").is_none());
    assert!(store.get_user_roles("nobody").unwrap().is_empty());
    assert!(!store.has_permission("nobody", "r", Action::READ).unwrap());
}

#[test]
fn test_empty_user_id_is_rejected_without_storage() {
    let (store, mock) = new_mock_store();
    let executed = mock.executed_count();

    assert!(store.get_user_roles("").unwrap_err().is_validation());
    assert!(store.get_user_role_codes("").unwrap_err().is_validation());
    for action in [Action::READ, Action::new(b'x'), Action::new(0)] {
        assert!(store.has_permission("", "r", action).unwrap_err().is_validation());
    }
    assert_eq!(mock.executed_count(), executed);
}

#[test]
fn test_has_permission_requires_exact_match() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();
    let perm = store
        .create_permission("pid1", "view_invoice", "invoice", Action::READ)
        .unwrap();
    store.assign_permission("rid-a", &perm.id).unwrap();
    store.assign_role("uid1", "rid-a").unwrap();

    assert!(store.has_permission("uid1", "invoice", Action::READ).unwrap());
    assert!(!store.has_permission("uid1", "invoice", Action::UPDATE).unwrap());
    assert!(!store.has_permission("uid1", "invoices", Action::READ).unwrap());
    assert!(!store.has_permission("uid1", "*", Action::READ).unwrap());
    assert!(!store.has_permission("uid2", "invoice", Action::READ).unwrap());
    assert_eq!(store.get_user_role_codes("uid1").unwrap(), vec![code(b'a')]);
}

#[test]
fn test_edge_to_uncached_role_is_ignored() {
    let (store, _mock) = new_mock_store();
    store.assign_role("uid", "ghost").unwrap();

    assert!(store.get_user_roles("uid").unwrap().is_empty());
    assert!(!store.has_permission("uid", "r", Action::READ).unwrap());
}

// Register

struct Partial;

impl Handler for Partial {
    fn handler_name(&self) -> Option<&str> {
        Some("inc")
    }
}

struct NoName {
    policy: StaticHandler,
}

impl Handler for NoName {
    fn role_policy(&self) -> Option<&dyn RolePolicy> {
        Some(&self.policy)
    }
}

#[test]
fn test_register_seeds_permissions_and_grants() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();

    let h = StaticHandler::new("invoice").allow(Action::READ, [code(b'a')]);
    store.register(&h).unwrap();

    assert_eq!(mock.executed_matching("INSERT INTO rbac_permissions"), 1);
    assert_eq!(mock.executed_matching("INSERT INTO rbac_role_permissions"), 1);

    let perm = store.get_permission_by_key("invoice", Action::READ).unwrap();
    assert_eq!(perm.name, "invoice:r");
    assert_eq!(store.get_role_permissions("rid-a"), vec![perm]);
}

#[test]
fn test_register_skips_incomplete_descriptors() {
    let (store, mock) = new_mock_store();
    let executed = mock.executed_count();

    store.register(&Partial).unwrap();
    store
        .register(&NoName {
            policy: StaticHandler::new("").allow(Action::READ, [code(b'a')]),
        })
        .unwrap();
    store
        .register(&StaticHandler::new("").allow(Action::READ, [code(b'a')]))
        .unwrap();

    assert_eq!(mock.executed_count(), executed);
    assert!(store.list_permissions().is_empty());
}

#[test]
fn test_register_skips_unknown_codes() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();

    let h = StaticHandler::new("report")
        .allow(Action::READ, [code(b'a'), code(b'z')])
        .allow(Action::DELETE, [code(b'z')]);
    store.register(&h).unwrap();

    assert_eq!(store.list_permissions().len(), 2);
    assert_eq!(mock.executed_matching("INSERT INTO rbac_role_permissions"), 1);
    assert!(store.get_role_by_code(code(b'z')).is_none());
}

#[test]
fn test_register_is_idempotent() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();
    store.create_role("rid2", code(b'e'), "Editor", "Desc").unwrap();

    let h = StaticHandler::new("invoice")
        .allow(Action::READ, [code(b'a'), code(b'e')])
        .allow(Action::UPDATE, [code(b'a')]);

    store.register(&h).unwrap();
    let once = store.snapshot();
    store.register(&h).unwrap();
    assert_eq!(store.snapshot(), once);
}

#[test]
fn test_register_propagates_create_permission_error() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();

    mock.on_execute(|sql, _| {
        if sql.contains("INSERT INTO rbac_permissions") {
            Err(StorageError::backend("create perm error"))
        } else {
            Ok(())
        }
    });

    let h = StaticHandler::new("res").allow(Action::READ, [code(b'a')]);
    let err = store.register(&h).unwrap_err();
    assert_eq!(err.to_string(), "create perm error");
}

#[test]
fn test_register_propagates_assign_error() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();

    mock.on_execute(|sql, _| {
        if sql.contains("INSERT INTO rbac_role_permissions") {
            Err(StorageError::backend("assign error"))
        } else {
            Ok(())
        }
    });

    let h = StaticHandler::new("res").allow(Action::READ, [code(b'a')]);
    let err = store.register(&h).unwrap_err();
    assert_eq!(err.to_string(), "assign error");
    assert!(store.get_permission_by_key("res", Action::READ).is_some());
    assert!(store.get_role_permissions("rid-a").is_empty());
}

#[test]
fn test_register_keeps_earlier_actions_on_failure() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();

    mock.on_execute(|sql, params| {
        if sql.contains("INSERT INTO rbac_permissions") && text(&params[3]) == "r" {
            Err(StorageError::backend("read failed"))
        } else {
            Ok(())
        }
    });

    let h = StaticHandler::new("doc")
        .allow(Action::CREATE, [code(b'a')])
        .allow(Action::READ, [code(b'a')]);
    assert!(store.register(&h).is_err());

    assert!(store.get_permission_by_key("doc", Action::CREATE).is_some());
    assert!(store.get_permission_by_key("doc", Action::READ).is_none());
    assert_eq!(store.get_role_permissions("rid-a").len(), 1);
}

#[test]
fn test_register_all_stops_at_first_error() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();

    mock.on_execute(|sql, params| {
        if sql.contains("INSERT INTO rbac_permissions") && text(&params[2]) == "b" {
            Err(StorageError::backend("boom"))
        } else {
            Ok(())
        }
    });

    let a = StaticHandler::new("a").allow(Action::READ, [code(b'a')]);
    let b = StaticHandler::new("b").allow(Action::READ, [code(b'a')]);
    let c = StaticHandler::new("c").allow(Action::READ, [code(b'a')]);
    assert!(store.register_all(&[&a, &b, &c]).is_err());

    assert!(store.get_permission_by_key("a", Action::READ).is_some());
    assert!(store.get_permission_by_key("c", Action::READ).is_none());
}

// Diagnostics

#[test]
fn test_log_sink_receives_mutations() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);

    let lines = Arc::new(Mutex::new(Vec::new()));
    let lines_clone = Arc::clone(&lines);
    store.set_log(Some(Arc::new(move |msg: &str| {
        lines_clone.lock().push(msg.to_string())
    })));

    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();
    store.assign_role("u1", "rid-a").unwrap();
    store.set_log(None);
    store.revoke_role("u1", "rid-a").unwrap();

    let lines = lines.lock();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("rid-a"));
    assert!(lines[1].contains("u1"));
}

#[test]
fn test_log_sink_may_read_the_store() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    let store = Arc::new(store);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    let weak = Arc::downgrade(&store);
    store.set_log(Some(Arc::new(move |_: &str| {
        if let Some(store) = weak.upgrade() {
            seen_clone.lock().push(store.list_roles().len());
        }
    })));

    let (done_tx, done_rx) = std::sync::mpsc::channel();
    let worker = {
        let store = Arc::clone(&store);
        std::thread::spawn(move || {
            store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();
            store.assign_role("u1", "rid-a").unwrap();
            store.delete_role("rid-a").unwrap();
            done_tx.send(()).unwrap();
        })
    };

    done_rx
        .recv_timeout(std::time::Duration::from_secs(5))
        .expect("mutations finished while the sink read the store");
    worker.join().unwrap();
    store.set_log(None);

    assert_eq!(*seen.lock(), vec![1, 1, 0]);
}

#[test]
fn test_debug_reports_counts() {
    let (store, mock) = new_mock_store();
    echo_canonical_rows(&mock);
    store.create_role("rid1", code(b'a'), "Admin", "Desc").unwrap();

    let rendered = format!("{:?}", store);
    assert!(rendered.contains("roles: 1"));
}
