use owlreg_core::{RegistrationRecord, RegistrationStore, SqliteStore};
use rusqlite::Connection;

fn table_exists(conn: &Connection, name: &str) -> bool {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [name],
            |row| row.get(0),
        )
        .unwrap();
    count > 0
}

#[test]
fn ensure_schema_creates_all_four_tables() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("registrations.db"));

    store.ensure_schema().unwrap();

    let conn = Connection::open(store.path()).unwrap();
    for table in [
        "students",
        "family_background",
        "academic_profile",
        "emergency_contacts",
    ] {
        assert!(table_exists(&conn, table), "missing table {table}");
    }
}

#[test]
fn ensure_schema_is_idempotent_and_preserves_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("registrations.db"));

    store.ensure_schema().unwrap();
    store.save_registration(&RegistrationRecord::default()).unwrap();

    store.ensure_schema().unwrap();
    store.ensure_schema().unwrap();

    let conn = Connection::open(store.path()).unwrap();
    let students: i64 = conn
        .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(students, 1);
}

#[test]
fn probe_reports_unready_until_schema_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("registrations.db"));

    assert!(!store.probe());
    store.ensure_schema().unwrap();
    assert!(store.probe());
}
