use owlreg_core::{
    AcademicProfile, EmergencyContact, FamilyBackground, ParentInfo, PersonalInfo,
    RegistrationRecord, RegistrationStore, SqliteStore, StoreError,
};
use rusqlite::Connection;

fn sample_record() -> RegistrationRecord {
    RegistrationRecord {
        personal: PersonalInfo {
            first_name: "Liza".to_string(),
            last_name: "Dela Cruz".to_string(),
            lrn: "136742090015".to_string(),
            strand: "STEM".to_string(),
            birth_date: "2008-03-21".to_string(),
            mobile: "09171234567".to_string(),
            street_address: "123 Mabini St".to_string(),
            barangay: "San Isidro".to_string(),
            city: "Quezon City".to_string(),
            province: "Metro Manila".to_string(),
            ..PersonalInfo::default()
        },
        family: FamilyBackground {
            mother: ParentInfo {
                skipped: false,
                first_name: "Ana".to_string(),
                last_name: "Cruz".to_string(),
                age: "47".to_string(),
                occupation: "Teacher".to_string(),
                ..ParentInfo::default()
            },
            ..FamilyBackground::default()
        },
        academic: AcademicProfile {
            elementary_school: "San Isidro Elementary".to_string(),
            elementary_year: "2019".to_string(),
            junior_high_school: "San Isidro National High".to_string(),
            junior_high_year: "2023".to_string(),
            junior_high_honors: "With Honors".to_string(),
            ..AcademicProfile::default()
        },
        emergency: EmergencyContact {
            contact_name: "Ana Cruz".to_string(),
            relationship: "Mother".to_string(),
            address: "123 Mabini St, San Isidro".to_string(),
            contact_no: "09181234567".to_string(),
        },
    }
}

fn ready_store(dir: &tempfile::TempDir) -> SqliteStore {
    let store = SqliteStore::new(dir.path().join("registrations.db"));
    store.ensure_schema().unwrap();
    store
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn save_commits_all_four_rows_with_a_generated_code() {
    let dir = tempfile::tempdir().unwrap();
    let store = ready_store(&dir);

    let saved = store.save_registration(&sample_record()).unwrap();
    assert_eq!(saved.reference_code.len(), 10);
    assert!(saved.reference_code.starts_with('R'));
    assert!(saved.student_id > 0);

    let conn = Connection::open(store.path()).unwrap();
    for table in [
        "students",
        "family_background",
        "academic_profile",
        "emergency_contacts",
    ] {
        assert_eq!(count(&conn, table), 1, "expected one row in {table}");
    }

    let (lrn, address): (String, String) = conn
        .query_row(
            "SELECT lrn, home_address FROM students WHERE student_id = ?1;",
            [saved.student_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(lrn, "136742090015");
    assert_eq!(address, "123 Mabini St, San Isidro, Quezon City, Metro Manila");
}

#[test]
fn provided_reference_code_is_reused_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let store = ready_store(&dir);

    let mut record = sample_record();
    record.personal.reference_code = Some("R12345ABCD".to_string());

    let saved = store.save_registration(&record).unwrap();
    assert_eq!(saved.reference_code, "R12345ABCD");
}

#[test]
fn duplicate_reference_code_retries_with_a_fresh_code() {
    let dir = tempfile::tempdir().unwrap();
    let store = ready_store(&dir);

    let mut first = sample_record();
    first.personal.reference_code = Some("R12345ABCD".to_string());
    store.save_registration(&first).unwrap();

    let mut second = sample_record();
    second.personal.reference_code = Some("R12345ABCD".to_string());

    let saved = store.save_registration(&second).unwrap();
    assert_ne!(saved.reference_code, "R12345ABCD");
    assert_eq!(saved.reference_code.len(), 10);

    let conn = Connection::open(store.path()).unwrap();
    assert_eq!(count(&conn, "students"), 2);
}

#[test]
fn blank_required_fields_are_stored_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = ready_store(&dir);

    let saved = store
        .save_registration(&RegistrationRecord::default())
        .unwrap();

    let conn = Connection::open(store.path()).unwrap();
    let (first_name, mobile, strand, birthday, lrn): (String, String, String, String, String) =
        conn.query_row(
            "SELECT first_name, mobile_no, strand, birthday, lrn
             FROM students WHERE student_id = ?1;",
            [saved.student_id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            },
        )
        .unwrap();
    assert_eq!(first_name, "Unknown");
    assert_eq!(mobile, "00000000000");
    assert_eq!(strand, "Undecided");
    assert_eq!(birthday, "2000-01-01");
    assert_eq!(lrn, saved.reference_code);

    let (contact_name, contact_no): (String, String) = conn
        .query_row(
            "SELECT contact_name, contact_no FROM emergency_contacts WHERE student_id = ?1;",
            [saved.student_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(contact_name, "Not specified");
    assert_eq!(contact_no, "00000000000");
}

#[test]
fn skipped_parent_leaves_every_column_blank() {
    let dir = tempfile::tempdir().unwrap();
    let store = ready_store(&dir);

    let mut record = sample_record();
    // A skipped section must win over whatever data rode along with it.
    record.family.father = ParentInfo {
        skipped: true,
        first_name: "Jose".to_string(),
        last_name: "Reyes".to_string(),
        age: "52".to_string(),
        occupation: "Driver".to_string(),
        ..ParentInfo::default()
    };

    let saved = store.save_registration(&record).unwrap();

    let conn = Connection::open(store.path()).unwrap();
    let (father_name, father_age, father_occupation, mother_name): (
        String,
        Option<i64>,
        String,
        String,
    ) = conn
        .query_row(
            "SELECT father_name, father_age, father_occupation, mother_name
             FROM family_background WHERE student_id = ?1;",
            [saved.student_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(father_name, "");
    assert_eq!(father_age, None);
    assert_eq!(father_occupation, "");
    assert_eq!(mother_name, "Ana Cruz");
}

#[test]
fn non_numeric_academic_years_are_stored_as_null() {
    let dir = tempfile::tempdir().unwrap();
    let store = ready_store(&dir);

    let mut record = sample_record();
    record.academic.elementary_year = "twenty nineteen".to_string();
    record.academic.junior_high_year = "2023".to_string();

    let saved = store.save_registration(&record).unwrap();

    let conn = Connection::open(store.path()).unwrap();
    let (elem_year, jhs_year): (Option<i64>, Option<i64>) = conn
        .query_row(
            "SELECT elem_year_graduated, jhs_year_graduated
             FROM academic_profile WHERE student_id = ?1;",
            [saved.student_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(elem_year, None);
    assert_eq!(jhs_year, Some(2023));
}

#[test]
fn failure_mid_transaction_leaves_no_partial_rows() {
    let dir = tempfile::tempdir().unwrap();
    let store = ready_store(&dir);

    // Remove the last table the transaction touches; the earlier inserts
    // must roll back with it.
    let conn = Connection::open(store.path()).unwrap();
    conn.execute_batch("DROP TABLE emergency_contacts;").unwrap();
    drop(conn);

    let err = store.save_registration(&sample_record()).unwrap_err();
    assert!(matches!(err, StoreError::SchemaMissing(_)), "got {err:?}");

    let conn = Connection::open(store.path()).unwrap();
    for table in ["students", "family_background", "academic_profile"] {
        let rows: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(rows, 0, "expected rollback to clear {table}");
    }
}
