//! Embedded SQLite registration store.
//!
//! # Responsibility
//! - Own the embedded database file: connection bootstrap, idempotent
//!   schema creation, and the transactional four-table insert.
//!
//! # Invariants
//! - Connections are opened per call and released on every exit path.
//! - Detail rows exist only when the whole registration committed;
//!   `foreign_keys=ON` keeps the cascade contract enforceable.

use crate::model::record::RegistrationRecord;
use crate::store::{
    fields, insert_with_code_retry, Backend, RegistrationStore, SavedRegistration, StoreResult,
};
use log::{info, warn};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_STUDENTS_SQL: &str = "CREATE TABLE IF NOT EXISTS students (
    student_id INTEGER PRIMARY KEY AUTOINCREMENT,
    reference_code TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    middle_name TEXT,
    last_name TEXT NOT NULL,
    extension TEXT,
    lrn TEXT NOT NULL,
    enrollment_type TEXT NOT NULL,
    strand TEXT NOT NULL,
    preferred_session TEXT NOT NULL,
    birthday TEXT NOT NULL,
    civil_status TEXT NOT NULL,
    religion TEXT,
    mobile_no TEXT NOT NULL,
    telephone_no TEXT,
    ethnicity TEXT,
    home_address TEXT NOT NULL,
    created_at TEXT NOT NULL
);";

const CREATE_FAMILY_SQL: &str = "CREATE TABLE IF NOT EXISTS family_background (
    family_id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL,
    father_name TEXT,
    father_age INTEGER,
    father_ethnicity TEXT,
    father_occupation TEXT,
    father_education TEXT,
    mother_name TEXT,
    mother_age INTEGER,
    mother_ethnicity TEXT,
    mother_occupation TEXT,
    mother_education TEXT,
    guardian_name TEXT,
    guardian_age INTEGER,
    guardian_ethnicity TEXT,
    guardian_occupation TEXT,
    guardian_education TEXT,
    guardian_contact TEXT,
    FOREIGN KEY (student_id) REFERENCES students(student_id) ON DELETE CASCADE
);";

const CREATE_ACADEMIC_SQL: &str = "CREATE TABLE IF NOT EXISTS academic_profile (
    academic_id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL,
    elementary_school TEXT,
    elem_year_graduated INTEGER,
    elem_honors TEXT,
    juniorhs_school TEXT,
    jhs_year_graduated INTEGER,
    jhs_honors TEXT,
    FOREIGN KEY (student_id) REFERENCES students(student_id) ON DELETE CASCADE
);";

const CREATE_EMERGENCY_SQL: &str = "CREATE TABLE IF NOT EXISTS emergency_contacts (
    emergency_id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL,
    contact_name TEXT NOT NULL,
    relationship TEXT NOT NULL,
    address TEXT NOT NULL,
    contact_no TEXT NOT NULL,
    FOREIGN KEY (student_id) REFERENCES students(student_id) ON DELETE CASCADE
);";

const INSERT_STUDENT_SQL: &str = "INSERT INTO students (
    reference_code, first_name, middle_name, last_name, extension,
    lrn, enrollment_type, strand, preferred_session,
    birthday, civil_status, religion, mobile_no, telephone_no,
    ethnicity, home_address, created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);";

const INSERT_FAMILY_SQL: &str = "INSERT INTO family_background (
    student_id, father_name, father_age, father_ethnicity,
    father_occupation, father_education, mother_name,
    mother_age, mother_ethnicity, mother_occupation,
    mother_education, guardian_name, guardian_age,
    guardian_ethnicity, guardian_occupation, guardian_education,
    guardian_contact
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);";

const INSERT_ACADEMIC_SQL: &str = "INSERT INTO academic_profile (
    student_id, elementary_school, elem_year_graduated,
    elem_honors, juniorhs_school, jhs_year_graduated, jhs_honors
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);";

const INSERT_EMERGENCY_SQL: &str = "INSERT INTO emergency_contacts (
    student_id, contact_name, relationship, address, contact_no
) VALUES (?1, ?2, ?3, ?4, ?5);";

/// Embedded store backed by a single SQLite database file.
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    fn insert_registration(
        &self,
        record: &RegistrationRecord,
        reference_code: &str,
    ) -> StoreResult<SavedRegistration> {
        let student = fields::student_row(&record.personal, reference_code);
        let family = fields::family_row(&record.family);
        let academic = fields::academic_row(&record.academic);
        let emergency = fields::emergency_row(&record.emergency);

        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        tx.execute(
            INSERT_STUDENT_SQL,
            params![
                student.reference_code,
                student.first_name,
                student.middle_name,
                student.last_name,
                student.extension,
                student.lrn,
                student.enrollment_type,
                student.strand,
                student.preferred_session,
                student.birthday,
                student.civil_status,
                student.religion,
                student.mobile_no,
                student.telephone_no,
                student.ethnicity,
                student.home_address,
                fields::registration_timestamp(),
            ],
        )?;
        let student_id = tx.last_insert_rowid();

        tx.execute(
            INSERT_FAMILY_SQL,
            params![
                student_id,
                family.father.name,
                family.father.age,
                family.father.ethnicity,
                family.father.occupation,
                family.father.education,
                family.mother.name,
                family.mother.age,
                family.mother.ethnicity,
                family.mother.occupation,
                family.mother.education,
                family.guardian.name,
                family.guardian.age,
                family.guardian.ethnicity,
                family.guardian.occupation,
                family.guardian.education,
                family.guardian.contact,
            ],
        )?;

        tx.execute(
            INSERT_ACADEMIC_SQL,
            params![
                student_id,
                academic.elementary_school,
                academic.elementary_year,
                academic.elementary_honors,
                academic.junior_high_school,
                academic.junior_high_year,
                academic.junior_high_honors,
            ],
        )?;

        tx.execute(
            INSERT_EMERGENCY_SQL,
            params![
                student_id,
                emergency.contact_name,
                emergency.relationship,
                emergency.address,
                emergency.contact_no,
            ],
        )?;

        tx.commit()?;
        Ok(SavedRegistration {
            reference_code: student.reference_code,
            student_id,
        })
    }
}

impl RegistrationStore for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Embedded
    }

    fn ensure_schema(&self) -> StoreResult<()> {
        let started_at = Instant::now();
        let conn = self.open()?;
        conn.execute_batch(&format!(
            "{CREATE_STUDENTS_SQL}{CREATE_FAMILY_SQL}{CREATE_ACADEMIC_SQL}{CREATE_EMERGENCY_SQL}"
        ))?;
        info!(
            "event=schema_bootstrap module=store backend=embedded status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn probe(&self) -> bool {
        let Ok(conn) = Connection::open(&self.path) else {
            return false;
        };
        if conn
            .query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))
            .is_err()
        {
            return false;
        }
        // Readiness includes the students table, so a fresh or empty file
        // reports false and gets routed through schema self-repair.
        table_exists(&conn, "students")
    }

    fn save_registration(&self, record: &RegistrationRecord) -> StoreResult<SavedRegistration> {
        let started_at = Instant::now();
        let result = insert_with_code_retry(Backend::Embedded, record, |code| {
            self.insert_registration(record, code)
        });

        match &result {
            Ok(saved) => info!(
                "event=registration_save module=store backend=embedded status=ok duration_ms={} reference_code={} student_id={}",
                started_at.elapsed().as_millis(),
                saved.reference_code,
                saved.student_id
            ),
            Err(err) => warn!(
                "event=registration_save module=store backend=embedded status=error duration_ms={} error_kind={} error={}",
                started_at.elapsed().as_millis(),
                err.kind(),
                err
            ),
        }
        result
    }
}

fn table_exists(conn: &Connection, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        [name],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count > 0)
    .unwrap_or(false)
}
