//! Networked MySQL registration store.
//!
//! # Responsibility
//! - Own the networked backend: transport-level probing, database and
//!   table bootstrap, and the transactional four-table insert.
//!
//! # Invariants
//! - A raw TCP reachability check runs before any authenticated connect,
//!   so a dead server fails in seconds instead of a full driver timeout.
//! - Connections are opened per call and released on every exit path;
//!   an uncommitted transaction rolls back when dropped.

use crate::config::NetworkedConfig;
use crate::model::record::RegistrationRecord;
use crate::refcode::unix_seconds;
use crate::store::{
    fields, insert_with_code_retry, Backend, RegistrationStore, SavedRegistration, StoreError,
    StoreResult,
};
use log::{info, warn};
use mysql::prelude::Queryable;
use mysql::{params, Conn, Opts, OptsBuilder, TxOpts};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

const TCP_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const STATEMENT_TIMEOUT: Duration = Duration::from_secs(30);

const CREATE_STUDENTS_SQL: &str = "CREATE TABLE IF NOT EXISTS students (
    student_id INT AUTO_INCREMENT PRIMARY KEY,
    reference_code VARCHAR(10) NOT NULL UNIQUE,
    first_name VARCHAR(50) NOT NULL,
    middle_name VARCHAR(50) DEFAULT NULL,
    last_name VARCHAR(50) NOT NULL,
    extension VARCHAR(10) DEFAULT NULL,
    lrn VARCHAR(100) NOT NULL UNIQUE,
    enrollment_type ENUM('Freshmen','Transferee') NOT NULL,
    strand VARCHAR(50) NOT NULL,
    preferred_session ENUM('Morning','Afternoon') NOT NULL,
    birthday DATE NOT NULL,
    civil_status ENUM('Single','Married','Other') DEFAULT 'Single',
    religion VARCHAR(50) DEFAULT NULL,
    mobile_no VARCHAR(20) NOT NULL,
    telephone_no VARCHAR(20) DEFAULT NULL,
    ethnicity VARCHAR(50) DEFAULT NULL,
    home_address TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
)";

const CREATE_FAMILY_SQL: &str = "CREATE TABLE IF NOT EXISTS family_background (
    family_id INT AUTO_INCREMENT PRIMARY KEY,
    student_id INT NOT NULL,
    father_name VARCHAR(100) DEFAULT NULL,
    father_age INT DEFAULT NULL,
    father_ethnicity VARCHAR(50) DEFAULT NULL,
    father_occupation VARCHAR(100) DEFAULT NULL,
    father_education VARCHAR(100) DEFAULT NULL,
    mother_name VARCHAR(100) DEFAULT NULL,
    mother_age INT DEFAULT NULL,
    mother_ethnicity VARCHAR(50) DEFAULT NULL,
    mother_occupation VARCHAR(100) DEFAULT NULL,
    mother_education VARCHAR(100) DEFAULT NULL,
    guardian_name VARCHAR(100) DEFAULT NULL,
    guardian_age INT DEFAULT NULL,
    guardian_ethnicity VARCHAR(50) DEFAULT NULL,
    guardian_occupation VARCHAR(100) DEFAULT NULL,
    guardian_education VARCHAR(100) DEFAULT NULL,
    guardian_contact VARCHAR(20) DEFAULT NULL,
    FOREIGN KEY (student_id) REFERENCES students(student_id) ON DELETE CASCADE
)";

const CREATE_ACADEMIC_SQL: &str = "CREATE TABLE IF NOT EXISTS academic_profile (
    academic_id INT AUTO_INCREMENT PRIMARY KEY,
    student_id INT NOT NULL,
    elementary_school VARCHAR(150) DEFAULT NULL,
    elem_year_graduated YEAR DEFAULT NULL,
    elem_honors VARCHAR(100) DEFAULT NULL,
    juniorhs_school VARCHAR(150) DEFAULT NULL,
    jhs_year_graduated YEAR DEFAULT NULL,
    jhs_honors VARCHAR(100) DEFAULT NULL,
    FOREIGN KEY (student_id) REFERENCES students(student_id) ON DELETE CASCADE
)";

const CREATE_EMERGENCY_SQL: &str = "CREATE TABLE IF NOT EXISTS emergency_contacts (
    emergency_id INT AUTO_INCREMENT PRIMARY KEY,
    student_id INT NOT NULL,
    contact_name VARCHAR(100) NOT NULL,
    relationship VARCHAR(50) NOT NULL,
    address TEXT NOT NULL,
    contact_no VARCHAR(20) NOT NULL,
    FOREIGN KEY (student_id) REFERENCES students(student_id) ON DELETE CASCADE
)";

const INSERT_STUDENT_SQL: &str = "INSERT INTO students (
    reference_code, first_name, middle_name, last_name, extension,
    lrn, enrollment_type, strand, preferred_session,
    birthday, civil_status, religion, mobile_no, telephone_no,
    ethnicity, home_address
) VALUES (
    :reference_code, :first_name, :middle_name, :last_name, :extension,
    :lrn, :enrollment_type, :strand, :preferred_session,
    :birthday, :civil_status, :religion, :mobile_no, :telephone_no,
    :ethnicity, :home_address
)";

const INSERT_FAMILY_SQL: &str = "INSERT INTO family_background (
    student_id, father_name, father_age, father_ethnicity,
    father_occupation, father_education, mother_name,
    mother_age, mother_ethnicity, mother_occupation,
    mother_education, guardian_name, guardian_age,
    guardian_ethnicity, guardian_occupation, guardian_education,
    guardian_contact
) VALUES (
    :student_id, :father_name, :father_age, :father_ethnicity,
    :father_occupation, :father_education, :mother_name,
    :mother_age, :mother_ethnicity, :mother_occupation,
    :mother_education, :guardian_name, :guardian_age,
    :guardian_ethnicity, :guardian_occupation, :guardian_education,
    :guardian_contact
)";

const INSERT_ACADEMIC_SQL: &str = "INSERT INTO academic_profile (
    student_id, elementary_school, elem_year_graduated,
    elem_honors, juniorhs_school, jhs_year_graduated, jhs_honors
) VALUES (
    :student_id, :elementary_school, :elem_year_graduated,
    :elem_honors, :juniorhs_school, :jhs_year_graduated, :jhs_honors
)";

const INSERT_EMERGENCY_SQL: &str = "INSERT INTO emergency_contacts (
    student_id, contact_name, relationship, address, contact_no
) VALUES (:student_id, :contact_name, :relationship, :address, :contact_no)";

/// Networked store backed by a MySQL server.
pub struct MysqlStore {
    config: NetworkedConfig,
}

impl MysqlStore {
    pub fn new(config: NetworkedConfig) -> Self {
        Self { config }
    }

    fn opts(&self, with_database: bool) -> Opts {
        let mut builder = OptsBuilder::new()
            .ip_or_hostname(Some(self.config.host.clone()))
            .tcp_port(self.config.port)
            .user(Some(self.config.user.clone()))
            .pass(Some(self.config.password.clone()))
            .tcp_connect_timeout(Some(self.config.connect_timeout()))
            .read_timeout(Some(STATEMENT_TIMEOUT))
            .write_timeout(Some(STATEMENT_TIMEOUT));
        if with_database {
            builder = builder.db_name(Some(self.config.database.clone()));
        }
        Opts::from(builder)
    }

    fn connect(&self) -> StoreResult<Conn> {
        Ok(Conn::new(self.opts(true))?)
    }

    /// Server-level connection with no database selected; used to create
    /// the database itself.
    fn connect_server(&self) -> StoreResult<Conn> {
        Ok(Conn::new(self.opts(false))?)
    }

    fn tcp_reachable(&self) -> bool {
        let Ok(addrs) = (self.config.host.as_str(), self.config.port).to_socket_addrs() else {
            return false;
        };
        for addr in addrs {
            if TcpStream::connect_timeout(&addr, TCP_PROBE_TIMEOUT).is_ok() {
                return true;
            }
        }
        false
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

        // This schema declares lrn UNIQUE; a timestamp suffix keeps repeat
        // submissions carrying the same learner number insertable.
        let lrn = format!("{}_{}", student.lrn, unix_seconds());

        let mut conn = self.connect()?;
        let mut tx = conn.start_transaction(TxOpts::default())?;

        tx.exec_drop(
            INSERT_STUDENT_SQL,
            params! {
                "reference_code" => student.reference_code.as_str(),
                "first_name" => student.first_name.as_str(),
                "middle_name" => student.middle_name.as_str(),
                "last_name" => student.last_name.as_str(),
                "extension" => student.extension.as_str(),
                "lrn" => lrn.as_str(),
                "enrollment_type" => student.enrollment_type,
                "strand" => student.strand.as_str(),
                "preferred_session" => student.preferred_session,
                "birthday" => student.birthday.as_str(),
                "civil_status" => student.civil_status,
                "religion" => student.religion.as_str(),
                "mobile_no" => student.mobile_no.as_str(),
                "telephone_no" => student.telephone_no.as_str(),
                "ethnicity" => student.ethnicity.as_str(),
                "home_address" => student.home_address.as_str(),
            },
        )?;
        let student_id = tx
            .last_insert_id()
            .map(|id| id as i64)
            .ok_or_else(|| StoreError::WriteFailed("students insert returned no id".to_string()))?;

        tx.exec_drop(
            INSERT_FAMILY_SQL,
            params! {
                "student_id" => student_id,
                "father_name" => family.father.name.as_str(),
                "father_age" => family.father.age,
                "father_ethnicity" => family.father.ethnicity.as_str(),
                "father_occupation" => family.father.occupation.as_str(),
                "father_education" => family.father.education.as_str(),
                "mother_name" => family.mother.name.as_str(),
                "mother_age" => family.mother.age,
                "mother_ethnicity" => family.mother.ethnicity.as_str(),
                "mother_occupation" => family.mother.occupation.as_str(),
                "mother_education" => family.mother.education.as_str(),
                "guardian_name" => family.guardian.name.as_str(),
                "guardian_age" => family.guardian.age,
                "guardian_ethnicity" => family.guardian.ethnicity.as_str(),
                "guardian_occupation" => family.guardian.occupation.as_str(),
                "guardian_education" => family.guardian.education.as_str(),
                "guardian_contact" => family.guardian.contact.as_str(),
            },
        )?;

        tx.exec_drop(
            INSERT_ACADEMIC_SQL,
            params! {
                "student_id" => student_id,
                "elementary_school" => academic.elementary_school.as_str(),
                "elem_year_graduated" => academic.elementary_year,
                "elem_honors" => academic.elementary_honors.as_str(),
                "juniorhs_school" => academic.junior_high_school.as_str(),
                "jhs_year_graduated" => academic.junior_high_year,
                "jhs_honors" => academic.junior_high_honors.as_str(),
            },
        )?;

        tx.exec_drop(
            INSERT_EMERGENCY_SQL,
            params! {
                "student_id" => student_id,
                "contact_name" => emergency.contact_name.as_str(),
                "relationship" => emergency.relationship.as_str(),
                "address" => emergency.address.as_str(),
                "contact_no" => emergency.contact_no.as_str(),
            },
        )?;

        tx.commit()?;
        Ok(SavedRegistration {
            reference_code: student.reference_code,
            student_id,
        })
    }
}

impl RegistrationStore for MysqlStore {
    fn backend(&self) -> Backend {
        Backend::Networked
    }

    fn ensure_schema(&self) -> StoreResult<()> {
        let started_at = Instant::now();
        if !is_safe_database_name(&self.config.database) {
            return Err(StoreError::WriteFailed(format!(
                "database name `{}` is not a plain identifier",
                self.config.database
            )));
        }

        let mut server = self.connect_server()?;
        server.query_drop(format!(
            "CREATE DATABASE IF NOT EXISTS {}",
            self.config.database
        ))?;
        drop(server);

        let mut conn = self.connect()?;
        conn.query_drop(CREATE_STUDENTS_SQL)?;
        conn.query_drop(CREATE_FAMILY_SQL)?;
        conn.query_drop(CREATE_ACADEMIC_SQL)?;
        conn.query_drop(CREATE_EMERGENCY_SQL)?;

        info!(
            "event=schema_bootstrap module=store backend=networked status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn probe(&self) -> bool {
        if !self.tcp_reachable() {
            return false;
        }
        // Full readiness: authenticated connect with the database selected
        // plus the students table answering. A missing database or table
        // reports false and gets routed through schema self-repair.
        let Ok(mut conn) = Conn::new(self.opts(true)) else {
            return false;
        };
        conn.query_drop("SELECT 1 FROM students LIMIT 1").is_ok()
    }

    fn save_registration(&self, record: &RegistrationRecord) -> StoreResult<SavedRegistration> {
        let started_at = Instant::now();
        let result = insert_with_code_retry(Backend::Networked, record, |code| {
            self.insert_registration(record, code)
        });

        match &result {
            Ok(saved) => info!(
                "event=registration_save module=store backend=networked status=ok duration_ms={} reference_code={} student_id={}",
                started_at.elapsed().as_millis(),
                saved.reference_code,
                saved.student_id
            ),
            Err(err) => warn!(
                "event=registration_save module=store backend=networked status=error duration_ms={} error_kind={} error={}",
                started_at.elapsed().as_millis(),
                err.kind(),
                err
            ),
        }
        result
    }
}

fn is_safe_database_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::is_safe_database_name;

    #[test]
    fn database_names_are_restricted_to_plain_identifiers() {
        assert!(is_safe_database_name("owlreg"));
        assert!(is_safe_database_name("owlreg_2026"));
        assert!(!is_safe_database_name(""));
        assert!(!is_safe_database_name("owlreg; DROP TABLE students"));
        assert!(!is_safe_database_name("owl-reg"));
    }
}
