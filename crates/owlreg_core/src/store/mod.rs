//! Backend storage contracts and shared result types.
//!
//! # Responsibility
//! - Define the adapter contract both backends implement.
//! - Classify driver errors into the engine's error kinds so no driver
//!   exception crosses the adapter boundary.
//!
//! # Invariants
//! - Adapter errors are values, never unhandled faults; the coordinator
//!   decides what a single backend's failure means for the whole request.
//! - A `ConstraintViolation` during save is retried exactly once with a
//!   regenerated reference code.

use crate::model::record::RegistrationRecord;
use crate::refcode::generate_reference_code;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod fields;
pub mod mysql_store;
pub mod probe;
pub mod sqlite_store;

pub use mysql_store::MysqlStore;
pub use sqlite_store::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Identity of one configured backend. Ordering is save priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Backend {
    Embedded,
    Networked,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Networked => "networked",
        }
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-backend result of one committed registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedRegistration {
    /// Code the row was actually committed under.
    pub reference_code: String,
    /// Backend-local auto-increment ID; may differ between backends.
    pub student_id: i64,
}

/// Error kinds every adapter failure collapses into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Probe or connect failed; the backend never answered.
    Unreachable(String),
    /// Expected database or tables are absent.
    SchemaMissing(String),
    /// A uniqueness constraint rejected the write.
    ConstraintViolation(String),
    /// Any other failure inside the atomic insert.
    WriteFailed(String),
    /// A step exceeded its bound.
    Timeout(String),
}

impl StoreError {
    /// Stable kind token for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "unreachable",
            Self::SchemaMissing(_) => "schema_missing",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::WriteFailed(_) => "write_failed",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable(detail) => write!(f, "backend unreachable: {detail}"),
            Self::SchemaMissing(detail) => write!(f, "schema missing: {detail}"),
            Self::ConstraintViolation(detail) => write!(f, "constraint violation: {detail}"),
            Self::WriteFailed(detail) => write!(f, "write failed: {detail}"),
            Self::Timeout(detail) => write!(f, "timed out: {detail}"),
        }
    }
}

impl Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        let detail = value.to_string();
        match value {
            rusqlite::Error::SqliteFailure(code, _) => {
                // "no such table" surfaces as a generic error code; the
                // message is the only reliable signal.
                if detail.contains("no such table") {
                    return Self::SchemaMissing(detail);
                }
                match code.code {
                    rusqlite::ErrorCode::ConstraintViolation => Self::ConstraintViolation(detail),
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                        Self::Timeout(detail)
                    }
                    rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::NotADatabase
                    | rusqlite::ErrorCode::PermissionDenied
                    | rusqlite::ErrorCode::SystemIoFailure => Self::Unreachable(detail),
                    _ => Self::WriteFailed(detail),
                }
            }
            _ => Self::WriteFailed(detail),
        }
    }
}

impl From<mysql::Error> for StoreError {
    fn from(value: mysql::Error) -> Self {
        match value {
            mysql::Error::MySqlError(server) => {
                classify_server_error(server.code, server.to_string())
            }
            mysql::Error::IoError(io) => match io.kind() {
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                    Self::Timeout(io.to_string())
                }
                _ => Self::Unreachable(io.to_string()),
            },
            mysql::Error::DriverError(driver) => match driver {
                mysql::error::DriverError::ConnectTimeout => Self::Timeout(driver.to_string()),
                mysql::error::DriverError::CouldNotConnect(_) => {
                    Self::Unreachable(driver.to_string())
                }
                _ => Self::WriteFailed(driver.to_string()),
            },
            other => Self::WriteFailed(other.to_string()),
        }
    }
}

const ER_DUP_ENTRY: u16 = 1062;
const ER_BAD_DB: u16 = 1049;
const ER_NO_SUCH_TABLE: u16 = 1146;
const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;

fn classify_server_error(code: u16, detail: String) -> StoreError {
    match code {
        ER_DUP_ENTRY => StoreError::ConstraintViolation(detail),
        ER_BAD_DB | ER_NO_SUCH_TABLE => StoreError::SchemaMissing(detail),
        ER_LOCK_WAIT_TIMEOUT => StoreError::Timeout(detail),
        _ => StoreError::WriteFailed(detail),
    }
}

/// Contract every backend adapter implements.
///
/// Each call owns its own connection and releases it on every exit path;
/// in-flight transactions roll back when dropped without a commit.
pub trait RegistrationStore {
    /// Stable identity for outcome maps and log fields.
    fn backend(&self) -> Backend;

    /// Idempotently creates the database (networked backend) and all four
    /// tables if absent. Never drops or destructively alters anything;
    /// safe to call on every process start.
    fn ensure_schema(&self) -> StoreResult<()>;

    /// Cheap readiness check. `false` means the backend needs repair or is
    /// unreachable; callers decide whether to attempt self-repair.
    fn probe(&self) -> bool;

    /// Persists the whole record as one atomic transaction, reusing the
    /// record's reference code when present.
    fn save_registration(&self, record: &RegistrationRecord) -> StoreResult<SavedRegistration>;
}

/// Runs one insert attempt under the record's reference code (or a fresh
/// one), retrying exactly once with a regenerated code when the first
/// attempt hits a uniqueness violation.
pub(crate) fn insert_with_code_retry<F>(
    backend: Backend,
    record: &RegistrationRecord,
    mut insert: F,
) -> StoreResult<SavedRegistration>
where
    F: FnMut(&str) -> StoreResult<SavedRegistration>,
{
    let reference_code = record
        .personal
        .reference_code
        .clone()
        .filter(|code| !code.is_empty())
        .unwrap_or_else(generate_reference_code);

    match insert(&reference_code) {
        Err(StoreError::ConstraintViolation(detail)) => {
            warn!(
                "event=reference_code_retry module=store backend={backend} status=retry error={detail}"
            );
            insert(&generate_reference_code())
        }
        other => other,
    }
}
