//! Dual-backend registration persistence engine.
//! This crate is the single source of truth for save semantics and the
//! partial-success policy across the embedded and networked stores.

pub mod config;
pub mod credential;
pub mod logging;
pub mod model;
pub mod refcode;
pub mod service;
pub mod store;

pub use config::{EmbeddedConfig, EngineConfig, NetworkedConfig};
pub use credential::{hash_password, verify_password};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{
    AcademicProfile, CivilStatus, EmergencyContact, EnrollmentType, FamilyBackground, ParentInfo,
    PersonalInfo, PreferredSession, RegistrationRecord,
};
pub use refcode::generate_reference_code;
pub use service::coordinator::{RegistrationCoordinator, SaveOutcome, SaveReport};
pub use store::probe::{test_connection, RetryPolicy};
pub use store::{
    Backend, MysqlStore, RegistrationStore, SavedRegistration, SqliteStore, StoreError,
    StoreResult,
};

/// Returns the engine crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
