//! Dual-backend save coordination.
//!
//! # Responsibility
//! - Run one save request against every configured store in priority
//!   order and merge the outcomes under the partial-success policy.
//! - Propagate the first committed reference code to later stores.
//!
//! # Invariants
//! - Store writes are strictly sequential; a later store sees the code
//!   the earlier store actually committed.
//! - One store's failure never prevents attempting the next store.
//! - The overall request fails only when every store failed.

use crate::config::EngineConfig;
use crate::model::record::RegistrationRecord;
use crate::store::probe::{test_connection, RetryPolicy};
use crate::store::{
    Backend, MysqlStore, RegistrationStore, SavedRegistration, SqliteStore, StoreError,
};
use log::{info, warn};
use std::collections::BTreeMap;

/// One backend's result for one save request.
pub type SaveOutcome = Result<SavedRegistration, StoreError>;

/// Merged result of one save request across all configured backends.
#[derive(Debug)]
pub struct SaveReport {
    outcomes: BTreeMap<Backend, SaveOutcome>,
}

impl SaveReport {
    /// True when at least one backend committed.
    pub fn success(&self) -> bool {
        self.outcomes.values().any(Result::is_ok)
    }

    /// Reference code from the first successful backend in priority order.
    pub fn reference_code(&self) -> Option<&str> {
        self.first_saved().map(|saved| saved.reference_code.as_str())
    }

    /// Backend-local student ID from the first successful backend.
    pub fn student_id(&self) -> Option<i64> {
        self.first_saved().map(|saved| saved.student_id)
    }

    pub fn outcome(&self, backend: Backend) -> Option<&SaveOutcome> {
        self.outcomes.get(&backend)
    }

    pub fn outcomes(&self) -> &BTreeMap<Backend, SaveOutcome> {
        &self.outcomes
    }

    /// Most specific error across backends, for display when the whole
    /// request failed. Unreachable is the least informative kind, so any
    /// richer failure wins over it.
    pub fn first_error(&self) -> Option<&StoreError> {
        self.outcomes
            .values()
            .filter_map(|outcome| outcome.as_ref().err())
            .min_by_key(|err| error_specificity(err))
    }

    fn first_saved(&self) -> Option<&SavedRegistration> {
        self.outcomes
            .values()
            .filter_map(|outcome| outcome.as_ref().ok())
            .next()
    }
}

fn error_specificity(err: &StoreError) -> u8 {
    match err {
        StoreError::ConstraintViolation(_) => 0,
        StoreError::SchemaMissing(_) => 1,
        StoreError::WriteFailed(_) => 2,
        StoreError::Timeout(_) => 3,
        StoreError::Unreachable(_) => 4,
    }
}

/// Orchestrates the configured stores for save requests.
///
/// Construct one at process start and hand it to whichever component
/// needs it; there is no ambient instance.
pub struct RegistrationCoordinator {
    stores: Vec<Box<dyn RegistrationStore>>,
    probe_policy: RetryPolicy,
}

impl RegistrationCoordinator {
    /// Builds the default embedded-then-networked store pair.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_stores(vec![
            Box::new(SqliteStore::new(&config.embedded.file_path)),
            Box::new(MysqlStore::new(config.networked.clone())),
        ])
    }

    /// Uses a caller-provided store set; priority follows vector order.
    pub fn with_stores(stores: Vec<Box<dyn RegistrationStore>>) -> Self {
        Self {
            stores,
            probe_policy: RetryPolicy::default(),
        }
    }

    pub fn with_probe_policy(mut self, policy: RetryPolicy) -> Self {
        self.probe_policy = policy;
        self
    }

    /// Startup readiness check: bounded retry plus schema self-repair per
    /// store.
    pub fn check_backends(&self) -> BTreeMap<Backend, bool> {
        self.stores
            .iter()
            .map(|store| {
                (
                    store.backend(),
                    test_connection(store.as_ref(), self.probe_policy),
                )
            })
            .collect()
    }

    /// Saves one registration to every configured store.
    ///
    /// The record itself is never mutated; code propagation happens on a
    /// working copy, and the assigned code is reported back through the
    /// returned [`SaveReport`].
    pub fn save(&self, record: &RegistrationRecord) -> SaveReport {
        let mut working = record.clone();
        let mut outcomes = BTreeMap::new();

        info!(
            "event=registration_save module=coordinator status=start stores={}",
            self.stores.len()
        );

        for store in &self.stores {
            let backend = store.backend();

            if !store.probe() {
                warn!("event=backend_probe module=coordinator backend={backend} status=error");
                // Self-repair covers the database-not-yet-created case; the
                // save itself surfaces whatever problem remains.
                if let Err(err) = store.ensure_schema() {
                    warn!(
                        "event=schema_repair module=coordinator backend={backend} status=error error_kind={} error={err}",
                        err.kind()
                    );
                }
            }

            let outcome = store.save_registration(&working);
            match &outcome {
                Ok(saved) => {
                    let offered = working.personal.reference_code.as_deref();
                    match offered {
                        None | Some("") => {
                            working.personal.reference_code = Some(saved.reference_code.clone());
                        }
                        Some(code) if code != saved.reference_code => {
                            // Accepted inconsistency: this store could not
                            // reuse the offered code and committed its own.
                            warn!(
                                "event=reference_code_divergence module=coordinator backend={backend} offered={code} committed={}",
                                saved.reference_code
                            );
                        }
                        Some(_) => {}
                    }
                }
                Err(err) => {
                    warn!(
                        "event=backend_save module=coordinator backend={backend} status=error error_kind={}",
                        err.kind()
                    );
                }
            }
            outcomes.insert(backend, outcome);
        }

        let report = SaveReport { outcomes };
        match report.reference_code() {
            Some(code) => info!(
                "event=registration_save module=coordinator status=ok reference_code={code}"
            ),
            None => warn!(
                "event=registration_save module=coordinator status=error detail=all_backends_failed"
            ),
        }
        report
    }
}
