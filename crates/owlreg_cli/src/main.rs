//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `owlreg_core` linkage.
//! - Report backend readiness for quick local sanity checks.

use owlreg_core::{EngineConfig, RegistrationCoordinator};

fn main() {
    println!("owlreg_core version={}", owlreg_core::core_version());

    let config = EngineConfig::default();
    let coordinator = RegistrationCoordinator::new(&config);
    for (backend, ready) in coordinator.check_backends() {
        println!("backend={backend} ready={ready}");
    }
}
