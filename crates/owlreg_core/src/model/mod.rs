//! Typed intake payload for one registration.
//!
//! # Responsibility
//! - Define the canonical record handed from the intake workflow to the
//!   persistence engine.
//! - Keep one shape that both backend adapters read from.
//!
//! # Invariants
//! - The engine only reads records; it never mutates the caller's data.
//! - Blank-field defaulting happens at the storage boundary, not here.

pub mod record;
