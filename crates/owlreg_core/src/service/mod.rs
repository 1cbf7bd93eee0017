//! Save orchestration over the configured backend stores.
//!
//! # Responsibility
//! - Drive every configured store through one save request and merge the
//!   per-backend outcomes.
//! - Keep UI collaborators decoupled from adapter details.

pub mod coordinator;
