//! End-to-end test utilities
//!
//! Spawns the REST API and the push gateway in-process against the
//! PostgreSQL and Redis named by the environment.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
