//! Preflight risk assessment workflows for flight school operations.
//!
//! The crate centers on a deterministic GO / CAUTION / NO-GO scoring engine
//! and the service scaffolding around it: catalog validation, response
//! validation, storage and alerting contracts, and an HTTP router.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
