//! Schema evolution runner for the storefront catalog database.
//!
//! Applies an ordered, idempotent sequence of forward/backward schema steps
//! against a relational store, tracking progress in a ledger table that lives
//! in the store itself. Exposed on the command line as
//! `migrate up | down | status`.
//!
//! Design constraints the modules uphold:
//! - steps check live schema state before acting and are safe to re-run;
//! - the runner alone writes the ledger, strictly after a step succeeds;
//! - application is sequential in ascending version order, rollback in
//!   descending order, and rollback past a non-revertible step is rejected
//!   before anything runs.

pub mod config;
pub mod db;
pub mod error;
pub mod inspector;
pub mod ledger;
pub mod registry;
pub mod runner;
pub mod step;
pub mod steps;

pub use error::{MigrateError, StepError};
pub use registry::StepRegistry;
pub use runner::Runner;
