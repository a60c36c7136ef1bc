//! Replica placement audit and replication convergence for Rackwatch.
//!
//! This crate provides:
//!
//! - [`Auditor`] — walks a namespace subtree, resolves every file's block
//!   locations, and checks each block against the placement policy,
//!   accumulating the set of violating files.
//! - [`ConvergenceWaiter`] — polls a set of files until every block
//!   reports exactly the target replica count, with a deadline and a
//!   cancellation signal.
//! - [`AuditReporter`] / [`WaitReporter`] — seams for the operator-facing
//!   line output, with console and silent implementations.

pub mod auditor;
pub mod error;
pub mod report;
pub mod resolver;
pub mod waiter;

pub use auditor::{AuditReport, Auditor};
pub use error::AuditError;
pub use report::{AuditReporter, ConsoleReporter, SilentReporter, WaitReporter};
pub use resolver::{resolve, Resolution};
pub use waiter::{ConvergenceOutcome, ConvergenceWaiter, WaiterConfig};
