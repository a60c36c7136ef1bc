//! Client boundary to the cluster's metadata service.
//!
//! This crate provides:
//!
//! - [`Namespace`], [`BlockService`], [`Membership`] — the abstract
//!   contracts Rackwatch consumes. Connection setup to a real cluster
//!   lives behind these traits; the audit core never sees a wire format.
//! - [`Walker`] — iterative depth-first traversal of a namespace subtree,
//!   tolerant of concurrent mutation.
//! - [`MemoryCluster`] — an in-memory implementation of all three traits,
//!   used by tests and by the snapshot-file backend of the CLI.

pub mod error;
pub mod memory;
pub mod traits;
pub mod walker;

pub use error::FsError;
pub use memory::MemoryCluster;
pub use traits::{BlockService, Membership, Namespace};
pub use walker::Walker;

#[cfg(test)]
mod tests;
