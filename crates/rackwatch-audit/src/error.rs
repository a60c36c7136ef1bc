//! Error types for audit operations.

use rackwatch_fs::FsError;
use rackwatch_policy::PolicyError;
use rackwatch_topology::TopologyError;

/// Errors that abort an audit or convergence run.
///
/// Benign per-file conditions (deleted files, vanished directories,
/// open or corrupt files) never surface here; they are recovered inside
/// the loop. Anything that does surface is fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The metadata service failed outright.
    #[error("metadata service error: {0}")]
    Fs(#[from] FsError),

    /// No topology snapshot could be taken.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The placement policy could not be evaluated. No subsequent
    /// verdict could be trusted, so the whole run stops.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
