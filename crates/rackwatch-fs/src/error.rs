//! Error types for the metadata-service boundary.

/// Errors produced by namespace, block, and membership calls.
///
/// Benign races (deleted file, vanished directory) are *not* errors;
/// they are modelled as `None`/[`BlockLookup::Missing`] return values.
/// An `FsError` means the service itself failed and the caller cannot
/// continue with the current operation.
///
/// [`BlockLookup::Missing`]: rackwatch_types::BlockLookup::Missing
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The namespace service could not be reached or returned a
    /// malformed reply. Reserved for remote backends; [`MemoryCluster`]
    /// never fails this way.
    ///
    /// [`MemoryCluster`]: crate::memory::MemoryCluster
    #[error("namespace service error: {0}")]
    Namespace(String),

    /// The block service could not be reached or returned a malformed
    /// reply. Reserved for remote backends; [`MemoryCluster`] never
    /// fails this way.
    ///
    /// [`MemoryCluster`]: crate::memory::MemoryCluster
    #[error("block service error: {0}")]
    Blocks(String),

    /// The membership service could not produce a live-node report.
    /// Fatal to an audit run: no topology snapshot can be built.
    #[error("membership report unavailable: {0}")]
    MembershipUnavailable(String),

    /// The path exists but is not the kind of entry the operation
    /// expects (e.g. `set_replication` on a directory).
    #[error("not a regular file: {0}")]
    NotAFile(String),
}
