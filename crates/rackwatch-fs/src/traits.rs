//! Core traits for talking to the cluster's metadata service.

use rackwatch_types::{BlockLookup, DataNodeInfo, FileMeta};

use crate::error::FsError;

/// Read and mutate file metadata in the remote namespace.
///
/// All implementations must be `Send + Sync` so one client can be shared
/// across the audit pipeline.
#[async_trait::async_trait]
pub trait Namespace: Send + Sync {
    /// Look up one entry. Returns `None` if the path does not exist.
    async fn stat(&self, path: &str) -> Result<Option<FileMeta>, FsError>;

    /// List the immediate children of a directory.
    ///
    /// Returns `None` when the directory no longer exists — expected
    /// during a long walk over a mutating namespace, and handled by
    /// skipping the subtree rather than failing the run.
    async fn list(&self, path: &str) -> Result<Option<Vec<FileMeta>>, FsError>;

    /// Change a file's intended replication factor.
    ///
    /// Returns `false` if the path no longer exists.
    async fn set_replication(&self, path: &str, replication: u16) -> Result<bool, FsError>;
}

/// Resolve the blocks of a file and their current replica locations.
#[async_trait::async_trait]
pub trait BlockService: Send + Sync {
    /// Fetch the located blocks covering `[offset, offset + len)` of a file.
    ///
    /// The distinction between a deleted file ([`BlockLookup::Missing`])
    /// and a file open for writing ([`BlockLookup::UnderConstruction`])
    /// matters to callers: the former is silently skipped, the latter is
    /// logged as un-auditable.
    async fn block_locations(
        &self,
        path: &str,
        offset: u64,
        len: u64,
    ) -> Result<BlockLookup, FsError>;
}

/// Report the cluster's live storage nodes and their racks.
#[async_trait::async_trait]
pub trait Membership: Send + Sync {
    /// Return every node currently considered live, with its rack.
    async fn live_nodes(&self) -> Result<Vec<DataNodeInfo>, FsError>;
}
