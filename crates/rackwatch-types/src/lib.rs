//! Shared types and identifiers for Rackwatch.
//!
//! This crate defines all core types used across the Rackwatch workspace:
//! identifiers ([`NodeId`], [`RackId`], [`BlockId`]), namespace metadata
//! ([`FileMeta`]), block-location results ([`LocatedBlock`], [`BlockLookup`]),
//! and cluster membership records ([`DataNodeInfo`]).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID types
// ---------------------------------------------------------------------------

macro_rules! define_name_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from any string-like value.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// View the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_name_id!(
    /// Identifier for a storage node, typically `host:port`.
    NodeId
);

define_name_id!(
    /// Identifier for a fault-isolation rack, typically a topology path
    /// such as `/dc1/rack4`.
    RackId
);

/// Opaque identifier for a block of a file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(u64);

impl BlockId {
    /// Wrap a raw numeric block ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Return the raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blk_{}", self.0)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Namespace metadata
// ---------------------------------------------------------------------------

/// Metadata for one namespace entry, as returned by `stat` and `list`.
///
/// Produced transiently during a walk and discarded once the entry's
/// blocks have been evaluated; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Absolute path of the entry, `/`-separated.
    pub path: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Length of the file in bytes (0 for directories).
    pub len: u64,
    /// Intended replication factor. Always >= 1 for regular files;
    /// meaningless for directories.
    pub replication: u16,
}

impl FileMeta {
    /// Metadata for a regular file.
    pub fn file(path: impl Into<String>, len: u64, replication: u16) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            len,
            replication,
        }
    }

    /// Metadata for a directory.
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            len: 0,
            replication: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Block locations
// ---------------------------------------------------------------------------

/// One block of a file together with the nodes currently holding a replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatedBlock {
    /// Block identifier.
    pub id: BlockId,
    /// Length of the block in bytes.
    pub len: u64,
    /// Whether the metadata service has flagged this block as corrupt.
    pub corrupt: bool,
    /// Nodes holding a replica of this block. May be empty when all
    /// replicas have been lost.
    pub locations: Vec<NodeId>,
}

/// Result of a block-location lookup for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockLookup {
    /// The file no longer exists; it was deleted between listing and
    /// resolution. A normal, benign race with the walker.
    Missing,
    /// The file is open for writing. Its block list is not yet stable
    /// and must not be evaluated.
    UnderConstruction,
    /// The file's complete, ordered block list.
    Located(Vec<LocatedBlock>),
}

/// A replica of a block with its rack resolved against a topology
/// snapshot. `rack` is `None` when the hosting node was not part of the
/// snapshot (the lookup fails closed rather than crashing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaLocation {
    /// Node holding the replica.
    pub node: NodeId,
    /// Rack of that node as of snapshot time, if known.
    pub rack: Option<RackId>,
}

// ---------------------------------------------------------------------------
// Cluster membership
// ---------------------------------------------------------------------------

/// One entry of the live-node report used to build a topology snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataNodeInfo {
    /// Node identifier.
    pub node_id: NodeId,
    /// Rack the node is mounted in.
    pub rack: RackId,
}

impl DataNodeInfo {
    /// Convenience constructor.
    pub fn new(node_id: impl Into<String>, rack: impl Into<String>) -> Self {
        Self {
            node_id: NodeId::new(node_id),
            rack: RackId::new(rack),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
