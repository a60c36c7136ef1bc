//! JSON cluster snapshots.
//!
//! The CLI runs against a cluster image loaded from a JSON file: the
//! live-node report plus the namespace with per-block replica locations.
//! This is the pluggable backend boundary — a client for a real metadata
//! service would implement the same `rackwatch-fs` traits the loaded
//! [`MemoryCluster`] does.
//!
//! ```json
//! {
//!   "nodes": [{ "id": "dn1:50010", "rack": "/rack1" }],
//!   "files": [
//!     {
//!       "path": "/a/f1",
//!       "replication": 3,
//!       "blocks": [{ "id": 1, "len": 134217728, "locations": ["dn1:50010"] }]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use rackwatch_fs::MemoryCluster;
use rackwatch_types::{BlockId, LocatedBlock, NodeId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ClusterSnapshot {
    nodes: Vec<SnapshotNode>,
    files: Vec<SnapshotFile>,
}

#[derive(Debug, Deserialize)]
struct SnapshotNode {
    id: String,
    rack: String,
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    path: String,
    replication: u16,
    #[serde(default)]
    under_construction: bool,
    blocks: Vec<SnapshotBlock>,
}

#[derive(Debug, Deserialize)]
struct SnapshotBlock {
    id: u64,
    #[serde(default = "default_block_len")]
    len: u64,
    #[serde(default)]
    corrupt: bool,
    locations: Vec<String>,
}

fn default_block_len() -> u64 {
    128 * 1024 * 1024
}

/// Load a cluster image from a JSON file.
pub fn load(path: &Path) -> anyhow::Result<MemoryCluster> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read snapshot {}", path.display()))?;
    from_json(&content).with_context(|| format!("malformed snapshot {}", path.display()))
}

/// Build a cluster from snapshot JSON.
pub fn from_json(json: &str) -> anyhow::Result<MemoryCluster> {
    let snapshot: ClusterSnapshot = serde_json::from_str(json)?;
    let cluster = MemoryCluster::new();

    for node in snapshot.nodes {
        cluster.add_node(node.id, node.rack);
    }
    for file in snapshot.files {
        let blocks = file
            .blocks
            .into_iter()
            .map(|b| LocatedBlock {
                id: BlockId::new(b.id),
                len: b.len,
                corrupt: b.corrupt,
                locations: b.locations.into_iter().map(NodeId::new).collect(),
            })
            .collect();
        cluster.add_file(&file.path, file.replication, blocks);
        if file.under_construction {
            cluster.set_under_construction(&file.path, true);
        }
    }
    Ok(cluster)
}
