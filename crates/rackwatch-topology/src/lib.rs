//! Rack/node topology snapshot.
//!
//! [`ClusterTopology`] is built once per audit run from the membership
//! service's live-node report and never changes afterwards, even if the
//! real cluster does: every placement verdict within a run is consistent
//! "as of snapshot time". Rack lookups for nodes that were not in the
//! report fail closed to `None` — an unknown node contributes no rack to
//! diversity rather than crashing the run.

use std::collections::{HashMap, HashSet};

use rackwatch_fs::{FsError, Membership};
use rackwatch_types::{DataNodeInfo, NodeId, RackId, ReplicaLocation};
use tracing::info;

/// Errors building a topology snapshot.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// The membership service could not produce a live-node report.
    /// Fatal: no audit can run without a topology.
    #[error("cannot snapshot cluster topology: {0}")]
    Membership(#[from] FsError),
}

/// Immutable node-to-rack mapping taken at the start of a run.
#[derive(Debug, Clone)]
pub struct ClusterTopology {
    racks: HashMap<NodeId, RackId>,
    rack_count: usize,
}

impl ClusterTopology {
    /// Snapshot the topology from a live membership report.
    pub async fn snapshot(membership: &dyn Membership) -> Result<Self, TopologyError> {
        let nodes = membership.live_nodes().await?;
        let topology = Self::from_nodes(nodes);
        info!(
            nodes = topology.node_count(),
            racks = topology.rack_count(),
            "cluster topology snapshot taken"
        );
        Ok(topology)
    }

    /// Build a topology directly from node records.
    pub fn from_nodes(nodes: Vec<DataNodeInfo>) -> Self {
        let racks: HashMap<NodeId, RackId> = nodes
            .into_iter()
            .map(|n| (n.node_id, n.rack))
            .collect();
        let rack_count = racks.values().collect::<HashSet<_>>().len();
        Self { racks, rack_count }
    }

    /// Rack of a node as of snapshot time, `None` if the node was not in
    /// the live report.
    pub fn rack_of(&self, node: &NodeId) -> Option<&RackId> {
        self.racks.get(node)
    }

    /// Number of nodes in the snapshot.
    pub fn node_count(&self) -> usize {
        self.racks.len()
    }

    /// Number of distinct racks in the snapshot.
    pub fn rack_count(&self) -> usize {
        self.rack_count
    }

    /// Resolve a block's replica node list against this snapshot.
    pub fn resolve(&self, locations: &[NodeId]) -> Vec<ReplicaLocation> {
        locations
            .iter()
            .map(|node| ReplicaLocation {
                node: node.clone(),
                rack: self.rack_of(node).cloned(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> ClusterTopology {
        ClusterTopology::from_nodes(vec![
            DataNodeInfo::new("dn1:50010", "/rack1"),
            DataNodeInfo::new("dn2:50010", "/rack1"),
            DataNodeInfo::new("dn3:50010", "/rack2"),
        ])
    }

    #[test]
    fn test_rack_and_node_counts() {
        let topo = topology();
        assert_eq!(topo.node_count(), 3);
        assert_eq!(topo.rack_count(), 2);
    }

    #[test]
    fn test_unknown_node_fails_closed() {
        let topo = topology();
        assert!(topo.rack_of(&NodeId::new("stranger:50010")).is_none());

        let resolved = topo.resolve(&[NodeId::new("dn1:50010"), NodeId::new("stranger:50010")]);
        assert_eq!(resolved[0].rack, Some(RackId::new("/rack1")));
        assert_eq!(resolved[1].rack, None);
    }

    #[test]
    fn test_empty_report_gives_empty_topology() {
        let topo = ClusterTopology::from_nodes(Vec::new());
        assert_eq!(topo.node_count(), 0);
        assert_eq!(topo.rack_count(), 0);
    }

    #[tokio::test]
    async fn test_snapshot_from_membership_service() {
        let cluster = rackwatch_fs::MemoryCluster::new();
        cluster.add_node("dn1:50010", "/rack1");
        cluster.add_node("dn2:50010", "/rack2");

        let topo = ClusterTopology::snapshot(&cluster).await.unwrap();
        assert_eq!(topo.rack_count(), 2);

        cluster.set_membership_down(true);
        assert!(ClusterTopology::snapshot(&cluster).await.is_err());
    }
}
