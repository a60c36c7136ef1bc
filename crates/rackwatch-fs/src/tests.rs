//! Tests for the rackwatch-fs crate.

#[cfg(test)]
mod tests {
    use rackwatch_types::{BlockId, BlockLookup, LocatedBlock, NodeId};

    use crate::memory::MemoryCluster;
    use crate::traits::{BlockService, Membership, Namespace};
    use crate::walker::Walker;

    // -----------------------------------------------------------------------
    // Test helpers
    // -----------------------------------------------------------------------

    fn block(id: u64, nodes: &[&str]) -> LocatedBlock {
        LocatedBlock {
            id: BlockId::new(id),
            len: 64 * 1024 * 1024,
            corrupt: false,
            locations: nodes.iter().map(|n| NodeId::new(*n)).collect(),
        }
    }

    /// Three files across two directories, plus an empty directory.
    fn sample_cluster() -> MemoryCluster {
        let cluster = MemoryCluster::new();
        cluster.add_node("dn1:50010", "/rack1");
        cluster.add_node("dn2:50010", "/rack2");
        cluster.add_file("/a/f1", 3, vec![block(1, &["dn1:50010", "dn2:50010"])]);
        cluster.add_file("/a/f2", 1, vec![block(2, &["dn1:50010"])]);
        cluster.add_file("/b/c/f3", 2, vec![block(3, &["dn2:50010"])]);
        cluster.add_file("/d/.keep", 1, vec![]);
        cluster.remove("/d/.keep");
        cluster
    }

    async fn walk_all(cluster: &MemoryCluster, root: &str) -> Vec<String> {
        let mut walker = Walker::open(cluster, root).await.unwrap();
        let mut paths = Vec::new();
        while let Some(file) = walker.next().await.unwrap() {
            assert!(!file.is_dir, "walker yielded directory {}", file.path);
            paths.push(file.path);
        }
        paths
    }

    // -----------------------------------------------------------------------
    // Walker
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_walker_yields_every_file_exactly_once() {
        let cluster = sample_cluster();
        let mut paths = walk_all(&cluster, "/").await;
        paths.sort();
        assert_eq!(paths, vec!["/a/f1", "/a/f2", "/b/c/f3"]);
    }

    #[tokio::test]
    async fn test_walker_never_yields_directories() {
        let cluster = sample_cluster();
        // walk_all asserts !is_dir for each yielded entry; the empty /d
        // directory must simply produce nothing.
        let paths = walk_all(&cluster, "/d").await;
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_walker_missing_root_yields_nothing() {
        let cluster = sample_cluster();
        let paths = walk_all(&cluster, "/nope").await;
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn test_walker_subtree_only() {
        let cluster = sample_cluster();
        let paths = walk_all(&cluster, "/b").await;
        assert_eq!(paths, vec!["/b/c/f3"]);
    }

    #[tokio::test]
    async fn test_walker_skips_directory_that_vanishes_mid_walk() {
        let cluster = sample_cluster();
        let mut walker = Walker::open(&cluster, "/").await.unwrap();

        // Pull one file, then delete the /b subtree while the walk is in
        // flight. The walk must finish without error and without /b files.
        let first = walker.next().await.unwrap().unwrap();
        cluster.remove("/b");

        let mut rest = Vec::new();
        while let Some(file) = walker.next().await.unwrap() {
            rest.push(file.path);
        }
        for path in std::iter::once(&first.path).chain(rest.iter()) {
            assert!(!path.starts_with("/b/"), "walked into removed dir: {path}");
        }
    }

    // -----------------------------------------------------------------------
    // MemoryCluster as Namespace / BlockService / Membership
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_stat_and_set_replication() {
        let cluster = sample_cluster();
        let meta = cluster.stat("/a/f1").await.unwrap().unwrap();
        assert_eq!(meta.replication, 3);

        assert!(cluster.set_replication("/a/f1", 5).await.unwrap());
        let meta = cluster.stat("/a/f1").await.unwrap().unwrap();
        assert_eq!(meta.replication, 5);

        // Missing path reports failure rather than erroring.
        assert!(!cluster.set_replication("/gone", 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_block_locations_missing_and_under_construction() {
        let cluster = sample_cluster();
        assert_eq!(
            cluster.block_locations("/gone", 0, 1).await.unwrap(),
            BlockLookup::Missing
        );

        cluster.set_under_construction("/a/f1", true);
        assert_eq!(
            cluster.block_locations("/a/f1", 0, 1).await.unwrap(),
            BlockLookup::UnderConstruction
        );
    }

    #[tokio::test]
    async fn test_block_locations_returns_full_block_list() {
        let cluster = MemoryCluster::new();
        cluster.add_file(
            "/f",
            2,
            vec![block(10, &["dn1:50010"]), block(11, &["dn2:50010"])],
        );
        let meta = cluster.stat("/f").await.unwrap().unwrap();
        match cluster.block_locations("/f", 0, meta.len).await.unwrap() {
            BlockLookup::Located(blocks) => {
                assert_eq!(blocks.len(), 2);
                assert_eq!(blocks[0].id, BlockId::new(10));
                assert_eq!(blocks[1].id, BlockId::new(11));
            }
            other => panic!("unexpected lookup result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_membership_report_and_outage() {
        let cluster = sample_cluster();
        let nodes = cluster.live_nodes().await.unwrap();
        assert_eq!(nodes.len(), 2);

        cluster.set_membership_down(true);
        assert!(cluster.live_nodes().await.is_err());
    }
}
