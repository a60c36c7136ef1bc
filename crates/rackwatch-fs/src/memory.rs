//! In-memory cluster backend.
//!
//! [`MemoryCluster`] implements [`Namespace`], [`BlockService`], and
//! [`Membership`] over a `RwLock`-protected tree. It backs the CLI's
//! snapshot-file mode and every test that needs a namespace to walk or a
//! block map to poll, including tests that mutate the cluster mid-run to
//! reproduce the races the audit must tolerate.

use std::collections::BTreeMap;
use std::sync::RwLock;

use rackwatch_types::{BlockLookup, DataNodeInfo, FileMeta, LocatedBlock, NodeId};
use tracing::debug;

use crate::error::FsError;
use crate::traits::{BlockService, Membership, Namespace};

enum Entry {
    Dir,
    File(FileState),
}

struct FileState {
    replication: u16,
    under_construction: bool,
    blocks: Vec<LocatedBlock>,
}

impl FileState {
    fn len(&self) -> u64 {
        self.blocks.iter().map(|b| b.len).sum()
    }
}

struct Inner {
    nodes: Vec<DataNodeInfo>,
    entries: BTreeMap<String, Entry>,
    membership_down: bool,
}

/// In-memory implementation of the full metadata-service boundary.
pub struct MemoryCluster {
    inner: RwLock<Inner>,
}

impl Default for MemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCluster {
    /// Create an empty cluster containing only the root directory.
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("/".to_string(), Entry::Dir);
        Self {
            inner: RwLock::new(Inner {
                nodes: Vec::new(),
                entries,
                membership_down: false,
            }),
        }
    }

    /// Register a live node in the given rack.
    pub fn add_node(&self, node_id: impl Into<String>, rack: impl Into<String>) {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.nodes.push(DataNodeInfo::new(node_id, rack));
    }

    /// Create a file with the given blocks, creating parent directories
    /// as needed. Replaces any existing entry at `path`.
    pub fn add_file(&self, path: &str, replication: u16, blocks: Vec<LocatedBlock>) {
        let mut inner = self.inner.write().expect("lock poisoned");
        for dir in ancestors(path) {
            inner.entries.entry(dir.to_string()).or_insert(Entry::Dir);
        }
        inner.entries.insert(
            path.to_string(),
            Entry::File(FileState {
                replication,
                under_construction: false,
                blocks,
            }),
        );
    }

    /// Mark a file as open for writing (or close it again).
    pub fn set_under_construction(&self, path: &str, open: bool) {
        let mut inner = self.inner.write().expect("lock poisoned");
        if let Some(Entry::File(state)) = inner.entries.get_mut(path) {
            state.under_construction = open;
        }
    }

    /// Flag one block of a file as corrupt.
    pub fn set_block_corrupt(&self, path: &str, index: usize) {
        let mut inner = self.inner.write().expect("lock poisoned");
        if let Some(Entry::File(state)) = inner.entries.get_mut(path) {
            if let Some(block) = state.blocks.get_mut(index) {
                block.corrupt = true;
            }
        }
    }

    /// Replace the replica locations of one block of a file.
    pub fn set_block_locations(&self, path: &str, index: usize, nodes: &[&str]) {
        let mut inner = self.inner.write().expect("lock poisoned");
        if let Some(Entry::File(state)) = inner.entries.get_mut(path) {
            if let Some(block) = state.blocks.get_mut(index) {
                block.locations = nodes.iter().map(|n| NodeId::new(*n)).collect();
            }
        }
    }

    /// Remove an entry and, if it is a directory, everything below it.
    pub fn remove(&self, path: &str) {
        let mut inner = self.inner.write().expect("lock poisoned");
        let prefix = format!("{}/", path.trim_end_matches('/'));
        inner
            .entries
            .retain(|p, _| p != path && !p.starts_with(&prefix));
    }

    /// Make subsequent `live_nodes` calls fail, simulating an unreachable
    /// membership service.
    pub fn set_membership_down(&self, down: bool) {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.membership_down = down;
    }

    fn meta_unlocked(path: &str, entry: &Entry) -> FileMeta {
        match entry {
            Entry::Dir => FileMeta::dir(path),
            Entry::File(state) => FileMeta::file(path, state.len(), state.replication),
        }
    }
}

/// Yield every ancestor directory of `path`, root first.
///
/// `/a/b/f` -> `/`, `/a`, `/a/b`.
fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    std::iter::once("/").chain(
        path.match_indices('/')
            .skip(1)
            .map(move |(i, _)| &path[..i]),
    )
}

fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(i) => &path[..i],
        None => "/",
    }
}

#[async_trait::async_trait]
impl Namespace for MemoryCluster {
    async fn stat(&self, path: &str) -> Result<Option<FileMeta>, FsError> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner
            .entries
            .get(path)
            .map(|e| Self::meta_unlocked(path, e)))
    }

    async fn list(&self, path: &str) -> Result<Option<Vec<FileMeta>>, FsError> {
        let inner = self.inner.read().expect("lock poisoned");
        if !matches!(inner.entries.get(path), Some(Entry::Dir)) {
            return Ok(None);
        }
        let children = inner
            .entries
            .iter()
            .filter(|(p, _)| p.as_str() != "/" && parent(p) == path)
            .map(|(p, e)| Self::meta_unlocked(p, e))
            .collect();
        Ok(Some(children))
    }

    async fn set_replication(&self, path: &str, replication: u16) -> Result<bool, FsError> {
        let mut inner = self.inner.write().expect("lock poisoned");
        match inner.entries.get_mut(path) {
            Some(Entry::File(state)) => {
                debug!(path, replication, "setting replication factor");
                state.replication = replication;
                Ok(true)
            }
            Some(Entry::Dir) => Err(FsError::NotAFile(path.to_string())),
            None => Ok(false),
        }
    }
}

#[async_trait::async_trait]
impl BlockService for MemoryCluster {
    async fn block_locations(
        &self,
        path: &str,
        offset: u64,
        len: u64,
    ) -> Result<BlockLookup, FsError> {
        let inner = self.inner.read().expect("lock poisoned");
        let state = match inner.entries.get(path) {
            Some(Entry::File(state)) => state,
            _ => return Ok(BlockLookup::Missing),
        };
        if state.under_construction {
            return Ok(BlockLookup::UnderConstruction);
        }

        // Select the blocks overlapping [offset, offset + len).
        let mut selected = Vec::new();
        let mut cursor = 0u64;
        let end = offset.saturating_add(len);
        for block in &state.blocks {
            let block_end = cursor + block.len;
            if block_end > offset && cursor < end {
                selected.push(block.clone());
            }
            cursor = block_end;
        }
        Ok(BlockLookup::Located(selected))
    }
}

#[async_trait::async_trait]
impl Membership for MemoryCluster {
    async fn live_nodes(&self) -> Result<Vec<DataNodeInfo>, FsError> {
        let inner = self.inner.read().expect("lock poisoned");
        if inner.membership_down {
            return Err(FsError::MembershipUnavailable(
                "simulated membership outage".to_string(),
            ));
        }
        Ok(inner.nodes.clone())
    }
}
