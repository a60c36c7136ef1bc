//! Audit orchestrator.
//!
//! Drives the full placement audit: snapshot the topology, walk the
//! namespace, resolve each file's blocks, and check every block against
//! the placement policy. Violations are reported through the
//! [`AuditReporter`] as they are found — a long audit yields partial
//! results even if interrupted — and accumulated into the returned
//! [`AuditReport`].

use std::collections::BTreeSet;
use std::sync::Arc;

use rackwatch_fs::{BlockService, Membership, Namespace, Walker};
use rackwatch_policy::PlacementPolicy;
use rackwatch_topology::ClusterTopology;
use rackwatch_types::RackId;
use tracing::{debug, info, warn};

use crate::error::AuditError;
use crate::report::AuditReporter;
use crate::resolver::{self, Resolution};

/// Outcome of one audit run.
#[derive(Debug, Default, Clone)]
pub struct AuditReport {
    /// Files with at least one block violating the placement policy.
    /// A file appears at most once regardless of how many of its blocks
    /// are misplaced.
    pub violating_files: BTreeSet<String>,
    /// Files examined, including skipped ones.
    pub files_scanned: u64,
    /// Files skipped because they were open for writing.
    pub open_files_skipped: u64,
    /// Files skipped because a block was corrupt.
    pub corrupt_files_skipped: u64,
    /// Blocks with no live replicas at all. Not policy violations; all
    /// replicas are simply gone.
    pub lost_blocks: u64,
}

/// Walks a subtree and verifies every block's replica placement.
pub struct Auditor {
    namespace: Arc<dyn Namespace>,
    blocks: Arc<dyn BlockService>,
    membership: Arc<dyn Membership>,
    policy: Arc<dyn PlacementPolicy>,
}

impl Auditor {
    /// Create an auditor over the given service clients and policy.
    pub fn new(
        namespace: Arc<dyn Namespace>,
        blocks: Arc<dyn BlockService>,
        membership: Arc<dyn Membership>,
        policy: Arc<dyn PlacementPolicy>,
    ) -> Self {
        Self {
            namespace,
            blocks,
            membership,
            policy,
        }
    }

    /// Audit every file under `root`.
    ///
    /// Takes a fresh topology snapshot, then evaluates files in
    /// traversal order. Fails fast if the membership service is
    /// unreachable or the policy cannot be evaluated; everything else is
    /// recovered per file.
    pub async fn audit(
        &self,
        root: &str,
        reporter: &mut dyn AuditReporter,
    ) -> Result<AuditReport, AuditError> {
        let topology = ClusterTopology::snapshot(self.membership.as_ref()).await?;
        self.audit_with_topology(root, &topology, reporter).await
    }

    /// Audit against an existing topology snapshot.
    ///
    /// Useful when several subtrees are audited in one run and should
    /// share a single "as of snapshot time" view of the cluster.
    pub async fn audit_with_topology(
        &self,
        root: &str,
        topology: &ClusterTopology,
        reporter: &mut dyn AuditReporter,
    ) -> Result<AuditReport, AuditError> {
        info!(root, "starting placement audit");

        let mut report = AuditReport::default();
        let mut walker = Walker::open(self.namespace.as_ref(), root).await?;
        // Printed length of the previous progress line, threaded through
        // each reporting call so the console can blank out stale text.
        let mut last_len = 0usize;

        while let Some(file) = walker.next().await? {
            report.files_scanned += 1;
            last_len = reporter.progress(&file.path, last_len);

            match resolver::resolve(self.blocks.as_ref(), &file).await? {
                Resolution::Missing => {
                    debug!(path = %file.path, "file deleted since listing, skipping");
                }
                Resolution::UnderConstruction => {
                    info!(path = %file.path, "file is open for writing, not checking");
                    report.open_files_skipped += 1;
                    reporter.open_file(&file.path);
                }
                Resolution::Corrupt(block) => {
                    warn!(path = %file.path, %block, "corrupt block, skipping file");
                    report.corrupt_files_skipped += 1;
                    reporter.corrupt_file(block, &file.path);
                }
                Resolution::Complete(blocks) => {
                    for block in blocks {
                        if block.locations.is_empty() {
                            warn!(path = %file.path, block = %block.id, "block has no live replicas");
                            report.lost_blocks += 1;
                            reporter.lost_block(block.id, &file.path);
                            continue;
                        }

                        let racks: Vec<Option<RackId>> = topology
                            .resolve(&block.locations)
                            .into_iter()
                            .map(|replica| replica.rack)
                            .collect();
                        let missing =
                            self.policy
                                .missing_racks(file.replication, &racks, topology)?;
                        if missing > 0 {
                            reporter.violation(block.id, &file.path, missing);
                            report.violating_files.insert(file.path.clone());
                        }
                    }
                }
            }
        }

        reporter.summary(report.violating_files.len());
        info!(
            files = report.files_scanned,
            violating = report.violating_files.len(),
            open_skipped = report.open_files_skipped,
            corrupt_skipped = report.corrupt_files_skipped,
            lost_blocks = report.lost_blocks,
            "placement audit finished"
        );
        Ok(report)
    }
}
