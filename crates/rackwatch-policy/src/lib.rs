//! Pluggable replica placement policy.
//!
//! The audit core never owns the diversity rule. It consumes a
//! [`PlacementPolicy`] through this versioned interface and reports the
//! verdict; the default [`RackDiversityPolicy`] encodes the standard
//! two-rack rule. A policy failure is fatal to the whole run — once the
//! evaluator cannot be trusted, no subsequent verdict can be either.

use std::collections::HashSet;

use rackwatch_topology::ClusterTopology;
use rackwatch_types::RackId;

/// Errors from policy evaluation. Always fatal to the calling run.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The evaluator could not produce a verdict.
    #[error("placement policy evaluation failed: {0}")]
    Evaluation(String),
}

/// Verdict on one block's replica placement.
///
/// `missing_racks` answers: across how many *additional* racks would this
/// block need replicas for its placement to satisfy the policy? Zero
/// means compliant. Callers must not invoke the policy for a block with
/// zero replicas — a lost block is a distinct condition, reported
/// separately, never a zero-shortfall verdict.
pub trait PlacementPolicy: Send + Sync {
    /// Count of additional racks required for compliance.
    ///
    /// `replica_racks` holds one entry per replica; `None` marks a
    /// replica on a node absent from the topology snapshot, which
    /// contributes no rack to diversity.
    ///
    /// The result is always `0..=replication`.
    fn missing_racks(
        &self,
        replication: u16,
        replica_racks: &[Option<RackId>],
        topology: &ClusterTopology,
    ) -> Result<u32, PolicyError>;
}

/// The standard rack-diversity rule.
///
/// A block with replication factor `r` must span
/// `min(r, 2, total racks)` distinct racks. Files with `r <= 1` have no
/// diversity requirement, and a single-rack cluster can never be in
/// violation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RackDiversityPolicy;

impl PlacementPolicy for RackDiversityPolicy {
    fn missing_racks(
        &self,
        replication: u16,
        replica_racks: &[Option<RackId>],
        topology: &ClusterTopology,
    ) -> Result<u32, PolicyError> {
        debug_assert!(
            !replica_racks.is_empty(),
            "policy invoked for a block with no replicas"
        );

        let total_racks = topology.rack_count();
        if replication <= 1 || total_racks <= 1 {
            return Ok(0);
        }

        let required = (replication as usize).min(2).min(total_racks);
        let distinct = replica_racks
            .iter()
            .flatten()
            .collect::<HashSet<_>>()
            .len();

        Ok(required.saturating_sub(distinct) as u32)
    }
}
