//! Replication convergence waiter.
//!
//! After a file's replication factor changes, the cluster converges
//! asynchronously. [`ConvergenceWaiter`] polls each file's block
//! locations at a fixed interval until every block reports a replica
//! count *exactly equal* to the target. Equality matters: during a
//! planned decrease a block is over-replicated for a while, and treating
//! "meets or exceeds" as done would declare victory before the excess
//! replicas are dropped. That case converges slowly and gets a one-time
//! warning instead.
//!
//! Paths are processed strictly one at a time, each to a terminal
//! outcome before the next begins. This bounds the load the wait puts on
//! the metadata service; wall-clock time is not the concern for an
//! operator-triggered maintenance action.

use std::sync::Arc;
use std::time::Duration;

use rackwatch_fs::{BlockService, Namespace};
use rackwatch_types::BlockLookup;
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::error::AuditError;
use crate::report::WaitReporter;

/// Tuning for the convergence wait.
#[derive(Debug, Clone)]
pub struct WaiterConfig {
    /// Time between polls of one path.
    pub poll_interval: Duration,
    /// Give up on a path after this long, yielding
    /// [`ConvergenceOutcome::TimedOut`]. `None` waits indefinitely.
    pub max_wait: Option<Duration>,
}

impl WaiterConfig {
    /// Production defaults: poll every ten seconds, no deadline.
    pub fn default_config() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            max_wait: None,
        }
    }

    /// Fast settings for tests.
    pub fn test_config() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
            max_wait: Some(Duration::from_secs(2)),
        }
    }
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Terminal state of one waited-on path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvergenceOutcome {
    /// Every block reported exactly the target replica count.
    Satisfied,
    /// The deadline expired before the path converged.
    TimedOut,
    /// The caller's cancellation signal fired.
    Cancelled,
    /// The path was deleted while waiting.
    Gone,
}

/// Polls files until their replicas converge to a target factor.
pub struct ConvergenceWaiter {
    namespace: Arc<dyn Namespace>,
    blocks: Arc<dyn BlockService>,
    config: WaiterConfig,
}

impl ConvergenceWaiter {
    /// Create a waiter over the given service clients.
    pub fn new(
        namespace: Arc<dyn Namespace>,
        blocks: Arc<dyn BlockService>,
        config: WaiterConfig,
    ) -> Self {
        Self {
            namespace,
            blocks,
            config,
        }
    }

    /// Wait for every path to converge to `target` replicas per block.
    ///
    /// Returns one outcome per path, in input order. `cancel` is checked
    /// between polls; flipping it to `true` resolves the current and all
    /// remaining paths as [`ConvergenceOutcome::Cancelled`].
    pub async fn wait_for_replication(
        &self,
        paths: &[String],
        target: u16,
        cancel: Option<watch::Receiver<bool>>,
        reporter: &mut dyn WaitReporter,
    ) -> Result<Vec<(String, ConvergenceOutcome)>, AuditError> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            let outcome = if cancelled(&cancel) {
                ConvergenceOutcome::Cancelled
            } else {
                self.wait_for_path(path, target, &cancel, reporter).await?
            };
            reporter.wait_finished(path, &outcome);
            outcomes.push((path.clone(), outcome));
        }
        Ok(outcomes)
    }

    /// Poll one path to a terminal outcome.
    async fn wait_for_path(
        &self,
        path: &str,
        target: u16,
        cancel: &Option<watch::Receiver<bool>>,
        reporter: &mut dyn WaitReporter,
    ) -> Result<ConvergenceOutcome, AuditError> {
        let deadline = self.config.max_wait.map(|d| Instant::now() + d);
        let mut started = false;
        let mut warned_decrease = false;

        loop {
            let meta = match self.namespace.stat(path).await? {
                Some(meta) => meta,
                None => {
                    debug!(path, "file deleted while waiting for replication");
                    return Ok(ConvergenceOutcome::Gone);
                }
            };

            let mut over_replicated = None;
            let satisfied = match self
                .blocks
                .block_locations(path, 0, meta.len)
                .await?
            {
                BlockLookup::Missing => return Ok(ConvergenceOutcome::Gone),
                // An open file's block list is still moving; keep polling.
                BlockLookup::UnderConstruction => false,
                BlockLookup::Located(blocks) => {
                    let mut all_exact = true;
                    for block in &blocks {
                        let count = block.locations.len() as u16;
                        if count != target {
                            all_exact = false;
                        }
                        if count > target && over_replicated.is_none() {
                            over_replicated = Some(count);
                        }
                    }
                    all_exact
                }
            };

            if satisfied {
                info!(path, target, "replication converged");
                return Ok(ConvergenceOutcome::Satisfied);
            }

            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    warn!(path, target, "gave up waiting for replication");
                    return Ok(ConvergenceOutcome::TimedOut);
                }
            }

            if !started {
                reporter.wait_started(path);
                started = true;
            }
            // The warning follows the "Waiting for ..." line so the
            // operator output reads in order.
            if let Some(count) = over_replicated {
                if !warned_decrease {
                    warn!(
                        path,
                        replicas = count,
                        target,
                        "decreasing replication, convergence may be slow"
                    );
                    reporter.decrease_warning();
                    warned_decrease = true;
                }
            }
            reporter.wait_tick();

            sleep(self.config.poll_interval).await;

            // Cancellation is level-triggered and checked between poll
            // cycles, so it takes effect within one interval.
            if cancelled(cancel) {
                info!(path, "replication wait cancelled");
                return Ok(ConvergenceOutcome::Cancelled);
            }
        }
    }
}

fn cancelled(cancel: &Option<watch::Receiver<bool>>) -> bool {
    cancel.as_ref().is_some_and(|rx| *rx.borrow())
}
