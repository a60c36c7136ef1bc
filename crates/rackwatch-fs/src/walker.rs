//! Iterative depth-first namespace traversal.

use rackwatch_types::FileMeta;
use tracing::debug;

use crate::error::FsError;
use crate::traits::Namespace;

/// Depth-first walk over every non-directory entry under a root path.
///
/// The walk holds an explicit work stack instead of recursing, so
/// arbitrarily deep directory trees cannot exhaust the call stack and the
/// caller can stop between steps. A directory whose listing comes back
/// `None` vanished while the walk was in flight; its subtree is skipped,
/// not fatal — concurrent mutation of the remote namespace during a long
/// walk is expected.
///
/// The walk is single-pass and not restartable: the namespace may have
/// changed by the time it finishes, so re-walking requires a fresh
/// [`Walker`].
pub struct Walker<'a> {
    ns: &'a dyn Namespace,
    stack: Vec<FileMeta>,
}

impl<'a> Walker<'a> {
    /// Start a walk at `root`. A root that does not exist yields an
    /// empty walk.
    pub async fn open(ns: &'a dyn Namespace, root: &str) -> Result<Walker<'a>, FsError> {
        let stack = match ns.stat(root).await? {
            Some(meta) => vec![meta],
            None => {
                debug!(root, "walk root does not exist");
                Vec::new()
            }
        };
        Ok(Self { ns, stack })
    }

    /// Produce the next file, or `None` when the walk is exhausted.
    ///
    /// Directories are expanded in place and never yielded.
    pub async fn next(&mut self) -> Result<Option<FileMeta>, FsError> {
        while let Some(entry) = self.stack.pop() {
            if !entry.is_dir {
                return Ok(Some(entry));
            }
            match self.ns.list(&entry.path).await? {
                Some(mut children) => {
                    // Reverse so the stack pops children in listing order.
                    children.reverse();
                    self.stack.extend(children);
                }
                None => {
                    debug!(path = %entry.path, "directory vanished mid-walk, skipping");
                }
            }
        }
        Ok(None)
    }
}
