//! Block-location resolution for one file.

use rackwatch_fs::{BlockService, FsError};
use rackwatch_types::{BlockId, BlockLookup, FileMeta, LocatedBlock};

/// What the block service had to say about one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The file was deleted between listing and resolution. Benign;
    /// callers skip it silently.
    Missing,
    /// The file is open for writing. Callers skip evaluation and log
    /// this distinctly from a violation.
    UnderConstruction,
    /// At least one block is corrupt (the first is carried here). A
    /// corrupt block invalidates confidence in the rest of the block
    /// list, so the entire file is abandoned for this run.
    Corrupt(BlockId),
    /// The complete, healthy block list, ready for evaluation.
    Complete(Vec<LocatedBlock>),
}

/// Fetch and classify the block list of `file`.
pub async fn resolve(blocks: &dyn BlockService, file: &FileMeta) -> Result<Resolution, FsError> {
    match blocks.block_locations(&file.path, 0, file.len).await? {
        BlockLookup::Missing => Ok(Resolution::Missing),
        BlockLookup::UnderConstruction => Ok(Resolution::UnderConstruction),
        BlockLookup::Located(list) => match list.iter().find(|b| b.corrupt) {
            Some(bad) => Ok(Resolution::Corrupt(bad.id)),
            None => Ok(Resolution::Complete(list)),
        },
    }
}
