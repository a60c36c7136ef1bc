//! Block listing output.
//!
//! One stanza per file: a `FILE:` header, one line per block naming the
//! nodes holding a replica, and a blank separator. A file whose block
//! list is unavailable (open for writing) gets the header and separator
//! with no block lines.

use std::io::Write;

use rackwatch_types::BlockLookup;

/// Write the listing stanza for one file.
pub fn write_file_blocks(
    out: &mut dyn Write,
    path: &str,
    lookup: &BlockLookup,
) -> std::io::Result<()> {
    writeln!(out, "FILE: {path}")?;
    if let BlockLookup::Located(blocks) = lookup {
        for block in blocks {
            let nodes = block
                .locations
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "{} - {nodes}", block.id)?;
        }
    }
    writeln!(out)
}
