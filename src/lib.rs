//! Compactor for MyLifeOrganized XML exports.
//!
//! MLO keeps completed and dropped tasks in the outline forever, so exports
//! grow without bound. This crate parses an exported XML file, removes every
//! task that is completed or dropped together with its entire subtree, and
//! writes the reduced document back out with surviving tasks untouched and
//! in their original order.
//!
//! # Architecture
//!
//! One synchronous pipeline per run:
//! - **Document layer**: `xml` module - parses bytes into a mutable ordered
//!   tree and serializes it back
//! - **Core**: `compact` module - status classification and the recursive
//!   structure-preserving prune
//! - **Driver**: [`run`] - parse, locate the task tree, prune once, write
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! fn main() -> Result<(), mlo_compact::CompactError> {
//!     mlo_compact::run(Path::new("export.xml"), Path::new("compacted.xml"))
//! }
//! ```

mod compact;
mod error;
mod xml;

pub use compact::{TASK_NODE_TAG, TASK_TREE_TAG, is_completed_or_dropped, locate_task_tree, prune};
pub use error::CompactError;
pub use xml::{Document, Element, Node};

use std::fs;
use std::path::Path;

/// Run one compaction: read `input`, drop finished tasks, write `output`.
///
/// Nothing is written when the input is missing, fails to parse, or contains
/// no task tree.
pub fn run(input: &Path, output: &Path) -> Result<(), CompactError> {
    if !input.exists() {
        return Err(CompactError::MissingInput(input.to_path_buf()));
    }
    let text = fs::read_to_string(input)?;
    let mut doc = Document::parse(&text)?;
    let tree = locate_task_tree(&mut doc).ok_or(CompactError::Structure)?;
    prune(tree);
    fs::write(output, doc.to_bytes()?)?;
    Ok(())
}
