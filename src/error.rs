use std::path::PathBuf;
use thiserror::Error;

/// Everything that can fail during one compaction run.
///
/// Each variant maps to one diagnostic printed by the binary; there is no
/// retry behavior, this is a one-shot batch tool.
#[derive(Debug, Error)]
pub enum CompactError {
    /// The input path does not exist.
    #[error("input file '{}' not found", .0.display())]
    MissingInput(PathBuf),

    /// The input is not well-formed XML.
    #[error("error parsing XML: {0}")]
    Parse(String),

    /// No `TaskTree` element could be located in the document.
    #[error("could not find TaskTree element")]
    Structure,

    /// Reading the input or writing the output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
