use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("The annotation file is not in GFF or GTF format: {0}")]
    UnknownFormat(String),
    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("No gene identifier on line {line}")]
    MissingGeneId { line: usize },
    #[error("Unresolved parent {parent} on line {line}")]
    UnresolvedParent { line: usize, parent: String },
    #[error("Error reading annotation file: {0}")]
    Read(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
