use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Motif must contain at least one base")]
    EmptyMotif,
    #[error("Invalid motif standard level {0}, expected 0 to 4")]
    InvalidLevel(u8),
    #[error("Unknown sequence: {0}")]
    UnknownSequence(String),
    #[error("Invalid range {start}-{end} for sequence {sequence} with length {length}")]
    InvalidRange {
        sequence: String,
        start: u64,
        end: u64,
        length: u64,
    },
    #[error("Error reading sequence file: {0}")]
    SequenceFile(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
