use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown strand symbol: {0}")]
    InvalidStrand(String),

    #[error("Unknown repeat kind: {0}")]
    InvalidRepeatKind(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
