use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntervalForestError {
    #[error("Unknown overlapper type: {0} (expected ailist or nclist)")]
    UnknownOverlapperType(String),
}
