//! strkit finds tandem repeats in genomic sequence and places them on gene
//! models. Each part lives in its own crate and is re-exported here behind a
//! feature of the same name.
#[cfg(feature = "core")]
#[doc(inline)]
pub use strkit_core as core;

#[cfg(feature = "overlaprs")]
#[doc(inline)]
pub use strkit_overlaprs as overlaprs;

#[cfg(feature = "search")]
#[doc(inline)]
pub use strkit_search as search;

#[cfg(feature = "annotation")]
#[doc(inline)]
pub use strkit_annotation as annotation;
