//! Tandem repeat search.
//!
//! - [`motif`]: standard (canonical) motifs.
//! - [`perfect`]: exact microsatellite and VNTR scanners.
//! - [`imperfect`]: seed-and-extend search for imperfect microsatellites.
//! - [`compound`]: merging of neighbouring perfect loci.
//! - [`sequence`]: sequence access, FASTA loading and flanking sequence.
//! - [`batch`]: parallel search over many sequences.
//! - [`summary`]: base statistics and repeat summaries.
//!
//! ```rust
//! use strkit_search::{MinRepeats, MotifStandard, scan_perfect};
//!
//! let standard = MotifStandard::new(3).unwrap();
//! let seq = "AT".repeat(30);
//!
//! let hits = scan_perfect(seq.as_bytes(), &MinRepeats::default());
//! assert_eq!(hits.len(), 1);
//!
//! let locus = hits[0].clone().into_perfect("chr1", &standard);
//! assert_eq!((locus.start, locus.end, locus.repeat), (1, 60, 30));
//! ```
pub mod batch;
pub mod compound;
pub mod errors;
pub mod imperfect;
pub mod motif;
pub mod perfect;
pub mod sequence;
pub mod summary;

// re-exports
pub use self::batch::{CancelToken, ScanOutcome, ScanTask, run_batch};
pub use self::compound::{CompoundMerger, merge_compound};
pub use self::errors::SearchError;
pub use self::imperfect::{EditMatrix, ImperfectHit, ImperfectParams, ImperfectScanner, scan_imperfect};
pub use self::motif::MotifStandard;
pub use self::perfect::{MinRepeats, TandemHit, scan_perfect, scan_vntr};
pub use self::sequence::{FastaSequences, Flanks, SequenceProvider, flanking};
pub use self::summary::{RepeatSummary, SequenceStats};
