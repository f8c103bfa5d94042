//! Gene annotation for tandem repeat loci.
//!
//! GFF3 and GTF files (optionally gzipped) are read into a [`GeneModel`]: a
//! gene table plus CDS, exon, UTR and derived intron features, each bound to
//! its gene. A [`FeatureIndex`] puts those features in per-sequence overlap
//! indexes and answers [`FeatureIndex::locate`] queries.
//!
//! ```rust
//! use strkit_annotation::{AnnotationFormat, FeatureIndex, GeneModel};
//! use strkit_overlaprs::OverlapperType;
//!
//! let gtf = "\
//! 1\tx\tgene\t1\t1000\t.\t+\t.\tgene_id \"G1\"; gene_name \"ABC\";
//! 1\tx\texon\t1\t100\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
//! 1\tx\texon\t901\t1000\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
//! ";
//! let model = GeneModel::from_reader(gtf.as_bytes(), AnnotationFormat::Gtf).unwrap();
//! let index = FeatureIndex::from_model(model, OverlapperType::AIList);
//!
//! assert_eq!(index.locate("1", 400, 420).label(), "intron");
//! assert_eq!(index.locate("1", 2000, 2020).label(), "intergenic");
//! assert_eq!(index.locate("2", 1, 10).label(), "unannotated");
//! ```
pub mod errors;
pub mod format;
pub mod index;
pub mod loader;
pub mod record;

// re-exports
pub use self::errors::AnnotationError;
pub use self::format::AnnotationFormat;
pub use self::index::{FeatureIndex, Location};
pub use self::loader::GeneModel;
pub use self::record::{AnnotationRecord, RecordReader};
