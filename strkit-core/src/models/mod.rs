pub mod feature;
pub mod interval;
pub mod locus;

// re-export for cleaner imports
pub use self::feature::{AnnotationFeature, FeatureType, GeneInfo, Strand};
pub use self::interval::Interval;
pub use self::locus::{
    CompoundLocus, ImperfectLocus, LargeMotifLocus, Locus, PerfectLocus, RepeatKind,
};
