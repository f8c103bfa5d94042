//! Static interval overlap indexes.
//!
//! Annotation features are loaded once and then queried for every repeat
//! locus, possibly from many threads, so the indexes here are build-once and
//! read-only. Two structures are provided behind the [`Overlapper`] trait:
//!
//! - [`AIList`], the Augmented Interval List, suited to dense annotations
//!   where long gene bodies cover many short exons.
//! - [`NCList`], the Nested Containment List, which keeps parent features
//!   ahead of the features they contain.
//!
//! [`IntervalForest`] keeps one index per sequence.
//!
//! ```rust
//! use strkit_overlaprs::{AIList, Interval, Overlapper};
//!
//! let exons = vec![
//!     Interval { start: 100u32, end: 200, val: "exon1" },
//!     Interval { start: 150, end: 300, val: "exon2" },
//!     Interval { start: 400, end: 500, val: "exon3" },
//! ];
//!
//! let index = AIList::build(exons);
//! assert_eq!(index.find(180, 250).len(), 2);
//! ```

pub mod ailist;
pub mod errors;
pub mod interval_forest;
pub mod nclist;
pub mod traits;

use std::fmt::{self, Display};
use std::str::FromStr;

// re-exports
pub use self::ailist::AIList;
pub use self::errors::IntervalForestError;
pub use self::interval_forest::IntervalForest;
pub use self::nclist::NCList;
pub use self::traits::{Interval, Overlapper};

/// Which overlap structure backs an [`IntervalForest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapperType {
    #[default]
    AIList,
    NCList,
}

impl FromStr for OverlapperType {
    type Err = IntervalForestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ailist" => Ok(OverlapperType::AIList),
            "nclist" | "ncls" => Ok(OverlapperType::NCList),
            _ => Err(IntervalForestError::UnknownOverlapperType(s.to_string())),
        }
    }
}

impl Display for OverlapperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapperType::AIList => write!(f, "ailist"),
            OverlapperType::NCList => write!(f, "nclist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("ailist", OverlapperType::AIList)]
    #[case("NCList", OverlapperType::NCList)]
    #[case("ncls", OverlapperType::NCList)]
    fn test_overlapper_type_from_str(#[case] input: &str, #[case] expected: OverlapperType) {
        assert_eq!(input.parse::<OverlapperType>().unwrap(), expected);
    }

    #[rstest]
    fn test_overlapper_type_rejects_unknown() {
        assert!("bits".parse::<OverlapperType>().is_err());
    }
}
