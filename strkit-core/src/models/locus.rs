use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// The four families of tandem repeat reported by strkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatKind {
    /// Exact microsatellite (SSR), motif of 1-6 bp.
    #[serde(rename = "ssr")]
    Perfect,
    /// Microsatellite tolerating substitutions and small indels (iSSR).
    #[serde(rename = "issr")]
    Imperfect,
    /// Run of adjacent perfect microsatellites (cSSR).
    #[serde(rename = "cssr")]
    Compound,
    /// Exact tandem repeat with a longer motif (VNTR).
    #[serde(rename = "vntr")]
    LargeMotif,
}

impl RepeatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatKind::Perfect => "ssr",
            RepeatKind::Imperfect => "issr",
            RepeatKind::Compound => "cssr",
            RepeatKind::LargeMotif => "vntr",
        }
    }
}

impl Display for RepeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RepeatKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ssr" | "perfect" => Ok(RepeatKind::Perfect),
            "issr" | "imperfect" => Ok(RepeatKind::Imperfect),
            "cssr" | "compound" => Ok(RepeatKind::Compound),
            "vntr" | "large-motif" => Ok(RepeatKind::LargeMotif),
            _ => Err(CoreError::InvalidRepeatKind(s.to_string())),
        }
    }
}

/// Common view over every locus kind.
///
/// Coordinates are 1-based and inclusive. Identifiers are assigned by
/// whoever persists the loci, never by the scanners, so `id` is `None`
/// straight out of a scan.
pub trait Locus {
    fn id(&self) -> Option<u64>;
    fn set_id(&mut self, id: u64);
    fn sequence(&self) -> &str;
    fn start(&self) -> u64;
    fn end(&self) -> u64;
    fn kind(&self) -> RepeatKind;

    fn span(&self) -> u64 {
        self.end() - self.start() + 1
    }
}

/// A maximal exact repeat of a 1-6 bp motif.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfectLocus {
    pub id: Option<u64>,
    pub sequence: String,
    /// Canonical motif.
    pub standard: String,
    pub motif: String,
    pub motif_len: usize,
    pub repeat: u32,
    pub start: u64,
    pub end: u64,
    pub length: u64,
}

/// An imperfect microsatellite with its edit statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImperfectLocus {
    pub id: Option<u64>,
    pub sequence: String,
    pub standard: String,
    pub motif: String,
    pub motif_len: usize,
    pub start: u64,
    pub end: u64,
    pub length: u64,
    pub matches: u32,
    pub substitutions: u32,
    pub insertions: u32,
    pub deletions: u32,
    pub score: i64,
}

/// Adjacent perfect microsatellites fused into one locus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundLocus {
    pub id: Option<u64>,
    pub sequence: String,
    pub start: u64,
    pub end: u64,
    /// Member motifs joined by `-`.
    pub motif: String,
    pub complexity: u32,
    /// Sum of member lengths, gaps excluded.
    pub length: u64,
    /// Sum of the gaps between consecutive members.
    pub gap: u64,
    /// `first-last` member identifiers.
    pub component: String,
    /// e.g. `(AT)7-(N)3-(AG)5`
    pub structure: String,
    pub members: Vec<u64>,
}

/// An exact tandem repeat with a motif longer than a microsatellite's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargeMotifLocus {
    pub id: Option<u64>,
    pub sequence: String,
    pub standard: String,
    pub motif: String,
    pub motif_len: usize,
    pub repeat: u32,
    pub start: u64,
    pub end: u64,
    pub length: u64,
}

macro_rules! impl_locus {
    ($ty:ty, $kind:expr) => {
        impl Locus for $ty {
            fn id(&self) -> Option<u64> {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = Some(id);
            }

            fn sequence(&self) -> &str {
                &self.sequence
            }

            fn start(&self) -> u64 {
                self.start
            }

            fn end(&self) -> u64 {
                self.end
            }

            fn kind(&self) -> RepeatKind {
                $kind
            }
        }
    };
}

impl_locus!(PerfectLocus, RepeatKind::Perfect);
impl_locus!(ImperfectLocus, RepeatKind::Imperfect);
impl_locus!(CompoundLocus, RepeatKind::Compound);
impl_locus!(LargeMotifLocus, RepeatKind::LargeMotif);

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("ssr", RepeatKind::Perfect)]
    #[case("ISSR", RepeatKind::Imperfect)]
    #[case("compound", RepeatKind::Compound)]
    #[case("vntr", RepeatKind::LargeMotif)]
    fn test_repeat_kind_from_str(#[case] input: &str, #[case] expected: RepeatKind) {
        assert_eq!(input.parse::<RepeatKind>().unwrap(), expected);
    }

    #[rstest]
    fn test_repeat_kind_rejects_unknown() {
        assert!("str".parse::<RepeatKind>().is_err());
    }

    #[rstest]
    fn test_imperfect_span() {
        let locus = ImperfectLocus {
            id: None,
            sequence: "chr1".to_string(),
            standard: "AAG".to_string(),
            motif: "AAG".to_string(),
            motif_len: 3,
            start: 1,
            end: 24,
            length: 24,
            matches: 20,
            substitutions: 2,
            insertions: 1,
            deletions: 1,
            score: 14,
        };
        assert_eq!(locus.span(), 24);
    }

    #[rstest]
    fn test_set_id() {
        let mut locus = PerfectLocus {
            id: None,
            sequence: "chr1".to_string(),
            standard: "AT".to_string(),
            motif: "AT".to_string(),
            motif_len: 2,
            repeat: 30,
            start: 1,
            end: 60,
            length: 60,
        };
        locus.set_id(7);
        assert_eq!(locus.id(), Some(7));
        assert_eq!(locus.kind(), RepeatKind::Perfect);
    }
}
