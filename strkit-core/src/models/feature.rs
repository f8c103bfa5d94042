use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
    Unstranded,
}

impl Strand {
    pub fn from_char(c: char) -> Strand {
        match c {
            '+' => Strand::Forward,
            '-' => Strand::Reverse,
            _ => Strand::Unstranded,
        }
    }
}

impl FromStr for Strand {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." | "?" => Ok(Strand::Unstranded),
            _ => Err(CoreError::InvalidStrand(s.to_string())),
        }
    }
}

/// Gene-model feature types understood by the annotation loader.
///
/// Introns never come from an annotation file; they are derived from the
/// gaps between the sorted exons of one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureType {
    Gene,
    #[serde(rename = "CDS")]
    Cds,
    Exon,
    #[serde(rename = "5UTR")]
    FivePrimeUtr,
    #[serde(rename = "3UTR")]
    ThreePrimeUtr,
    #[serde(rename = "UTR")]
    Utr,
    Intron,
}

impl FeatureType {
    /// Map an annotation record type (column 3) to a feature type.
    pub fn from_record_type(feature: &str) -> Option<FeatureType> {
        match feature.to_uppercase().as_str() {
            "GENE" => Some(FeatureType::Gene),
            "CDS" => Some(FeatureType::Cds),
            "EXON" => Some(FeatureType::Exon),
            "FIVE_PRIME_UTR" | "5UTR" | "5'UTR" => Some(FeatureType::FivePrimeUtr),
            "THREE_PRIME_UTR" | "3UTR" | "3'UTR" => Some(FeatureType::ThreePrimeUtr),
            "UTR" => Some(FeatureType::Utr),
            "INTRON" => Some(FeatureType::Intron),
            _ => None,
        }
    }

    pub fn is_utr(&self) -> bool {
        matches!(
            self,
            FeatureType::FivePrimeUtr | FeatureType::ThreePrimeUtr | FeatureType::Utr
        )
    }
}

impl Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FeatureType::Gene => "gene",
            FeatureType::Cds => "CDS",
            FeatureType::Exon => "exon",
            FeatureType::FivePrimeUtr => "5UTR",
            FeatureType::ThreePrimeUtr => "3UTR",
            FeatureType::Utr => "UTR",
            FeatureType::Intron => "intron",
        };
        write!(f, "{}", label)
    }
}

/// One gene-model feature bound to the gene that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationFeature {
    pub sequence: String,
    pub start: u64,
    pub end: u64,
    pub feature: FeatureType,
    pub strand: Strand,
    /// Numeric id of the owning gene, see [`GeneInfo::id`].
    pub gene: usize,
}

/// A row of the gene table built while loading an annotation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneInfo {
    /// 1-based, in order of appearance in the annotation file.
    pub id: usize,
    pub sequence: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub gene_id: String,
    pub gene_name: String,
    pub biotype: String,
}
