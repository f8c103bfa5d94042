use std::fmt::{self, Display};
use std::path::Path;

use serde::Serialize;
use strkit_core::models::{AnnotationFeature, FeatureType, GeneInfo};
use strkit_overlaprs::{Interval, IntervalForest, OverlapperType};

use crate::errors::AnnotationError;
use crate::loader::GeneModel;

/// Where a locus falls relative to the gene models of its sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Location<'a> {
    /// The annotation has no feature on this sequence at all.
    Unannotated,
    Intergenic,
    Feature {
        category: FeatureType,
        gene: &'a GeneInfo,
    },
}

impl Location<'_> {
    pub fn label(&self) -> String {
        match self {
            Location::Unannotated => "unannotated".to_string(),
            Location::Intergenic => "intergenic".to_string(),
            Location::Feature { category, .. } => category.to_string(),
        }
    }

    pub fn gene(&self) -> Option<&GeneInfo> {
        match self {
            Location::Feature { gene, .. } => Some(gene),
            _ => None,
        }
    }
}

impl Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lower ranks win when a locus overlaps several features. Genes never
/// classify a locus by themselves.
fn priority(feature: FeatureType) -> Option<u8> {
    match feature {
        FeatureType::Cds => Some(0),
        FeatureType::Exon => Some(1),
        FeatureType::FivePrimeUtr | FeatureType::ThreePrimeUtr | FeatureType::Utr => Some(2),
        FeatureType::Intron => Some(3),
        FeatureType::Gene => None,
    }
}

/// Gene-model features of an annotation, indexed per sequence.
pub struct FeatureIndex {
    forest: IntervalForest<u64, usize>,
    features: Vec<AnnotationFeature>,
    genes: Vec<GeneInfo>,
}

impl FeatureIndex {
    pub fn build(
        features: Vec<AnnotationFeature>,
        genes: Vec<GeneInfo>,
        overlapper_type: OverlapperType,
    ) -> FeatureIndex {
        let forest = IntervalForest::build(
            features.iter().enumerate().map(|(i, feature)| {
                (
                    feature.sequence.clone(),
                    Interval::from_closed(feature.start, feature.end, i),
                )
            }),
            overlapper_type,
        );

        let index = FeatureIndex {
            forest,
            features,
            genes,
        };
        log::debug!(
            "Indexed {} features on {} sequences ({})",
            index.features.len(),
            index.sequences().count(),
            overlapper_type
        );
        index
    }

    pub fn from_model(model: GeneModel, overlapper_type: OverlapperType) -> FeatureIndex {
        FeatureIndex::build(model.features, model.genes, overlapper_type)
    }

    /// Load a GFF or GTF file, gzipped or not, into an AIList backed index.
    pub fn from_path(path: &Path) -> Result<FeatureIndex, AnnotationError> {
        FeatureIndex::from_path_with(path, OverlapperType::default())
    }

    pub fn from_path_with(
        path: &Path,
        overlapper_type: OverlapperType,
    ) -> Result<FeatureIndex, AnnotationError> {
        let model = GeneModel::from_path(path)?;
        Ok(FeatureIndex::from_model(model, overlapper_type))
    }

    pub fn features(&self) -> &[AnnotationFeature] {
        &self.features
    }

    pub fn genes(&self) -> &[GeneInfo] {
        &self.genes
    }

    /// Sequence ids that carry at least one feature.
    pub fn sequences(&self) -> impl Iterator<Item = &str> {
        self.forest.sequences()
    }

    /// Gene by its 1-based numeric id.
    pub fn gene(&self, id: usize) -> Option<&GeneInfo> {
        id.checked_sub(1).and_then(|i| self.genes.get(i))
    }

    pub fn overlapper_type(&self) -> OverlapperType {
        self.forest.overlapper_type()
    }

    /// Classify the closed range `start..=end` on `seqid`.
    pub fn locate(&self, seqid: &str, start: u64, end: u64) -> Location<'_> {
        let Some(hits) = self.forest.find_closed(seqid, start, end) else {
            return Location::Unannotated;
        };

        let best = hits
            .iter()
            .filter_map(|hit| {
                let feature = &self.features[hit.val];
                priority(feature.feature).map(|rank| (rank, hit.val, feature))
            })
            .min_by_key(|(rank, i, _)| (*rank, *i));

        match best.and_then(|(_, _, feature)| {
            self.gene(feature.gene).map(|gene| (feature.feature, gene))
        }) {
            Some((category, gene)) => Location::Feature { category, gene },
            None => Location::Intergenic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use strkit_core::models::Strand;

    fn feature(start: u64, end: u64, kind: FeatureType, gene: usize) -> AnnotationFeature {
        AnnotationFeature {
            sequence: "chr1".to_string(),
            start,
            end,
            feature: kind,
            strand: Strand::Forward,
            gene,
        }
    }

    fn gene(id: usize, name: &str, start: u64, end: u64) -> GeneInfo {
        GeneInfo {
            id,
            sequence: "chr1".to_string(),
            start,
            end,
            strand: Strand::Forward,
            gene_id: format!("gene-{}", name),
            gene_name: name.to_string(),
            biotype: "protein_coding".to_string(),
        }
    }

    #[fixture]
    fn features() -> Vec<AnnotationFeature> {
        vec![
            feature(100, 200, FeatureType::Exon, 1),
            feature(201, 499, FeatureType::Intron, 1),
            feature(500, 900, FeatureType::Exon, 1),
            feature(150, 200, FeatureType::Cds, 1),
            feature(100, 149, FeatureType::FivePrimeUtr, 1),
            feature(100, 900, FeatureType::Gene, 1),
            feature(2000, 2500, FeatureType::Gene, 2),
        ]
    }

    #[fixture]
    fn genes() -> Vec<GeneInfo> {
        vec![gene(1, "ABC", 100, 900), gene(2, "XYZ", 2000, 2500)]
    }

    #[rstest]
    #[case(OverlapperType::AIList, 180, 190, "CDS")]
    #[case(OverlapperType::AIList, 140, 160, "CDS")]
    #[case(OverlapperType::AIList, 120, 130, "exon")]
    #[case(OverlapperType::AIList, 300, 310, "intron")]
    #[case(OverlapperType::AIList, 495, 505, "exon")]
    #[case(OverlapperType::AIList, 1000, 1010, "intergenic")]
    #[case(OverlapperType::AIList, 2100, 2110, "intergenic")]
    #[case(OverlapperType::NCList, 180, 190, "CDS")]
    #[case(OverlapperType::NCList, 300, 310, "intron")]
    #[case(OverlapperType::NCList, 1000, 1010, "intergenic")]
    fn test_locate(
        features: Vec<AnnotationFeature>,
        genes: Vec<GeneInfo>,
        #[case] overlapper_type: OverlapperType,
        #[case] start: u64,
        #[case] end: u64,
        #[case] expected: &str,
    ) {
        let index = FeatureIndex::build(features, genes, overlapper_type);
        assert_eq!(index.locate("chr1", start, end).label(), expected);
    }

    #[rstest]
    fn test_locate_reports_gene(features: Vec<AnnotationFeature>, genes: Vec<GeneInfo>) {
        let index = FeatureIndex::build(features, genes, OverlapperType::AIList);
        let location = index.locate("chr1", 160, 170);
        assert_eq!(location.gene().map(|g| g.gene_name.as_str()), Some("ABC"));
        assert!(matches!(
            location,
            Location::Feature {
                category: FeatureType::Cds,
                ..
            }
        ));
    }

    #[rstest]
    fn test_unannotated_sequence(features: Vec<AnnotationFeature>, genes: Vec<GeneInfo>) {
        let index = FeatureIndex::build(features, genes, OverlapperType::AIList);
        assert_eq!(index.locate("chrM", 1, 100), Location::Unannotated);
        assert_eq!(index.locate("chr1", 5000, 5100), Location::Intergenic);
    }

    #[rstest]
    fn test_sequences_are_counted_once(mut features: Vec<AnnotationFeature>, genes: Vec<GeneInfo>) {
        let mut other = feature(10, 20, FeatureType::Exon, 2);
        other.sequence = "chr2".to_string();
        features.push(other);

        let index = FeatureIndex::build(features, genes, OverlapperType::AIList);
        let mut sequences: Vec<&str> = index.sequences().collect();
        sequences.sort();
        assert_eq!(sequences, vec!["chr1", "chr2"]);
        assert_eq!(index.features().len(), 8);
    }

    #[rstest]
    fn test_closed_range_boundaries(features: Vec<AnnotationFeature>, genes: Vec<GeneInfo>) {
        let index = FeatureIndex::build(features, genes, OverlapperType::AIList);
        // 900 is the last base of the second exon
        assert_eq!(index.locate("chr1", 900, 950).label(), "exon");
        assert_eq!(index.locate("chr1", 901, 950).label(), "intergenic");
        assert_eq!(index.locate("chr1", 50, 100).label(), "exon");
    }
}
