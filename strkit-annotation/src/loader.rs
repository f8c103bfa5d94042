//! Gene models from GFF and GTF records.
//!
//! Loading makes two passes over the records. The first builds the gene
//! table, the second binds every CDS, UTR and exon record to a gene and
//! derives introns from the exons of each transcript.
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use strkit_core::models::{AnnotationFeature, FeatureType, GeneInfo};
use strkit_core::utils::get_dynamic_reader;

use crate::errors::AnnotationError;
use crate::format::AnnotationFormat;
use crate::record::{AnnotationRecord, RecordReader};

/// Keys giving a GFF gene its identifier, in order of preference.
const GFF_GENE_ID_KEYS: [&str; 3] = ["ID", "GENE", "NAME"];
/// Keys giving a GFF gene its display name, in order of preference.
const GFF_GENE_NAME_KEYS: [&str; 4] = ["NAME", "PRODUCT", "GENE", "ID"];

/// Genes and gene-model features of one annotation file.
#[derive(Debug, Clone, Default)]
pub struct GeneModel {
    pub genes: Vec<GeneInfo>,
    pub features: Vec<AnnotationFeature>,
}

impl GeneModel {
    pub fn from_path(path: &Path) -> Result<GeneModel, AnnotationError> {
        let format = AnnotationFormat::detect_path(path)?;
        let reader =
            get_dynamic_reader(path).map_err(|e| AnnotationError::Read(e.to_string()))?;
        let model = GeneModel::from_reader(reader, format)?;

        log::info!(
            "Loaded {} genes and {} features from {} ({})",
            model.genes.len(),
            model.features.len(),
            path.display(),
            format
        );
        Ok(model)
    }

    pub fn from_reader<R: BufRead>(
        reader: R,
        format: AnnotationFormat,
    ) -> Result<GeneModel, AnnotationError> {
        let records = RecordReader::new(reader, format).collect::<Result<Vec<_>, _>>()?;
        GeneModel::from_records(&records, format)
    }

    pub fn from_records(
        records: &[AnnotationRecord],
        format: AnnotationFormat,
    ) -> Result<GeneModel, AnnotationError> {
        let mut model = match format {
            AnnotationFormat::Gff => {
                let table = GeneTable::from_gff(records)?;
                let features = gff_features(records, &table)?;
                GeneModel {
                    genes: table.genes,
                    features,
                }
            }
            AnnotationFormat::Gtf => {
                let table = GeneTable::from_gtf(records)?;
                let features = gtf_features(records, &table)?;
                GeneModel {
                    genes: table.genes,
                    features,
                }
            }
        };

        model.features.extend(model.genes.iter().map(|gene| AnnotationFeature {
            sequence: gene.sequence.clone(),
            start: gene.start,
            end: gene.end,
            feature: FeatureType::Gene,
            strand: gene.strand,
            gene: gene.id,
        }));
        Ok(model)
    }

    pub fn gene(&self, id: usize) -> Option<&GeneInfo> {
        id.checked_sub(1).and_then(|i| self.genes.get(i))
    }
}

#[derive(Debug, Default)]
struct GeneTable {
    genes: Vec<GeneInfo>,
    ids: HashMap<String, usize>,
}

impl GeneTable {
    fn add(&mut self, record: &AnnotationRecord, gene_id: &str, gene_name: &str) {
        let id = self.genes.len() + 1;
        self.ids.insert(gene_id.to_string(), id);
        self.genes.push(GeneInfo {
            id,
            sequence: record.sequence.clone(),
            start: record.start,
            end: record.end,
            strand: record.strand,
            gene_id: gene_id.to_string(),
            gene_name: gene_name.to_string(),
            biotype: record
                .attr("GENE_BIOTYPE")
                .unwrap_or(record.feature.as_str())
                .to_string(),
        });
    }

    /// Gene records, plus top-level records (no parent) that are not regions.
    fn from_gff(records: &[AnnotationRecord]) -> Result<GeneTable, AnnotationError> {
        let mut table = GeneTable::default();
        for record in records {
            if record.feature == "REGION" {
                continue;
            }
            if record.feature != "GENE" && record.attr("PARENT").is_some() {
                continue;
            }

            let missing = || AnnotationError::MissingGeneId { line: record.line };
            let gene_id = record.first_attr(&GFF_GENE_ID_KEYS).ok_or_else(missing)?;
            let gene_name = record.first_attr(&GFF_GENE_NAME_KEYS).ok_or_else(missing)?;
            table.add(record, gene_id, gene_name);
        }
        Ok(table)
    }

    fn from_gtf(records: &[AnnotationRecord]) -> Result<GeneTable, AnnotationError> {
        let mut table = GeneTable::default();
        for record in records.iter().filter(|r| r.feature == "GENE") {
            let gene_id = record
                .attr("GENE_ID")
                .ok_or(AnnotationError::MissingGeneId { line: record.line })?;
            let gene_name = record.attr("GENE_NAME").unwrap_or(gene_id);
            table.add(record, gene_id, gene_name);
        }
        Ok(table)
    }

    fn resolve(&self, record: &AnnotationRecord, gene_id: &str) -> Result<usize, AnnotationError> {
        self.ids
            .get(gene_id)
            .copied()
            .ok_or_else(|| AnnotationError::UnresolvedParent {
                line: record.line,
                parent: gene_id.to_string(),
            })
    }
}

/// Exons of the transcript being read, flushed when the transcript changes.
#[derive(Debug, Default)]
struct ExonBuffer {
    transcript: Option<String>,
    exons: Vec<AnnotationFeature>,
}

impl ExonBuffer {
    fn push(&mut self, transcript: &str, exon: AnnotationFeature, out: &mut Vec<AnnotationFeature>) {
        if self.transcript.as_deref() != Some(transcript) {
            self.flush(out);
            self.transcript = Some(transcript.to_string());
        }
        self.exons.push(exon);
    }

    /// Emit the buffered exons sorted by start, with an intron between each
    /// pair of consecutive exons that do not touch.
    fn flush(&mut self, out: &mut Vec<AnnotationFeature>) {
        let mut exons = std::mem::take(&mut self.exons);
        exons.sort_by_key(|exon| exon.start);

        for (i, exon) in exons.iter().enumerate() {
            out.push(exon.clone());
            let Some(next) = exons.get(i + 1) else {
                continue;
            };
            if next.start > exon.end + 1 {
                out.push(AnnotationFeature {
                    start: exon.end + 1,
                    end: next.start - 1,
                    feature: FeatureType::Intron,
                    ..exon.clone()
                });
            }
        }
        self.transcript = None;
    }
}

fn feature(record: &AnnotationRecord, feature: FeatureType, gene: usize) -> AnnotationFeature {
    AnnotationFeature {
        sequence: record.sequence.clone(),
        start: record.start,
        end: record.end,
        feature,
        strand: record.strand,
        gene,
    }
}

/// The gene identifier a parentless record is known by in the gene table.
fn own_gene_id(record: &AnnotationRecord) -> Result<&str, AnnotationError> {
    record
        .first_attr(&GFF_GENE_ID_KEYS)
        .ok_or(AnnotationError::MissingGeneId { line: record.line })
}

/// The gene a CDS, UTR or exon record belongs to, through its parent chain.
fn owner_of<'a>(
    owners: &HashMap<String, &'a str>,
    record: &'a AnnotationRecord,
) -> Result<&'a str, AnnotationError> {
    match record.parent() {
        Some(parent) => {
            owners
                .get(parent)
                .copied()
                .ok_or_else(|| AnnotationError::UnresolvedParent {
                    line: record.line,
                    parent: parent.to_string(),
                })
        }
        None => own_gene_id(record),
    }
}

fn gff_features(
    records: &[AnnotationRecord],
    table: &GeneTable,
) -> Result<Vec<AnnotationFeature>, AnnotationError> {
    let mut features = Vec::new();
    let mut exons = ExonBuffer::default();
    // record id -> identifier of the gene it descends from
    let mut owners: HashMap<String, &str> = HashMap::new();

    for record in records {
        if record.feature == "REGION" {
            continue;
        }

        match FeatureType::from_record_type(&record.feature) {
            Some(FeatureType::Gene) => {
                if let Some(id) = record.attr("ID") {
                    owners.insert(id.to_string(), id);
                } else if let Some(gene) = record.attr("GENE") {
                    owners.insert(gene.to_string(), gene);
                    // children of unnamed RefSeq genes point at `gene-<symbol>`
                    owners.insert(format!("gene-{}", gene), gene);
                } else if let Some(name) = record.attr("NAME") {
                    owners.insert(name.to_string(), name);
                }
            }
            Some(
                kind @ (FeatureType::Cds
                | FeatureType::FivePrimeUtr
                | FeatureType::ThreePrimeUtr
                | FeatureType::Utr),
            ) => {
                let owner = owner_of(&owners, record)?;
                features.push(feature(record, kind, table.resolve(record, owner)?));
            }
            Some(FeatureType::Exon) => {
                let owner = owner_of(&owners, record)?;
                let exon = feature(record, FeatureType::Exon, table.resolve(record, owner)?);
                let transcript = match record.parent() {
                    Some(parent) => parent,
                    None => own_gene_id(record)?,
                };
                exons.push(transcript, exon, &mut features);
            }
            _ => {
                if let Some(id) = record.attr("ID") {
                    let owner = record
                        .parent()
                        .and_then(|parent| owners.get(parent).copied())
                        .unwrap_or(id);
                    owners.insert(id.to_string(), owner);
                }
            }
        }
    }
    exons.flush(&mut features);

    Ok(features)
}

fn gtf_features(
    records: &[AnnotationRecord],
    table: &GeneTable,
) -> Result<Vec<AnnotationFeature>, AnnotationError> {
    let mut features = Vec::new();
    let mut exons = ExonBuffer::default();

    for record in records {
        let kind = match FeatureType::from_record_type(&record.feature) {
            Some(FeatureType::Gene) | Some(FeatureType::Intron) | None => continue,
            Some(kind) => kind,
        };

        let gene_id = record
            .attr("GENE_ID")
            .ok_or(AnnotationError::MissingGeneId { line: record.line })?;
        let gene = table.resolve(record, gene_id)?;

        if kind == FeatureType::Exon {
            let transcript = record.attr("TRANSCRIPT_ID").ok_or_else(|| {
                AnnotationError::MalformedRecord {
                    line: record.line,
                    reason: "exon without transcript_id".to_string(),
                }
            })?;
            exons.push(transcript, feature(record, kind, gene), &mut features);
        } else {
            features.push(feature(record, kind, gene));
        }
    }
    exons.flush(&mut features);

    Ok(features)
}
