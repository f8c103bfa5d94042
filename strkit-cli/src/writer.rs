use std::io::{self, Write};

use serde::Serialize;

use strkit_annotation::Location;
use strkit_core::models::{
    CompoundLocus, ImperfectLocus, LargeMotifLocus, PerfectLocus, RepeatKind,
};
use strkit_search::{Flanks, RepeatSummary};

/// What is reported about a locus besides the locus itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Annotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gene_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_flank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_flank: Option<String>,
}

impl Annotation {
    pub fn set_location(&mut self, location: &Location<'_>) {
        self.location = Some(location.label());
        if let Some(gene) = location.gene() {
            self.gene_id = Some(gene.gene_id.clone());
            self.gene_name = Some(gene.gene_name.clone());
        }
    }

    pub fn set_flanks(&mut self, flanks: Flanks) {
        self.left_flank = Some(flanks.left);
        self.right_flank = Some(flanks.right);
    }
}

/// Which optional column groups a table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Columns {
    pub location: bool,
    pub flanks: bool,
}

/// A locus that can be written as one tab separated row.
pub trait TsvRow {
    const HEADER: &'static [&'static str];

    fn fields(&self) -> Vec<String>;
}

fn id_field(id: Option<u64>) -> String {
    id.map_or_else(|| ".".to_string(), |id| id.to_string())
}

impl TsvRow for PerfectLocus {
    const HEADER: &'static [&'static str] = &[
        "id", "sequence", "start", "end", "motif", "standard", "type", "repeat", "length",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            id_field(self.id),
            self.sequence.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.motif.clone(),
            self.standard.clone(),
            self.motif_len.to_string(),
            self.repeat.to_string(),
            self.length.to_string(),
        ]
    }
}

impl TsvRow for ImperfectLocus {
    const HEADER: &'static [&'static str] = &[
        "id",
        "sequence",
        "start",
        "end",
        "motif",
        "standard",
        "type",
        "length",
        "matches",
        "substitutions",
        "insertions",
        "deletions",
        "score",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            id_field(self.id),
            self.sequence.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.motif.clone(),
            self.standard.clone(),
            self.motif_len.to_string(),
            self.length.to_string(),
            self.matches.to_string(),
            self.substitutions.to_string(),
            self.insertions.to_string(),
            self.deletions.to_string(),
            self.score.to_string(),
        ]
    }
}

impl TsvRow for CompoundLocus {
    const HEADER: &'static [&'static str] = &[
        "id",
        "sequence",
        "start",
        "end",
        "motif",
        "complexity",
        "length",
        "gap",
        "component",
        "structure",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            id_field(self.id),
            self.sequence.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.motif.clone(),
            self.complexity.to_string(),
            self.length.to_string(),
            self.gap.to_string(),
            self.component.clone(),
            self.structure.clone(),
        ]
    }
}

impl TsvRow for LargeMotifLocus {
    const HEADER: &'static [&'static str] = &[
        "id", "sequence", "start", "end", "motif", "standard", "type", "repeat", "length",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            id_field(self.id),
            self.sequence.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.motif.clone(),
            self.standard.clone(),
            self.motif_len.to_string(),
            self.repeat.to_string(),
            self.length.to_string(),
        ]
    }
}

fn or_dot(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some("") | None => ".",
        Some(value) => value,
    }
}

/// Write `loci` as a TSV table with a header line. `annotations` runs
/// parallel to `loci`.
pub fn write_tsv<W: Write, L: TsvRow>(
    out: &mut W,
    loci: &[L],
    annotations: &[Annotation],
    columns: Columns,
) -> io::Result<()> {
    let mut header: Vec<&str> = L::HEADER.to_vec();
    if columns.location {
        header.extend(["location", "gene_id", "gene_name"]);
    }
    if columns.flanks {
        header.extend(["left_flank", "right_flank"]);
    }
    writeln!(out, "{}", header.join("\t"))?;

    let empty = Annotation::default();
    for (i, locus) in loci.iter().enumerate() {
        let annotation = annotations.get(i).unwrap_or(&empty);
        let mut row = locus.fields();
        if columns.location {
            row.push(or_dot(&annotation.location).to_string());
            row.push(or_dot(&annotation.gene_id).to_string());
            row.push(or_dot(&annotation.gene_name).to_string());
        }
        if columns.flanks {
            row.push(or_dot(&annotation.left_flank).to_string());
            row.push(or_dot(&annotation.right_flank).to_string());
        }
        writeln!(out, "{}", row.join("\t"))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct AnnotatedLocus<'a, L> {
    #[serde(flatten)]
    pub locus: &'a L,
    #[serde(flatten)]
    pub annotation: &'a Annotation,
}

pub fn annotated<'a, L>(loci: &'a [L], annotations: &'a [Annotation]) -> Vec<AnnotatedLocus<'a, L>> {
    loci.iter()
        .zip(annotations)
        .map(|(locus, annotation)| AnnotatedLocus { locus, annotation })
        .collect()
}

/// Everything one search writes in JSON mode.
#[derive(Debug, Serialize)]
pub struct SearchReport<'a, L> {
    pub kind: RepeatKind,
    pub summary: &'a RepeatSummary,
    pub loci: Vec<AnnotatedLocus<'a, L>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub compound: Vec<AnnotatedLocus<'a, CompoundLocus>>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub skipped: &'a [String],
}

pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn locus() -> PerfectLocus {
        PerfectLocus {
            id: Some(1),
            sequence: "chr1".to_string(),
            standard: "AG".to_string(),
            motif: "TC".to_string(),
            motif_len: 2,
            repeat: 8,
            start: 30,
            end: 45,
            length: 16,
        }
    }

    #[fixture]
    fn annotation() -> Annotation {
        Annotation {
            location: Some("intron".to_string()),
            gene_id: Some("gene-KIT".to_string()),
            gene_name: Some("KIT".to_string()),
            left_flank: Some("ACGT".to_string()),
            right_flank: Some(String::new()),
        }
    }

    #[rstest]
    fn test_tsv_plain(locus: PerfectLocus) {
        let mut out = Vec::new();
        write_tsv(&mut out, &[locus], &[], Columns::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id\tsequence\tstart\tend\tmotif\tstandard\ttype\trepeat\tlength\n\
             1\tchr1\t30\t45\tTC\tAG\t2\t8\t16\n"
        );
    }

    #[rstest]
    fn test_tsv_with_annotation(locus: PerfectLocus, annotation: Annotation) {
        let mut out = Vec::new();
        let columns = Columns {
            location: true,
            flanks: true,
        };
        write_tsv(&mut out, &[locus], &[annotation], columns).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].ends_with("location\tgene_id\tgene_name\tleft_flank\tright_flank"));
        // an empty flank at a sequence end is written as a dot
        assert!(lines[1].ends_with("intron\tgene-KIT\tKIT\tACGT\t."));
    }

    #[rstest]
    fn test_json_flattens_annotation(locus: PerfectLocus, annotation: Annotation) {
        let loci = vec![locus];
        let annotations = vec![Annotation {
            left_flank: None,
            right_flank: None,
            ..annotation
        }];
        let summary = RepeatSummary::default();
        let report = SearchReport {
            kind: RepeatKind::Perfect,
            summary: &summary,
            loci: annotated(&loci, &annotations),
            compound: Vec::new(),
            skipped: &[],
        };

        let mut out = Vec::new();
        write_json(&mut out, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["kind"], "ssr");
        assert_eq!(value["loci"][0]["motif"], "TC");
        assert_eq!(value["loci"][0]["location"], "intron");
        assert_eq!(value["loci"][0].get("left_flank"), None);
        assert_eq!(value.get("compound"), None);
    }
}
