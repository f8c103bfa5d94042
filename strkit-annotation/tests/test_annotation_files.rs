use std::fs::File;
use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use strkit_annotation::{AnnotationError, AnnotationFormat, FeatureIndex, GeneModel, Location};
use strkit_core::models::FeatureType;
use strkit_overlaprs::OverlapperType;

const GFF: &str = "\
##gff-version 3
#!genome-build test
NC_1\tRefSeq\tregion\t1\t10000\t.\t+\t.\tID=NC_1:1..10000;Dbxref=taxon:9606
NC_1\tRefSeq\tgene\t1000\t4000\t.\t+\t.\tID=gene-KIT;Name=KIT;gene_biotype=protein_coding
NC_1\tRefSeq\tmRNA\t1000\t4000\t.\t+\t.\tID=rna-NM_1;Parent=gene-KIT
NC_1\tRefSeq\texon\t1000\t1200\t.\t+\t.\tID=exon-1;Parent=rna-NM_1
NC_1\tRefSeq\texon\t2000\t2300\t.\t+\t.\tID=exon-2;Parent=rna-NM_1
NC_1\tRefSeq\texon\t3500\t4000\t.\t+\t.\tID=exon-3;Parent=rna-NM_1
NC_1\tRefSeq\tfive_prime_UTR\t1000\t1099\t.\t+\t.\tParent=rna-NM_1
NC_1\tRefSeq\tCDS\t1100\t1200\t.\t+\t0\tID=cds-1;Parent=rna-NM_1
NC_1\tRefSeq\tCDS\t2000\t2300\t.\t+\t1\tID=cds-1;Parent=rna-NM_1
NC_1\tRefSeq\tCDS\t3500\t3700\t.\t+\t2\tID=cds-1;Parent=rna-NM_1
NC_1\tRefSeq\tthree_prime_UTR\t3701\t4000\t.\t+\t.\tParent=rna-NM_1
NC_1\tRefSeq\tgene\t6000\t7000\t.\t-\t.\tgene=LINC1;gene_biotype=lncRNA
NC_1\tRefSeq\tlnc_RNA\t6000\t7000\t.\t-\t.\tID=rna-X;Parent=gene-LINC1
NC_1\tRefSeq\texon\t6000\t6100\t.\t-\t.\tParent=rna-X
NC_1\tRefSeq\texon\t6900\t7000\t.\t-\t.\tParent=rna-X
##FASTA
>NC_1
ACGT
";

const GTF: &str = "\
1\tensembl\tgene\t1000\t4000\t.\t+\t.\tgene_id \"ENSG1\"; gene_name \"KIT\"; gene_biotype \"protein_coding\";
1\tensembl\ttranscript\t1000\t4000\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"ENST1\";
1\tensembl\texon\t1000\t1200\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"ENST1\";
1\tensembl\texon\t2000\t2300\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"ENST1\";
1\tensembl\texon\t3500\t4000\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"ENST1\";
1\tensembl\tCDS\t1100\t1200\t.\t+\t0\tgene_id \"ENSG1\"; transcript_id \"ENST1\";
1\tensembl\tfive_prime_utr\t1000\t1099\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"ENST1\";
";

fn write_plain(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).unwrap();
}

fn write_gz(dir: &Path, name: &str, text: &str) {
    let mut enc = GzEncoder::new(File::create(dir.join(name)).unwrap(), Compression::default());
    enc.write_all(text.as_bytes()).unwrap();
    enc.finish().unwrap();
}

#[fixture]
fn annotation_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_plain(dir.path(), "genes.gff3", GFF);
    write_gz(dir.path(), "genes.gff3.gz", GFF);
    write_plain(dir.path(), "genes.gtf", GTF);
    write_gz(dir.path(), "genes.gtf.gz", GTF);
    dir
}

#[rstest]
#[case("genes.gff3", AnnotationFormat::Gff)]
#[case("genes.gff3.gz", AnnotationFormat::Gff)]
#[case("genes.gtf", AnnotationFormat::Gtf)]
#[case("genes.gtf.gz", AnnotationFormat::Gtf)]
fn test_detect_path(annotation_dir: TempDir, #[case] file: &str, #[case] expected: AnnotationFormat) {
    let format = AnnotationFormat::detect_path(&annotation_dir.path().join(file)).unwrap();
    assert_eq!(format, expected);
}

#[rstest]
#[case("genes.gff3")]
#[case("genes.gff3.gz")]
fn test_gff_model(annotation_dir: TempDir, #[case] file: &str) {
    let model = GeneModel::from_path(&annotation_dir.path().join(file)).unwrap();

    let names: Vec<&str> = model.genes.iter().map(|g| g.gene_name.as_str()).collect();
    assert_eq!(names, vec!["KIT", "LINC1"]);

    let count = |kind: FeatureType| model.features.iter().filter(|f| f.feature == kind).count();
    // three exons of KIT give two introns, two exons of LINC1 give one
    assert_eq!(count(FeatureType::Exon), 5);
    assert_eq!(count(FeatureType::Intron), 3);
    assert_eq!(count(FeatureType::Cds), 3);
    assert_eq!(count(FeatureType::Gene), 2);
}

#[rstest]
#[case("genes.gff3", OverlapperType::AIList)]
#[case("genes.gff3.gz", OverlapperType::NCList)]
#[case("genes.gtf", OverlapperType::AIList)]
#[case("genes.gtf.gz", OverlapperType::NCList)]
fn test_locate_from_file(
    annotation_dir: TempDir,
    #[case] file: &str,
    #[case] overlapper_type: OverlapperType,
) {
    let path = annotation_dir.path().join(file);
    let index = FeatureIndex::from_path_with(&path, overlapper_type).unwrap();
    let seqid = if file.contains("gtf") { "1" } else { "NC_1" };

    assert_eq!(index.locate(seqid, 1150, 1170).label(), "CDS");
    // the UTR lies inside the first exon, and exons rank higher
    assert_eq!(index.locate(seqid, 1050, 1060).label(), "exon");
    assert_eq!(index.locate(seqid, 1500, 1520).label(), "intron");
    assert_eq!(index.locate(seqid, 5000, 5020), Location::Intergenic);
    assert_eq!(index.locate("chrUn", 1, 10), Location::Unannotated);

    let location = index.locate(seqid, 2100, 2110);
    assert_eq!(location.gene().map(|g| g.gene_name.as_str()), Some("KIT"));
}

#[rstest]
fn test_gene_alias_resolves(annotation_dir: TempDir) {
    let index = FeatureIndex::from_path(&annotation_dir.path().join("genes.gff3")).unwrap();
    let location = index.locate("NC_1", 6500, 6510);
    assert_eq!(location.label(), "intron");
    assert_eq!(location.gene().map(|g| g.gene_id.as_str()), Some("LINC1"));
    assert_eq!(location.gene().map(|g| g.biotype.as_str()), Some("lncRNA"));
}

#[rstest]
fn test_unresolved_parent_aborts_load(annotation_dir: TempDir) {
    let text = format!("{}NC_2\tRefSeq\tCDS\t10\t20\t.\t+\t0\tParent=rna-missing\n", GFF.split("##FASTA").next().unwrap());
    write_plain(annotation_dir.path(), "broken.gff3", &text);

    let result = GeneModel::from_path(&annotation_dir.path().join("broken.gff3"));
    assert!(matches!(result, Err(AnnotationError::UnresolvedParent { .. })));
}

#[rstest]
fn test_not_an_annotation(annotation_dir: TempDir) {
    write_plain(annotation_dir.path(), "regions.bed", "chr1\t10\t20\n");
    let result = FeatureIndex::from_path(&annotation_dir.path().join("regions.bed"));
    assert!(matches!(result, Err(AnnotationError::UnknownFormat(_))));
}
