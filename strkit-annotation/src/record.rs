use std::collections::HashMap;
use std::io::BufRead;

use strkit_core::models::Strand;

use crate::errors::AnnotationError;
use crate::format::AnnotationFormat;

/// One data line of a GFF or GTF file.
///
/// The feature type and attribute keys are upper cased so lookups do not
/// depend on the conventions of whoever wrote the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// 1-based line number, for error messages.
    pub line: usize,
    pub sequence: String,
    pub feature: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub attributes: HashMap<String, String>,
}

impl AnnotationRecord {
    /// Parse a data line. Comments and blank lines give `Ok(None)`.
    pub fn parse(
        text: &str,
        line: usize,
        format: AnnotationFormat,
    ) -> Result<Option<AnnotationRecord>, AnnotationError> {
        let text = text.trim_end();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let malformed = |reason: String| AnnotationError::MalformedRecord { line, reason };

        let columns: Vec<&str> = text.split('\t').collect();
        if columns.len() != 9 {
            return Err(malformed(format!(
                "expected 9 columns, found {}",
                columns.len()
            )));
        }

        let start = columns[3]
            .parse::<u64>()
            .map_err(|e| malformed(format!("start {}: {}", columns[3], e)))?;
        let end = columns[4]
            .parse::<u64>()
            .map_err(|e| malformed(format!("end {}: {}", columns[4], e)))?;
        if start == 0 || start > end {
            return Err(malformed(format!("invalid range {}-{}", start, end)));
        }

        Ok(Some(AnnotationRecord {
            line,
            sequence: columns[0].to_string(),
            feature: columns[2].to_uppercase(),
            start,
            end,
            strand: columns[6].chars().next().map_or(Strand::Unstranded, Strand::from_char),
            attributes: parse_attributes(columns[8], format),
        }))
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Value of the first key in `keys` that is present.
    pub fn first_attr(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.attr(key))
    }

    /// The `Parent` attribute; for multi-parent records, the first parent.
    pub fn parent(&self) -> Option<&str> {
        self.attr("PARENT")
            .and_then(|p| p.split(',').next())
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

fn parse_attributes(column: &str, format: AnnotationFormat) -> HashMap<String, String> {
    column
        .split(';')
        .filter_map(|item| {
            let item = item.trim();
            if item.is_empty() {
                return None;
            }
            let (key, value) = match format {
                AnnotationFormat::Gff => item.split_once('=')?,
                AnnotationFormat::Gtf => item.split_once(' ')?,
            };
            Some((
                key.trim().to_uppercase(),
                value.trim().trim_matches('"').to_string(),
            ))
        })
        .collect()
}

/// Iterator over the records of an annotation stream.
///
/// GFF3 files may end with an embedded `##FASTA` section; reading stops there.
pub struct RecordReader<R> {
    lines: std::io::Lines<R>,
    format: AnnotationFormat,
    line: usize,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R, format: AnnotationFormat) -> Self {
        RecordReader {
            lines: reader.lines(),
            format,
            line: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<AnnotationRecord, AnnotationError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;

            if text.starts_with("##FASTA") {
                self.done = true;
                break;
            }

            match AnnotationRecord::parse(&text, self.line, self.format) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_parse_gff() {
        let record = AnnotationRecord::parse(
            "chr1\tRefSeq\tCDS\t11\t20\t.\t-\t0\tID=cds-1;Parent=rna-1,rna-2;gene=ABC",
            3,
            AnnotationFormat::Gff,
        )
        .unwrap()
        .unwrap();

        assert_eq!(record.line, 3);
        assert_eq!(record.feature, "CDS");
        assert_eq!((record.start, record.end), (11, 20));
        assert_eq!(record.strand, Strand::Reverse);
        assert_eq!(record.attr("GENE"), Some("ABC"));
        assert_eq!(record.parent(), Some("rna-1"));
        assert_eq!(record.first_attr(&["NAME", "GENE", "ID"]), Some("ABC"));
    }

    #[rstest]
    fn test_parse_gtf() {
        let record = AnnotationRecord::parse(
            "1\thavana\texon\t100\t200\t.\t+\t.\tgene_id \"ENSG1\"; transcript_id \"ENST1\"; gene_name \"DDX11L1\";",
            1,
            AnnotationFormat::Gtf,
        )
        .unwrap()
        .unwrap();

        assert_eq!(record.feature, "EXON");
        assert_eq!(record.attr("GENE_ID"), Some("ENSG1"));
        assert_eq!(record.attr("TRANSCRIPT_ID"), Some("ENST1"));
        assert_eq!(record.attr("GENE_NAME"), Some("DDX11L1"));
        assert_eq!(record.parent(), None);
    }

    #[rstest]
    #[case("")]
    #[case("##gff-version 3")]
    #[case("#!genome-build GRCh38")]
    fn test_skipped_lines(#[case] line: &str) {
        assert_eq!(
            AnnotationRecord::parse(line, 1, AnnotationFormat::Gff).unwrap(),
            None
        );
    }

    #[rstest]
    #[case("chr1\tx\tgene\tone\t10\t.\t+\t.\tID=a")]
    #[case("chr1\tx\tgene\t20\t10\t.\t+\t.\tID=a")]
    #[case("chr1\tx\tgene\t1\t10")]
    fn test_malformed(#[case] line: &str) {
        assert!(matches!(
            AnnotationRecord::parse(line, 7, AnnotationFormat::Gff),
            Err(AnnotationError::MalformedRecord { line: 7, .. })
        ));
    }

    #[rstest]
    fn test_reader_stops_at_fasta() {
        let text = "##gff-version 3\nchr1\tx\tgene\t1\t10\t.\t+\t.\tID=a\n##FASTA\n>chr1\nACGT\n";
        let records: Vec<AnnotationRecord> = RecordReader::new(text.as_bytes(), AnnotationFormat::Gff)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 2);
    }
}
