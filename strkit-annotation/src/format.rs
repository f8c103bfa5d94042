use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use strkit_core::utils::{first_data_line, get_dynamic_reader};

use crate::errors::AnnotationError;

/// Attribute dialect of a gene annotation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationFormat {
    /// `key=value;` attributes
    Gff,
    /// `key "value";` attributes
    Gtf,
}

impl AnnotationFormat {
    /// Decide the dialect from the first data line of a file.
    pub fn detect(line: &str) -> Result<AnnotationFormat, AnnotationError> {
        let columns: Vec<&str> = line.trim_end().split('\t').collect();
        if columns.len() != 9 {
            return Err(AnnotationError::UnknownFormat(format!(
                "expected 9 tab separated columns, found {}",
                columns.len()
            )));
        }

        let attributes = columns[8];
        if attributes.contains('=') {
            Ok(AnnotationFormat::Gff)
        } else if attributes.contains("gene_id \"") {
            Ok(AnnotationFormat::Gtf)
        } else {
            Err(AnnotationError::UnknownFormat(format!(
                "unrecognised attributes: {}",
                attributes
            )))
        }
    }

    pub fn detect_path(path: &Path) -> Result<AnnotationFormat, AnnotationError> {
        let reader =
            get_dynamic_reader(path).map_err(|e| AnnotationError::Read(e.to_string()))?;
        match first_data_line(reader).map_err(|e| AnnotationError::Read(e.to_string()))? {
            Some(line) => AnnotationFormat::detect(&line),
            None => Err(AnnotationError::UnknownFormat(format!(
                "{} has no records",
                path.display()
            ))),
        }
    }
}

impl Display for AnnotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationFormat::Gff => write!(f, "GFF"),
            AnnotationFormat::Gtf => write!(f, "GTF"),
        }
    }
}
