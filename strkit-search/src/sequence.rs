use std::collections::HashMap;
use std::path::Path;

use bio::io::fasta;
use serde::{Deserialize, Serialize};
use strkit_core::utils::get_dynamic_reader;

use crate::errors::SearchError;

/// Random access to named sequences.
///
/// Bases are upper case. Coordinates passed to [`SequenceProvider::fetch`]
/// are 1-based and inclusive.
pub trait SequenceProvider: Send + Sync {
    /// Sequence names in file order.
    fn names(&self) -> Vec<String>;

    fn sequence(&self, name: &str) -> Result<&[u8], SearchError>;

    fn fetch(&self, name: &str, start: u64, end: u64) -> Result<&[u8], SearchError> {
        let seq = self.sequence(name)?;
        let length = seq.len() as u64;
        if start == 0 || start > end || end > length {
            return Err(SearchError::InvalidRange {
                sequence: name.to_string(),
                start,
                end,
                length,
            });
        }
        Ok(&seq[(start - 1) as usize..end as usize])
    }
}

/// All records of a FASTA file held in memory.
#[derive(Debug, Clone, Default)]
pub struct FastaSequences {
    names: Vec<String>,
    seq_map: HashMap<String, Vec<u8>>,
}

impl TryFrom<&Path> for FastaSequences {
    type Error = SearchError;

    ///
    /// Read a FASTA file, gzip compressed or not
    ///
    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        let reader = get_dynamic_reader(value)
            .map_err(|e| SearchError::SequenceFile(format!("{}: {}", value.display(), e)))?;

        let mut sequences = FastaSequences::default();
        for record in fasta::Reader::from_bufread(reader).records() {
            let record =
                record.map_err(|e| SearchError::SequenceFile(format!("{}: {}", value.display(), e)))?;
            sequences.insert(record.id().to_string(), record.seq().to_vec());
        }

        log::info!(
            "Loaded {} sequences from {}",
            sequences.names.len(),
            value.display()
        );
        Ok(sequences)
    }
}

impl TryFrom<&str> for FastaSequences {
    type Error = SearchError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        FastaSequences::try_from(Path::new(value))
    }
}

impl FromIterator<(String, Vec<u8>)> for FastaSequences {
    fn from_iter<T: IntoIterator<Item = (String, Vec<u8>)>>(iter: T) -> Self {
        let mut sequences = FastaSequences::default();
        for (name, seq) in iter {
            sequences.insert(name, seq);
        }
        sequences
    }
}

impl FastaSequences {
    fn insert(&mut self, name: String, mut seq: Vec<u8>) {
        seq.make_ascii_uppercase();
        if self.seq_map.insert(name.clone(), seq).is_none() {
            self.names.push(name);
        } else {
            log::warn!("Duplicate sequence name {}, keeping the last record", name);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seq_map.contains_key(name)
    }
}

impl SequenceProvider for FastaSequences {
    fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn sequence(&self, name: &str) -> Result<&[u8], SearchError> {
        self.seq_map
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| SearchError::UnknownSequence(name.to_string()))
    }
}

/// Sequence on either side of a locus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flanks {
    pub left: String,
    pub right: String,
}

/// Up to `flank` bases on each side of `start..=end`, cut short at the
/// sequence ends.
pub fn flanking<P>(
    provider: &P,
    name: &str,
    start: u64,
    end: u64,
    flank: u64,
) -> Result<Flanks, SearchError>
where
    P: SequenceProvider + ?Sized,
{
    let length = provider.sequence(name)?.len() as u64;
    if start == 0 || start > end || end > length {
        return Err(SearchError::InvalidRange {
            sequence: name.to_string(),
            start,
            end,
            length,
        });
    }

    let left: &[u8] = if start > 1 && flank > 0 {
        let from = start.saturating_sub(flank).max(1);
        provider.fetch(name, from, start - 1)?
    } else {
        &[]
    };
    let right: &[u8] = if end < length && flank > 0 {
        provider.fetch(name, end + 1, (end + flank).min(length))?
    } else {
        &[]
    };

    Ok(Flanks {
        left: String::from_utf8_lossy(left).into_owned(),
        right: String::from_utf8_lossy(right).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn sequences() -> FastaSequences {
        vec![
            ("chr1".to_string(), b"acgtACGTNNacgt".to_vec()),
            ("chr2".to_string(), b"GGGCCC".to_vec()),
        ]
        .into_iter()
        .collect()
    }

    #[rstest]
    fn test_names_keep_order(sequences: FastaSequences) {
        assert_eq!(sequences.names(), vec!["chr1", "chr2"]);
        assert_eq!(sequences.len(), 2);
    }

    #[rstest]
    fn test_bases_are_uppercased(sequences: FastaSequences) {
        assert_eq!(sequences.sequence("chr1").unwrap(), b"ACGTACGTNNACGT");
    }

    #[rstest]
    #[case(1, 4, b"ACGT".as_slice())]
    #[case(9, 10, b"NN".as_slice())]
    #[case(14, 14, b"T".as_slice())]
    fn test_fetch(sequences: FastaSequences, #[case] start: u64, #[case] end: u64, #[case] expected: &[u8]) {
        assert_eq!(sequences.fetch("chr1", start, end).unwrap(), expected);
    }

    #[rstest]
    #[case(0, 3)]
    #[case(5, 4)]
    #[case(10, 15)]
    fn test_fetch_out_of_range(sequences: FastaSequences, #[case] start: u64, #[case] end: u64) {
        assert!(matches!(
            sequences.fetch("chr1", start, end),
            Err(SearchError::InvalidRange { .. })
        ));
    }

    #[rstest]
    fn test_unknown_sequence(sequences: FastaSequences) {
        assert!(matches!(
            sequences.sequence("chrM"),
            Err(SearchError::UnknownSequence(_))
        ));
    }

    #[rstest]
    fn test_flanking(sequences: FastaSequences) {
        let flanks = flanking(&sequences, "chr1", 5, 8, 3).unwrap();
        assert_eq!(flanks.left, "CGT");
        assert_eq!(flanks.right, "NNA");

        // clamped at both ends
        let flanks = flanking(&sequences, "chr2", 2, 5, 100).unwrap();
        assert_eq!(flanks.left, "G");
        assert_eq!(flanks.right, "C");

        let flanks = flanking(&sequences, "chr2", 1, 6, 10).unwrap();
        assert_eq!(flanks, Flanks::default());
    }
}
