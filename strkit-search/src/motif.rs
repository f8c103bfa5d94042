//! Canonical repeat motifs.
//!
//! Repeat units that describe the same tandem repeat (read from another
//! offset, from the other strand, and so on) are grouped into classes, and
//! every class is reported under one representative, its *standard* motif.
//! The representative is the smallest member under the base order
//! `A < T < C < G < anything else`.
//!
//! The grouping depends on a level:
//!
//! | level | a motif is equivalent to                      |
//! |-------|-----------------------------------------------|
//! | 0     | itself only                                   |
//! | 1     | its cyclic rotations                          |
//! | 2     | + rotations of its reverse complement         |
//! | 3     | + rotations of its complement                 |
//! | 4     | + rotations of its reverse                    |
//!
//! Classes that share a member are merged, so looking up a standard motif
//! always returns that same motif.
use std::cmp::Ordering;

use fxhash::FxHashMap;

use crate::errors::SearchError;

/// Longest motif that gets a standard form.
pub const MAX_STANDARD_MOTIF: usize = 6;

/// Highest supported standard level.
pub const MAX_LEVEL: u8 = 4;

pub const DEFAULT_LEVEL: u8 = 3;

const BASES: [u8; 4] = [b'A', b'T', b'C', b'G'];

#[inline]
fn base_rank(base: &u8) -> u8 {
    match base {
        b'A' => 1,
        b'T' => 2,
        b'C' => 3,
        b'G' => 4,
        _ => 5,
    }
}

/// Compare two motifs under the base order `A < T < C < G < other`.
pub fn motif_order(a: &[u8], b: &[u8]) -> Ordering {
    a.iter().map(base_rank).cmp(b.iter().map(base_rank))
}

/// Whether `base` is one of `A`, `C`, `G`, `T`.
#[inline]
pub fn is_unambiguous(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T')
}

/// Whether a motif is not itself a tandem copy of a shorter motif,
/// e.g. `AT` is primitive but `ATAT` and `AAA` are not.
pub fn is_primitive(motif: &[u8]) -> bool {
    let n = motif.len();
    (1..n)
        .filter(|period| n % period == 0)
        .all(|period| (period..n).any(|k| motif[k] != motif[k - period]))
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

pub fn reverse_complement(motif: &str) -> String {
    motif
        .bytes()
        .rev()
        .map(|b| complement(b) as char)
        .collect()
}

fn rotations(motif: &[u8]) -> impl Iterator<Item = Vec<u8>> + '_ {
    (0..motif.len()).map(move |shift| {
        let mut rotated = motif[shift..].to_vec();
        rotated.extend_from_slice(&motif[..shift]);
        rotated
    })
}

fn equivalents(motif: &[u8], level: u8) -> Vec<Vec<u8>> {
    let mut forms = vec![motif.to_vec()];
    if level >= 1 {
        forms.extend(rotations(motif));
    }
    if level >= 2 {
        let rc: Vec<u8> = motif.iter().rev().map(|&b| complement(b)).collect();
        forms.extend(rotations(&rc));
    }
    if level >= 3 {
        let comp: Vec<u8> = motif.iter().map(|&b| complement(b)).collect();
        forms.extend(rotations(&comp));
    }
    if level >= 4 {
        let rev: Vec<u8> = motif.iter().rev().copied().collect();
        forms.extend(rotations(&rev));
    }
    forms
}

/// Every primitive motif of length 1 to [`MAX_STANDARD_MOTIF`].
fn primitive_motifs() -> Vec<Vec<u8>> {
    let mut all = Vec::new();
    let mut layer: Vec<Vec<u8>> = vec![Vec::new()];
    for _ in 0..MAX_STANDARD_MOTIF {
        layer = layer
            .iter()
            .flat_map(|prefix| {
                BASES.iter().map(move |&b| {
                    let mut next = prefix.clone();
                    next.push(b);
                    next
                })
            })
            .collect();
        all.extend(layer.iter().filter(|m| is_primitive(m)).cloned());
    }
    all
}

/// Precomputed motif to standard motif table for one level.
#[derive(Debug, Clone)]
pub struct MotifStandard {
    level: u8,
    table: FxHashMap<String, String>,
}

impl Default for MotifStandard {
    fn default() -> Self {
        MotifStandard {
            level: DEFAULT_LEVEL,
            table: Self::build_table(DEFAULT_LEVEL),
        }
    }
}

impl MotifStandard {
    pub fn new(level: u8) -> Result<Self, SearchError> {
        if level > MAX_LEVEL {
            return Err(SearchError::InvalidLevel(level));
        }
        Ok(MotifStandard {
            level,
            table: Self::build_table(level),
        })
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Rebuild the table for another level.
    pub fn set_level(&mut self, level: u8) -> Result<(), SearchError> {
        if level > MAX_LEVEL {
            return Err(SearchError::InvalidLevel(level));
        }
        if level != self.level {
            self.table = Self::build_table(level);
            self.level = level;
        }
        Ok(())
    }

    /// The standard form of `motif`.
    ///
    /// Motifs outside the table (longer than six bases, not primitive, or
    /// containing anything but `A`, `C`, `G`, `T`) are their own standard.
    pub fn standard<'a>(&'a self, motif: &'a str) -> Result<&'a str, SearchError> {
        if motif.is_empty() {
            return Err(SearchError::EmptyMotif);
        }
        Ok(self.table.get(motif).map(String::as_str).unwrap_or(motif))
    }

    /// Number of distinct standard motifs at this level.
    pub fn classes(&self) -> usize {
        if self.level == 0 {
            return primitive_motifs().len();
        }
        let mut standards: Vec<&String> = self.table.values().collect();
        standards.sort();
        standards.dedup();
        standards.len()
    }

    fn build_table(level: u8) -> FxHashMap<String, String> {
        let mut table = FxHashMap::default();
        if level == 0 {
            return table;
        }

        let motifs = primitive_motifs();
        let index: FxHashMap<&[u8], usize> = motifs
            .iter()
            .enumerate()
            .map(|(i, m)| (m.as_slice(), i))
            .collect();

        // union-find over motif indices, the root of a set is its smallest member
        let mut parent: Vec<usize> = (0..motifs.len()).collect();
        fn root(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for (i, motif) in motifs.iter().enumerate() {
            for form in equivalents(motif, level) {
                let Some(&j) = index.get(form.as_slice()) else {
                    continue;
                };
                let (a, b) = (root(&mut parent, i), root(&mut parent, j));
                if a == b {
                    continue;
                }
                if motif_order(&motifs[a], &motifs[b]) == Ordering::Greater {
                    parent[a] = b;
                } else {
                    parent[b] = a;
                }
            }
        }

        for i in 0..motifs.len() {
            let r = root(&mut parent, i);
            table.insert(
                String::from_utf8_lossy(&motifs[i]).into_owned(),
                String::from_utf8_lossy(&motifs[r]).into_owned(),
            );
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn all_motifs() -> Vec<String> {
        primitive_motifs()
            .into_iter()
            .map(|m| String::from_utf8(m).unwrap())
            .collect()
    }

    #[rstest]
    #[case(b"A", true)]
    #[case(b"AA", false)]
    #[case(b"AT", true)]
    #[case(b"AAA", false)]
    #[case(b"AAT", true)]
    #[case(b"ATAT", false)]
    #[case(b"AATT", true)]
    #[case(b"ATATAT", false)]
    #[case(b"AAGAAG", false)]
    #[case(b"AAGAAT", true)]
    fn test_is_primitive(#[case] motif: &[u8], #[case] expected: bool) {
        assert_eq!(is_primitive(motif), expected);
    }

    #[rstest]
    fn test_primitive_motif_count() {
        // 4 + 12 + 60 + 240 + 1020 + 4020
        assert_eq!(primitive_motifs().len(), 5356);
    }

    #[rstest]
    #[case(0, "GA", "GA")]
    #[case(1, "GA", "AG")]
    #[case(1, "CAG", "AGC")]
    #[case(1, "CTG", "TGC")]
    #[case(2, "CTG", "AGC")]
    #[case(2, "TTC", "AAG")]
    #[case(3, "CAG", "ACG")]
    #[case(3, "ACT", "ATC")]
    #[case(4, "TC", "AG")]
    fn test_standard(#[case] level: u8, #[case] motif: &str, #[case] expected: &str) {
        let standard = MotifStandard::new(level).unwrap();
        assert_eq!(standard.standard(motif).unwrap(), expected);
    }

    #[rstest]
    #[case(0, 5356)]
    #[case(1, 964)]
    #[case(2, 501)]
    #[case(3, 317)]
    #[case(4, 317)]
    fn test_class_counts(#[case] level: u8, #[case] expected: usize) {
        assert_eq!(MotifStandard::new(level).unwrap().classes(), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    fn test_standard_is_idempotent(#[case] level: u8) {
        let standard = MotifStandard::new(level).unwrap();
        for motif in all_motifs() {
            let once = standard.standard(&motif).unwrap();
            assert_eq!(standard.standard(once).unwrap(), once, "motif {motif}");
        }
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn test_rotations_share_a_standard(#[case] level: u8) {
        let standard = MotifStandard::new(level).unwrap();
        for motif in all_motifs() {
            let expected = standard.standard(&motif).unwrap();
            for rotated in rotations(motif.as_bytes()) {
                let rotated = String::from_utf8(rotated).unwrap();
                assert_eq!(standard.standard(&rotated).unwrap(), expected);
            }
        }
    }

    #[rstest]
    fn test_reverse_complement_shares_a_standard() {
        let standard = MotifStandard::new(2).unwrap();
        for motif in all_motifs() {
            let rc = reverse_complement(&motif);
            assert_eq!(
                standard.standard(&motif).unwrap(),
                standard.standard(&rc).unwrap()
            );
        }
    }

    #[rstest]
    #[case("ANT")]
    #[case("ATATAT")]
    #[case("AAGTCAGT")]
    fn test_unlisted_motifs_are_their_own_standard(#[case] motif: &str) {
        let standard = MotifStandard::default();
        assert_eq!(standard.standard(motif).unwrap(), motif);
    }

    #[rstest]
    fn test_errors() {
        assert!(matches!(MotifStandard::new(5), Err(SearchError::InvalidLevel(5))));
        assert!(matches!(
            MotifStandard::default().standard(""),
            Err(SearchError::EmptyMotif)
        ));
    }

    #[rstest]
    fn test_set_level() {
        let mut standard = MotifStandard::new(0).unwrap();
        assert_eq!(standard.standard("TC").unwrap(), "TC");
        standard.set_level(2).unwrap();
        assert_eq!(standard.level(), 2);
        assert_eq!(standard.standard("TC").unwrap(), "AG");
        assert!(standard.set_level(7).is_err());
        assert_eq!(standard.level(), 2);
    }
}
