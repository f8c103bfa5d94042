use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strkit_core::models::{ImperfectLocus, PerfectLocus};

use crate::motif::is_unambiguous;

/// Base composition of one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStats {
    pub name: String,
    pub length: u64,
    pub gc: u64,
    /// Bases other than A, C, G and T.
    pub ambiguous: u64,
}

impl SequenceStats {
    pub fn from_bases(name: &str, seq: &[u8]) -> Self {
        let mut gc = 0;
        let mut ambiguous = 0;
        for &base in seq {
            match base {
                b'G' | b'C' => gc += 1,
                b if !is_unambiguous(b) => ambiguous += 1,
                _ => {}
            }
        }
        SequenceStats {
            name: name.to_string(),
            length: seq.len() as u64,
            gc,
            ambiguous,
        }
    }

    /// Bases that can take part in a repeat.
    pub fn valid_bases(&self) -> u64 {
        self.length - self.ambiguous
    }

    pub fn gc_content(&self) -> f64 {
        match self.valid_bases() {
            0 => 0.0,
            valid => self.gc as f64 / valid as f64,
        }
    }
}

/// Label of a motif length class.
pub fn motif_class(motif_len: usize) -> &'static str {
    match motif_len {
        1 => "Mono",
        2 => "Di",
        3 => "Tri",
        4 => "Tetra",
        5 => "Penta",
        6 => "Hexa",
        _ => "Other",
    }
}

/// Aggregate figures over a set of repeat loci.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepeatSummary {
    pub total_loci: u64,
    pub total_bases: u64,
    /// Valid bases of the scanned sequences.
    pub scanned_bases: u64,
    /// Loci per megabase of valid sequence.
    pub relative_abundance: f64,
    /// Repeat bases per megabase of valid sequence.
    pub relative_density: f64,
    pub classes: BTreeMap<String, u64>,
    /// Most frequent standard motifs, most frequent first.
    pub top_motifs: Vec<(String, u64)>,
    /// Loci per annotation category.
    pub locations: BTreeMap<String, u64>,
}

impl RepeatSummary {
    /// Summarise `(standard motif, motif length, locus length)` triples.
    pub fn from_loci<'a, L>(loci: L, stats: &[SequenceStats], top: usize) -> Self
    where
        L: IntoIterator<Item = (&'a str, usize, u64)>,
    {
        let mut summary = RepeatSummary {
            scanned_bases: stats.iter().map(SequenceStats::valid_bases).sum(),
            ..Default::default()
        };
        let mut motifs: HashMap<&str, u64> = HashMap::new();

        for (standard, motif_len, length) in loci {
            summary.total_loci += 1;
            summary.total_bases += length;
            *summary.classes.entry(motif_class(motif_len).to_string()).or_default() += 1;
            *motifs.entry(standard).or_default() += 1;
        }

        if summary.scanned_bases > 0 {
            let megabases = summary.scanned_bases as f64 / 1e6;
            summary.relative_abundance = summary.total_loci as f64 / megabases;
            summary.relative_density = summary.total_bases as f64 / megabases;
        }

        let mut ranked: Vec<(String, u64)> = motifs
            .into_iter()
            .map(|(motif, count)| (motif.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top);
        summary.top_motifs = ranked;

        summary
    }

    pub fn from_perfect(loci: &[PerfectLocus], stats: &[SequenceStats], top: usize) -> Self {
        Self::from_loci(
            loci.iter()
                .map(|l| (l.standard.as_str(), l.motif_len, l.length)),
            stats,
            top,
        )
    }

    pub fn from_imperfect(loci: &[ImperfectLocus], stats: &[SequenceStats], top: usize) -> Self {
        Self::from_loci(
            loci.iter()
                .map(|l| (l.standard.as_str(), l.motif_len, l.length)),
            stats,
            top,
        )
    }

    /// Count one locus under an annotation category.
    pub fn record_location(&mut self, category: &str) {
        *self.locations.entry(category.to_string()).or_default() += 1;
    }
}
