//! Exact tandem repeat scanners.
//!
//! Both scanners walk the sequence once, left to right. At each position
//! the candidate periods are tried shortest first and the first one whose
//! exact run reaches its repeat threshold is reported; scanning then resumes
//! right after the reported repeat, so hits never overlap.
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strkit_core::models::{LargeMotifLocus, PerfectLocus};

use crate::motif::{MAX_STANDARD_MOTIF, MotifStandard, is_primitive, is_unambiguous};

/// Minimum repeat counts for motifs of length 1 to 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinRepeats([u32; MAX_STANDARD_MOTIF]);

impl Default for MinRepeats {
    fn default() -> Self {
        MinRepeats([12, 7, 5, 4, 4, 4])
    }
}

impl MinRepeats {
    pub fn new(mono: u32, di: u32, tri: u32, tetra: u32, penta: u32, hexa: u32) -> Self {
        MinRepeats([mono, di, tri, tetra, penta, hexa])
    }

    /// Threshold for a motif of `motif_len` bases.
    pub fn get(&self, motif_len: usize) -> u32 {
        self.0[motif_len.clamp(1, MAX_STANDARD_MOTIF) - 1]
    }
}

impl From<[u32; MAX_STANDARD_MOTIF]> for MinRepeats {
    fn from(value: [u32; MAX_STANDARD_MOTIF]) -> Self {
        MinRepeats(value)
    }
}

/// An exact repeat found by [`scan_perfect`] or [`scan_vntr`].
///
/// Coordinates are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TandemHit {
    pub motif: String,
    pub repeat: u32,
    pub start: u64,
    pub end: u64,
}

impl TandemHit {
    pub fn motif_len(&self) -> usize {
        self.motif.len()
    }

    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    fn standard_motif(&self, standard: &MotifStandard) -> String {
        standard
            .standard(&self.motif)
            .map(str::to_string)
            .unwrap_or_else(|_| self.motif.clone())
    }

    pub fn into_perfect(self, sequence: &str, standard: &MotifStandard) -> PerfectLocus {
        PerfectLocus {
            id: None,
            sequence: sequence.to_string(),
            standard: self.standard_motif(standard),
            motif_len: self.motif_len(),
            repeat: self.repeat,
            start: self.start,
            end: self.end,
            length: self.length(),
            motif: self.motif,
        }
    }

    pub fn into_large_motif(self, sequence: &str, standard: &MotifStandard) -> LargeMotifLocus {
        LargeMotifLocus {
            id: None,
            sequence: sequence.to_string(),
            standard: self.standard_motif(standard),
            motif_len: self.motif_len(),
            repeat: self.repeat,
            start: self.start,
            end: self.end,
            length: self.length(),
            motif: self.motif,
        }
    }
}

/// Length of the exact run of period `period` starting at `pos`, counting the
/// first copy of the motif. The run stops at the first mismatch, the first
/// ambiguous base, or the end of the sequence.
pub(crate) fn run_length(seq: &[u8], pos: usize, period: usize) -> usize {
    let mut length = period;
    while pos + length < seq.len() {
        let base = seq[pos + length - period];
        if !is_unambiguous(base) || base != seq[pos + length] {
            break;
        }
        length += 1;
    }
    length
}

/// Motif of `period` bases at `pos`, if it is a valid repeat unit.
pub(crate) fn candidate_motif(seq: &[u8], pos: usize, period: usize) -> Option<&[u8]> {
    let motif = seq.get(pos..pos + period)?;
    (motif.iter().all(|&b| is_unambiguous(b)) && is_primitive(motif)).then_some(motif)
}

fn scan_periods<F>(seq: &[u8], periods: RangeInclusive<usize>, threshold: F) -> Vec<TandemHit>
where
    F: Fn(usize) -> u32,
{
    let mut hits = Vec::new();
    let mut pos = 0;

    'scan: while pos < seq.len() {
        if !is_unambiguous(seq[pos]) {
            pos += 1;
            continue;
        }

        for period in periods.clone() {
            let Some(motif) = candidate_motif(seq, pos, period) else {
                continue;
            };
            let repeat = run_length(seq, pos, period) / period;
            if (repeat as u32) < threshold(period) {
                continue;
            }

            let length = repeat * period;
            hits.push(TandemHit {
                motif: String::from_utf8_lossy(motif).into_owned(),
                repeat: repeat as u32,
                start: pos as u64 + 1,
                end: (pos + length) as u64,
            });
            pos += length;
            continue 'scan;
        }

        pos += 1;
    }

    hits
}

/// Find exact microsatellites (motifs of 1 to 6 bases).
pub fn scan_perfect(seq: &[u8], min_repeats: &MinRepeats) -> Vec<TandemHit> {
    scan_periods(seq, 1..=MAX_STANDARD_MOTIF, |period| min_repeats.get(period))
}

/// Find exact tandem repeats with motifs of `min_motif` to `max_motif` bases
/// repeated at least `min_repeat` times.
pub fn scan_vntr(seq: &[u8], min_motif: usize, max_motif: usize, min_repeat: u32) -> Vec<TandemHit> {
    let min_motif = min_motif.max(1);
    if min_motif > max_motif {
        return Vec::new();
    }
    scan_periods(seq, min_motif..=max_motif, |_| min_repeat)
}
