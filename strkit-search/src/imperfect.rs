//! Imperfect microsatellites by seed and extend.
//!
//! A seed is an exact run of a 1-6 bp motif. From the seed, the repeat is
//! extended in both directions by aligning the flanking sequence against the
//! periodic continuation of the motif with a bounded edit distance matrix.
//! Extension stops once the best edit distance has grown for more than
//! `max_consecutive_edits` steps in a row, or when the window or the sequence
//! runs out.
//!
//! Matrix layout: row `x` is the `x`-th motif base away from the seed, column
//! `n` the `n`-th sequence base away from the seed. Step `n` fills the ring
//! made of column `n` above the diagonal, row `n` left of the diagonal, and
//! the diagonal cell itself. A move that consumes a sequence base only is an
//! insertion, one that consumes a motif base only is a deletion.
use serde::{Deserialize, Serialize};
use strkit_core::models::ImperfectLocus;

use crate::motif::{MAX_STANDARD_MOTIF, MotifStandard, is_unambiguous};
use crate::perfect::{candidate_motif, run_length};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImperfectParams {
    /// Minimum number of exact motif copies in a seed.
    pub seed_repeat: u32,
    /// Minimum seed length in bases.
    pub seed_min_length: u32,
    pub max_consecutive_edits: u32,
    pub mismatch_penalty: i64,
    pub gap_penalty: i64,
    pub min_score: i64,
    /// Maximum number of bases one extension may examine.
    pub window_size: usize,
}

impl Default for ImperfectParams {
    fn default() -> Self {
        ImperfectParams {
            seed_repeat: 3,
            seed_min_length: 8,
            max_consecutive_edits: 3,
            mismatch_penalty: 1,
            gap_penalty: 2,
            min_score: 10,
            window_size: 500,
        }
    }
}

impl ImperfectParams {
    pub fn score(&self, matches: u32, substitutions: u32, insertions: u32, deletions: u32) -> i64 {
        matches as i64
            - substitutions as i64 * self.mismatch_penalty
            - (insertions as i64 + deletions as i64) * self.gap_penalty
    }
}

/// An imperfect repeat found by [`scan_imperfect`], 1-based inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImperfectHit {
    pub motif: String,
    pub start: u64,
    pub end: u64,
    pub matches: u32,
    pub substitutions: u32,
    pub insertions: u32,
    pub deletions: u32,
    pub score: i64,
}

impl ImperfectHit {
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn into_locus(self, sequence: &str, standard: &MotifStandard) -> ImperfectLocus {
        let standard = standard
            .standard(&self.motif)
            .map(str::to_string)
            .unwrap_or_else(|_| self.motif.clone());
        ImperfectLocus {
            id: None,
            sequence: sequence.to_string(),
            standard,
            motif_len: self.motif.len(),
            start: self.start,
            end: self.end,
            length: self.length(),
            matches: self.matches,
            substitutions: self.substitutions,
            insertions: self.insertions,
            deletions: self.deletions,
            score: self.score,
            motif: self.motif,
        }
    }
}

/// Edit operations of one extension and how many sequence bases it covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extension {
    pub matches: u32,
    pub substitutions: u32,
    pub insertions: u32,
    pub deletions: u32,
    pub consumed: usize,
}

/// Square edit distance matrix of `(size + 1)²` cells.
///
/// Row 0 and column 0 hold their index and are never written again; every
/// other cell of ring `n` is rewritten before it is read, so one matrix can
/// serve any number of extensions of up to `size` steps.
#[derive(Debug, Clone)]
pub struct EditMatrix {
    size: usize,
    cells: Vec<u32>,
}

impl EditMatrix {
    pub fn new(size: usize) -> Self {
        let width = size + 1;
        let mut cells = vec![0; width * width];
        for k in 0..width {
            cells[k] = k as u32;
            cells[k * width] = k as u32;
        }
        EditMatrix { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> u32 {
        self.cells[row * (self.size + 1) + col]
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, value: u32) {
        let width = self.size + 1;
        self.cells[row * width + col] = value;
    }

    #[inline]
    fn fill(&mut self, row: usize, col: usize, same: bool) -> u32 {
        let diagonal = self.at(row - 1, col - 1);
        let value = if same {
            diagonal
        } else {
            diagonal
                .min(self.at(row - 1, col))
                .min(self.at(row, col - 1))
                + 1
        };
        self.set(row, col, value);
        value
    }

    /// Fill ring `n` and return its smallest cell.
    fn fill_ring<S, M>(&mut self, n: usize, seq_at: &S, motif_at: &M) -> u32
    where
        S: Fn(usize) -> u8,
        M: Fn(usize) -> u8,
    {
        let base = seq_at(n);
        let unit = motif_at(n);
        let mut lowest = n as u32;
        for x in 1..n {
            lowest = lowest.min(self.fill(x, n, motif_at(x) == base && is_unambiguous(base)));
            let other = seq_at(x);
            lowest = lowest.min(self.fill(n, x, unit == other && is_unambiguous(other)));
        }
        lowest.min(self.fill(n, n, unit == base && is_unambiguous(base)))
    }

    /// Pick the cell a finished extension ends on: the lowest cell of ring
    /// `n`, the diagonal first, then the column cell nearest the diagonal
    /// (all `n` sequence bases used), then the nearest row cell.
    fn end_cell(&self, n: usize) -> (usize, usize) {
        let diagonal = self.at(n, n);
        let column = (0..n).rev().min_by_key(|&x| self.at(x, n));
        let row = (0..n).rev().min_by_key(|&x| self.at(n, x));

        let lowest_column = column.map(|x| self.at(x, n)).unwrap_or(u32::MAX);
        let lowest_row = row.map(|x| self.at(n, x)).unwrap_or(u32::MAX);
        let lowest = diagonal.min(lowest_column).min(lowest_row);

        match (column, row) {
            _ if diagonal == lowest => (n, n),
            (Some(x), _) if lowest_column == lowest => (x, n),
            (_, Some(x)) => (n, x),
            _ => (n, n),
        }
    }

    fn backtrace<S, M>(&self, mut row: usize, mut col: usize, seq_at: &S, motif_at: &M) -> Extension
    where
        S: Fn(usize) -> u8,
        M: Fn(usize) -> u8,
    {
        let mut ext = Extension {
            consumed: col,
            ..Default::default()
        };

        while row > 0 && col > 0 {
            let base = seq_at(col);
            let same = is_unambiguous(base) && motif_at(row) == base;
            let here = self.at(row, col);
            if here == self.at(row - 1, col - 1) + u32::from(!same) {
                if same {
                    ext.matches += 1;
                } else {
                    ext.substitutions += 1;
                }
                row -= 1;
                col -= 1;
            } else if here == self.at(row, col - 1) + 1 {
                ext.insertions += 1;
                col -= 1;
            } else {
                ext.deletions += 1;
                row -= 1;
            }
        }
        ext.insertions += col as u32;
        ext.deletions += row as u32;
        ext
    }

    /// Extend away from a seed for at most `limit` steps.
    ///
    /// `seq_at(n)` and `motif_at(n)` give the `n`-th (1-based) sequence and
    /// motif base away from the seed boundary.
    pub fn extend<S, M>(&mut self, seq_at: S, motif_at: M, limit: usize, max_errors: u32) -> Extension
    where
        S: Fn(usize) -> u8,
        M: Fn(usize) -> u8,
    {
        let limit = limit.min(self.size);
        let mut previous = 0;
        let mut errors = 0;
        let mut steps = 0;

        for n in 1..=limit {
            steps = n;
            let lowest = self.fill_ring(n, &seq_at, &motif_at);
            if lowest > previous {
                errors += 1;
            } else {
                errors = 0;
            }
            previous = lowest;
            if errors > max_errors {
                break;
            }
        }

        // drop the trailing steps that only added edits
        let steps = steps.saturating_sub(errors as usize);
        if steps == 0 {
            return Extension::default();
        }

        let (row, col) = self.end_cell(steps);
        self.backtrace(row, col, &seq_at, &motif_at)
    }
}

/// Seed-and-extend scanner owning its scratch matrix.
#[derive(Debug, Clone)]
pub struct ImperfectScanner {
    params: ImperfectParams,
    matrix: EditMatrix,
}

impl ImperfectScanner {
    pub fn new(params: ImperfectParams) -> Self {
        ImperfectScanner {
            matrix: EditMatrix::new(params.window_size),
            params,
        }
    }

    pub fn params(&self) -> &ImperfectParams {
        &self.params
    }

    /// Try to grow the seed at `seed_start` into a scoring repeat. Left
    /// extension never reaches below `floor`, the end of the previous hit.
    fn grow(
        &mut self,
        seq: &[u8],
        floor: usize,
        seed_start: usize,
        motif: &[u8],
        seed_len: usize,
    ) -> Option<ImperfectHit> {
        let period = motif.len();
        let seed_end = seed_start + seed_len - 1;

        let left = self.matrix.extend(
            |n| seq[seed_start - n],
            |x| motif[(period - x % period) % period],
            seed_start - floor,
            self.params.max_consecutive_edits,
        );
        let right = self.matrix.extend(
            |n| seq[seed_end + n],
            |x| motif[(x - 1) % period],
            seq.len() - seed_end - 1,
            self.params.max_consecutive_edits,
        );

        let matches = seed_len as u32 + left.matches + right.matches;
        let substitutions = left.substitutions + right.substitutions;
        let insertions = left.insertions + right.insertions;
        let deletions = left.deletions + right.deletions;
        let score = self.params.score(matches, substitutions, insertions, deletions);
        if score < self.params.min_score {
            return None;
        }

        Some(ImperfectHit {
            motif: String::from_utf8_lossy(motif).into_owned(),
            start: (seed_start - left.consumed) as u64 + 1,
            end: (seed_end + right.consumed) as u64 + 1,
            matches,
            substitutions,
            insertions,
            deletions,
            score,
        })
    }

    pub fn scan(&mut self, seq: &[u8]) -> Vec<ImperfectHit> {
        let mut hits = Vec::new();
        let mut pos = 0;
        let mut floor = 0;

        'scan: while pos < seq.len() {
            if !is_unambiguous(seq[pos]) {
                pos += 1;
                continue;
            }

            for period in 1..=MAX_STANDARD_MOTIF {
                let Some(motif) = candidate_motif(seq, pos, period) else {
                    continue;
                };
                let run = run_length(seq, pos, period);
                let seed_len = run - run % period;
                if ((seed_len / period) as u32) < self.params.seed_repeat
                    || (seed_len as u32) < self.params.seed_min_length
                {
                    continue;
                }

                if let Some(hit) = self.grow(seq, floor, pos, motif, seed_len) {
                    pos = hit.end as usize;
                    floor = pos;
                    hits.push(hit);
                    continue 'scan;
                }
            }

            pos += 1;
        }

        hits
    }
}

/// Find imperfect microsatellites in `seq`.
pub fn scan_imperfect(seq: &[u8], params: &ImperfectParams) -> Vec<ImperfectHit> {
    ImperfectScanner::new(*params).scan(seq)
}
