//! Compound microsatellites.
//!
//! Perfect loci that follow each other on a sequence with at most `d_max`
//! bases between them are fused into one compound locus. Input must be
//! sorted by sequence and start, as produced by the perfect scanner.
use strkit_core::models::{CompoundLocus, PerfectLocus};

/// Fuse adjacent perfect loci of a sorted slice into compound loci.
pub fn merge_compound(loci: &[PerfectLocus], d_max: u64) -> Vec<CompoundLocus> {
    CompoundMerger::new(loci.iter().cloned(), d_max).collect()
}

/// Iterator adaptor yielding compound loci from a sorted stream of perfect
/// loci. Loci without an id are referred to by their 1-based position in the
/// stream.
pub struct CompoundMerger<It> {
    inner: It,
    d_max: u64,
    seen: u64,
    run: Vec<(u64, PerfectLocus)>,
}

impl<It> CompoundMerger<It>
where
    It: Iterator<Item = PerfectLocus>,
{
    pub fn new(inner: It, d_max: u64) -> Self {
        CompoundMerger {
            inner,
            d_max,
            seen: 0,
            run: Vec::new(),
        }
    }

    fn extends_run(&self, next: &PerfectLocus) -> bool {
        match self.run.last() {
            Some((_, last)) => {
                last.sequence == next.sequence && gap_between(last, next) <= self.d_max
            }
            None => false,
        }
    }

    fn flush(run: Vec<(u64, PerfectLocus)>) -> Option<CompoundLocus> {
        if run.len() < 2 {
            return None;
        }

        let (first_id, first) = &run[0];
        let (last_id, last) = &run[run.len() - 1];

        let mut motifs = Vec::with_capacity(run.len());
        let mut tokens = Vec::with_capacity(run.len() * 2);
        let mut gap = 0;
        let mut length = 0;
        for (i, (_, locus)) in run.iter().enumerate() {
            if i > 0 {
                let d = gap_between(&run[i - 1].1, locus);
                if d > 0 {
                    tokens.push(format!("(N){}", d));
                }
                gap += d;
            }
            motifs.push(locus.motif.as_str());
            tokens.push(format!("({}){}", locus.motif, locus.repeat));
            length += locus.length;
        }

        Some(CompoundLocus {
            id: None,
            sequence: first.sequence.clone(),
            start: first.start,
            end: last.end,
            motif: motifs.join("-"),
            complexity: run.len() as u32,
            length,
            gap,
            component: format!("{}-{}", first_id, last_id),
            structure: tokens.join("-"),
            members: run.iter().map(|(id, _)| *id).collect(),
        })
    }
}

/// Bases strictly between two loci, 0 when they touch or overlap.
fn gap_between(left: &PerfectLocus, right: &PerfectLocus) -> u64 {
    right.start.saturating_sub(left.end + 1)
}

impl<It> Iterator for CompoundMerger<It>
where
    It: Iterator<Item = PerfectLocus>,
{
    type Item = CompoundLocus;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(locus) = self.inner.next() else {
                return Self::flush(std::mem::take(&mut self.run));
            };

            self.seen += 1;
            let id = locus.id.unwrap_or(self.seen);

            if self.extends_run(&locus) {
                self.run.push((id, locus));
                continue;
            }

            let finished = std::mem::replace(&mut self.run, vec![(id, locus)]);
            if let Some(compound) = Self::flush(finished) {
                return Some(compound);
            }
        }
    }
}
