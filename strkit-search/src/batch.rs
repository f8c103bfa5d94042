//! Whole-file searches.
//!
//! Each sequence is scanned independently on the current rayon pool. Results
//! come back in sequence order and receive their ids here, 1-based per
//! repeat kind, before anything is written out.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strkit_core::models::{CompoundLocus, ImperfectLocus, LargeMotifLocus, Locus, PerfectLocus};

use crate::compound::merge_compound;
use crate::errors::SearchError;
use crate::imperfect::{ImperfectParams, ImperfectScanner};
use crate::motif::MotifStandard;
use crate::perfect::{MinRepeats, scan_perfect, scan_vntr};
use crate::sequence::SequenceProvider;
use crate::summary::SequenceStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScanTask {
    /// Exact microsatellites, merged into compound loci when `d_max` is set.
    Perfect {
        min_repeats: MinRepeats,
        d_max: Option<u64>,
    },
    Imperfect(ImperfectParams),
    LargeMotif {
        min_motif: usize,
        max_motif: usize,
        min_repeat: u32,
    },
}

impl ScanTask {
    pub fn name(&self) -> &'static str {
        match self {
            ScanTask::Perfect { .. } => "ssr",
            ScanTask::Imperfect(_) => "issr",
            ScanTask::LargeMotif { .. } => "vntr",
        }
    }
}

/// Stop signal shared between a caller and a running batch.
///
/// Checked before each sequence; a sequence already being scanned runs to
/// completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything found in one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub perfect: Vec<PerfectLocus>,
    pub compound: Vec<CompoundLocus>,
    pub imperfect: Vec<ImperfectLocus>,
    pub large_motif: Vec<LargeMotifLocus>,
    pub stats: Vec<SequenceStats>,
    /// Sequences not scanned because the batch was cancelled.
    pub skipped: Vec<String>,
}

impl ScanOutcome {
    pub fn total_loci(&self) -> usize {
        self.perfect.len() + self.compound.len() + self.imperfect.len() + self.large_motif.len()
    }
}

#[derive(Debug, Default)]
struct SequenceResult {
    perfect: Vec<PerfectLocus>,
    imperfect: Vec<ImperfectLocus>,
    large_motif: Vec<LargeMotifLocus>,
}

fn scan_sequence(
    name: &str,
    seq: &[u8],
    task: &ScanTask,
    standard: &MotifStandard,
    scanner: &mut Option<ImperfectScanner>,
) -> SequenceResult {
    let mut result = SequenceResult::default();
    match task {
        ScanTask::Perfect { min_repeats, .. } => {
            result.perfect = scan_perfect(seq, min_repeats)
                .into_iter()
                .map(|hit| hit.into_perfect(name, standard))
                .collect();
        }
        ScanTask::Imperfect(params) => {
            let scanner = scanner.get_or_insert_with(|| ImperfectScanner::new(*params));
            result.imperfect = scanner
                .scan(seq)
                .into_iter()
                .map(|hit| hit.into_locus(name, standard))
                .collect();
        }
        ScanTask::LargeMotif {
            min_motif,
            max_motif,
            min_repeat,
        } => {
            result.large_motif = scan_vntr(seq, *min_motif, *max_motif, *min_repeat)
                .into_iter()
                .map(|hit| hit.into_large_motif(name, standard))
                .collect();
        }
    }
    result
}

fn number<L: Locus>(loci: &mut [L]) {
    for (i, locus) in loci.iter_mut().enumerate() {
        locus.set_id(i as u64 + 1);
    }
}

/// Scan `names` from `provider` with `task`.
///
/// Runs on the rayon pool the call is made from, so wrap it in
/// `ThreadPool::install` to bound the number of workers. `on_done` is called
/// once per scanned sequence, from the worker that scanned it.
pub fn run_batch<P, F>(
    provider: &P,
    names: &[String],
    task: &ScanTask,
    standard: &MotifStandard,
    cancel: &CancelToken,
    on_done: F,
) -> Result<ScanOutcome, SearchError>
where
    P: SequenceProvider + ?Sized,
    F: Fn(&str) + Sync + Send,
{
    let results: Vec<Option<(SequenceStats, SequenceResult)>> = names
        .par_iter()
        .map_init(
            || None,
            |scanner, name| {
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                let seq = provider.sequence(name)?;
                let stats = SequenceStats::from_bases(name, seq);
                let found = scan_sequence(name, seq, task, standard, scanner);
                log::debug!(
                    "Scanned {} ({} bp) for {}: {} loci",
                    name,
                    seq.len(),
                    task.name(),
                    found.perfect.len() + found.imperfect.len() + found.large_motif.len()
                );
                on_done(name);
                Ok(Some((stats, found)))
            },
        )
        .collect::<Result<_, SearchError>>()?;

    let mut outcome = ScanOutcome::default();
    for (name, result) in names.iter().zip(results) {
        match result {
            Some((stats, found)) => {
                outcome.stats.push(stats);
                outcome.perfect.extend(found.perfect);
                outcome.imperfect.extend(found.imperfect);
                outcome.large_motif.extend(found.large_motif);
            }
            None => outcome.skipped.push(name.clone()),
        }
    }

    number(&mut outcome.perfect);
    number(&mut outcome.imperfect);
    number(&mut outcome.large_motif);

    if let ScanTask::Perfect {
        d_max: Some(d_max), ..
    } = task
    {
        outcome.compound = merge_compound(&outcome.perfect, *d_max);
        number(&mut outcome.compound);
    }

    if !outcome.skipped.is_empty() {
        log::warn!(
            "Search cancelled, {} of {} sequences skipped",
            outcome.skipped.len(),
            names.len()
        );
    }
    log::info!(
        "Found {} {} loci in {} sequences",
        outcome.total_loci(),
        task.name(),
        outcome.stats.len()
    );

    Ok(outcome)
}
