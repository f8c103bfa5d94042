//! Shared driver of the `ssr`, `issr` and `vntr` subcommands.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, arg};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use strkit_annotation::FeatureIndex;
use strkit_core::models::{CompoundLocus, Locus, RepeatKind};
use strkit_overlaprs::OverlapperType;
use strkit_search::{
    CancelToken, FastaSequences, MotifStandard, RepeatSummary, ScanOutcome, SequenceProvider,
    flanking, run_batch,
};

use crate::config::{OutputFormat, SearchConfig};
use crate::writer::{
    Annotation, Columns, SearchReport, TsvRow, annotated, write_json, write_tsv,
};

/// Arguments every search subcommand takes.
pub fn search_args() -> Vec<Arg> {
    vec![
        arg!(-f --fasta <fasta> "FASTA file to search, optionally gzipped").required(true),
        arg!(-c --config <config> "TOML file with search settings").required(false),
        arg!(-a --annotation <annotation> "GFF or GTF file used to locate each locus")
            .required(false),
        arg!(--backend <backend> "Overlap index for the annotation (ailist or nclist)")
            .required(false),
        arg!(--flank <flank> "Bases of flanking sequence to report on each side")
            .required(false)
            .value_parser(clap::value_parser!(u64)),
        arg!(-o --output <output> "Output file (json) or prefix (tsv). Defaults to stdout")
            .required(false),
        arg!(--format <format> "Output format (tsv or json)").required(false),
        arg!(-t --threads <threads> "Number of worker threads")
            .required(false)
            .value_parser(clap::value_parser!(usize)),
        arg!(--timeout <seconds> "Stop scanning new sequences after this many seconds")
            .required(false)
            .value_parser(clap::value_parser!(u64)),
    ]
}

/// Read the configuration file, if any, and apply command line overrides.
pub fn load_config(matches: &ArgMatches) -> Result<SearchConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => SearchConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to read config file {}", path))?,
        None => SearchConfig::default(),
    };

    if let Some(flank) = matches.get_one::<u64>("flank") {
        config.output.flank = *flank;
    }
    if let Some(format) = matches.get_one::<String>("format") {
        config.output.format = format.parse()?;
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.threads = *threads;
    }
    Ok(config)
}

pub fn load_annotation(matches: &ArgMatches) -> Result<Option<FeatureIndex>> {
    let Some(path) = matches.get_one::<String>("annotation") else {
        return Ok(None);
    };
    let overlapper_type = match matches.get_one::<String>("backend") {
        Some(backend) => backend.parse::<OverlapperType>()?,
        None => OverlapperType::default(),
    };
    let index = FeatureIndex::from_path_with(Path::new(path), overlapper_type)
        .with_context(|| format!("Failed to load annotation file {}", path))?;
    Ok(Some(index))
}

/// Output for one table: `<prefix>.<kind>.tsv` when a prefix is given,
/// stdout otherwise.
fn table_writer(prefix: Option<&PathBuf>, suffix: &str) -> Result<Box<dyn Write>> {
    match prefix {
        Some(prefix) => {
            let path = PathBuf::from(format!("{}.{}", prefix.display(), suffix));
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn annotate<L: Locus + Sync>(
    loci: &[L],
    sequences: &FastaSequences,
    index: Option<&FeatureIndex>,
    flank: u64,
) -> Result<Vec<Annotation>> {
    loci.par_iter()
        .map(|locus| {
            let mut annotation = Annotation::default();
            if let Some(index) = index {
                annotation.set_location(&index.locate(locus.sequence(), locus.start(), locus.end()));
            }
            if flank > 0 {
                annotation.set_flanks(flanking(
                    sequences,
                    locus.sequence(),
                    locus.start(),
                    locus.end(),
                    flank,
                )?);
            }
            Ok(annotation)
        })
        .collect()
}

/// Where each located locus falls, in the summary.
fn count_locations(summary: &mut RepeatSummary, annotations: &[Annotation]) {
    for location in annotations.iter().filter_map(|a| a.location.as_deref()) {
        summary.record_location(location);
    }
}

fn log_summary(kind: RepeatKind, summary: &RepeatSummary) {
    log::info!(
        "{}: {} loci, {} bp, {:.2} loci/Mb, {:.2} bp/Mb",
        kind,
        summary.total_loci,
        summary.total_bases,
        summary.relative_abundance,
        summary.relative_density
    );
    for (class, count) in &summary.classes {
        log::info!("  {}: {}", class, count);
    }
    for (location, count) in &summary.locations {
        log::info!("  {}: {}", location, count);
    }
}

struct Emit<'a> {
    kind: RepeatKind,
    config: &'a SearchConfig,
    sequences: &'a FastaSequences,
    index: Option<&'a FeatureIndex>,
    output: Option<PathBuf>,
    outcome: &'a ScanOutcome,
}

impl Emit<'_> {
    fn columns(&self) -> Columns {
        Columns {
            location: self.index.is_some(),
            flanks: self.config.output.flank > 0,
        }
    }

    fn write<L>(&self, loci: &[L], mut summary: RepeatSummary) -> Result<()>
    where
        L: Locus + TsvRow + Serialize + Sync,
    {
        let flank = self.config.output.flank;
        let annotations = annotate(loci, self.sequences, self.index, flank)?;
        let compound: &[CompoundLocus] = &self.outcome.compound;
        let compound_annotations = annotate(compound, self.sequences, self.index, flank)?;

        if self.index.is_some() {
            count_locations(&mut summary, &annotations);
        }
        log_summary(self.kind, &summary);

        match self.config.output.format {
            OutputFormat::Json => {
                let report = SearchReport {
                    kind: self.kind,
                    summary: &summary,
                    loci: annotated(loci, &annotations),
                    compound: annotated(compound, &compound_annotations),
                    skipped: &self.outcome.skipped,
                };
                let mut out: Box<dyn Write> = match &self.output {
                    Some(path) => Box::new(BufWriter::new(
                        File::create(path)
                            .with_context(|| format!("Failed to create {}", path.display()))?,
                    )),
                    None => Box::new(BufWriter::new(io::stdout())),
                };
                write_json(&mut out, &report)?;
                out.flush()?;
            }
            OutputFormat::Tsv => {
                let prefix = self.output.as_ref();
                let mut out = table_writer(prefix, &format!("{}.tsv", self.kind))?;
                write_tsv(&mut out, loci, &annotations, self.columns())?;

                if !compound.is_empty() {
                    if prefix.is_some() {
                        out.flush()?;
                        out = table_writer(prefix, &format!("{}.tsv", RepeatKind::Compound))?;
                    } else {
                        writeln!(out)?;
                    }
                    write_tsv(&mut out, compound, &compound_annotations, self.columns())?;
                }
                out.flush()?;

                if let Some(prefix) = prefix {
                    let mut out = table_writer(Some(prefix), "summary.json")?;
                    write_json(&mut out, &summary)?;
                    out.flush()?;
                }
            }
        }
        Ok(())
    }
}

pub fn run_search(matches: &ArgMatches, kind: RepeatKind) -> Result<()> {
    let mut config = load_config(matches)?;
    if let Some(dmax) = matches.try_get_one::<u64>("dmax").ok().flatten() {
        config.ssr.dmax = *dmax;
    }
    if matches.try_get_one::<bool>("no-compound").ok().flatten() == Some(&true) {
        config.ssr.compound = false;
    }

    let fasta = matches
        .get_one::<String>("fasta")
        .context("A path to a FASTA file is required.")?;
    let sequences = FastaSequences::try_from(Path::new(fasta))
        .with_context(|| format!("Failed to read FASTA file {}", fasta))?;
    let index = load_annotation(matches)?;

    let standard = MotifStandard::new(config.motif.level)?;
    let task = config.task(kind)?;
    let names = sequences.names();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .context("Failed to build the worker pool")?;

    let bar = ProgressBar::new(names.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("Invalid progress bar template")?,
    );
    bar.set_message(format!("Searching {}", kind));

    let cancel = CancelToken::new();
    let deadline = matches
        .get_one::<u64>("timeout")
        .map(|seconds| Instant::now() + Duration::from_secs(*seconds));

    let outcome = pool.install(|| {
        run_batch(&sequences, &names, &task, &standard, &cancel, |name| {
            bar.inc(1);
            bar.set_message(name.to_string());
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                cancel.cancel();
            }
        })
    })?;
    bar.finish_and_clear();

    for name in &outcome.skipped {
        log::warn!("Not searched: {}", name);
    }

    let top = config.output.top_motifs;
    let emit = Emit {
        kind,
        config: &config,
        sequences: &sequences,
        index: index.as_ref(),
        output: matches.get_one::<String>("output").map(PathBuf::from),
        outcome: &outcome,
    };

    pool.install(|| match kind {
        RepeatKind::Perfect => emit.write(
            &outcome.perfect,
            RepeatSummary::from_perfect(&outcome.perfect, &outcome.stats, top),
        ),
        RepeatKind::Imperfect => emit.write(
            &outcome.imperfect,
            RepeatSummary::from_imperfect(&outcome.imperfect, &outcome.stats, top),
        ),
        RepeatKind::LargeMotif => emit.write(
            &outcome.large_motif,
            RepeatSummary::from_loci(
                outcome
                    .large_motif
                    .iter()
                    .map(|l| (l.standard.as_str(), l.motif_len, l.length)),
                &outcome.stats,
                top,
            ),
        ),
        RepeatKind::Compound => Ok(()),
    })
}
