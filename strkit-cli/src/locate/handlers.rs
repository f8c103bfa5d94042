use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};

use anyhow::{Context, Result, bail};
use clap::ArgMatches;

use strkit_annotation::{FeatureIndex, Location};
use strkit_core::utils::get_dynamic_reader_w_stdin;

use crate::search::load_annotation;

/// A locus to place, 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLocus {
    pub sequence: String,
    pub start: u64,
    pub end: u64,
}

/// Parse one line of the loci file. Blank lines, `#` comments and a header
/// line (non-numeric start on the first line) give `None`.
pub fn parse_locus_line(line: &str, line_no: usize) -> Result<Option<QueryLocus>> {
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut fields = line.split('\t');
    let sequence = fields
        .next()
        .with_context(|| format!("Missing sequence field on line {}", line_no))?;
    let start_str = fields
        .next()
        .with_context(|| format!("Missing start field on line {}", line_no))?;
    let end_str = fields
        .next()
        .with_context(|| format!("Missing end field on line {}", line_no))?;

    let start = match start_str.trim().parse::<u64>() {
        Ok(start) => start,
        Err(_) if line_no == 1 => return Ok(None),
        Err(e) => bail!("Invalid start {} on line {}: {}", start_str, line_no, e),
    };
    let end = end_str
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Invalid end {} on line {}", end_str, line_no))?;

    if start == 0 || start > end {
        bail!("Invalid range {}-{} on line {}", start, end, line_no);
    }

    Ok(Some(QueryLocus {
        sequence: sequence.to_string(),
        start,
        end,
    }))
}

fn write_location<W: Write>(out: &mut W, locus: &QueryLocus, location: &Location<'_>) -> io::Result<()> {
    let (gene_id, gene_name) = location
        .gene()
        .map_or((".", "."), |gene| (gene.gene_id.as_str(), gene.gene_name.as_str()));
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}",
        locus.sequence, locus.start, locus.end, location, gene_id, gene_name
    )
}

pub fn locate_loci<R: BufRead, W: Write>(index: &FeatureIndex, reader: R, out: &mut W) -> Result<usize> {
    writeln!(out, "sequence\tstart\tend\tlocation\tgene_id\tgene_name")?;

    let mut count = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(locus) = parse_locus_line(&line, i + 1)? else {
            continue;
        };
        let location = index.locate(&locus.sequence, locus.start, locus.end);
        write_location(out, &locus, &location)?;
        count += 1;
    }
    Ok(count)
}

pub fn run_locate(matches: &ArgMatches) -> Result<()> {
    let loci = matches
        .get_one::<String>("loci")
        .context("A path to a loci file is required.")?;

    let index = load_annotation(matches)?.context("A path to an annotation file is required.")?;
    let reader = get_dynamic_reader_w_stdin(loci)?;

    let mut out: Box<dyn Write> = match matches.get_one::<String>("output") {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let count = locate_loci(&index, reader, &mut out)?;
    out.flush()?;

    log::info!("Located {} loci", count);
    Ok(())
}
