use clap::{Command, arg};

pub const LOCATE_CMD: &str = "locate";

pub fn create_locate_cli() -> Command {
    Command::new(LOCATE_CMD)
        .about("Place loci from a TSV file (sequence, start, end) on gene models")
        .arg_required_else_help(true)
        .arg(arg!(-a --annotation <annotation> "GFF or GTF file, optionally gzipped").required(true))
        .arg(
            arg!(-l --loci <loci> "TSV file of 1-based, inclusive loci, or - for stdin")
                .required(true),
        )
        .arg(
            arg!(--backend <backend> "Overlap index for the annotation (ailist or nclist)")
                .required(false),
        )
        .arg(arg!(-o --output <output> "Output file. Defaults to stdout").required(false))
}
