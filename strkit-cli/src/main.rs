mod config;
mod issr;
mod locate;
mod search;
mod ssr;
mod vntr;
mod writer;

use anyhow::Result;
use clap::{ArgAction, Command, arg};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "strkit";
    pub const BIN_NAME: &str = "strkit";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Find perfect, imperfect, compound and large-motif tandem repeats in genomic sequence, and place them on gene models.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Log debugging messages")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(ssr::cli::create_ssr_cli())
        .subcommand(issr::cli::create_issr_cli())
        .subcommand(vntr::cli::create_vntr_cli())
        .subcommand(locate::cli::create_locate_cli())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_flag("verbose"));
    log::debug!("{} {}", consts::PKG_NAME, consts::VERSION);

    match matches.subcommand() {
        //
        // PERFECT MICROSATELLITES
        //
        Some((ssr::cli::SSR_CMD, matches)) => {
            ssr::handlers::run_ssr(matches)?;
        }

        //
        // IMPERFECT MICROSATELLITES
        //
        Some((issr::cli::ISSR_CMD, matches)) => {
            issr::handlers::run_issr(matches)?;
        }

        //
        // VNTRS
        //
        Some((vntr::cli::VNTR_CMD, matches)) => {
            vntr::handlers::run_vntr(matches)?;
        }

        //
        // ANNOTATION OF EXISTING LOCI
        //
        Some((locate::cli::LOCATE_CMD, matches)) => {
            locate::handlers::run_locate(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_ssr_flags() {
        let matches = build_parser()
            .try_get_matches_from([
                "strkit", "ssr", "--fasta", "genome.fa", "--dmax", "20", "--flank", "0",
                "--format", "json", "-v",
            ])
            .unwrap();
        assert!(matches.get_flag("verbose"));

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, ssr::cli::SSR_CMD);
        assert_eq!(sub.get_one::<u64>("dmax"), Some(&20));

        let config = search::load_config(sub).unwrap();
        assert_eq!(config.output.flank, 0);
        assert_eq!(config.output.format, config::OutputFormat::Json);
    }

    #[rstest]
    fn test_no_compound_flag() {
        let matches = build_parser()
            .try_get_matches_from(["strkit", "ssr", "--fasta", "genome.fa", "--no-compound"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_flag("no-compound"));
        assert_eq!(sub.get_one::<u64>("dmax"), None);
    }

    #[rstest]
    #[case(&["strkit", "issr"])]
    #[case(&["strkit", "ssr", "--threads", "2"])]
    #[case(&["strkit", "locate", "--loci", "loci.tsv"])]
    #[case(&["strkit", "vntr", "--dmax", "5", "--fasta", "x.fa"])]
    #[case(&["strkit", "locate", "--annotation", "genes.gtf"])]
    fn test_rejected_invocations(#[case] argv: &[&str]) {
        assert!(build_parser().try_get_matches_from(argv).is_err());
    }
}
