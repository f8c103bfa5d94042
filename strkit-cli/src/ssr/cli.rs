use clap::{ArgAction, Command, arg};

use crate::search::search_args;

pub const SSR_CMD: &str = "ssr";

pub fn create_ssr_cli() -> Command {
    Command::new(SSR_CMD)
        .about("Find perfect microsatellites (SSRs) and merge neighbours into compound SSRs")
        .arg_required_else_help(true)
        .args(search_args())
        .arg(
            arg!(--dmax <dmax> "Largest gap between SSRs merged into one compound SSR, 0 merges touching SSRs only")
                .required(false)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            arg!(--"no-compound" "Do not merge SSRs into compound SSRs")
                .action(ArgAction::SetTrue),
        )
}
