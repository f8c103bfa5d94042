use clap::Command;

use crate::search::search_args;

pub const ISSR_CMD: &str = "issr";

pub fn create_issr_cli() -> Command {
    Command::new(ISSR_CMD)
        .about("Find imperfect microsatellites (iSSRs) by seed-and-extend alignment")
        .arg_required_else_help(true)
        .args(search_args())
}
