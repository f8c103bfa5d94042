use clap::Command;

use crate::search::search_args;

pub const VNTR_CMD: &str = "vntr";

pub fn create_vntr_cli() -> Command {
    Command::new(VNTR_CMD)
        .about("Find exact tandem repeats with long motifs (VNTRs)")
        .arg_required_else_help(true)
        .args(search_args())
}
