use anyhow::Result;
use clap::ArgMatches;

use strkit_core::models::RepeatKind;

use crate::search::run_search;

pub fn run_issr(matches: &ArgMatches) -> Result<()> {
    run_search(matches, RepeatKind::Imperfect)
}
