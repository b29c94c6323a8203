use anyhow::Result;
use clap::Args;
use fundlens_lib::StateService;

use super::Context;
use crate::output::{build_race_rows, format_money, Output, OutputFormat};

#[derive(Args)]
pub struct StatesArgs {
    /// US state code (e.g. MD, VA)
    pub state: String,
}

pub fn run(args: &StatesArgs, ctx: &Context, out: &Output) -> Result<()> {
    let db = ctx.open_db()?;
    let summary = StateService::new(&db).summary(&args.state)?;

    match out.format {
        OutputFormat::Json | OutputFormat::Xml => out.record("state_summary", &summary),
        _ => {
            eprintln!(
                "{} ({}): {} candidates, {} active, {} raised across {} contributions",
                summary.state_name,
                summary.state,
                summary.total_candidates,
                summary.active_candidates,
                format_money(summary.total_raised),
                summary.total_contributions
            );
            out.rows(build_race_rows(&summary.races))
        }
    }
}
