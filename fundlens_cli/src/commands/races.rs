use anyhow::Result;
use clap::{Args, ValueEnum};
use fundlens_lib::RaceService;

use super::Context;
use crate::output::{build_race_candidate_rows, format_money, Output, OutputFormat};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Office {
    Senate,
    House,
    President,
}

#[derive(Args)]
pub struct RacesArgs {
    /// Which race: senate, house or president
    #[arg(value_enum)]
    pub office: Office,

    /// US state code (required for senate and house)
    #[arg(long)]
    pub state: Option<String>,

    /// Congressional district (required for house)
    #[arg(long)]
    pub district: Option<String>,
}

pub fn run(args: &RacesArgs, ctx: &Context, out: &Output) -> Result<()> {
    let db = ctx.open_db()?;
    let service = RaceService::new(&db);
    let race = match args.office {
        Office::Senate => service.senate(required(&args.state, "--state")?)?,
        Office::House => service.house(
            required(&args.state, "--state")?,
            required(&args.district, "--district")?,
        )?,
        Office::President => service.presidential()?,
    };

    match out.format {
        OutputFormat::Json | OutputFormat::Xml => out.record("race", &race),
        _ => {
            let seat = match (&race.state, &race.district) {
                (Some(state), Some(district)) => format!(" {}-{}", state, district),
                (Some(state), None) => format!(" {}", state),
                _ => String::new(),
            };
            eprintln!(
                "{}{}: {} candidates, {} active, {} raised from {} contributors",
                race.office_label,
                seat,
                race.summary.total_candidates,
                race.summary.active_candidates,
                format_money(race.summary.total_raised),
                race.summary.unique_contributors
            );
            out.rows(build_race_candidate_rows(&race.candidates))
        }
    }
}

fn required<'a>(value: &'a Option<String>, flag: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("{} is required for this race", flag))
}
