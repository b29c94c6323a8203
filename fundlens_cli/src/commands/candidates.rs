use anyhow::Result;
use clap::Args;
use fundlens_lib::{CandidateFilter, CandidateService, FilterSpec};

use super::{criteria, search_query, Context, PagingArgs};
use crate::output::{build_candidate_rows, Output};

#[derive(Args)]
pub struct CandidatesArgs {
    /// Show one candidate by ID
    #[arg(long, conflicts_with_all = ["search", "stats", "fundraising"])]
    pub id: Option<i64>,

    /// Search candidates by name (exact, then prefix, then substring matches)
    #[arg(long)]
    pub search: Option<String>,

    /// Show counts by office, party and state for the filtered set
    #[arg(long)]
    pub stats: bool,

    /// Show contribution statistics for one candidate ID
    #[arg(long, value_name = "ID")]
    pub fundraising: Option<i64>,

    /// Filter by name (partial match)
    #[arg(long)]
    pub name: Option<String>,

    /// Filter by US state code (e.g. MD, VA)
    #[arg(long)]
    pub state: Option<String>,

    /// Filter by office: H, S or P
    #[arg(long)]
    pub office: Option<String>,

    /// Filter by party code (e.g. DEM, REP)
    #[arg(long)]
    pub party: Option<String>,

    /// Filter by district
    #[arg(long)]
    pub district: Option<String>,

    /// Filter by election year
    #[arg(long)]
    pub election_year: Option<String>,

    /// Filter by active status: true or false
    #[arg(long)]
    pub active: Option<String>,

    /// Only candidates whose committees received money from this contributor
    #[arg(long)]
    pub contributor_id: Option<String>,

    /// Additional filter as key=value (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    #[command(flatten)]
    pub paging: PagingArgs,
}

pub fn run(args: &CandidatesArgs, ctx: &Context, out: &Output) -> Result<()> {
    let db = ctx.open_db()?;
    let paginator = ctx.paginator();
    let service = CandidateService::new(&db, &paginator);

    if let Some(id) = args.id {
        return out.record("candidate", &service.get(id)?);
    }
    if let Some(id) = args.fundraising {
        return out.record("fundraising", &service.fundraising(id)?);
    }

    let criteria = criteria(
        &[
            ("name", args.name.as_ref()),
            ("state", args.state.as_ref()),
            ("office", args.office.as_ref()),
            ("party", args.party.as_ref()),
            ("district", args.district.as_ref()),
            ("election_year", args.election_year.as_ref()),
            ("is_active", args.active.as_ref()),
            ("contributor_id", args.contributor_id.as_ref()),
        ],
        &args.filters,
    )?;
    let filter = CandidateFilter::from_criteria(&criteria)?;

    if args.stats {
        return out.record("candidate_stats", &service.stats(&filter)?);
    }

    let page = args.paging.request()?;
    let result = match &args.search {
        Some(q) => service.search(&search_query(q)?, &filter, page)?,
        None => service.list(&filter, &args.paging.sort()?, page)?,
    };
    out.page(
        "candidates",
        "candidate",
        &result,
        build_candidate_rows(&result.items),
    )
}
