use anyhow::Result;
use clap::Args;
use fundlens_lib::{CommitteeFilter, CommitteeService, FilterSpec};

use super::{criteria, search_query, Context, PagingArgs};
use crate::output::{build_committee_rows, Output};

#[derive(Args)]
pub struct CommitteesArgs {
    /// Show one committee by ID
    #[arg(long, conflicts_with_all = ["search", "stats", "fundraising"])]
    pub id: Option<i64>,

    /// Search committees by name
    #[arg(long)]
    pub search: Option<String>,

    /// Show counts by committee type, party and state for the filtered set
    #[arg(long)]
    pub stats: bool,

    /// Show statistics for contributions received by one committee ID
    #[arg(long, value_name = "ID")]
    pub fundraising: Option<i64>,

    /// Filter by name (partial match)
    #[arg(long)]
    pub name: Option<String>,

    /// Filter by US state code
    #[arg(long)]
    pub state: Option<String>,

    /// Filter by city (partial match)
    #[arg(long)]
    pub city: Option<String>,

    /// Filter by FEC committee type code (e.g. H, S, P, Q, N)
    #[arg(long = "type")]
    pub committee_type: Option<String>,

    /// Filter by party code
    #[arg(long)]
    pub party: Option<String>,

    /// Filter by active status: true or false
    #[arg(long)]
    pub active: Option<String>,

    /// Only committees linked to this candidate
    #[arg(long)]
    pub candidate_id: Option<String>,

    /// Only committees that received money from this contributor
    #[arg(long)]
    pub contributor_id: Option<String>,

    /// Filter by the linked candidate's office: H, S or P
    #[arg(long)]
    pub candidate_office: Option<String>,

    /// Additional filter as key=value (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    #[command(flatten)]
    pub paging: PagingArgs,
}

pub fn run(args: &CommitteesArgs, ctx: &Context, out: &Output) -> Result<()> {
    let db = ctx.open_db()?;
    let paginator = ctx.paginator();
    let service = CommitteeService::new(&db, &paginator);

    if let Some(id) = args.id {
        return out.record("committee", &service.get(id)?);
    }
    if let Some(id) = args.fundraising {
        return out.record("fundraising", &service.fundraising(id)?);
    }

    let criteria = criteria(
        &[
            ("name", args.name.as_ref()),
            ("state", args.state.as_ref()),
            ("city", args.city.as_ref()),
            ("committee_type", args.committee_type.as_ref()),
            ("party", args.party.as_ref()),
            ("is_active", args.active.as_ref()),
            ("candidate_id", args.candidate_id.as_ref()),
            ("contributor_id", args.contributor_id.as_ref()),
            ("candidate_office", args.candidate_office.as_ref()),
        ],
        &args.filters,
    )?;
    let filter = CommitteeFilter::from_criteria(&criteria)?;

    if args.stats {
        return out.record("committee_stats", &service.stats(&filter)?);
    }

    let page = args.paging.request()?;
    let result = match &args.search {
        Some(q) => service.search(&search_query(q)?, &filter, page)?,
        None => service.list(&filter, &args.paging.sort()?, page)?,
    };
    out.page(
        "committees",
        "committee",
        &result,
        build_committee_rows(&result.items),
    )
}
