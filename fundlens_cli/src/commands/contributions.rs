use anyhow::Result;
use clap::Args;
use fundlens_lib::{Aggregation, ContributionFilter, ContributionService, FilterSpec};

use super::{criteria, search_query, Context, PagingArgs};
use crate::output::{build_contribution_rows, key_value_rows, Output, OutputFormat};

#[derive(Args)]
pub struct ContributionsArgs {
    /// Show one contribution by ID
    #[arg(long, conflicts_with_all = ["search", "stats", "with_stats"])]
    pub id: Option<i64>,

    /// With --id, include the contributor, committee and candidate
    #[arg(long, requires = "id")]
    pub full: bool,

    /// Search contributions by contributor name
    #[arg(long)]
    pub search: Option<String>,

    /// Show statistics over the filtered set instead of a listing
    #[arg(long, conflicts_with = "with_stats")]
    pub stats: bool,

    /// Print the listing together with statistics over the whole filtered set
    #[arg(long)]
    pub with_stats: bool,

    /// Earliest date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Latest date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Minimum amount in dollars
    #[arg(long)]
    pub min_amount: Option<String>,

    /// Maximum amount in dollars
    #[arg(long)]
    pub max_amount: Option<String>,

    /// Filter by contribution type (e.g. DIRECT, EARMARKED, IN_KIND)
    #[arg(long = "type")]
    pub contribution_type: Option<String>,

    /// Filter by election type (e.g. PRIMARY, GENERAL)
    #[arg(long)]
    pub election_type: Option<String>,

    /// Filter by election year
    #[arg(long)]
    pub election_year: Option<String>,

    /// Only contributions from this contributor
    #[arg(long)]
    pub contributor_id: Option<String>,

    /// Only contributions to this committee
    #[arg(long)]
    pub committee_id: Option<String>,

    /// Only contributions to committees of this candidate
    #[arg(long)]
    pub candidate_id: Option<String>,

    /// Filter by contributor state
    #[arg(long)]
    pub contributor_state: Option<String>,

    /// Filter by the recipient candidate's state
    #[arg(long)]
    pub candidate_state: Option<String>,

    /// Filter by the recipient candidate's office: H, S or P
    #[arg(long)]
    pub candidate_office: Option<String>,

    /// Additional filter as key=value (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    #[command(flatten)]
    pub paging: PagingArgs,
}

pub fn run(args: &ContributionsArgs, ctx: &Context, out: &Output) -> Result<()> {
    let db = ctx.open_db()?;
    let paginator = ctx.paginator();
    let service = ContributionService::new(&db, &paginator);

    if let Some(id) = args.id {
        return if args.full {
            out.record("contribution", &service.get_full(id)?)
        } else {
            out.record("contribution", &service.get(id)?)
        };
    }

    let criteria = criteria(
        &[
            ("start_date", args.start_date.as_ref()),
            ("end_date", args.end_date.as_ref()),
            ("min_amount", args.min_amount.as_ref()),
            ("max_amount", args.max_amount.as_ref()),
            ("contribution_type", args.contribution_type.as_ref()),
            ("election_type", args.election_type.as_ref()),
            ("election_year", args.election_year.as_ref()),
            ("contributor_id", args.contributor_id.as_ref()),
            ("committee_id", args.committee_id.as_ref()),
            ("candidate_id", args.candidate_id.as_ref()),
            ("contributor_state", args.contributor_state.as_ref()),
            ("candidate_state", args.candidate_state.as_ref()),
            ("candidate_office", args.candidate_office.as_ref()),
        ],
        &args.filters,
    )?;
    let filter = ContributionFilter::from_criteria(&criteria)?;

    if args.stats {
        return out.record("contribution_stats", &service.stats(&filter, Aggregation::ALL)?);
    }

    let page = args.paging.request()?;
    if args.with_stats {
        let listing =
            service.list_with_stats(&filter, &args.paging.sort()?, page, Aggregation::ALL)?;
        return match out.format {
            OutputFormat::Json | OutputFormat::Xml => out.record("contributions", &listing),
            _ => {
                out.page(
                    "contributions",
                    "contribution",
                    &listing.page,
                    build_contribution_rows(&listing.page.items),
                )?;
                out.rows(key_value_rows(&serde_json::to_value(&listing.stats)?))
            }
        };
    }

    let result = match &args.search {
        Some(q) => service.search(&search_query(q)?, &filter, page)?,
        None => service.list(&filter, &args.paging.sort()?, page)?,
    };
    out.page(
        "contributions",
        "contribution",
        &result,
        build_contribution_rows(&result.items),
    )
}
