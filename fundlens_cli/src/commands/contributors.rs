use anyhow::Result;
use clap::Args;
use fundlens_lib::{
    ContributorFilter, ContributorService, FilterSpec, RecipientSortBy, SearchScope, SortDirection,
};

use super::{criteria, search_query, Context, PagingArgs};
use crate::output::{
    build_contributor_rows, build_recipient_rows, build_top_contributor_rows, Output,
};

#[derive(Args)]
pub struct ContributorsArgs {
    /// Show one contributor by ID
    #[arg(long, conflicts_with_all = ["search", "stats", "giving", "top", "recipients"])]
    pub id: Option<i64>,

    /// Search contributors by name
    #[arg(long)]
    pub search: Option<String>,

    /// Also match the search term against employer and occupation
    #[arg(long, requires = "search")]
    pub wide: bool,

    /// Show counts by entity type and state for the filtered set
    #[arg(long)]
    pub stats: bool,

    /// Show statistics for everything one contributor ID gave
    #[arg(long, value_name = "ID")]
    pub giving: Option<i64>,

    /// Rank contributors by total given (honors --state and --entity-type)
    #[arg(long, conflicts_with_all = ["search", "stats", "giving", "recipients"])]
    pub top: bool,

    /// List the committees one contributor ID gave to, with totals.
    /// --sort-by accepts total_amount, contribution_count, committee_name,
    /// first_date or last_date (default total_amount, desc)
    #[arg(long, value_name = "ID", conflicts_with_all = ["search", "stats", "giving"])]
    pub recipients: Option<i64>,

    /// Filter by name (partial match)
    #[arg(long)]
    pub name: Option<String>,

    /// Filter by US state code
    #[arg(long)]
    pub state: Option<String>,

    /// Filter by city (partial match)
    #[arg(long)]
    pub city: Option<String>,

    /// Filter by entity type (e.g. IND, ORG, PAC)
    #[arg(long)]
    pub entity_type: Option<String>,

    /// Filter by employer (partial match)
    #[arg(long)]
    pub employer: Option<String>,

    /// Filter by occupation (partial match)
    #[arg(long)]
    pub occupation: Option<String>,

    /// Only contributors who gave to this committee
    #[arg(long)]
    pub committee_id: Option<String>,

    /// Only contributors who gave to any committee of this candidate
    #[arg(long)]
    pub candidate_id: Option<String>,

    /// Additional filter as key=value (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    #[command(flatten)]
    pub paging: PagingArgs,
}

pub fn run(args: &ContributorsArgs, ctx: &Context, out: &Output) -> Result<()> {
    let db = ctx.open_db()?;
    let paginator = ctx.paginator();
    let service = ContributorService::new(&db, &paginator);

    if let Some(id) = args.id {
        return out.record("contributor", &service.get(id)?);
    }
    if let Some(id) = args.giving {
        return out.record("giving", &service.giving(id)?);
    }
    if let Some(id) = args.recipients {
        let sort_by = match args.paging.sort_by.as_deref() {
            Some(raw) => raw.parse::<RecipientSortBy>()?,
            None => RecipientSortBy::default(),
        };
        let direction = match args.paging.sort_dir.as_deref() {
            Some(raw) => raw.parse::<SortDirection>()?,
            None => SortDirection::Desc,
        };
        let result = service.recipients(id, sort_by, direction, args.paging.request()?)?;
        return out.page(
            "recipients",
            "recipient",
            &result,
            build_recipient_rows(&result.items),
        );
    }
    if args.top {
        let result = service.top(
            args.state.as_deref(),
            args.entity_type.as_deref(),
            args.paging.request()?,
        )?;
        return out.page(
            "top_contributors",
            "contributor",
            &result,
            build_top_contributor_rows(&result.items),
        );
    }

    let criteria = criteria(
        &[
            ("name", args.name.as_ref()),
            ("state", args.state.as_ref()),
            ("city", args.city.as_ref()),
            ("entity_type", args.entity_type.as_ref()),
            ("employer", args.employer.as_ref()),
            ("occupation", args.occupation.as_ref()),
            ("committee_id", args.committee_id.as_ref()),
            ("candidate_id", args.candidate_id.as_ref()),
        ],
        &args.filters,
    )?;
    let filter = ContributorFilter::from_criteria(&criteria)?;

    if args.stats {
        return out.record("contributor_stats", &service.stats(&filter)?);
    }

    let page = args.paging.request()?;
    let result = match &args.search {
        Some(q) => {
            let scope = if args.wide {
                SearchScope::NameEmployerOccupation
            } else {
                SearchScope::Name
            };
            service.search(&search_query(q)?, scope, &filter, page)?
        }
        None => service.list(&filter, &args.paging.sort()?, page)?,
    };
    out.page(
        "contributors",
        "contributor",
        &result,
        build_contributor_rows(&result.items),
    )
}
