//! The `search` subcommand: one term across candidates, committees and contributors.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use fundlens_lib::types::{Candidate, Committee, Contributor, Page};
use fundlens_lib::{
    CandidateFilter, CandidateService, CommitteeFilter, CommitteeService, ContributorFilter,
    ContributorService, PageRequest, SearchQuery, SearchScope,
};
use serde::Serialize;
use tokio::task::JoinHandle;

use super::{search_query, Context};
use crate::output::{Output, OutputFormat, SearchHitRow};

#[derive(Args)]
pub struct SearchArgs {
    /// Search term
    pub query: String,

    /// Results per category (defaults to the configured search page size)
    #[arg(long)]
    pub limit: Option<i64>,

    /// Also match contributors by employer and occupation
    #[arg(long)]
    pub wide: bool,
}

#[derive(Serialize)]
struct UnifiedResults {
    query: String,
    candidates: Page<Candidate>,
    committees: Page<Committee>,
    contributors: Page<Contributor>,
}

/// Run `f` on a blocking thread with its own database connection.
fn category<T, F>(ctx: &Arc<Context>, f: F) -> JoinHandle<Result<Page<T>>>
where
    T: Send + 'static,
    F: FnOnce(&Context, &fundlens_lib::Db) -> Result<Page<T>> + Send + 'static,
{
    let ctx = Arc::clone(ctx);
    tokio::task::spawn_blocking(move || {
        let db = ctx.open_db()?;
        f(ctx.as_ref(), &db)
    })
}

pub async fn run(args: &SearchArgs, ctx: Arc<Context>, out: &Output) -> Result<()> {
    let query = search_query(&args.query)?;
    let size = args
        .limit
        .unwrap_or_else(|| i64::from(ctx.settings.search_page_size));
    let page = PageRequest::new(1, Some(size))?;
    let scope = if args.wide {
        SearchScope::NameEmployerOccupation
    } else {
        SearchScope::Name
    };

    let q: SearchQuery = query.clone();
    let candidates = category(&ctx, move |ctx, db| {
        let paginator = ctx.paginator();
        Ok(CandidateService::new(db, &paginator).search(&q, &CandidateFilter::default(), page)?)
    });
    let q = query.clone();
    let committees = category(&ctx, move |ctx, db| {
        let paginator = ctx.paginator();
        Ok(CommitteeService::new(db, &paginator).search(&q, &CommitteeFilter::default(), page)?)
    });
    let q = query.clone();
    let contributors = category(&ctx, move |ctx, db| {
        let paginator = ctx.paginator();
        Ok(ContributorService::new(db, &paginator).search(
            &q,
            scope,
            &ContributorFilter::default(),
            page,
        )?)
    });

    let (candidates, committees, contributors) =
        tokio::try_join!(candidates, committees, contributors)?;
    let results = UnifiedResults {
        query: query.as_str().to_string(),
        candidates: candidates?,
        committees: committees?,
        contributors: contributors?,
    };

    eprintln!(
        "{} candidates, {} committees, {} contributors match '{}'",
        results.candidates.meta.total_items,
        results.committees.meta.total_items,
        results.contributors.meta.total_items,
        results.query
    );

    match out.format {
        OutputFormat::Json | OutputFormat::Xml => out.record("search", &results),
        _ => out.rows(hit_rows(&results)),
    }
}

fn hit_rows(results: &UnifiedResults) -> Vec<SearchHitRow> {
    let candidates = results.candidates.items.iter().map(|c| SearchHitRow {
        category: "candidate".into(),
        id: c.id,
        name: c.name.clone(),
        detail: match &c.state {
            Some(state) => format!("{} {} {}", c.office, state, c.election_year),
            None => format!("{} {}", c.office, c.election_year),
        },
    });
    let committees = results.committees.items.iter().map(|c| SearchHitRow {
        category: "committee".into(),
        id: c.id,
        name: c.name.clone(),
        detail: c.committee_type.clone(),
    });
    let contributors = results.contributors.items.iter().map(|c| SearchHitRow {
        category: "contributor".into(),
        id: c.id,
        name: c.name.clone(),
        detail: [c.employer.as_deref(), c.state.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", "),
    });
    candidates.chain(committees).chain(contributors).collect()
}
