//! Entity services: list, get, by-relation, stats and search for each entity.
//!
//! Services borrow a [`DataStore`] and a [`Paginator`] for the duration of
//! one request and hold no other state.

use std::time::Instant;

use fundlens_query::query::search::resolve;
use fundlens_query::query::{
    ContributionFilter, Field, FilterSpec, QueryPlan, RelationScope, SearchQuery, SearchScope,
    Sort,
};
use fundlens_query::types::{ContributionStats, Page, SetStats};

use crate::aggregation::{self, Aggregation};
use crate::error::FundLensError;
use crate::pagination::{PageRequest, Paginator};
use crate::store::{DataStore, FromRow};

mod candidate;
mod committee;
mod contribution;
mod contributor;
mod metadata;
mod race;
mod state;

pub use self::candidate::CandidateService;
pub use self::committee::CommitteeService;
pub use self::contribution::{ContributionListing, ContributionService};
pub use self::contributor::ContributorService;
pub use self::metadata::MetadataService;
pub use self::race::RaceService;
pub use self::state::{StateService, TOP_FUNDRAISERS};

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

pub(crate) fn list<S, F, R>(
    store: &S,
    paginator: &Paginator,
    filter: &F,
    sort: &Sort<F::SortBy>,
    page: PageRequest,
) -> Result<Page<R>, FundLensError>
where
    S: DataStore,
    F: FilterSpec,
    R: FromRow,
{
    let started = Instant::now();
    let plan = filter.plan(sort)?;
    let result = paginator.paginate(store, &plan, page)?;
    tracing::info!(
        entity = %F::ENTITY,
        filters = filter.active_count(),
        results = result.items.len(),
        total = result.meta.total_items,
        elapsed_ms = elapsed_ms(started),
        "list"
    );
    Ok(result)
}

pub(crate) fn by_relation<S, F, R>(
    store: &S,
    paginator: &Paginator,
    scope: RelationScope,
    page: PageRequest,
) -> Result<Page<R>, FundLensError>
where
    S: DataStore,
    F: FilterSpec,
    R: FromRow,
{
    let filter = F::default().with_scope(scope)?;
    list::<S, F, R>(store, paginator, &filter, &Sort::default(), page)
}

pub(crate) fn get<S, R>(store: &S, entity: &'static str, id: i64) -> Result<R, FundLensError>
where
    S: DataStore,
    R: FromRow,
{
    let started = Instant::now();
    let found = store.get::<R>(id)?;
    tracing::info!(
        entity,
        id,
        found = found.is_some(),
        elapsed_ms = elapsed_ms(started),
        "get"
    );
    found.ok_or_else(|| FundLensError::not_found(entity, id))
}

/// The filter's plan with the search conjunct added and relevance ordering.
pub(crate) fn search_plan<F: FilterSpec>(
    query: &SearchQuery,
    scope: SearchScope,
    filter: &F,
) -> Result<QueryPlan, FundLensError> {
    let resolved = resolve(F::ENTITY, query, scope);
    Ok(QueryPlan::builder(F::ENTITY)
        .filters(filter.predicates())
        .filter(resolved.predicate)
        .order_by_all(resolved.ordering)
        .build()?)
}

pub(crate) fn search<S, F, R>(
    store: &S,
    paginator: &Paginator,
    query: &SearchQuery,
    scope: SearchScope,
    filter: &F,
    page: PageRequest,
) -> Result<Page<R>, FundLensError>
where
    S: DataStore,
    F: FilterSpec,
    R: FromRow,
{
    let started = Instant::now();
    let plan = search_plan(query, scope, filter)?;
    let result = paginator.paginate(store, &plan, page)?;
    tracing::info!(
        entity = %F::ENTITY,
        filters = filter.active_count() + 1,
        results = result.items.len(),
        total = result.meta.total_items,
        elapsed_ms = elapsed_ms(started),
        "search"
    );
    Ok(result)
}

/// Count and breakdowns over the filtered set of `F::ENTITY`.
pub(crate) fn set_stats<S, F>(
    store: &S,
    filter: &F,
    dimensions: &[Field],
) -> Result<SetStats, FundLensError>
where
    S: DataStore,
    F: FilterSpec,
{
    let started = Instant::now();
    let plan = filter.plan(&Sort::default())?;
    let stats = aggregation::set_stats(store, &plan, dimensions)?;
    tracing::info!(
        entity = %F::ENTITY,
        filters = filter.active_count(),
        results = stats.total_items,
        elapsed_ms = elapsed_ms(started),
        "stats"
    );
    Ok(stats)
}

/// Every statistic over the contributions tied to one record. NotFound when
/// the record itself is missing.
pub(crate) fn record_stats<S, R>(
    store: &S,
    entity: &'static str,
    id: i64,
    contributions: ContributionFilter,
) -> Result<ContributionStats, FundLensError>
where
    S: DataStore,
    R: FromRow,
{
    let started = Instant::now();
    let stats = store.snapshot(|s| {
        get::<S, R>(s, entity, id)?;
        let plan = contributions.plan(&Sort::default())?;
        Ok::<_, FundLensError>(aggregation::contribution_stats(s, &plan, Aggregation::ALL)?)
    })?;
    tracing::info!(
        entity,
        id,
        filters = contributions.active_count(),
        results = stats.total_contributions,
        elapsed_ms = elapsed_ms(started),
        "record_stats"
    );
    Ok(stats)
}
