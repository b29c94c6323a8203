use std::time::Instant;

use fundlens_query::query::{
    ContributionFilter, ContributionSortBy, FilterSpec, RelationScope, SearchQuery, SearchScope,
    Sort,
};
use fundlens_query::types::{
    Candidate, Committee, Contribution, ContributionStats, ContributionWithRelations, Contributor,
    Page,
};
use serde::Serialize;

use crate::aggregation::{self, Aggregation};
use crate::error::FundLensError;
use crate::pagination::{PageRequest, Paginator};
use crate::store::DataStore;

const ENTITY: &str = "contribution";

/// A page of contributions with statistics over the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributionListing {
    #[serde(flatten)]
    pub page: Page<Contribution>,
    pub stats: ContributionStats,
}

pub struct ContributionService<'a, S> {
    store: &'a S,
    paginator: &'a Paginator,
}

impl<'a, S: DataStore> ContributionService<'a, S> {
    pub fn new(store: &'a S, paginator: &'a Paginator) -> Self {
        ContributionService { store, paginator }
    }

    pub fn list(
        &self,
        filter: &ContributionFilter,
        sort: &Sort<ContributionSortBy>,
        page: PageRequest,
    ) -> Result<Page<Contribution>, FundLensError> {
        super::list(self.store, self.paginator, filter, sort, page)
    }

    pub fn get(&self, id: i64) -> Result<Contribution, FundLensError> {
        super::get(self.store, ENTITY, id)
    }

    /// The contribution with its contributor, committee and linked candidate.
    pub fn get_full(&self, id: i64) -> Result<ContributionWithRelations, FundLensError> {
        let started = Instant::now();
        let full = self.store.snapshot(|s| {
            let contribution: Contribution = super::get(s, ENTITY, id)?;
            let contributor: Contributor =
                super::get(s, "contributor", contribution.contributor_id)?;
            let committee: Committee = super::get(s, "committee", contribution.committee_id)?;
            let candidate = match committee.candidate_id {
                Some(cid) => s.get::<Candidate>(cid)?,
                None => None,
            };
            Ok::<_, FundLensError>(ContributionWithRelations {
                contribution,
                contributor,
                committee,
                candidate,
            })
        })?;
        tracing::info!(
            entity = ENTITY,
            id,
            has_candidate = full.candidate.is_some(),
            elapsed_ms = super::elapsed_ms(started),
            "get_full"
        );
        Ok(full)
    }

    pub fn by_contributor(
        &self,
        contributor_id: i64,
        page: PageRequest,
    ) -> Result<Page<Contribution>, FundLensError> {
        self.by_scope(RelationScope::Contributor(contributor_id), page)
    }

    pub fn by_committee(
        &self,
        committee_id: i64,
        page: PageRequest,
    ) -> Result<Page<Contribution>, FundLensError> {
        self.by_scope(RelationScope::Committee(committee_id), page)
    }

    /// Contributions to any committee linked to the candidate.
    pub fn by_candidate(
        &self,
        candidate_id: i64,
        page: PageRequest,
    ) -> Result<Page<Contribution>, FundLensError> {
        self.by_scope(RelationScope::Candidate(candidate_id), page)
    }

    fn by_scope(
        &self,
        scope: RelationScope,
        page: PageRequest,
    ) -> Result<Page<Contribution>, FundLensError> {
        super::by_relation::<S, ContributionFilter, Contribution>(
            self.store,
            self.paginator,
            scope,
            page,
        )
    }

    pub fn stats(
        &self,
        filter: &ContributionFilter,
        aggregations: &[Aggregation],
    ) -> Result<ContributionStats, FundLensError> {
        let started = Instant::now();
        let plan = filter.plan(&Sort::default())?;
        let stats = aggregation::contribution_stats(self.store, &plan, aggregations)?;
        tracing::info!(
            entity = ENTITY,
            filters = filter.active_count(),
            results = stats.total_contributions,
            elapsed_ms = super::elapsed_ms(started),
            "stats"
        );
        Ok(stats)
    }

    /// Search contributions by contributor name.
    pub fn search(
        &self,
        query: &SearchQuery,
        filter: &ContributionFilter,
        page: PageRequest,
    ) -> Result<Page<Contribution>, FundLensError> {
        super::search(self.store, self.paginator, query, SearchScope::Name, filter, page)
    }

    /// One plan and one snapshot feed both the page and the statistics.
    pub fn list_with_stats(
        &self,
        filter: &ContributionFilter,
        sort: &Sort<ContributionSortBy>,
        page: PageRequest,
        aggregations: &[Aggregation],
    ) -> Result<ContributionListing, FundLensError> {
        let started = Instant::now();
        let plan = filter.plan(sort)?;
        let listing = self.store.snapshot(|s| -> Result<_, FundLensError> {
            let page = self.paginator.paginate_in(s, &plan, page)?;
            let stats = aggregation::contribution_stats(s, &plan, aggregations)?;
            Ok(ContributionListing { page, stats })
        })?;
        tracing::info!(
            entity = ENTITY,
            filters = filter.active_count(),
            results = listing.page.items.len(),
            total = listing.page.meta.total_items,
            elapsed_ms = super::elapsed_ms(started),
            "list_with_stats"
        );
        Ok(listing)
    }
}
