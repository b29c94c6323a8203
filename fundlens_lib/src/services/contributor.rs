use std::time::Instant;

use fundlens_query::query::{
    ContributionFilter, ContributorFilter, ContributorSortBy, Field, FilterSpec, Predicate,
    QueryPlan, RecipientSortBy, RelationScope, SearchQuery, SearchScope, Sort, SortDirection,
};
use fundlens_query::types::{
    Committee, ContributionStats, Contributor, EntityKind, Page, Recipient, SetStats,
    TopContributor, ENTITY_TYPES,
};
use fundlens_query::validation::{validate_code, validate_state};

use crate::aggregation::{self, GroupOrder, GroupTotals};
use crate::error::FundLensError;
use crate::pagination::{PageRequest, Paginator};
use crate::store::{DataStore, Window};

const ENTITY: &str = "contributor";

pub struct ContributorService<'a, S> {
    store: &'a S,
    paginator: &'a Paginator,
}

impl<'a, S: DataStore> ContributorService<'a, S> {
    pub fn new(store: &'a S, paginator: &'a Paginator) -> Self {
        ContributorService { store, paginator }
    }

    pub fn list(
        &self,
        filter: &ContributorFilter,
        sort: &Sort<ContributorSortBy>,
        page: PageRequest,
    ) -> Result<Page<Contributor>, FundLensError> {
        super::list(self.store, self.paginator, filter, sort, page)
    }

    pub fn get(&self, id: i64) -> Result<Contributor, FundLensError> {
        super::get(self.store, ENTITY, id)
    }

    /// Contributors who gave to the committee, each listed once.
    pub fn by_committee(
        &self,
        committee_id: i64,
        page: PageRequest,
    ) -> Result<Page<Contributor>, FundLensError> {
        super::by_relation::<S, ContributorFilter, Contributor>(
            self.store,
            self.paginator,
            RelationScope::Committee(committee_id),
            page,
        )
    }

    /// Contributors who gave to any committee of the candidate, each listed once.
    pub fn by_candidate(
        &self,
        candidate_id: i64,
        page: PageRequest,
    ) -> Result<Page<Contributor>, FundLensError> {
        super::by_relation::<S, ContributorFilter, Contributor>(
            self.store,
            self.paginator,
            RelationScope::Candidate(candidate_id),
            page,
        )
    }

    pub fn stats(&self, filter: &ContributorFilter) -> Result<SetStats, FundLensError> {
        super::set_stats(
            self.store,
            filter,
            &[Field::ContributorEntityType, Field::ContributorState],
        )
    }

    /// Search by name, or by name, employer and occupation with the wide scope.
    pub fn search(
        &self,
        query: &SearchQuery,
        scope: SearchScope,
        filter: &ContributorFilter,
        page: PageRequest,
    ) -> Result<Page<Contributor>, FundLensError> {
        super::search(self.store, self.paginator, query, scope, filter, page)
    }

    /// Statistics over everything the contributor gave.
    pub fn giving(&self, id: i64) -> Result<ContributionStats, FundLensError> {
        super::record_stats::<S, Contributor>(
            self.store,
            ENTITY,
            id,
            ContributionFilter::default().with_contributor_id(id),
        )
    }

    /// Contributors ranked by total amount given, largest first, optionally
    /// limited to one state and one entity type.
    pub fn top(
        &self,
        state: Option<&str>,
        entity_type: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<TopContributor>, FundLensError> {
        let started = Instant::now();
        let mut predicates = Vec::new();
        if let Some(state) = state {
            let code = validate_state("state", state)?;
            predicates.push(Predicate::Eq(Field::ContributorState, code.into()));
        }
        if let Some(kind) = entity_type {
            let code = validate_code("entity_type", kind, ENTITY_TYPES.iter().map(|(c, _)| *c))?;
            predicates.push(Predicate::Eq(Field::ContributorEntityType, code.into()));
        }
        let filters = predicates.len();
        let plan = QueryPlan::builder(EntityKind::Contribution)
            .filters(predicates)
            .build()?;

        let result = self.store.snapshot(|s| {
            let groups = self.ranked_groups(
                s,
                &plan,
                Field::ContributionContributorId,
                (GroupOrder::TotalAmount, SortDirection::Desc),
                page,
            )?;
            let mut items = Vec::with_capacity(groups.items.len());
            for g in groups.items {
                let contributor: Contributor = super::get(s, ENTITY, g.key)?;
                items.push(TopContributor {
                    contributor,
                    total_amount: g.total_amount,
                    total_contributions: g.total_contributions,
                    unique_recipients: g.unique_committees,
                });
            }
            Ok::<_, FundLensError>(Page {
                items,
                meta: groups.meta,
            })
        })?;
        tracing::info!(
            entity = ENTITY,
            filters,
            results = result.items.len(),
            total = result.meta.total_items,
            elapsed_ms = super::elapsed_ms(started),
            "top"
        );
        Ok(result)
    }

    /// The committees the contributor gave to, with per-committee totals.
    pub fn recipients(
        &self,
        id: i64,
        sort_by: RecipientSortBy,
        direction: SortDirection,
        page: PageRequest,
    ) -> Result<Page<Recipient>, FundLensError> {
        let started = Instant::now();
        let plan = ContributionFilter::default()
            .with_contributor_id(id)
            .plan(&Sort::default())?;
        let order = match sort_by {
            RecipientSortBy::TotalAmount => GroupOrder::TotalAmount,
            RecipientSortBy::ContributionCount => GroupOrder::ContributionCount,
            RecipientSortBy::CommitteeName => GroupOrder::Label(Field::CommitteeName),
            RecipientSortBy::FirstDate => GroupOrder::FirstDate,
            RecipientSortBy::LastDate => GroupOrder::LastDate,
        };

        let result = self.store.snapshot(|s| {
            super::get::<S, Contributor>(s, ENTITY, id)?;
            let groups = self.ranked_groups(
                s,
                &plan,
                Field::ContributionCommitteeId,
                (order, direction),
                page,
            )?;
            let mut items = Vec::with_capacity(groups.items.len());
            for g in groups.items {
                let committee: Committee = super::get(s, "committee", g.key)?;
                items.push(Recipient {
                    committee,
                    total_contributions: g.total_contributions,
                    total_amount: g.total_amount,
                    first_date: g.first_date,
                    last_date: g.last_date,
                });
            }
            Ok::<_, FundLensError>(Page {
                items,
                meta: groups.meta,
            })
        })?;
        tracing::info!(
            entity = ENTITY,
            id,
            sort_by = %sort_by,
            results = result.items.len(),
            total = result.meta.total_items,
            elapsed_ms = super::elapsed_ms(started),
            "recipients"
        );
        Ok(result)
    }

    /// One page of group totals with metadata counted over every group.
    fn ranked_groups(
        &self,
        store: &S,
        plan: &QueryPlan,
        group_by: Field,
        order: (GroupOrder, SortDirection),
        page: PageRequest,
    ) -> Result<Page<GroupTotals>, FundLensError> {
        let total = aggregation::group_count(store, plan, group_by)?;
        let meta = self.paginator.meta(page, total);
        let items = if meta.is_past_end() {
            Vec::new()
        } else {
            aggregation::group_totals(
                store,
                plan,
                group_by,
                Some(order),
                Some(Window {
                    limit: u64::from(meta.page_size),
                    offset: meta.offset(),
                }),
            )?
        };
        Ok(Page { items, meta })
    }
}
