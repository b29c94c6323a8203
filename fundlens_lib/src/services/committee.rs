use fundlens_query::query::{
    CommitteeFilter, CommitteeSortBy, ContributionFilter, Field, RelationScope, SearchQuery,
    SearchScope, Sort,
};
use fundlens_query::types::{Committee, ContributionStats, Page, SetStats};

use crate::error::FundLensError;
use crate::pagination::{PageRequest, Paginator};
use crate::store::DataStore;

const ENTITY: &str = "committee";

pub struct CommitteeService<'a, S> {
    store: &'a S,
    paginator: &'a Paginator,
}

impl<'a, S: DataStore> CommitteeService<'a, S> {
    pub fn new(store: &'a S, paginator: &'a Paginator) -> Self {
        CommitteeService { store, paginator }
    }

    pub fn list(
        &self,
        filter: &CommitteeFilter,
        sort: &Sort<CommitteeSortBy>,
        page: PageRequest,
    ) -> Result<Page<Committee>, FundLensError> {
        super::list(self.store, self.paginator, filter, sort, page)
    }

    pub fn get(&self, id: i64) -> Result<Committee, FundLensError> {
        super::get(self.store, ENTITY, id)
    }

    pub fn by_candidate(
        &self,
        candidate_id: i64,
        page: PageRequest,
    ) -> Result<Page<Committee>, FundLensError> {
        super::by_relation::<S, CommitteeFilter, Committee>(
            self.store,
            self.paginator,
            RelationScope::Candidate(candidate_id),
            page,
        )
    }

    /// Committees that received money from the contributor.
    pub fn by_contributor(
        &self,
        contributor_id: i64,
        page: PageRequest,
    ) -> Result<Page<Committee>, FundLensError> {
        super::by_relation::<S, CommitteeFilter, Committee>(
            self.store,
            self.paginator,
            RelationScope::Contributor(contributor_id),
            page,
        )
    }

    pub fn stats(&self, filter: &CommitteeFilter) -> Result<SetStats, FundLensError> {
        super::set_stats(
            self.store,
            filter,
            &[Field::CommitteeType, Field::CommitteeParty, Field::CommitteeState],
        )
    }

    pub fn search(
        &self,
        query: &SearchQuery,
        filter: &CommitteeFilter,
        page: PageRequest,
    ) -> Result<Page<Committee>, FundLensError> {
        super::search(self.store, self.paginator, query, SearchScope::Name, filter, page)
    }

    pub fn fundraising(&self, id: i64) -> Result<ContributionStats, FundLensError> {
        super::record_stats::<S, Committee>(
            self.store,
            ENTITY,
            id,
            ContributionFilter::default().with_committee_id(id),
        )
    }
}
