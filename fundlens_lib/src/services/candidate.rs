use fundlens_query::query::{
    CandidateFilter, CandidateSortBy, ContributionFilter, Field, RelationScope, SearchQuery,
    SearchScope, Sort,
};
use fundlens_query::types::{Candidate, ContributionStats, Page, SetStats};

use crate::error::FundLensError;
use crate::pagination::{PageRequest, Paginator};
use crate::store::DataStore;

const ENTITY: &str = "candidate";

pub struct CandidateService<'a, S> {
    store: &'a S,
    paginator: &'a Paginator,
}

impl<'a, S: DataStore> CandidateService<'a, S> {
    pub fn new(store: &'a S, paginator: &'a Paginator) -> Self {
        CandidateService { store, paginator }
    }

    pub fn list(
        &self,
        filter: &CandidateFilter,
        sort: &Sort<CandidateSortBy>,
        page: PageRequest,
    ) -> Result<Page<Candidate>, FundLensError> {
        super::list(self.store, self.paginator, filter, sort, page)
    }

    pub fn get(&self, id: i64) -> Result<Candidate, FundLensError> {
        super::get(self.store, ENTITY, id)
    }

    /// Candidates whose committees received money from the contributor.
    pub fn by_contributor(
        &self,
        contributor_id: i64,
        page: PageRequest,
    ) -> Result<Page<Candidate>, FundLensError> {
        super::by_relation::<S, CandidateFilter, Candidate>(
            self.store,
            self.paginator,
            RelationScope::Contributor(contributor_id),
            page,
        )
    }

    /// Count of matching candidates broken down by office, party and state.
    pub fn stats(&self, filter: &CandidateFilter) -> Result<SetStats, FundLensError> {
        super::set_stats(
            self.store,
            filter,
            &[Field::CandidateOffice, Field::CandidateParty, Field::CandidateState],
        )
    }

    pub fn search(
        &self,
        query: &SearchQuery,
        filter: &CandidateFilter,
        page: PageRequest,
    ) -> Result<Page<Candidate>, FundLensError> {
        super::search(self.store, self.paginator, query, SearchScope::Name, filter, page)
    }

    /// Contribution statistics over every committee linked to the candidate.
    pub fn fundraising(&self, id: i64) -> Result<ContributionStats, FundLensError> {
        super::record_stats::<S, Candidate>(
            self.store,
            ENTITY,
            id,
            ContributionFilter::default().with_candidate_id(id),
        )
    }
}
