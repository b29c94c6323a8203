//! Store-agnostic core of the FundLens read API: record types, filter
//! specifications, the abstract query plan, and search resolution.

mod errors;
pub mod query;
pub mod types;
pub mod validation;

pub use self::errors::{PlanError, ValidationError};
pub use self::query::{
    CandidateFilter, CandidateSortBy, CommitteeFilter, CommitteeSortBy, ContributionFilter,
    ContributionSortBy, ContributorFilter, ContributorSortBy, Criteria, FilterSpec, QueryPlan,
    RecipientSortBy, RelationScope, SearchQuery, SearchScope, Sort, SortDirection,
};
