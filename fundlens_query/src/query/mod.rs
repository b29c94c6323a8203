mod aggregate;
pub use self::aggregate::{AggregateRequest, AggregateRow, AggregateValue, Measure};

mod common;
pub use self::common::{
    AmountRange, Criteria, DateRange, FilterSpec, RelationScope, Sort, SortField,
};

pub mod plan;
pub use self::plan::{
    Condition, Field, JoinEdge, Predicate, QueryPlan, Relation, SortDirection, SortExpr, SortKey,
    Value,
};

pub mod search;
pub use self::search::{fold_case, Resolved, SearchQuery, SearchScope};

mod candidate;
pub use self::candidate::{CandidateFilter, CandidateSortBy};

mod committee;
pub use self::committee::{CommitteeFilter, CommitteeSortBy};

mod contributor;
pub use self::contributor::{ContributorFilter, ContributorSortBy, RecipientSortBy};

mod contribution;
pub use self::contribution::{ContributionFilter, ContributionSortBy};
