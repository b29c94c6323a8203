//! Library layer for FundLens: SQLite store, plan compiler, pagination,
//! aggregation and the entity services.
//!
//! Filter specifications, record types and the abstract query plan live in
//! `fundlens_query` and are re-exported here.

pub mod aggregation;
pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;
mod sql;
pub mod store;

pub use fundlens_query;
pub use fundlens_query::types;
pub use fundlens_query::{
    CandidateFilter, CandidateSortBy, CommitteeFilter, CommitteeSortBy, ContributionFilter,
    ContributionSortBy, ContributorFilter, ContributorSortBy, Criteria, FilterSpec, PlanError,
    RecipientSortBy, RelationScope, SearchQuery, SearchScope, Sort, SortDirection, ValidationError,
};

pub use aggregation::Aggregation;
pub use config::{ConfigError, Settings};
pub use db::{Db, DbError};
pub use error::FundLensError;
pub use pagination::{PageRequest, PaginationConfig, Paginator};
pub use services::{
    CandidateService, CommitteeService, ContributionListing, ContributionService,
    ContributorService, MetadataService, RaceService, StateService,
};
pub use store::DataStore;
