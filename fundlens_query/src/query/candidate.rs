use std::str::FromStr;

use crate::errors::ValidationError;
use crate::types::{EntityKind, OFFICES};
use crate::validation;

use super::common::{self, Criteria, FilterSpec, RelationScope, SortField};
use super::plan::{Field, Predicate, Relation, SortDirection, SortExpr, SortKey};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    pub name: Option<String>,
    pub state: Option<String>,
    pub office: Option<String>,
    pub party: Option<String>,
    pub district: Option<String>,
    pub election_year: Option<i32>,
    pub is_active: Option<bool>,
    /// Candidates whose committees received money from this contributor.
    pub contributor_id: Option<i64>,
}

impl FilterSpec for CandidateFilter {
    const ENTITY: EntityKind = EntityKind::Candidate;
    const KEYS: &'static [&'static str] = &[
        "name",
        "state",
        "office",
        "party",
        "district",
        "election_year",
        "is_active",
        "contributor_id",
    ];

    type SortBy = CandidateSortBy;

    fn from_criteria(criteria: &Criteria) -> Result<Self, ValidationError> {
        criteria.check_keys(Self::KEYS)?;
        Ok(CandidateFilter {
            name: common::text(criteria, "name")?,
            state: common::state(criteria, "state")?,
            office: common::code(criteria, "office", OFFICES)?,
            party: criteria.parse("party", validation::validate_party)?,
            district: criteria.parse("district", validation::validate_district)?,
            election_year: common::year(criteria, "election_year")?,
            is_active: common::flag(criteria, "is_active")?,
            contributor_id: common::id(criteria, "contributor_id")?,
        })
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        common::push_contains(&mut out, Field::CandidateName, &self.name);
        common::push_eq(&mut out, Field::CandidateState, &self.state);
        common::push_eq(&mut out, Field::CandidateOffice, &self.office);
        common::push_eq(&mut out, Field::CandidateParty, &self.party);
        common::push_eq(&mut out, Field::CandidateDistrict, &self.district);
        common::push_eq(&mut out, Field::CandidateElectionYear, &self.election_year);
        common::push_eq(&mut out, Field::CandidateIsActive, &self.is_active);
        if let Some(id) = self.contributor_id {
            out.push(Predicate::Exists(
                Relation::ContributionsToCandidate,
                vec![Predicate::Eq(Field::ContributionContributorId, id.into())],
            ));
        }
        out
    }

    fn with_scope(self, scope: RelationScope) -> Result<Self, ValidationError> {
        match scope {
            RelationScope::Contributor(id) => Ok(self.with_contributor_id(id)),
            other => Err(other.unsupported(Self::ENTITY)),
        }
    }

    fn active_count(&self) -> usize {
        [
            self.name.is_some(),
            self.state.is_some(),
            self.office.is_some(),
            self.party.is_some(),
            self.district.is_some(),
            self.election_year.is_some(),
            self.is_active.is_some(),
            self.contributor_id.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

impl CandidateFilter {
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_uppercase());
        self
    }

    pub fn with_office(mut self, office: &str) -> Self {
        self.office = Some(office.to_uppercase());
        self
    }

    pub fn with_party(mut self, party: &str) -> Self {
        self.party = Some(party.to_uppercase());
        self
    }

    pub fn with_election_year(mut self, year: i32) -> Self {
        self.election_year = Some(year);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn with_contributor_id(mut self, id: i64) -> Self {
        self.contributor_id = Some(id);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CandidateSortBy {
    #[default]
    Id,
    Name,
    ElectionYear,
}

impl SortField for CandidateSortBy {
    fn sort_keys(self, direction: SortDirection) -> Vec<SortKey> {
        let expr = match self {
            CandidateSortBy::Id => SortExpr::Field(Field::CandidateId),
            CandidateSortBy::Name => SortExpr::Folded(Field::CandidateName),
            CandidateSortBy::ElectionYear => SortExpr::Field(Field::CandidateElectionYear),
        };
        vec![SortKey { expr, direction }]
    }
}

impl std::fmt::Display for CandidateSortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CandidateSortBy::Id => "id",
            CandidateSortBy::Name => "name",
            CandidateSortBy::ElectionYear => "election_year",
        };
        f.write_str(s)
    }
}

impl FromStr for CandidateSortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(CandidateSortBy::Id),
            "name" => Ok(CandidateSortBy::Name),
            "election_year" => Ok(CandidateSortBy::ElectionYear),
            _ => Err(ValidationError::invalid(
                "sort_by",
                format!("'{}' is not one of id, name, election_year", s),
            )),
        }
    }
}
