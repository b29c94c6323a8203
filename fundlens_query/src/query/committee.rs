use std::str::FromStr;

use crate::errors::ValidationError;
use crate::types::{EntityKind, COMMITTEE_TYPES, OFFICES};
use crate::validation;

use super::common::{self, Criteria, FilterSpec, RelationScope, SortField};
use super::plan::{Field, Predicate, Relation, SortDirection, SortExpr, SortKey};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitteeFilter {
    pub name: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub committee_type: Option<String>,
    pub party: Option<String>,
    pub is_active: Option<bool>,
    pub candidate_id: Option<i64>,
    /// Committees that received money from this contributor.
    pub contributor_id: Option<i64>,
    /// Office of the linked candidate; unlinked committees never match.
    pub candidate_office: Option<String>,
}

impl FilterSpec for CommitteeFilter {
    const ENTITY: EntityKind = EntityKind::Committee;
    const KEYS: &'static [&'static str] = &[
        "name",
        "state",
        "city",
        "committee_type",
        "party",
        "is_active",
        "candidate_id",
        "contributor_id",
        "candidate_office",
    ];

    type SortBy = CommitteeSortBy;

    fn from_criteria(criteria: &Criteria) -> Result<Self, ValidationError> {
        criteria.check_keys(Self::KEYS)?;
        Ok(CommitteeFilter {
            name: common::text(criteria, "name")?,
            state: common::state(criteria, "state")?,
            city: common::text(criteria, "city")?,
            committee_type: common::code(criteria, "committee_type", COMMITTEE_TYPES)?,
            party: criteria.parse("party", validation::validate_party)?,
            is_active: common::flag(criteria, "is_active")?,
            candidate_id: common::id(criteria, "candidate_id")?,
            contributor_id: common::id(criteria, "contributor_id")?,
            candidate_office: common::code(criteria, "candidate_office", OFFICES)?,
        })
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        common::push_contains(&mut out, Field::CommitteeName, &self.name);
        common::push_eq(&mut out, Field::CommitteeState, &self.state);
        common::push_contains(&mut out, Field::CommitteeCity, &self.city);
        common::push_eq(&mut out, Field::CommitteeType, &self.committee_type);
        common::push_eq(&mut out, Field::CommitteeParty, &self.party);
        common::push_eq(&mut out, Field::CommitteeIsActive, &self.is_active);
        common::push_eq(&mut out, Field::CommitteeCandidateId, &self.candidate_id);
        common::push_eq(&mut out, Field::CandidateOffice, &self.candidate_office);
        if let Some(id) = self.contributor_id {
            out.push(Predicate::Exists(
                Relation::ContributionsToCommittee,
                vec![Predicate::Eq(Field::ContributionContributorId, id.into())],
            ));
        }
        out
    }

    fn with_scope(self, scope: RelationScope) -> Result<Self, ValidationError> {
        match scope {
            RelationScope::Candidate(id) => Ok(self.with_candidate_id(id)),
            RelationScope::Contributor(id) => Ok(self.with_contributor_id(id)),
            other => Err(other.unsupported(Self::ENTITY)),
        }
    }

    fn active_count(&self) -> usize {
        [
            self.name.is_some(),
            self.state.is_some(),
            self.city.is_some(),
            self.committee_type.is_some(),
            self.party.is_some(),
            self.is_active.is_some(),
            self.candidate_id.is_some(),
            self.contributor_id.is_some(),
            self.candidate_office.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

impl CommitteeFilter {
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_uppercase());
        self
    }

    pub fn with_committee_type(mut self, committee_type: &str) -> Self {
        self.committee_type = Some(committee_type.to_uppercase());
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn with_candidate_id(mut self, id: i64) -> Self {
        self.candidate_id = Some(id);
        self
    }

    pub fn with_contributor_id(mut self, id: i64) -> Self {
        self.contributor_id = Some(id);
        self
    }

    pub fn with_candidate_office(mut self, office: &str) -> Self {
        self.candidate_office = Some(office.to_uppercase());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitteeSortBy {
    #[default]
    Id,
    Name,
}

impl SortField for CommitteeSortBy {
    fn sort_keys(self, direction: SortDirection) -> Vec<SortKey> {
        let expr = match self {
            CommitteeSortBy::Id => SortExpr::Field(Field::CommitteeId),
            CommitteeSortBy::Name => SortExpr::Folded(Field::CommitteeName),
        };
        vec![SortKey { expr, direction }]
    }
}

impl std::fmt::Display for CommitteeSortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CommitteeSortBy::Id => "id",
            CommitteeSortBy::Name => "name",
        })
    }
}

impl FromStr for CommitteeSortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(CommitteeSortBy::Id),
            "name" => Ok(CommitteeSortBy::Name),
            _ => Err(ValidationError::invalid(
                "sort_by",
                format!("'{}' is not one of id, name", s),
            )),
        }
    }
}
