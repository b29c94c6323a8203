use std::str::FromStr;

use chrono::NaiveDate;

use crate::errors::ValidationError;
use crate::types::{EntityKind, Money, CONTRIBUTION_TYPES, ELECTION_TYPES, OFFICES};
use crate::validation;

use super::common::{self, AmountRange, Criteria, DateRange, FilterSpec, RelationScope, SortField};
use super::plan::{Field, Predicate, SortDirection, SortExpr, SortKey};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionFilter {
    pub dates: DateRange,
    pub amounts: AmountRange,
    pub contribution_type: Option<String>,
    pub election_type: Option<String>,
    pub election_year: Option<i32>,
    pub contributor_id: Option<i64>,
    pub committee_id: Option<i64>,
    /// Contributions to any committee linked to this candidate.
    pub candidate_id: Option<i64>,
    pub contributor_state: Option<String>,
    pub candidate_state: Option<String>,
    pub candidate_office: Option<String>,
}

impl FilterSpec for ContributionFilter {
    const ENTITY: EntityKind = EntityKind::Contribution;
    const KEYS: &'static [&'static str] = &[
        "start_date",
        "end_date",
        "min_amount",
        "max_amount",
        "contribution_type",
        "election_type",
        "election_year",
        "contributor_id",
        "committee_id",
        "candidate_id",
        "contributor_state",
        "candidate_state",
        "candidate_office",
    ];

    type SortBy = ContributionSortBy;

    fn from_criteria(criteria: &Criteria) -> Result<Self, ValidationError> {
        criteria.check_keys(Self::KEYS)?;
        let dates = DateRange::new(
            criteria.parse("start_date", validation::parse_date)?,
            criteria.parse("end_date", validation::parse_date)?,
        )?;
        let amounts = AmountRange::new(
            criteria.parse("min_amount", validation::parse_amount)?,
            criteria.parse("max_amount", validation::parse_amount)?,
        )?;
        Ok(ContributionFilter {
            dates,
            amounts,
            contribution_type: criteria.parse("contribution_type", |f, raw| {
                validation::validate_code(f, raw, CONTRIBUTION_TYPES.iter().copied())
            })?,
            election_type: criteria.parse("election_type", |f, raw| {
                validation::validate_code(f, raw, ELECTION_TYPES.iter().copied())
            })?,
            election_year: common::year(criteria, "election_year")?,
            contributor_id: common::id(criteria, "contributor_id")?,
            committee_id: common::id(criteria, "committee_id")?,
            candidate_id: common::id(criteria, "candidate_id")?,
            contributor_state: common::state(criteria, "contributor_state")?,
            candidate_state: common::state(criteria, "candidate_state")?,
            candidate_office: common::code(criteria, "candidate_office", OFFICES)?,
        })
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut out = self.dates.predicates(Field::ContributionDate);
        out.extend(self.amounts.predicates(Field::ContributionAmount));
        common::push_eq(&mut out, Field::ContributionType, &self.contribution_type);
        common::push_eq(&mut out, Field::ContributionElectionType, &self.election_type);
        common::push_eq(&mut out, Field::ContributionElectionYear, &self.election_year);
        common::push_eq(&mut out, Field::ContributionContributorId, &self.contributor_id);
        common::push_eq(&mut out, Field::ContributionCommitteeId, &self.committee_id);
        common::push_eq(&mut out, Field::CommitteeCandidateId, &self.candidate_id);
        common::push_eq(&mut out, Field::ContributorState, &self.contributor_state);
        common::push_eq(&mut out, Field::CandidateState, &self.candidate_state);
        common::push_eq(&mut out, Field::CandidateOffice, &self.candidate_office);
        out
    }

    fn with_scope(self, scope: RelationScope) -> Result<Self, ValidationError> {
        Ok(match scope {
            RelationScope::Contributor(id) => self.with_contributor_id(id),
            RelationScope::Committee(id) => self.with_committee_id(id),
            RelationScope::Candidate(id) => self.with_candidate_id(id),
        })
    }

    fn active_count(&self) -> usize {
        [
            self.dates.start.is_some(),
            self.dates.end.is_some(),
            self.amounts.min.is_some(),
            self.amounts.max.is_some(),
            self.contribution_type.is_some(),
            self.election_type.is_some(),
            self.election_year.is_some(),
            self.contributor_id.is_some(),
            self.committee_id.is_some(),
            self.candidate_id.is_some(),
            self.contributor_state.is_some(),
            self.candidate_state.is_some(),
            self.candidate_office.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

impl ContributionFilter {
    /// Set both date bounds, checking their order.
    pub fn with_dates(
        mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        self.dates = DateRange::new(start, end)?;
        Ok(self)
    }

    /// Set both amount bounds, checking their order.
    pub fn with_amounts(
        mut self,
        min: Option<Money>,
        max: Option<Money>,
    ) -> Result<Self, ValidationError> {
        self.amounts = AmountRange::new(min, max)?;
        Ok(self)
    }

    pub fn with_contribution_type(mut self, contribution_type: &str) -> Self {
        self.contribution_type = Some(contribution_type.to_uppercase());
        self
    }

    pub fn with_election_year(mut self, year: i32) -> Self {
        self.election_year = Some(year);
        self
    }

    pub fn with_contributor_id(mut self, id: i64) -> Self {
        self.contributor_id = Some(id);
        self
    }

    pub fn with_committee_id(mut self, id: i64) -> Self {
        self.committee_id = Some(id);
        self
    }

    pub fn with_candidate_id(mut self, id: i64) -> Self {
        self.candidate_id = Some(id);
        self
    }

    pub fn with_contributor_state(mut self, state: &str) -> Self {
        self.contributor_state = Some(state.to_uppercase());
        self
    }

    pub fn with_candidate_state(mut self, state: &str) -> Self {
        self.candidate_state = Some(state.to_uppercase());
        self
    }

    pub fn with_candidate_office(mut self, office: &str) -> Self {
        self.candidate_office = Some(office.to_uppercase());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContributionSortBy {
    #[default]
    Id,
    Date,
    Amount,
}

impl SortField for ContributionSortBy {
    fn sort_keys(self, direction: SortDirection) -> Vec<SortKey> {
        let field = match self {
            ContributionSortBy::Id => Field::ContributionId,
            ContributionSortBy::Date => Field::ContributionDate,
            ContributionSortBy::Amount => Field::ContributionAmount,
        };
        vec![SortKey {
            expr: SortExpr::Field(field),
            direction,
        }]
    }
}

impl std::fmt::Display for ContributionSortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ContributionSortBy::Id => "id",
            ContributionSortBy::Date => "date",
            ContributionSortBy::Amount => "amount",
        })
    }
}

impl FromStr for ContributionSortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(ContributionSortBy::Id),
            "date" => Ok(ContributionSortBy::Date),
            "amount" => Ok(ContributionSortBy::Amount),
            _ => Err(ValidationError::invalid(
                "sort_by",
                format!("'{}' is not one of id, date, amount", s),
            )),
        }
    }
}
