use std::str::FromStr;

use crate::errors::ValidationError;
use crate::types::{EntityKind, ENTITY_TYPES};

use super::common::{self, Criteria, FilterSpec, RelationScope, SortField};
use super::plan::{Field, Predicate, Relation, SortDirection, SortExpr, SortKey};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributorFilter {
    pub name: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub entity_type: Option<String>,
    pub employer: Option<String>,
    pub occupation: Option<String>,
    /// Contributors who gave to this committee.
    pub committee_id: Option<i64>,
    /// Contributors who gave to any committee of this candidate.
    pub candidate_id: Option<i64>,
}

impl FilterSpec for ContributorFilter {
    const ENTITY: EntityKind = EntityKind::Contributor;
    const KEYS: &'static [&'static str] = &[
        "name",
        "state",
        "city",
        "entity_type",
        "employer",
        "occupation",
        "committee_id",
        "candidate_id",
    ];

    type SortBy = ContributorSortBy;

    fn from_criteria(criteria: &Criteria) -> Result<Self, ValidationError> {
        criteria.check_keys(Self::KEYS)?;
        Ok(ContributorFilter {
            name: common::text(criteria, "name")?,
            state: common::state(criteria, "state")?,
            city: common::text(criteria, "city")?,
            entity_type: common::code(criteria, "entity_type", ENTITY_TYPES)?,
            employer: common::text(criteria, "employer")?,
            occupation: common::text(criteria, "occupation")?,
            committee_id: common::id(criteria, "committee_id")?,
            candidate_id: common::id(criteria, "candidate_id")?,
        })
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        common::push_contains(&mut out, Field::ContributorName, &self.name);
        common::push_eq(&mut out, Field::ContributorState, &self.state);
        common::push_contains(&mut out, Field::ContributorCity, &self.city);
        common::push_eq(&mut out, Field::ContributorEntityType, &self.entity_type);
        common::push_contains(&mut out, Field::ContributorEmployer, &self.employer);
        common::push_contains(&mut out, Field::ContributorOccupation, &self.occupation);

        // Both scopes share one subquery so "gave to committee X of candidate Y"
        // means the same contribution satisfied both.
        let mut given = Vec::new();
        common::push_eq(&mut given, Field::ContributionCommitteeId, &self.committee_id);
        common::push_eq(&mut given, Field::CommitteeCandidateId, &self.candidate_id);
        if !given.is_empty() {
            out.push(Predicate::Exists(Relation::ContributionsByContributor, given));
        }
        out
    }

    fn with_scope(self, scope: RelationScope) -> Result<Self, ValidationError> {
        match scope {
            RelationScope::Committee(id) => Ok(self.with_committee_id(id)),
            RelationScope::Candidate(id) => Ok(self.with_candidate_id(id)),
            other => Err(other.unsupported(Self::ENTITY)),
        }
    }

    fn active_count(&self) -> usize {
        [
            self.name.is_some(),
            self.state.is_some(),
            self.city.is_some(),
            self.entity_type.is_some(),
            self.employer.is_some(),
            self.occupation.is_some(),
            self.committee_id.is_some(),
            self.candidate_id.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

impl ContributorFilter {
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_uppercase());
        self
    }

    pub fn with_entity_type(mut self, entity_type: &str) -> Self {
        self.entity_type = Some(entity_type.to_uppercase());
        self
    }

    pub fn with_employer(mut self, employer: &str) -> Self {
        self.employer = Some(employer.to_string());
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
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContributorSortBy {
    #[default]
    Id,
    Name,
}

impl SortField for ContributorSortBy {
    fn sort_keys(self, direction: SortDirection) -> Vec<SortKey> {
        let expr = match self {
            ContributorSortBy::Id => SortExpr::Field(Field::ContributorId),
            ContributorSortBy::Name => SortExpr::Folded(Field::ContributorName),
        };
        vec![SortKey { expr, direction }]
    }
}

impl std::fmt::Display for ContributorSortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ContributorSortBy::Id => "id",
            ContributorSortBy::Name => "name",
        })
    }
}

impl FromStr for ContributorSortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(ContributorSortBy::Id),
            "name" => Ok(ContributorSortBy::Name),
            _ => Err(ValidationError::invalid(
                "sort_by",
                format!("'{}' is not one of id, name", s),
            )),
        }
    }
}

/// Ordering of the committees a contributor gave to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecipientSortBy {
    #[default]
    TotalAmount,
    ContributionCount,
    CommitteeName,
    FirstDate,
    LastDate,
}

impl std::fmt::Display for RecipientSortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RecipientSortBy::TotalAmount => "total_amount",
            RecipientSortBy::ContributionCount => "contribution_count",
            RecipientSortBy::CommitteeName => "committee_name",
            RecipientSortBy::FirstDate => "first_date",
            RecipientSortBy::LastDate => "last_date",
        })
    }
}

impl FromStr for RecipientSortBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "total_amount" => Ok(RecipientSortBy::TotalAmount),
            "contribution_count" => Ok(RecipientSortBy::ContributionCount),
            "committee_name" => Ok(RecipientSortBy::CommitteeName),
            "first_date" => Ok(RecipientSortBy::FirstDate),
            "last_date" => Ok(RecipientSortBy::LastDate),
            _ => Err(ValidationError::invalid(
                "sort_by",
                format!(
                    "'{}' is not one of total_amount, contribution_count, committee_name, first_date, last_date",
                    s
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::common::Sort;
    use crate::query::plan::{Condition, JoinEdge};

    #[test]
    fn partial_match_fields_are_contains() {
        let criteria =
            Criteria::from_pairs([("employer", "Acme"), ("occupation", "engineer")]).unwrap();
        let filter = ContributorFilter::from_criteria(&criteria).unwrap();
        assert_eq!(
            filter.predicates(),
            vec![
                Predicate::Contains(Field::ContributorEmployer, "Acme".into()),
                Predicate::Contains(Field::ContributorOccupation, "engineer".into()),
            ]
        );
    }

    #[test]
    fn entity_type_is_checked() {
        let criteria = Criteria::from_pairs([("entity_type", "ind")]).unwrap();
        let filter = ContributorFilter::from_criteria(&criteria).unwrap();
        assert_eq!(filter.entity_type.as_deref(), Some("IND"));
    }

    #[test]
    fn candidate_scope_subquery_joins_committee() {
        let filter = ContributorFilter::default()
            .with_scope(RelationScope::Candidate(2))
            .unwrap();
        let plan = filter.plan(&Sort::default()).unwrap();
        assert!(plan.joins.is_empty());
        match &plan.conditions[0] {
            Condition::Exists { joins, predicates, .. } => {
                assert_eq!(joins, &vec![JoinEdge::ContributionToCommittee]);
                assert_eq!(predicates.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn both_scopes_share_one_subquery() {
        let filter = ContributorFilter::default()
            .with_committee_id(1)
            .with_candidate_id(2);
        let preds = filter.predicates();
        assert_eq!(preds.len(), 1);
        assert_eq!(filter.active_count(), 2);
    }

    #[test]
    fn recipient_sort_parses() {
        assert_eq!(
            "first_date".parse::<RecipientSortBy>().unwrap(),
            RecipientSortBy::FirstDate
        );
        assert_eq!(RecipientSortBy::default().to_string(), "total_amount");
        assert_eq!(
            "amount".parse::<RecipientSortBy>().unwrap_err().field(),
            "sort_by"
        );
    }

    #[test]
    fn contributor_scope_is_unsupported() {
        assert!(ContributorFilter::default()
            .with_scope(RelationScope::Contributor(1))
            .is_err());
    }
}
