//! Abstract query plans: predicates, the join graph, ordering, and the plan builder.
//!
//! A [`QueryPlan`] is store-agnostic. It names fields through the closed
//! [`Field`] enum and carries values as typed [`Value`]s; turning it into
//! SQL (or anything else) is the data store's job.

use chrono::NaiveDate;

use crate::errors::{PlanError, ValidationError};
use crate::types::{EntityKind, Money};

/// Every queryable attribute of every entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CandidateId,
    CandidateName,
    CandidateOffice,
    CandidateState,
    CandidateDistrict,
    CandidateParty,
    CandidateElectionYear,
    CandidateIsActive,

    CommitteeId,
    CommitteeName,
    CommitteeType,
    CommitteeState,
    CommitteeCity,
    CommitteeParty,
    CommitteeCandidateId,
    CommitteeIsActive,

    ContributorId,
    ContributorName,
    ContributorEntityType,
    ContributorEmployer,
    ContributorOccupation,
    ContributorCity,
    ContributorState,
    ContributorZip,

    ContributionId,
    ContributionContributorId,
    ContributionCommitteeId,
    ContributionAmount,
    ContributionDate,
    ContributionType,
    ContributionElectionType,
    ContributionElectionYear,
    ContributionMemo,
}

impl Field {
    /// The entity whose table holds this field.
    pub fn entity(self) -> EntityKind {
        use Field::*;
        match self {
            CandidateId | CandidateName | CandidateOffice | CandidateState | CandidateDistrict
            | CandidateParty | CandidateElectionYear | CandidateIsActive => EntityKind::Candidate,
            CommitteeId | CommitteeName | CommitteeType | CommitteeState | CommitteeCity
            | CommitteeParty | CommitteeCandidateId | CommitteeIsActive => EntityKind::Committee,
            ContributorId | ContributorName | ContributorEntityType | ContributorEmployer
            | ContributorOccupation | ContributorCity | ContributorState | ContributorZip => {
                EntityKind::Contributor
            }
            ContributionId | ContributionContributorId | ContributionCommitteeId
            | ContributionAmount | ContributionDate | ContributionType
            | ContributionElectionType | ContributionElectionYear | ContributionMemo => {
                EntityKind::Contribution
            }
        }
    }

    /// Attribute name without the entity prefix, used for breakdown labels.
    pub fn name(self) -> &'static str {
        use Field::*;
        match self {
            CandidateId | CommitteeId | ContributorId | ContributionId => "id",
            CandidateName | CommitteeName | ContributorName => "name",
            CandidateOffice => "office",
            CandidateState | CommitteeState | ContributorState => "state",
            CandidateDistrict => "district",
            CandidateParty | CommitteeParty => "party",
            CandidateElectionYear | ContributionElectionYear => "election_year",
            CandidateIsActive | CommitteeIsActive => "is_active",
            CommitteeType => "committee_type",
            CommitteeCity | ContributorCity => "city",
            CommitteeCandidateId => "candidate_id",
            ContributorEntityType => "entity_type",
            ContributorEmployer => "employer",
            ContributorOccupation => "occupation",
            ContributorZip => "zip",
            ContributionContributorId => "contributor_id",
            ContributionCommitteeId => "committee_id",
            ContributionAmount => "amount",
            ContributionDate => "date",
            ContributionType => "contribution_type",
            ContributionElectionType => "election_type",
            ContributionMemo => "memo_text",
        }
    }

    /// The identifier field of an entity.
    pub fn id_of(entity: EntityKind) -> Field {
        match entity {
            EntityKind::Candidate => Field::CandidateId,
            EntityKind::Committee => Field::CommitteeId,
            EntityKind::Contributor => Field::ContributorId,
            EntityKind::Contribution => Field::ContributionId,
        }
    }
}

/// A typed parameter value. Stores must bind these, never splice them into query text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    Money(Money),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<Money> for Value {
    fn from(m: Money) -> Self {
        Value::Money(m)
    }
}

/// A correlated one-to-many relation used for semi-join scoping.
///
/// Scoping a parent by something on its children ("contributors who gave to
/// committee 7") would multiply parent rows if joined directly; these are
/// planned as `EXISTS` subqueries instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Contributions made by the outer contributor.
    ContributionsByContributor,
    /// Contributions received by the outer committee.
    ContributionsToCommittee,
    /// Contributions received by any committee of the outer candidate.
    ContributionsToCandidate,
}

impl Relation {
    /// Entity the relation hangs off.
    pub fn outer(self) -> EntityKind {
        match self {
            Relation::ContributionsByContributor => EntityKind::Contributor,
            Relation::ContributionsToCommittee => EntityKind::Committee,
            Relation::ContributionsToCandidate => EntityKind::Candidate,
        }
    }

    /// Root entity of the subquery.
    pub fn inner(self) -> EntityKind {
        EntityKind::Contribution
    }

    /// `(inner field, outer field)` that must be equal for a row to correlate.
    pub fn correlation(self) -> (Field, Field) {
        match self {
            Relation::ContributionsByContributor => {
                (Field::ContributionContributorId, Field::ContributorId)
            }
            Relation::ContributionsToCommittee => {
                (Field::ContributionCommitteeId, Field::CommitteeId)
            }
            Relation::ContributionsToCandidate => {
                (Field::CommitteeCandidateId, Field::CandidateId)
            }
        }
    }
}

/// A single filter condition. All predicates of a plan are AND-combined.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Field, Value),
    /// Inclusive lower bound.
    AtLeast(Field, Value),
    /// Inclusive upper bound.
    AtMost(Field, Value),
    /// Case-insensitive substring match; the term is matched literally.
    Contains(Field, String),
    /// Case-insensitive substring match against any of the fields.
    AnyContains(Vec<Field>, String),
    /// At least one related row satisfies the inner predicates.
    Exists(Relation, Vec<Predicate>),
}

impl Predicate {
    /// Fields this predicate reads in the scope it is evaluated in.
    /// `Exists` reads nothing from the outer scope beyond its correlation key.
    fn scope_fields(&self) -> Vec<Field> {
        match self {
            Predicate::Eq(f, _)
            | Predicate::AtLeast(f, _)
            | Predicate::AtMost(f, _)
            | Predicate::Contains(f, _) => vec![*f],
            Predicate::AnyContains(fields, _) => fields.clone(),
            Predicate::Exists(relation, _) => vec![relation.correlation().1],
        }
    }
}

/// A many-to-one edge of the entity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinEdge {
    ContributionToCommittee,
    CommitteeToCandidate,
    ContributionToContributor,
}

impl JoinEdge {
    pub fn from(self) -> EntityKind {
        match self {
            JoinEdge::ContributionToCommittee | JoinEdge::ContributionToContributor => {
                EntityKind::Contribution
            }
            JoinEdge::CommitteeToCandidate => EntityKind::Committee,
        }
    }

    pub fn to(self) -> EntityKind {
        match self {
            JoinEdge::ContributionToCommittee => EntityKind::Committee,
            JoinEdge::CommitteeToCandidate => EntityKind::Candidate,
            JoinEdge::ContributionToContributor => EntityKind::Contributor,
        }
    }

    /// `(foreign key on the child, referenced key on the parent)`.
    pub fn keys(self) -> (Field, Field) {
        match self {
            JoinEdge::ContributionToCommittee => (Field::ContributionCommitteeId, Field::CommitteeId),
            JoinEdge::CommitteeToCandidate => (Field::CommitteeCandidateId, Field::CandidateId),
            JoinEdge::ContributionToContributor => {
                (Field::ContributionContributorId, Field::ContributorId)
            }
        }
    }
}

/// Edges needed to reach `target` from `root`, parent-most last.
/// `None` when `target` is only reachable across a one-to-many edge.
pub fn join_path(root: EntityKind, target: EntityKind) -> Option<&'static [JoinEdge]> {
    use EntityKind::*;
    match (root, target) {
        (a, b) if a == b => Some(&[]),
        (Contribution, Committee) => Some(&[JoinEdge::ContributionToCommittee]),
        (Contribution, Candidate) => Some(&[
            JoinEdge::ContributionToCommittee,
            JoinEdge::CommitteeToCandidate,
        ]),
        (Contribution, Contributor) => Some(&[JoinEdge::ContributionToContributor]),
        (Committee, Candidate) => Some(&[JoinEdge::CommitteeToCandidate]),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl std::str::FromStr for SortDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(ValidationError::invalid(
                "sort_direction",
                format!("'{}' is not one of asc, desc", s),
            )),
        }
    }
}

/// What a sort key orders by.
#[derive(Debug, Clone, PartialEq)]
pub enum SortExpr {
    Field(Field),
    /// Case-insensitive ordering of a text field.
    Folded(Field),
    /// Search rank of `field` against `term`: 0 exact, 1 prefix, 2 substring, 3 anything else.
    Relevance { field: Field, term: String },
}

impl SortExpr {
    fn field(&self) -> Field {
        match self {
            SortExpr::Field(f) | SortExpr::Folded(f) => *f,
            SortExpr::Relevance { field, .. } => *field,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: SortExpr,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(expr: SortExpr) -> Self {
        SortKey {
            expr,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(expr: SortExpr) -> Self {
        SortKey {
            expr,
            direction: SortDirection::Desc,
        }
    }
}

/// A planned condition: either a plain predicate on the plan's rows or a
/// correlated subquery with its own joins.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Match(Predicate),
    Exists {
        relation: Relation,
        joins: Vec<JoinEdge>,
        predicates: Vec<Predicate>,
    },
}

/// A fully resolved, store-agnostic query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub root: EntityKind,
    /// Many-to-one joins from the root, in dependency order.
    pub joins: Vec<JoinEdge>,
    pub conditions: Vec<Condition>,
    /// Always ends with the root identifier ascending.
    pub ordering: Vec<SortKey>,
}

impl QueryPlan {
    pub fn builder(root: EntityKind) -> PlanBuilder {
        PlanBuilder::new(root)
    }

    /// This plan plus whatever joins are needed to read `fields`.
    ///
    /// Joins only follow many-to-one edges, so the returned plan selects the
    /// same rows as `self`.
    pub fn reaching(&self, fields: &[Field]) -> Result<QueryPlan, PlanError> {
        let mut joins = self.joins.clone();
        for field in fields {
            add_path(self.root, *field, &mut joins)?;
        }
        Ok(QueryPlan {
            root: self.root,
            joins,
            conditions: self.conditions.clone(),
            ordering: self.ordering.clone(),
        })
    }

    pub fn is_unfiltered(&self) -> bool {
        self.conditions.is_empty()
    }
}

fn add_path(root: EntityKind, field: Field, joins: &mut Vec<JoinEdge>) -> Result<(), PlanError> {
    let path = join_path(root, field.entity()).ok_or(PlanError::Unreachable { root, field })?;
    for edge in path {
        if !joins.contains(edge) {
            joins.push(*edge);
        }
    }
    Ok(())
}

/// Accumulates predicates and ordering, adding joins only for fields that
/// need them. The first error is kept and reported by [`PlanBuilder::build`].
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    root: EntityKind,
    joins: Vec<JoinEdge>,
    conditions: Vec<Condition>,
    ordering: Vec<SortKey>,
    error: Option<PlanError>,
}

impl PlanBuilder {
    pub fn new(root: EntityKind) -> Self {
        PlanBuilder {
            root,
            joins: Vec::new(),
            conditions: Vec::new(),
            ordering: Vec::new(),
            error: None,
        }
    }

    fn require(&mut self, field: Field) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = add_path(self.root, field, &mut self.joins) {
            self.error = Some(e);
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        for field in predicate.scope_fields() {
            self.require(field);
        }
        match predicate {
            Predicate::Exists(relation, inner) => {
                if relation.outer() != self.root && self.error.is_none() {
                    self.error = Some(PlanError::Unreachable {
                        root: self.root,
                        field: relation.correlation().1,
                    });
                }
                match plan_subquery(relation, inner) {
                    Ok(condition) => self.conditions.push(condition),
                    Err(e) => {
                        self.error.get_or_insert(e);
                    }
                }
            }
            other => self.conditions.push(Condition::Match(other)),
        }
        self
    }

    pub fn filters(self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        predicates.into_iter().fold(self, PlanBuilder::filter)
    }

    pub fn order_by(mut self, key: SortKey) -> Self {
        self.require(key.expr.field());
        self.ordering.push(key);
        self
    }

    pub fn order_by_all(self, keys: impl IntoIterator<Item = SortKey>) -> Self {
        keys.into_iter().fold(self, PlanBuilder::order_by)
    }

    /// Finish the plan, appending the identifier tie-break so that pages are
    /// stable across repeated calls.
    pub fn build(mut self) -> Result<QueryPlan, PlanError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let id = SortExpr::Field(Field::id_of(self.root));
        let has_tiebreak = self.ordering.last().is_some_and(|k| k.expr == id);
        if !has_tiebreak {
            self.ordering.push(SortKey::asc(id));
        }
        Ok(QueryPlan {
            root: self.root,
            joins: self.joins,
            conditions: self.conditions,
            ordering: self.ordering,
        })
    }
}

fn plan_subquery(relation: Relation, predicates: Vec<Predicate>) -> Result<Condition, PlanError> {
    let inner = relation.inner();
    let mut joins = Vec::new();
    add_path(inner, relation.correlation().0, &mut joins)?;
    for predicate in &predicates {
        if matches!(predicate, Predicate::Exists(..)) {
            return Err(PlanError::NestedExists(inner));
        }
        for field in predicate.scope_fields() {
            add_path(inner, field, &mut joins)?;
        }
    }
    Ok(Condition::Exists {
        relation,
        joins,
        predicates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan_has_no_joins_and_id_order() {
        let plan = QueryPlan::builder(EntityKind::Candidate).build().unwrap();
        assert!(plan.joins.is_empty());
        assert!(plan.is_unfiltered());
        assert_eq!(
            plan.ordering,
            vec![SortKey::asc(SortExpr::Field(Field::CandidateId))]
        );
    }

    #[test]
    fn root_field_filter_adds_no_join() {
        let plan = QueryPlan::builder(EntityKind::Contribution)
            .filter(Predicate::AtLeast(
                Field::ContributionAmount,
                Money::from_dollars(200).into(),
            ))
            .build()
            .unwrap();
        assert!(plan.joins.is_empty());
        assert_eq!(plan.conditions.len(), 1);
    }

    #[test]
    fn candidate_filter_on_contribution_joins_through_committee() {
        let plan = QueryPlan::builder(EntityKind::Contribution)
            .filter(Predicate::Eq(Field::CandidateState, "MD".into()))
            .build()
            .unwrap();
        assert_eq!(
            plan.joins,
            vec![JoinEdge::ContributionToCommittee, JoinEdge::CommitteeToCandidate]
        );
    }

    #[test]
    fn shared_path_is_joined_once() {
        let plan = QueryPlan::builder(EntityKind::Contribution)
            .filter(Predicate::Eq(Field::CommitteeCandidateId, 3i64.into()))
            .filter(Predicate::Eq(Field::CandidateOffice, "S".into()))
            .filter(Predicate::Eq(Field::ContributorState, "VA".into()))
            .build()
            .unwrap();
        assert_eq!(
            plan.joins,
            vec![
                JoinEdge::ContributionToCommittee,
                JoinEdge::CommitteeToCandidate,
                JoinEdge::ContributionToContributor,
            ]
        );
    }

    #[test]
    fn candidate_root_cannot_reach_contributions() {
        let err = QueryPlan::builder(EntityKind::Candidate)
            .filter(Predicate::Eq(Field::ContributionType, "DIRECT".into()))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::Unreachable {
                root: EntityKind::Candidate,
                field: Field::ContributionType
            }
        );
    }

    #[test]
    fn exists_plans_subquery_without_outer_join() {
        let plan = QueryPlan::builder(EntityKind::Candidate)
            .filter(Predicate::Exists(
                Relation::ContributionsToCandidate,
                vec![Predicate::Eq(Field::ContributionContributorId, 9i64.into())],
            ))
            .build()
            .unwrap();
        assert!(plan.joins.is_empty());
        match &plan.conditions[0] {
            Condition::Exists { joins, .. } => {
                assert_eq!(joins, &vec![JoinEdge::ContributionToCommittee]);
            }
            other => panic!("expected exists, got {:?}", other),
        }
    }

    #[test]
    fn exists_on_wrong_root_is_rejected() {
        let result = QueryPlan::builder(EntityKind::Committee)
            .filter(Predicate::Exists(
                Relation::ContributionsByContributor,
                vec![],
            ))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn nested_exists_is_rejected() {
        let result = QueryPlan::builder(EntityKind::Committee)
            .filter(Predicate::Exists(
                Relation::ContributionsToCommittee,
                vec![Predicate::Exists(Relation::ContributionsByContributor, vec![])],
            ))
            .build();
        assert_eq!(result.unwrap_err(), PlanError::NestedExists(EntityKind::Contribution));
    }

    #[test]
    fn explicit_ordering_gets_id_tiebreak() {
        let plan = QueryPlan::builder(EntityKind::Contribution)
            .order_by(SortKey::desc(SortExpr::Field(Field::ContributionDate)))
            .build()
            .unwrap();
        assert_eq!(plan.ordering.len(), 2);
        assert_eq!(
            plan.ordering[1],
            SortKey::asc(SortExpr::Field(Field::ContributionId))
        );
    }

    #[test]
    fn ordering_ending_in_id_is_left_alone() {
        let plan = QueryPlan::builder(EntityKind::Committee)
            .order_by(SortKey::desc(SortExpr::Field(Field::CommitteeId)))
            .build()
            .unwrap();
        assert_eq!(
            plan.ordering,
            vec![SortKey::desc(SortExpr::Field(Field::CommitteeId))]
        );
    }

    #[test]
    fn ordering_by_related_field_adds_join() {
        let plan = QueryPlan::builder(EntityKind::Contribution)
            .order_by(SortKey::asc(SortExpr::Folded(Field::ContributorName)))
            .build()
            .unwrap();
        assert_eq!(plan.joins, vec![JoinEdge::ContributionToContributor]);
    }

    #[test]
    fn reaching_adds_joins_without_touching_conditions() {
        let plan = QueryPlan::builder(EntityKind::Contribution)
            .filter(Predicate::Eq(Field::ContributionType, "DIRECT".into()))
            .build()
            .unwrap();
        let grouped = plan.reaching(&[Field::ContributorState]).unwrap();
        assert_eq!(grouped.joins, vec![JoinEdge::ContributionToContributor]);
        assert_eq!(grouped.conditions, plan.conditions);
        assert!(plan.reaching(&[Field::CandidateName]).is_ok());
        assert!(QueryPlan::builder(EntityKind::Contributor)
            .build()
            .unwrap()
            .reaching(&[Field::ContributionAmount])
            .is_err());
    }
}
