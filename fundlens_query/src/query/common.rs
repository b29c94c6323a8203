//! Raw criteria, the filter-spec trait and the pieces shared by every entity filter.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::errors::{PlanError, ValidationError};
use crate::query::plan::{Field, Predicate, QueryPlan, SortDirection, SortKey};
use crate::types::{EntityKind, Money};
use crate::validation;

/// Raw `key=value` filter criteria as supplied by a caller.
///
/// Keys are unique; supplying one twice is an error rather than last-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    values: BTreeMap<String, String>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut criteria = Criteria::new();
        for (k, v) in pairs {
            criteria.insert(k, v)?;
        }
        Ok(criteria)
    }

    /// Parse a list of `key=value` arguments.
    pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ValidationError> {
        let mut criteria = Criteria::new();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                ValidationError::invalid(arg, "expected key=value")
            })?;
            criteria.insert(key, value)?;
        }
        Ok(criteria)
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let key = key.into().trim().to_string();
        if self.values.contains_key(&key) {
            return Err(ValidationError::DuplicateFilter { field: key });
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    /// Builder form of [`Criteria::insert`].
    pub fn with(mut self, key: &str, value: &str) -> Result<Self, ValidationError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Reject any key outside `allowed`, suggesting the closest known key.
    pub fn check_keys(&self, allowed: &'static [&'static str]) -> Result<(), ValidationError> {
        for key in self.keys() {
            if !allowed.contains(&key) {
                return Err(ValidationError::UnknownFilter {
                    field: key.to_string(),
                    suggestion: closest_key(key, allowed),
                });
            }
        }
        Ok(())
    }

    /// Parse the value under `key` with `parse`, if present.
    pub fn parse<T>(
        &self,
        key: &str,
        parse: impl FnOnce(&str, &str) -> Result<T, ValidationError>,
    ) -> Result<Option<T>, ValidationError> {
        self.get(key).map(|raw| parse(key, raw)).transpose()
    }
}

fn closest_key(key: &str, allowed: &'static [&'static str]) -> Option<&'static str> {
    let lower = key.to_lowercase();
    allowed
        .iter()
        .map(|candidate| (*candidate, strsim::jaro_winkler(&lower, candidate)))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

/// Narrow a filter to the records related to one specific record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationScope {
    Candidate(i64),
    Committee(i64),
    Contributor(i64),
}

impl RelationScope {
    /// The criteria key this scope fills in.
    pub fn key(&self) -> &'static str {
        match self {
            RelationScope::Candidate(_) => "candidate_id",
            RelationScope::Committee(_) => "committee_id",
            RelationScope::Contributor(_) => "contributor_id",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            RelationScope::Candidate(id)
            | RelationScope::Committee(id)
            | RelationScope::Contributor(id) => *id,
        }
    }

    pub(crate) fn unsupported(&self, entity: EntityKind) -> ValidationError {
        ValidationError::invalid(
            self.key(),
            format!("{} records cannot be scoped by {}", entity, self.key()),
        )
    }
}

/// Inclusive date bounds. `start <= end` when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, ValidationError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ValidationError::invalid(
                    "start_date",
                    format!("start_date {} is after end_date {}", s, e),
                ));
            }
        }
        Ok(DateRange { start, end })
    }

    pub fn predicates(&self, field: Field) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(s) = self.start {
            out.push(Predicate::AtLeast(field, s.into()));
        }
        if let Some(e) = self.end {
            out.push(Predicate::AtMost(field, e.into()));
        }
        out
    }
}

/// Inclusive amount bounds. `min <= max` when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmountRange {
    pub min: Option<Money>,
    pub max: Option<Money>,
}

impl AmountRange {
    pub fn new(min: Option<Money>, max: Option<Money>) -> Result<Self, ValidationError> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(ValidationError::invalid(
                    "min_amount",
                    format!("min_amount {} is greater than max_amount {}", lo, hi),
                ));
            }
        }
        Ok(AmountRange { min, max })
    }

    pub fn predicates(&self, field: Field) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(lo) = self.min {
            out.push(Predicate::AtLeast(field, lo.into()));
        }
        if let Some(hi) = self.max {
            out.push(Predicate::AtMost(field, hi.into()));
        }
        out
    }
}

/// A per-entity sort column.
pub trait SortField: Copy + Default + FromStr<Err = ValidationError> + Display {
    fn sort_keys(self, direction: SortDirection) -> Vec<SortKey>;
}

/// Requested ordering for a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sort<B> {
    pub by: B,
    pub direction: SortDirection,
}

impl<B: SortField> Sort<B> {
    pub fn new(by: B, direction: SortDirection) -> Self {
        Sort { by, direction }
    }

    /// Parse optional `sort_by` and `sort_direction` values.
    pub fn parse(by: Option<&str>, direction: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Sort {
            by: by.map(str::parse).transpose()?.unwrap_or_default(),
            direction: direction.map(str::parse).transpose()?.unwrap_or_default(),
        })
    }

    pub fn keys(&self) -> Vec<SortKey> {
        self.by.sort_keys(self.direction)
    }
}

/// A validated, typed filter for one entity.
///
/// Converting from [`Criteria`] is the only place raw strings are parsed;
/// once built, a filter can only produce well-typed predicates.
pub trait FilterSpec: Sized + Default + Clone {
    const ENTITY: EntityKind;
    /// Every criteria key this entity accepts.
    const KEYS: &'static [&'static str];

    type SortBy: SortField;

    fn from_criteria(criteria: &Criteria) -> Result<Self, ValidationError>;

    fn predicates(&self) -> Vec<Predicate>;

    /// Narrow this filter to the records related to `scope`.
    fn with_scope(self, scope: RelationScope) -> Result<Self, ValidationError>;

    /// Number of criteria that are set.
    fn active_count(&self) -> usize;

    /// Plan a listing of the records matching this filter.
    fn plan(&self, sort: &Sort<Self::SortBy>) -> Result<QueryPlan, PlanError> {
        QueryPlan::builder(Self::ENTITY)
            .filters(self.predicates())
            .order_by_all(sort.keys())
            .build()
    }
}

pub(crate) fn text(criteria: &Criteria, key: &str) -> Result<Option<String>, ValidationError> {
    criteria.parse(key, validation::validate_text)
}

pub(crate) fn state(criteria: &Criteria, key: &str) -> Result<Option<String>, ValidationError> {
    criteria.parse(key, validation::validate_state)
}

pub(crate) fn id(criteria: &Criteria, key: &str) -> Result<Option<i64>, ValidationError> {
    criteria.parse(key, validation::validate_id)
}

pub(crate) fn year(criteria: &Criteria, key: &str) -> Result<Option<i32>, ValidationError> {
    criteria.parse(key, validation::parse_year)
}

pub(crate) fn flag(criteria: &Criteria, key: &str) -> Result<Option<bool>, ValidationError> {
    criteria.parse(key, validation::parse_bool)
}

pub(crate) fn code(
    criteria: &Criteria,
    key: &str,
    allowed: &[(&'static str, &'static str)],
) -> Result<Option<String>, ValidationError> {
    criteria.parse(key, |field, raw| {
        validation::validate_code(field, raw, allowed.iter().map(|(c, _)| *c))
    })
}

/// Push `Eq(field, value)` when the value is set.
pub(crate) fn push_eq<V: Into<crate::query::plan::Value> + Clone>(
    out: &mut Vec<Predicate>,
    field: Field,
    value: &Option<V>,
) {
    if let Some(v) = value {
        out.push(Predicate::Eq(field, v.clone().into()));
    }
}

pub(crate) fn push_contains(out: &mut Vec<Predicate>, field: Field, value: &Option<String>) {
    if let Some(v) = value {
        out.push(Predicate::Contains(field, v.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: &[&str] = &["name", "state", "office", "election_year"];

    #[test]
    fn duplicate_key_rejected() {
        let err = Criteria::from_pairs([("state", "MD"), ("state", "VA")]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateFilter {
                field: "state".into()
            }
        );
    }

    #[test]
    fn parse_args_splits_on_first_equals() {
        let c = Criteria::parse_args(&["name=a=b", "state=MD"]).unwrap();
        assert_eq!(c.get("name"), Some("a=b"));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn parse_args_rejects_bare_word() {
        assert!(Criteria::parse_args(&["state"]).is_err());
    }

    #[test]
    fn unknown_key_suggests_closest() {
        let c = Criteria::from_pairs([("satate", "MD")]).unwrap();
        match c.check_keys(KEYS).unwrap_err() {
            ValidationError::UnknownFilter { field, suggestion } => {
                assert_eq!(field, "satate");
                assert_eq!(suggestion, Some("state"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_key_far_from_everything_has_no_suggestion() {
        let c = Criteria::from_pairs([("zzz", "1")]).unwrap();
        match c.check_keys(KEYS).unwrap_err() {
            ValidationError::UnknownFilter { suggestion, .. } => assert_eq!(suggestion, None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn date_range_order_enforced() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(DateRange::new(Some(a), Some(b)).is_ok());
        assert!(DateRange::new(Some(a), Some(a)).is_ok());
        assert_eq!(
            DateRange::new(Some(b), Some(a)).unwrap_err().field(),
            "start_date"
        );
    }

    #[test]
    fn amount_range_order_enforced() {
        let lo = Money::from_dollars(10);
        let hi = Money::from_dollars(5);
        assert_eq!(
            AmountRange::new(Some(lo), Some(hi)).unwrap_err().field(),
            "min_amount"
        );
        assert_eq!(
            AmountRange::new(Some(lo), None)
                .unwrap()
                .predicates(Field::ContributionAmount)
                .len(),
            1
        );
    }

    #[test]
    fn relation_scope_keys() {
        assert_eq!(RelationScope::Committee(4).key(), "committee_id");
        assert_eq!(RelationScope::Contributor(9).id(), 9);
    }
}
