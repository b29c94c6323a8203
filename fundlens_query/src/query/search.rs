//! Free-text search: turns a query string into a text predicate plus a
//! relevance ordering for one entity.

use crate::errors::ValidationError;
use crate::types::EntityKind;
use crate::validation;

use super::plan::{Field, Predicate, SortExpr, SortKey};

/// A sanitized, non-empty search string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        validation::validate_search(raw).map(SearchQuery)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    #[default]
    Name,
    /// Also match contributor employer and occupation.
    NameEmployerOccupation,
}

/// Output of [`resolve`]: one conjunct to add to the filter, and the
/// ordering to use instead of the caller's.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub predicate: Predicate,
    pub ordering: Vec<SortKey>,
}

/// Unicode lowercase, applied to both a stored value and the term it is
/// matched against so that `É` matches `é`.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// The field a search on `entity` matches and ranks by.
pub fn name_field(entity: EntityKind) -> Field {
    match entity {
        EntityKind::Candidate => Field::CandidateName,
        EntityKind::Committee => Field::CommitteeName,
        EntityKind::Contributor | EntityKind::Contribution => Field::ContributorName,
    }
}

pub fn resolve(entity: EntityKind, query: &SearchQuery, scope: SearchScope) -> Resolved {
    let name = name_field(entity);
    let term = query.as_str().to_string();
    let predicate = match (entity, scope) {
        (EntityKind::Contributor, SearchScope::NameEmployerOccupation) => Predicate::AnyContains(
            vec![
                Field::ContributorName,
                Field::ContributorEmployer,
                Field::ContributorOccupation,
            ],
            term.clone(),
        ),
        _ => Predicate::Contains(name, term.clone()),
    };
    Resolved {
        predicate,
        ordering: vec![
            SortKey::asc(SortExpr::Relevance { field: name, term }),
            SortKey::asc(SortExpr::Folded(name)),
        ],
    }
}
