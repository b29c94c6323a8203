//! Error types for filter validation and plan construction.

use crate::query::Field;
use crate::types::EntityKind;

/// A rejected filter, pagination or search parameter.
///
/// Every variant names the offending field so callers can point the user at it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The key is not a recognised criterion for this entity.
    #[error("unknown filter '{field}'{}", suggestion_hint(.suggestion))]
    UnknownFilter {
        field: String,
        suggestion: Option<&'static str>,
    },
    /// The same key was supplied more than once.
    #[error("filter '{field}' given more than once")]
    DuplicateFilter { field: String },
    /// The key is known but its value failed parsing or a range check.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ValidationError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// The name of the parameter that caused the error.
    pub fn field(&self) -> &str {
        match self {
            Self::UnknownFilter { field, .. }
            | Self::DuplicateFilter { field }
            | Self::InvalidValue { field, .. } => field,
        }
    }
}

fn suggestion_hint(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{}'?)", s),
        None => String::new(),
    }
}

/// A plan referenced something the join graph cannot reach.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("field {field:?} is not reachable from {root}")]
    Unreachable { root: EntityKind, field: Field },
    #[error("relation subquery rooted at {0} cannot nest another relation subquery")]
    NestedExists(EntityKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_filter_message_includes_suggestion() {
        let err = ValidationError::UnknownFilter {
            field: "satate".into(),
            suggestion: Some("state"),
        };
        assert_eq!(
            err.to_string(),
            "unknown filter 'satate' (did you mean 'state'?)"
        );
        assert_eq!(err.field(), "satate");
    }

    #[test]
    fn unknown_filter_message_without_suggestion() {
        let err = ValidationError::UnknownFilter {
            field: "foo".into(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown filter 'foo'");
    }

    #[test]
    fn invalid_value_names_field() {
        let err = ValidationError::invalid("min_amount", "must be <= max_amount");
        assert_eq!(err.field(), "min_amount");
        assert!(err.to_string().contains("min_amount"));
    }
}
