//! Contributor records.

use serde::{Deserialize, Serialize};

pub type ContributorId = i64;

/// Contributor entity type codes and their labels.
pub const ENTITY_TYPES: &[(&str, &str)] = &[
    ("IND", "Individual"),
    ("ORG", "Organization"),
    ("PAC", "Political Action Committee"),
    ("CAN", "Candidate"),
    ("COM", "Committee"),
    ("PTY", "Party"),
    ("CCM", "Candidate Committee"),
];

/// A person or organisation that gives money to committees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: ContributorId,
    pub name: String,
    pub entity_type: String,
    pub employer: Option<String>,
    pub occupation: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

pub fn entity_type_label(code: &str) -> &str {
    ENTITY_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}
