//! Candidate records.

use serde::{Deserialize, Serialize};

pub type CandidateId = i64;

/// Offices a candidate can run for, with display labels.
pub const OFFICES: &[(&str, &str)] = &[
    ("H", "U.S. House"),
    ("S", "U.S. Senate"),
    ("P", "President"),
];

/// A person running for office in one election year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    /// Office code: `H`, `S` or `P`.
    pub office: String,
    /// Two-letter state code. Presidential candidates have none.
    pub state: Option<String>,
    /// District, for House races only.
    pub district: Option<String>,
    pub party: Option<String>,
    pub election_year: i32,
    pub is_active: bool,
}

/// Human label for an office code, falling back to the code itself.
pub fn office_label(code: &str) -> &str {
    OFFICES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}
