//! Committee records.

use serde::{Deserialize, Serialize};

use super::CandidateId;

pub type CommitteeId = i64;

/// FEC committee type codes and their labels.
pub const COMMITTEE_TYPES: &[(&str, &str)] = &[
    ("H", "House"),
    ("S", "Senate"),
    ("P", "Presidential"),
    ("X", "Non-Qualified"),
    ("Y", "Qualified"),
    ("Z", "National Party"),
    ("N", "PAC - Non-Qualified"),
    ("Q", "PAC - Qualified"),
    ("I", "Independent Expenditure"),
    ("O", "Super PAC"),
    ("U", "Single Candidate Independent Expenditure"),
    ("V", "PAC with Non-Contribution Account - Non-Qualified"),
    ("W", "PAC with Non-Contribution Account - Qualified"),
    ("D", "Party - Delegate"),
    ("E", "Party - National"),
];

/// A fundraising committee, optionally tied to one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Committee {
    pub id: CommitteeId,
    pub name: String,
    pub committee_type: String,
    pub state: Option<String>,
    pub city: Option<String>,
    pub party: Option<String>,
    /// Associated candidate. Absent for PACs and party committees.
    pub candidate_id: Option<CandidateId>,
    pub is_active: bool,
}

pub fn committee_type_label(code: &str) -> &str {
    COMMITTEE_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}
