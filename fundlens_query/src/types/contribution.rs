//! Contribution records and their one-level expansion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Candidate, Committee, CommitteeId, Contributor, ContributorId, Money};

pub type ContributionId = i64;

/// Recognised contribution type codes.
pub const CONTRIBUTION_TYPES: &[&str] = &[
    "DIRECT",
    "EARMARKED",
    "IN_KIND",
    "LOAN",
    "REFUND",
    "TRANSFER",
    "OTHER",
];

/// Recognised election type codes.
pub const ELECTION_TYPES: &[&str] = &["PRIMARY", "GENERAL", "RUNOFF", "SPECIAL", "CONVENTION"];

/// A single gift from a contributor to a committee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: ContributionId,
    pub contributor_id: ContributorId,
    pub committee_id: CommitteeId,
    pub amount: Money,
    pub date: NaiveDate,
    pub contribution_type: String,
    pub election_type: Option<String>,
    pub election_year: i32,
    pub memo_text: Option<String>,
}

/// A contribution with its contributor, committee and (if linked) candidate.
///
/// Exactly one level of relations is expanded; the embedded records do not
/// carry their own relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionWithRelations {
    #[serde(flatten)]
    pub contribution: Contribution,
    pub contributor: Contributor,
    pub committee: Committee,
    pub candidate: Option<Candidate>,
}
