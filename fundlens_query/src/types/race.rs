//! One race: the candidates running for a seat and what each has raised.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Committee, Contributor, Money};

/// Fundraising totals for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTotals {
    pub total_contributions: u64,
    pub total_amount: Money,
    pub unique_contributors: u64,
    pub average_amount: Option<f64>,
}

impl CandidateTotals {
    pub fn zero() -> Self {
        CandidateTotals {
            total_contributions: 0,
            total_amount: Money::ZERO,
            unique_contributors: 0,
            average_amount: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceCandidate {
    pub id: i64,
    pub name: String,
    pub party: Option<String>,
    pub is_active: bool,
    pub stats: CandidateTotals,
}

/// Totals across every candidate in a race. `unique_contributors` counts a
/// contributor once even when they gave to several candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceTotals {
    pub total_candidates: u64,
    pub active_candidates: u64,
    pub total_raised: Money,
    pub total_contributions: u64,
    pub unique_contributors: u64,
}

/// A Senate race (by state), House race (by state and district) or the
/// presidential race. Candidates are listed active first, then by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub office: String,
    pub office_label: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub summary: RaceTotals,
    pub candidates: Vec<RaceCandidate>,
}

/// A contributor ranked by how much they gave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopContributor {
    #[serde(flatten)]
    pub contributor: Contributor,
    pub total_amount: Money,
    pub total_contributions: u64,
    pub unique_recipients: u64,
}

/// A committee one contributor gave to, with what they gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(flatten)]
    pub committee: Committee,
    pub total_contributions: u64,
    pub total_amount: Money,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}
