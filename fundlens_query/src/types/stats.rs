//! Statistics records produced by the aggregation engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Candidate, EntityKind, Money};

/// One group of a group-by breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    /// Group key; `None` collects rows where the grouped field is unset.
    pub key: Option<String>,
    pub count: u64,
    /// Sum of contribution amounts in the group, when the breakdown is over money.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Money>,
}

/// Summary of a filtered set of contributions.
///
/// Over zero rows the counts (`unique_contributors` included) and total are
/// zero and every other value is `None`. Fields whose aggregation was not
/// requested keep their [`ContributionStats::empty`] value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionStats {
    pub total_contributions: u64,
    pub total_amount: Money,
    pub average_amount: Option<f64>,
    pub min_amount: Option<Money>,
    pub max_amount: Option<Money>,
    pub unique_contributors: Option<u64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub by_contribution_type: Vec<BreakdownRow>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub by_election_year: Vec<BreakdownRow>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub by_contributor_state: Vec<BreakdownRow>,
}

impl ContributionStats {
    pub fn empty() -> Self {
        ContributionStats {
            total_contributions: 0,
            total_amount: Money::ZERO,
            average_amount: None,
            min_amount: None,
            max_amount: None,
            unique_contributors: None,
            first_date: None,
            last_date: None,
            by_contribution_type: Vec::new(),
            by_election_year: Vec::new(),
            by_contributor_state: Vec::new(),
        }
    }
}

/// A named group-by dimension of a [`SetStats`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub dimension: String,
    pub rows: Vec<BreakdownRow>,
}

/// Count and breakdowns over a filtered set of candidates, committees or contributors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetStats {
    pub entity: EntityKind,
    pub total_items: u64,
    pub breakdowns: Vec<Breakdown>,
}

impl SetStats {
    pub fn breakdown(&self, dimension: &str) -> Option<&Breakdown> {
        self.breakdowns.iter().find(|b| b.dimension == dimension)
    }
}

/// A code with its display label and the number of records carrying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledValue {
    pub code: String,
    pub label: String,
    pub count: u64,
}

/// Fundraising totals for one office within a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSummary {
    pub office: String,
    pub office_label: String,
    pub candidate_count: u64,
    pub active_candidate_count: u64,
    pub total_raised: Money,
    pub top_fundraisers: Vec<Fundraiser>,
}

/// A candidate with the amount their committees raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundraiser {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub total_raised: Money,
}

/// Campaign-finance overview for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub state: String,
    pub state_name: String,
    pub total_candidates: u64,
    pub active_candidates: u64,
    pub total_raised: Money,
    pub total_contributions: u64,
    pub races: Vec<RaceSummary>,
}
