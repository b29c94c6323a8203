use std::collections::HashMap;
use std::time::Instant;

use fundlens_query::query::{Field, Predicate, QueryPlan, SortExpr, SortKey};
use fundlens_query::types::{
    office_label, Candidate, CandidateTotals, EntityKind, Race, RaceCandidate, RaceTotals,
};
use fundlens_query::validation::{validate_district, validate_state};

use crate::aggregation::{self, Aggregation};
use crate::error::FundLensError;
use crate::store::{DataStore, Window};

/// The candidates of one race with what each of them raised.
pub struct RaceService<'a, S> {
    store: &'a S,
}

impl<'a, S: DataStore> RaceService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        RaceService { store }
    }

    /// The Senate race in `state`. NotFound when the state has no Senate candidates.
    pub fn senate(&self, state: &str) -> Result<Race, FundLensError> {
        let state = validate_state("state", state)?;
        self.race("S", Some(state), None)
    }

    /// The House race for one district. NotFound when nobody runs there.
    pub fn house(&self, state: &str, district: &str) -> Result<Race, FundLensError> {
        let state = validate_state("state", state)?;
        let district = validate_district("district", district)?;
        self.race("H", Some(state), Some(district))
    }

    /// The presidential race. Never NotFound: no candidates gives an empty race.
    pub fn presidential(&self) -> Result<Race, FundLensError> {
        self.race("P", None, None)
    }

    fn race(
        &self,
        office: &str,
        state: Option<String>,
        district: Option<String>,
    ) -> Result<Race, FundLensError> {
        let started = Instant::now();
        let race = self
            .store
            .snapshot(|s| build_race(s, office, state, district))?;
        tracing::info!(
            entity = "race",
            office,
            state = race.state.as_deref().unwrap_or("-"),
            district = race.district.as_deref().unwrap_or("-"),
            results = race.candidates.len(),
            elapsed_ms = super::elapsed_ms(started),
            "race"
        );
        Ok(race)
    }
}

fn build_race<S: DataStore>(
    store: &S,
    office: &str,
    state: Option<String>,
    district: Option<String>,
) -> Result<Race, FundLensError> {
    let mut seat = vec![Predicate::Eq(Field::CandidateOffice, office.into())];
    if let Some(state) = &state {
        seat.push(Predicate::Eq(Field::CandidateState, state.as_str().into()));
    }
    if let Some(district) = &district {
        seat.push(Predicate::Eq(Field::CandidateDistrict, district.as_str().into()));
    }

    let candidate_plan = QueryPlan::builder(EntityKind::Candidate)
        .filters(seat.clone())
        .order_by(SortKey::desc(SortExpr::Field(Field::CandidateIsActive)))
        .order_by(SortKey::asc(SortExpr::Folded(Field::CandidateName)))
        .build()?;
    let candidates: Vec<Candidate> = store.fetch(
        &candidate_plan,
        Window {
            limit: u64::MAX,
            offset: 0,
        },
    )?;
    if candidates.is_empty() && office != "P" {
        let id = match (&state, &district) {
            (Some(s), Some(d)) => format!("{}-{}", s, d),
            (Some(s), None) => format!("{}-{}", s, office),
            _ => office.to_string(),
        };
        return Err(FundLensError::not_found("race", id));
    }

    let contribution_plan = QueryPlan::builder(EntityKind::Contribution)
        .filters(seat)
        .build()?;
    let per_candidate: HashMap<i64, CandidateTotals> = aggregation::group_totals(
        store,
        &contribution_plan,
        Field::CommitteeCandidateId,
        None,
        None,
    )?
    .into_iter()
    .map(|g| {
        (
            g.key,
            CandidateTotals {
                total_contributions: g.total_contributions,
                total_amount: g.total_amount,
                unique_contributors: g.unique_contributors,
                average_amount: g.average_amount,
            },
        )
    })
    .collect();
    let totals = aggregation::contribution_stats(
        store,
        &contribution_plan,
        &[
            Aggregation::Count,
            Aggregation::Total,
            Aggregation::UniqueContributors,
        ],
    )?;

    let active = candidates.iter().filter(|c| c.is_active).count();
    Ok(Race {
        office: office.to_string(),
        office_label: office_label(office).to_string(),
        state,
        district,
        summary: RaceTotals {
            total_candidates: candidates.len() as u64,
            active_candidates: active as u64,
            total_raised: totals.total_amount,
            total_contributions: totals.total_contributions,
            unique_contributors: totals.unique_contributors.unwrap_or(0),
        },
        candidates: candidates
            .into_iter()
            .map(|c| RaceCandidate {
                stats: per_candidate
                    .get(&c.id)
                    .cloned()
                    .unwrap_or_else(CandidateTotals::zero),
                id: c.id,
                name: c.name,
                party: c.party,
                is_active: c.is_active,
            })
            .collect(),
    })
}
