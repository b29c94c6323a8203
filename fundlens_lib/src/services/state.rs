use std::time::Instant;

use fundlens_query::query::{
    CandidateFilter, ContributionFilter, Field, FilterSpec, QueryPlan, Sort,
};
use fundlens_query::types::{
    office_label, BreakdownRow, Candidate, Fundraiser, Money, RaceSummary, StateSummary, OFFICES,
};
use fundlens_query::validation::{state_name, validate_state};

use crate::aggregation::{self, Aggregation};
use crate::error::FundLensError;
use crate::store::DataStore;

/// Candidates listed per race in a state summary.
pub const TOP_FUNDRAISERS: usize = 5;

/// Campaign-finance overview for one state, broken down by race.
pub struct StateService<'a, S> {
    store: &'a S,
}

impl<'a, S: DataStore> StateService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        StateService { store }
    }

    pub fn summary(&self, state: &str) -> Result<StateSummary, FundLensError> {
        let started = Instant::now();
        let code = validate_state("state", state)?;
        let summary = self.store.snapshot(|s| summarize(s, &code))?;
        tracing::info!(
            entity = "state",
            state = %code,
            races = summary.races.len(),
            total_candidates = summary.total_candidates,
            elapsed_ms = super::elapsed_ms(started),
            "summary"
        );
        Ok(summary)
    }
}

fn summarize<S: DataStore>(store: &S, code: &str) -> Result<StateSummary, FundLensError> {
    let sort = Sort::default();
    let candidates = CandidateFilter::default().with_state(code);
    let by_office = aggregation::breakdown(
        store,
        &candidates.plan(&sort)?,
        Field::CandidateOffice,
        None,
    )?;
    let total_candidates: u64 = by_office.iter().map(|r| r.count).sum();
    if total_candidates == 0 {
        return Err(FundLensError::not_found("state", code));
    }
    let active_by_office = aggregation::breakdown(
        store,
        &candidates.clone().with_active(true).plan(&sort)?,
        Field::CandidateOffice,
        None,
    )?;

    let contributions = ContributionFilter::default().with_candidate_state(code);
    let contribution_plan = contributions.plan(&Sort::default())?;
    let totals = aggregation::contribution_stats(
        store,
        &contribution_plan,
        &[Aggregation::Count, Aggregation::Total],
    )?;
    let raised_by_office = aggregation::breakdown(
        store,
        &contribution_plan,
        Field::CandidateOffice,
        Some(Field::ContributionAmount),
    )?;

    let mut races = Vec::new();
    for row in ordered_by_office(&by_office) {
        let Some(office) = row.key.as_deref() else {
            continue;
        };
        let office_plan = contributions
            .clone()
            .with_candidate_office(office)
            .plan(&Sort::default())?;
        races.push(RaceSummary {
            office: office.to_string(),
            office_label: office_label(office).to_string(),
            candidate_count: row.count,
            active_candidate_count: count_for(&active_by_office, office),
            total_raised: raised_by_office
                .iter()
                .find(|r| r.key.as_deref() == Some(office))
                .and_then(|r| r.total_amount)
                .unwrap_or(Money::ZERO),
            top_fundraisers: top_fundraisers(store, &office_plan)?,
        });
    }

    Ok(StateSummary {
        state: code.to_string(),
        state_name: state_name(code).to_string(),
        total_candidates,
        active_candidates: active_by_office.iter().map(|r| r.count).sum(),
        total_raised: totals.total_amount,
        total_contributions: totals.total_contributions,
        races,
    })
}

/// Known offices in display order, then any other codes.
fn ordered_by_office(rows: &[BreakdownRow]) -> Vec<&BreakdownRow> {
    let rank = |row: &BreakdownRow| {
        row.key
            .as_deref()
            .and_then(|k| OFFICES.iter().position(|(code, _)| *code == k))
            .unwrap_or(OFFICES.len())
    };
    let mut ordered: Vec<&BreakdownRow> = rows.iter().collect();
    ordered.sort_by_key(|row| rank(*row));
    ordered
}

fn count_for(rows: &[BreakdownRow], office: &str) -> u64 {
    rows.iter()
        .find(|r| r.key.as_deref() == Some(office))
        .map_or(0, |r| r.count)
}

fn top_fundraisers<S: DataStore>(
    store: &S,
    plan: &QueryPlan,
) -> Result<Vec<Fundraiser>, FundLensError> {
    let by_candidate = aggregation::breakdown(
        store,
        plan,
        Field::CommitteeCandidateId,
        Some(Field::ContributionAmount),
    )?;
    let mut ranked: Vec<(i64, Money)> = by_candidate
        .iter()
        .filter_map(|r| {
            let id = r.key.as_deref()?.parse::<i64>().ok()?;
            Some((id, r.total_amount.unwrap_or(Money::ZERO)))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(TOP_FUNDRAISERS);

    let mut out = Vec::with_capacity(ranked.len());
    for (id, total_raised) in ranked {
        if let Some(candidate) = store.get::<Candidate>(id)? {
            out.push(Fundraiser {
                candidate,
                total_raised,
            });
        }
    }
    Ok(out)
}
