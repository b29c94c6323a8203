//! Statistics over the full row set of a plan.
//!
//! Aggregates are computed from the same `QueryPlan` a listing uses, never
//! from a page of it, so a hand sum over every page equals `total_amount`.

use chrono::NaiveDate;
use fundlens_query::query::{
    AggregateRequest, AggregateRow, AggregateValue, Field, Measure, QueryPlan, SortDirection,
};
use fundlens_query::types::{Breakdown, BreakdownRow, ContributionStats, EntityKind, Money, SetStats};
use fundlens_query::PlanError;

use crate::db::DbError;
use crate::store::{DataStore, Window};

/// A statistic that can be requested over a set of contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Count,
    Total,
    Average,
    MinMax,
    UniqueContributors,
    DateSpan,
    ByContributionType,
    ByElectionYear,
    ByContributorState,
}

impl Aggregation {
    pub const ALL: &'static [Aggregation] = &[
        Aggregation::Count,
        Aggregation::Total,
        Aggregation::Average,
        Aggregation::MinMax,
        Aggregation::UniqueContributors,
        Aggregation::DateSpan,
        Aggregation::ByContributionType,
        Aggregation::ByElectionYear,
        Aggregation::ByContributorState,
    ];

    pub fn all() -> Vec<Aggregation> {
        Self::ALL.to_vec()
    }

    /// The scalar (ungrouped) statistics only.
    pub fn summary() -> Vec<Aggregation> {
        Self::ALL
            .iter()
            .copied()
            .filter(|a| a.group_field().is_none())
            .collect()
    }

    fn group_field(self) -> Option<Field> {
        match self {
            Aggregation::ByContributionType => Some(Field::ContributionType),
            Aggregation::ByElectionYear => Some(Field::ContributionElectionYear),
            Aggregation::ByContributorState => Some(Field::ContributorState),
            _ => None,
        }
    }
}

/// Index of each requested scalar measure in the single aggregate row.
#[derive(Default)]
struct Slots {
    count: Option<usize>,
    total: Option<usize>,
    average: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
    unique: Option<usize>,
    first: Option<usize>,
    last: Option<usize>,
}

fn push(measures: &mut Vec<Measure>, m: Measure) -> Option<usize> {
    measures.push(m);
    Some(measures.len() - 1)
}

/// Compute `aggregations` over every contribution selected by `plan`.
pub fn contribution_stats<S: DataStore>(
    store: &S,
    plan: &QueryPlan,
    aggregations: &[Aggregation],
) -> Result<ContributionStats, DbError> {
    ensure_contributions(plan)?;
    store.snapshot(|s| contribution_stats_in(s, plan, aggregations))
}

fn ensure_contributions(plan: &QueryPlan) -> Result<(), DbError> {
    if plan.root != EntityKind::Contribution {
        return Err(PlanError::Unreachable {
            root: plan.root,
            field: Field::ContributionAmount,
        }
        .into());
    }
    Ok(())
}

fn contribution_stats_in<S: DataStore>(
    store: &S,
    plan: &QueryPlan,
    aggregations: &[Aggregation],
) -> Result<ContributionStats, DbError> {
    let amount = Field::ContributionAmount;
    let mut measures = Vec::new();
    let mut slots = Slots::default();
    for a in aggregations {
        match a {
            Aggregation::Count => slots.count = push(&mut measures, Measure::Count),
            Aggregation::Total => slots.total = push(&mut measures, Measure::Sum(amount)),
            Aggregation::Average => slots.average = push(&mut measures, Measure::Avg(amount)),
            Aggregation::MinMax => {
                slots.min = push(&mut measures, Measure::Min(amount));
                slots.max = push(&mut measures, Measure::Max(amount));
            }
            Aggregation::UniqueContributors => {
                slots.unique = push(
                    &mut measures,
                    Measure::CountDistinct(Field::ContributionContributorId),
                )
            }
            Aggregation::DateSpan => {
                slots.first = push(&mut measures, Measure::Min(Field::ContributionDate));
                slots.last = push(&mut measures, Measure::Max(Field::ContributionDate));
            }
            _ => {}
        }
    }

    let mut stats = ContributionStats::empty();
    if !measures.is_empty() {
        let rows = store.aggregate(plan, &AggregateRequest::new(measures))?;
        if let Some(row) = rows.first() {
            let cell = |slot: Option<usize>| slot.and_then(|i| row.values.get(i));
            stats.total_contributions = cell(slots.count)
                .and_then(AggregateValue::as_i64)
                .map_or(0, to_u64);
            stats.total_amount = cell(slots.total)
                .and_then(AggregateValue::as_i64)
                .map_or(Money::ZERO, Money::from_cents);
            stats.average_amount = cell(slots.average)
                .and_then(AggregateValue::as_f64)
                .map(|cents| cents / 100.0);
            stats.min_amount = cell(slots.min)
                .and_then(AggregateValue::as_i64)
                .map(Money::from_cents);
            stats.max_amount = cell(slots.max)
                .and_then(AggregateValue::as_i64)
                .map(Money::from_cents);
            stats.unique_contributors = cell(slots.unique)
                .and_then(AggregateValue::as_i64)
                .map(to_u64);
            stats.first_date = cell(slots.first).map(as_date).transpose()?.flatten();
            stats.last_date = cell(slots.last).map(as_date).transpose()?.flatten();
        }
    }

    for a in aggregations {
        let Some(field) = a.group_field() else {
            continue;
        };
        let rows = breakdown(store, plan, field, Some(amount))?;
        match a {
            Aggregation::ByContributionType => stats.by_contribution_type = rows,
            Aggregation::ByElectionYear => stats.by_election_year = rows,
            Aggregation::ByContributorState => stats.by_contributor_state = rows,
            _ => {}
        }
    }
    Ok(stats)
}

/// Group-by counts (and sums of `sum_field`, when given) over `plan`.
pub fn breakdown<S: DataStore>(
    store: &S,
    plan: &QueryPlan,
    group_by: Field,
    sum_field: Option<Field>,
) -> Result<Vec<BreakdownRow>, DbError> {
    let mut measures = vec![Measure::Count];
    if let Some(f) = sum_field {
        measures.push(Measure::Sum(f));
    }
    let request = AggregateRequest::new(measures).grouped_by(group_by);
    let rows = store.aggregate(plan, &request)?;
    Ok(rows.iter().map(breakdown_row).collect())
}

fn breakdown_row(row: &AggregateRow) -> BreakdownRow {
    BreakdownRow {
        key: row.key.as_text(),
        count: row
            .values
            .first()
            .and_then(AggregateValue::as_i64)
            .map_or(0, to_u64),
        total_amount: row
            .values
            .get(1)
            .map(|v| v.as_i64().map_or(Money::ZERO, Money::from_cents)),
    }
}

/// Contribution totals for one value of an integer group key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotals {
    pub key: i64,
    pub total_contributions: u64,
    pub total_amount: Money,
    pub average_amount: Option<f64>,
    pub unique_contributors: u64,
    pub unique_committees: u64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// What [`group_totals`] ranks groups by before the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    TotalAmount,
    ContributionCount,
    FirstDate,
    LastDate,
    /// The smallest value of a field within the group, e.g. the committee name
    /// when grouping by committee id.
    Label(Field),
}

const GROUP_MEASURES: [Measure; 7] = [
    Measure::Count,
    Measure::Sum(Field::ContributionAmount),
    Measure::Avg(Field::ContributionAmount),
    Measure::CountDistinct(Field::ContributionContributorId),
    Measure::CountDistinct(Field::ContributionCommitteeId),
    Measure::Min(Field::ContributionDate),
    Measure::Max(Field::ContributionDate),
];

/// Per-group contribution totals over `plan`, grouped by an id field such as
/// `ContributionContributorId` or `CommitteeCandidateId`. Groups with a null
/// key are dropped.
pub fn group_totals<S: DataStore>(
    store: &S,
    plan: &QueryPlan,
    group_by: Field,
    order: Option<(GroupOrder, SortDirection)>,
    window: Option<Window>,
) -> Result<Vec<GroupTotals>, DbError> {
    ensure_contributions(plan)?;
    let mut measures = GROUP_MEASURES.to_vec();
    let order_index = order.map(|(by, direction)| {
        let index = match by {
            GroupOrder::ContributionCount => 0,
            GroupOrder::TotalAmount => 1,
            GroupOrder::FirstDate => 5,
            GroupOrder::LastDate => 6,
            GroupOrder::Label(field) => {
                measures.push(Measure::Min(field));
                measures.len() - 1
            }
        };
        (index, direction)
    });
    let mut request = AggregateRequest::new(measures).grouped_by(group_by);
    if let Some((index, direction)) = order_index {
        request = request.ordered_by_measure(index, direction);
    }
    if let Some(w) = window {
        request = request.windowed(w.limit, w.offset);
    }

    let rows = store.aggregate(plan, &request)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        let Some(key) = row.key.as_i64() else {
            continue;
        };
        let int = |i: usize| row.values.get(i).and_then(AggregateValue::as_i64);
        let date = |i: usize| row.values.get(i).map(as_date).transpose();
        out.push(GroupTotals {
            key,
            total_contributions: int(0).map_or(0, to_u64),
            total_amount: int(1).map_or(Money::ZERO, Money::from_cents),
            average_amount: row
                .values
                .get(2)
                .and_then(AggregateValue::as_f64)
                .map(|cents| cents / 100.0),
            unique_contributors: int(3).map_or(0, to_u64),
            unique_committees: int(4).map_or(0, to_u64),
            first_date: date(5)?.flatten(),
            last_date: date(6)?.flatten(),
        });
    }
    Ok(out)
}

/// Number of distinct non-null values of `group_by` over `plan`, i.e. how
/// many rows an unwindowed [`group_totals`] returns.
pub fn group_count<S: DataStore>(
    store: &S,
    plan: &QueryPlan,
    group_by: Field,
) -> Result<u64, DbError> {
    let rows = store.aggregate(plan, &AggregateRequest::new(vec![Measure::CountDistinct(group_by)]))?;
    Ok(rows
        .first()
        .and_then(|r| r.values.first())
        .and_then(AggregateValue::as_i64)
        .map_or(0, to_u64))
}

/// Count plus one breakdown per dimension over a candidate, committee or contributor set.
pub fn set_stats<S: DataStore>(
    store: &S,
    plan: &QueryPlan,
    dimensions: &[Field],
) -> Result<SetStats, DbError> {
    store.snapshot(|s| {
        let total_items = s.count(plan)?;
        let mut breakdowns = Vec::with_capacity(dimensions.len());
        for field in dimensions {
            breakdowns.push(Breakdown {
                dimension: field.name().to_string(),
                rows: breakdown(s, plan, *field, None)?,
            });
        }
        Ok(SetStats {
            entity: plan.root,
            total_items,
            breakdowns,
        })
    })
}

fn to_u64(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn as_date(v: &AggregateValue) -> Result<Option<NaiveDate>, DbError> {
    match v.as_text() {
        Some(s) => Ok(Some(NaiveDate::parse_from_str(&s, "%Y-%m-%d")?)),
        None => Ok(None),
    }
}
