use super::plan::{Field, SortDirection};

/// A single aggregate computed over every row of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Count,
    CountDistinct(Field),
    Sum(Field),
    Avg(Field),
    Min(Field),
    Max(Field),
}

impl Measure {
    pub fn field(&self) -> Option<Field> {
        match self {
            Measure::Count => None,
            Measure::CountDistinct(f)
            | Measure::Sum(f)
            | Measure::Avg(f)
            | Measure::Min(f)
            | Measure::Max(f) => Some(*f),
        }
    }
}

/// Measures to compute, optionally per distinct value of `group_by`.
///
/// Groups come back ordered by the key ascending, or by one of the measures
/// first when `order_by` names it. The key stays the final tie-break, so a
/// `window` over the groups is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRequest {
    pub measures: Vec<Measure>,
    pub group_by: Option<Field>,
    /// Index into `measures` and its direction.
    pub order_by: Option<(usize, SortDirection)>,
    /// `(limit, offset)` over the ordered groups.
    pub window: Option<(u64, u64)>,
}

impl AggregateRequest {
    pub fn new(measures: Vec<Measure>) -> Self {
        AggregateRequest {
            measures,
            group_by: None,
            order_by: None,
            window: None,
        }
    }

    pub fn grouped_by(mut self, field: Field) -> Self {
        self.group_by = Some(field);
        self
    }

    pub fn ordered_by_measure(mut self, index: usize, direction: SortDirection) -> Self {
        self.order_by = Some((index, direction));
        self
    }

    pub fn windowed(mut self, limit: u64, offset: u64) -> Self {
        self.window = Some((limit, offset));
        self
    }

    /// Every field the request reads, group key included.
    pub fn fields(&self) -> Vec<Field> {
        self.measures
            .iter()
            .filter_map(Measure::field)
            .chain(self.group_by)
            .collect()
    }
}

/// One aggregate result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateValue {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl AggregateValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AggregateValue::Int(n) => Some(*n),
            AggregateValue::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AggregateValue::Int(n) => Some(*n as f64),
            AggregateValue::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            AggregateValue::Null => None,
            AggregateValue::Int(n) => Some(n.to_string()),
            AggregateValue::Real(f) => Some(f.to_string()),
            AggregateValue::Text(s) => Some(s.clone()),
        }
    }
}

/// One output row: the group key (if grouped) and one value per measure.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: AggregateValue,
    pub values: Vec<AggregateValue>,
}
