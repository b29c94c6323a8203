//! Compiles abstract query plans into parameterised SQLite statements.
//!
//! Identifiers in the generated SQL come only from the closed `Field` and
//! `EntityKind` enums. Every value is bound as a `?N` parameter.
//!
//! Text matching goes through the `fold()` function that [`crate::db::Db`]
//! registers on its connection. SQLite's own `LIKE` and `NOCASE` only fold
//! ASCII.

use fundlens_query::query::{
    fold_case, AggregateRequest, Condition, Field, JoinEdge, Measure, Predicate, QueryPlan,
    SortDirection, SortExpr, Value,
};
use fundlens_query::types::EntityKind;
use fundlens_query::PlanError;
use rusqlite::types::ToSql;

/// Alias suffix for tables inside a correlated subquery.
const SUBQUERY_SUFFIX: &str = "_x";

pub(crate) fn table(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::Candidate => "candidates",
        EntityKind::Committee => "committees",
        EntityKind::Contributor => "contributors",
        EntityKind::Contribution => "contributions",
    }
}

pub(crate) fn alias(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::Candidate => "cand",
        EntityKind::Committee => "cmte",
        EntityKind::Contributor => "ctor",
        EntityKind::Contribution => "ctrb",
    }
}

pub(crate) fn column(field: Field) -> &'static str {
    match field {
        Field::ContributionAmount => "amount_cents",
        Field::CommitteeType => "committee_type",
        Field::ContributionType => "contribution_type",
        Field::ContributionElectionType => "election_type",
        other => other.name(),
    }
}

/// Name of the case-folding SQL function.
pub(crate) const FOLD_FN: &str = "fold";

fn qualified(field: Field, suffix: &str) -> String {
    format!("{}{}.{}", alias(field.entity()), suffix, column(field))
}

fn folded(field: Field, suffix: &str) -> String {
    format!("{}({})", FOLD_FN, qualified(field, suffix))
}

/// Escape `%`, `_` and `\` so a user term is matched literally by `LIKE ... ESCAPE '\'`.
pub(crate) fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(&fold_case(term)))
}

/// A compiled statement and its bound parameters, in `?N` order.
pub(crate) struct SqlQuery {
    pub sql: String,
    pub params: Vec<Box<dyn ToSql>>,
}

impl SqlQuery {
    pub fn param_refs(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

#[derive(Default)]
struct Compiler {
    params: Vec<Box<dyn ToSql>>,
}

impl Compiler {
    fn bind(&mut self, value: Box<dyn ToSql>) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    fn bind_value(&mut self, value: &Value) -> String {
        let boxed: Box<dyn ToSql> = match value {
            Value::Text(s) => Box::new(s.clone()),
            Value::Int(n) => Box::new(*n),
            Value::Bool(b) => Box::new(*b),
            Value::Date(d) => Box::new(d.format("%Y-%m-%d").to_string()),
            Value::Money(m) => Box::new(m.cents()),
        };
        self.bind(boxed)
    }

    fn from_clause(&self, root: EntityKind, joins: &[JoinEdge], suffix: &str) -> String {
        let mut sql = format!("{} {}{}", table(root), alias(root), suffix);
        for edge in joins {
            let (child_key, parent_key) = edge.keys();
            let parent = edge.to();
            sql.push_str(&format!(
                " LEFT JOIN {} {}{} ON {} = {}",
                table(parent),
                alias(parent),
                suffix,
                qualified(child_key, suffix),
                qualified(parent_key, suffix),
            ));
        }
        sql
    }

    fn predicate(&mut self, predicate: &Predicate, suffix: &str) -> Result<String, PlanError> {
        Ok(match predicate {
            Predicate::Eq(field, value) => {
                format!("{} = {}", qualified(*field, suffix), self.bind_value(value))
            }
            Predicate::AtLeast(field, value) => {
                format!("{} >= {}", qualified(*field, suffix), self.bind_value(value))
            }
            Predicate::AtMost(field, value) => {
                format!("{} <= {}", qualified(*field, suffix), self.bind_value(value))
            }
            Predicate::Contains(field, term) => {
                let p = self.bind(Box::new(contains_pattern(term)));
                format!("{} LIKE {} ESCAPE '\\'", folded(*field, suffix), p)
            }
            Predicate::AnyContains(fields, term) => {
                let p = self.bind(Box::new(contains_pattern(term)));
                let alternatives: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{} LIKE {} ESCAPE '\\'", folded(*f, suffix), p))
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
            Predicate::Exists(relation, _) => {
                return Err(PlanError::NestedExists(relation.inner()));
            }
        })
    }

    fn condition(&mut self, condition: &Condition) -> Result<String, PlanError> {
        match condition {
            Condition::Match(predicate) => self.predicate(predicate, ""),
            Condition::Exists {
                relation,
                joins,
                predicates,
            } => {
                let (inner_key, outer_key) = relation.correlation();
                let mut clauses = vec![format!(
                    "{} = {}",
                    qualified(inner_key, SUBQUERY_SUFFIX),
                    qualified(outer_key, "")
                )];
                for p in predicates {
                    clauses.push(self.predicate(p, SUBQUERY_SUFFIX)?);
                }
                Ok(format!(
                    "EXISTS (SELECT 1 FROM {} WHERE {})",
                    self.from_clause(relation.inner(), joins, SUBQUERY_SUFFIX),
                    clauses.join(" AND ")
                ))
            }
        }
    }

    fn where_clause(&mut self, plan: &QueryPlan) -> Result<String, PlanError> {
        if plan.conditions.is_empty() {
            return Ok(String::new());
        }
        let mut clauses = Vec::with_capacity(plan.conditions.len());
        for c in &plan.conditions {
            clauses.push(self.condition(c)?);
        }
        Ok(format!(" WHERE {}", clauses.join(" AND ")))
    }

    fn order_clause(&mut self, plan: &QueryPlan) -> String {
        if plan.ordering.is_empty() {
            return String::new();
        }
        let keys: Vec<String> = plan
            .ordering
            .iter()
            .map(|key| {
                let expr = match &key.expr {
                    SortExpr::Field(f) => qualified(*f, ""),
                    SortExpr::Folded(f) => folded(*f, ""),
                    SortExpr::Relevance { field, term } => {
                        let col = folded(*field, "");
                        let term = fold_case(term);
                        let prefix = self.bind(Box::new(format!("{}%", escape_like(&term))));
                        let inner = self.bind(Box::new(format!("%{}%", escape_like(&term))));
                        let exact = self.bind(Box::new(term));
                        format!(
                            "CASE WHEN {col} = {exact} THEN 0 \
                             WHEN {col} LIKE {prefix} ESCAPE '\\' THEN 1 \
                             WHEN {col} LIKE {inner} ESCAPE '\\' THEN 2 ELSE 3 END"
                        )
                    }
                };
                format!("{} {}", expr, direction_sql(key.direction))
            })
            .collect();
        format!(" ORDER BY {}", keys.join(", "))
    }
}

/// `SELECT <root columns> ... ORDER BY ... [LIMIT ? OFFSET ?]`.
pub(crate) fn select(
    plan: &QueryPlan,
    columns: &[&str],
    window: Option<(u64, u64)>,
) -> Result<SqlQuery, PlanError> {
    let mut c = Compiler::default();
    let root_alias = alias(plan.root);
    let cols: Vec<String> = columns
        .iter()
        .map(|col| format!("{}.{}", root_alias, col))
        .collect();
    let from = c.from_clause(plan.root, &plan.joins, "");
    let where_clause = c.where_clause(plan)?;
    let order = c.order_clause(plan);
    let mut sql = format!(
        "SELECT {} FROM {}{}{}",
        cols.join(", "),
        from,
        where_clause,
        order
    );
    if let Some((limit, offset)) = window {
        let l = c.bind(Box::new(i64::try_from(limit).unwrap_or(i64::MAX)));
        let o = c.bind(Box::new(i64::try_from(offset).unwrap_or(i64::MAX)));
        sql.push_str(&format!(" LIMIT {} OFFSET {}", l, o));
    }
    Ok(SqlQuery {
        sql,
        params: c.params,
    })
}

/// `SELECT COUNT(*)` over the plan's rows. Ordering is irrelevant and skipped.
pub(crate) fn count(plan: &QueryPlan) -> Result<SqlQuery, PlanError> {
    let mut c = Compiler::default();
    let from = c.from_clause(plan.root, &plan.joins, "");
    let where_clause = c.where_clause(plan)?;
    Ok(SqlQuery {
        sql: format!("SELECT COUNT(*) FROM {}{}", from, where_clause),
        params: c.params,
    })
}

fn measure(m: &Measure) -> String {
    match m {
        Measure::Count => "COUNT(*)".to_string(),
        Measure::CountDistinct(f) => format!("COUNT(DISTINCT {})", qualified(*f, "")),
        Measure::Sum(f) => format!("SUM({})", qualified(*f, "")),
        Measure::Avg(f) => format!("AVG({})", qualified(*f, "")),
        Measure::Min(f) => format!("MIN({})", qualified(*f, "")),
        Measure::Max(f) => format!("MAX({})", qualified(*f, "")),
    }
}

fn direction_sql(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

/// One row per group (or a single row when ungrouped): the group key first,
/// then one column per measure.
pub(crate) fn aggregate(plan: &QueryPlan, request: &AggregateRequest) -> Result<SqlQuery, PlanError> {
    let plan = plan.reaching(&request.fields())?;
    let mut c = Compiler::default();
    let key = match request.group_by {
        Some(f) => qualified(f, ""),
        None => "NULL".to_string(),
    };
    let measures: Vec<String> = request.measures.iter().map(measure).collect();
    let mut cols = vec![key.clone()];
    cols.extend(measures.iter().cloned());
    let from = c.from_clause(plan.root, &plan.joins, "");
    let where_clause = c.where_clause(&plan)?;
    let mut sql = format!("SELECT {} FROM {}{}", cols.join(", "), from, where_clause);
    if request.group_by.is_some() {
        sql.push_str(&format!(" GROUP BY {} ORDER BY ", key));
        if let Some((expr, direction)) = request
            .order_by
            .and_then(|(i, dir)| measures.get(i).map(|m| (m, dir)))
        {
            sql.push_str(&format!("{} {}, ", expr, direction_sql(direction)));
        }
        sql.push_str(&format!("{} ASC", key));
        if let Some((limit, offset)) = request.window {
            let l = c.bind(Box::new(i64::try_from(limit).unwrap_or(i64::MAX)));
            let o = c.bind(Box::new(i64::try_from(offset).unwrap_or(i64::MAX)));
            sql.push_str(&format!(" LIMIT {} OFFSET {}", l, o));
        }
    }
    Ok(SqlQuery {
        sql,
        params: c.params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundlens_query::query::{Relation, SortKey};
    use fundlens_query::types::Money;

    fn plan(root: EntityKind, preds: Vec<Predicate>) -> QueryPlan {
        QueryPlan::builder(root).filters(preds).build().unwrap()
    }

    #[test]
    fn unfiltered_select() {
        let q = select(&plan(EntityKind::Candidate, vec![]), &["id", "name"], None).unwrap();
        assert_eq!(
            q.sql,
            "SELECT cand.id, cand.name FROM candidates cand ORDER BY cand.id ASC"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn values_are_bound_not_spliced() {
        let evil = "MD'; DROP TABLE candidates; --";
        let q = count(&plan(
            EntityKind::Candidate,
            vec![Predicate::Eq(Field::CandidateState, evil.into())],
        ))
        .unwrap();
        assert!(!q.sql.contains("DROP"));
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM candidates cand WHERE cand.state = ?1"
        );
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn money_binds_as_cents() {
        let q = count(&plan(
            EntityKind::Contribution,
            vec![Predicate::AtLeast(
                Field::ContributionAmount,
                Money::from_dollars(200).into(),
            )],
        ))
        .unwrap();
        assert!(q.sql.ends_with("WHERE ctrb.amount_cents >= ?1"));
    }

    #[test]
    fn joins_use_left_join_on_keys() {
        let q = count(&plan(
            EntityKind::Contribution,
            vec![Predicate::Eq(Field::CandidateOffice, "S".into())],
        ))
        .unwrap();
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM contributions ctrb \
             LEFT JOIN committees cmte ON ctrb.committee_id = cmte.id \
             LEFT JOIN candidates cand ON cmte.candidate_id = cand.id \
             WHERE cand.office = ?1"
        );
    }

    #[test]
    fn exists_is_correlated_subquery() {
        let q = count(&plan(
            EntityKind::Contributor,
            vec![Predicate::Exists(
                Relation::ContributionsByContributor,
                vec![Predicate::Eq(Field::CommitteeCandidateId, 4i64.into())],
            )],
        ))
        .unwrap();
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM contributors ctor WHERE EXISTS (SELECT 1 FROM contributions ctrb_x \
             LEFT JOIN committees cmte_x ON ctrb_x.committee_id = cmte_x.id \
             WHERE ctrb_x.contributor_id = ctor.id AND cmte_x.candidate_id = ?1)"
        );
    }

    #[test]
    fn any_contains_reuses_one_parameter() {
        let q = count(&plan(
            EntityKind::Contributor,
            vec![Predicate::AnyContains(
                vec![Field::ContributorName, Field::ContributorEmployer],
                "acme".into(),
            )],
        ))
        .unwrap();
        assert!(q.sql.contains(
            "(fold(ctor.name) LIKE ?1 ESCAPE '\\' OR fold(ctor.employer) LIKE ?1 ESCAPE '\\')"
        ));
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn contains_folds_column_and_term() {
        let q = count(&plan(
            EntityKind::Contributor,
            vec![Predicate::Contains(Field::ContributorName, "MUÑOZ".into())],
        ))
        .unwrap();
        assert_eq!(
            q.sql,
            "SELECT COUNT(*) FROM contributors ctor WHERE fold(ctor.name) LIKE ?1 ESCAPE '\\'"
        );
        assert_eq!(contains_pattern("MUÑOZ_1"), "%muñoz\\_1%");
    }

    #[test]
    fn window_parameters_follow_filters() {
        let p = QueryPlan::builder(EntityKind::Contribution)
            .filter(Predicate::Eq(Field::ContributionType, "DIRECT".into()))
            .order_by(SortKey::desc(SortExpr::Field(Field::ContributionDate)))
            .build()
            .unwrap();
        let q = select(&p, &["id"], Some((10, 20))).unwrap();
        assert!(q
            .sql
            .ends_with("ORDER BY ctrb.date DESC, ctrb.id ASC LIMIT ?2 OFFSET ?3"));
        assert_eq!(q.params.len(), 3);
    }

    #[test]
    fn grouped_aggregate_adds_join_for_key() {
        let p = plan(EntityKind::Contribution, vec![]);
        let req = AggregateRequest::new(vec![Measure::Count, Measure::Sum(Field::ContributionAmount)])
            .grouped_by(Field::ContributorState);
        let q = aggregate(&p, &req).unwrap();
        assert_eq!(
            q.sql,
            "SELECT ctor.state, COUNT(*), SUM(ctrb.amount_cents) FROM contributions ctrb \
             LEFT JOIN contributors ctor ON ctrb.contributor_id = ctor.id \
             GROUP BY ctor.state ORDER BY ctor.state ASC"
        );
    }

    #[test]
    fn grouped_aggregate_orders_by_measure_then_key_and_windows() {
        let p = plan(
            EntityKind::Contribution,
            vec![Predicate::Eq(Field::ContributorState, "MD".into())],
        );
        let req = AggregateRequest::new(vec![Measure::Sum(Field::ContributionAmount), Measure::Count])
            .grouped_by(Field::ContributionContributorId)
            .ordered_by_measure(0, SortDirection::Desc)
            .windowed(10, 20);
        let q = aggregate(&p, &req).unwrap();
        assert_eq!(
            q.sql,
            "SELECT ctrb.contributor_id, SUM(ctrb.amount_cents), COUNT(*) FROM contributions ctrb \
             LEFT JOIN contributors ctor ON ctrb.contributor_id = ctor.id \
             WHERE ctor.state = ?1 \
             GROUP BY ctrb.contributor_id ORDER BY SUM(ctrb.amount_cents) DESC, ctrb.contributor_id ASC \
             LIMIT ?2 OFFSET ?3"
        );
        assert_eq!(q.params.len(), 3);
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
