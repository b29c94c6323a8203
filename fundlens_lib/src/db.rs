//! SQLite storage for FundLens data.

use std::path::Path;

use chrono::NaiveDate;
use fundlens_query::query::{
    AggregateRequest, AggregateRow, AggregateValue, Field, Predicate, QueryPlan,
};
use fundlens_query::types::{Candidate, Committee, Contribution, Contributor, EntityKind, Money};
use fundlens_query::PlanError;
use fundlens_query::query::fold_case;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection};
use serde::Deserialize;

use crate::sql;
use crate::store::{DataStore, FromRow, Window};

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("date parse error: {0}")]
    Date(#[from] chrono::ParseError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
}

/// `fold(text)`: Unicode lowercase, NULL-preserving. Every text match the
/// plan compiler emits calls it.
fn register_functions(conn: &Connection) -> Result<(), DbError> {
    conn.create_scalar_function(
        sql::FOLD_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| fold_case(&t)))
        },
    )?;
    Ok(())
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        register_functions(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        register_functions(&conn)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<(), DbError> {
        let schema = include_str!("../../schema/sqlite.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    pub fn upsert_candidate(&self, c: &Candidate) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO candidates (id, name, office, state, district, party, election_year, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                office = excluded.office,
                state = excluded.state,
                district = excluded.district,
                party = excluded.party,
                election_year = excluded.election_year,
                is_active = excluded.is_active",
            params![
                c.id,
                c.name,
                c.office,
                c.state,
                c.district,
                c.party,
                c.election_year,
                c.is_active
            ],
        )?;
        Ok(())
    }

    pub fn upsert_committee(&self, c: &Committee) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO committees (id, name, committee_type, state, city, party, candidate_id, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                committee_type = excluded.committee_type,
                state = excluded.state,
                city = excluded.city,
                party = excluded.party,
                candidate_id = excluded.candidate_id,
                is_active = excluded.is_active",
            params![
                c.id,
                c.name,
                c.committee_type,
                c.state,
                c.city,
                c.party,
                c.candidate_id,
                c.is_active
            ],
        )?;
        Ok(())
    }

    pub fn upsert_contributor(&self, c: &Contributor) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO contributors (id, name, entity_type, employer, occupation, city, state, zip)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                entity_type = excluded.entity_type,
                employer = excluded.employer,
                occupation = excluded.occupation,
                city = excluded.city,
                state = excluded.state,
                zip = excluded.zip",
            params![
                c.id,
                c.name,
                c.entity_type,
                c.employer,
                c.occupation,
                c.city,
                c.state,
                c.zip
            ],
        )?;
        Ok(())
    }

    pub fn upsert_contribution(&self, c: &Contribution) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO contributions (id, contributor_id, committee_id, amount_cents, date,
                                        contribution_type, election_type, election_year, memo_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                contributor_id = excluded.contributor_id,
                committee_id = excluded.committee_id,
                amount_cents = excluded.amount_cents,
                date = excluded.date,
                contribution_type = excluded.contribution_type,
                election_type = excluded.election_type,
                election_year = excluded.election_year,
                memo_text = excluded.memo_text",
            params![
                c.id,
                c.contributor_id,
                c.committee_id,
                c.amount.cents(),
                c.date.format("%Y-%m-%d").to_string(),
                c.contribution_type,
                c.election_type,
                c.election_year,
                c.memo_text
            ],
        )?;
        Ok(())
    }

    /// Load a JSON dataset, parents before children, in one transaction.
    pub fn import_json(&self, json: &str) -> Result<ImportCounts, DbError> {
        let data: Dataset = serde_json::from_str(json)?;
        let tx = self.conn.unchecked_transaction()?;
        for c in &data.candidates {
            self.upsert_candidate(c)?;
        }
        for c in &data.committees {
            self.upsert_committee(c)?;
        }
        for c in &data.contributors {
            self.upsert_contributor(c)?;
        }
        for c in &data.contributions {
            self.upsert_contribution(c)?;
        }
        tx.commit()?;
        Ok(ImportCounts {
            candidates: data.candidates.len(),
            committees: data.committees.len(),
            contributors: data.contributors.len(),
            contributions: data.contributions.len(),
        })
    }

    fn fetch_rows<R: FromRow>(
        &self,
        plan: &QueryPlan,
        window: Option<(u64, u64)>,
    ) -> Result<Vec<R>, DbError> {
        if plan.root != R::ENTITY {
            return Err(PlanError::Unreachable {
                root: plan.root,
                field: Field::id_of(R::ENTITY),
            }
            .into());
        }
        let q = sql::select(plan, R::COLUMNS, window)?;
        tracing::debug!(sql = %q.sql, params = q.params.len(), "fetch");
        let mut stmt = self.conn.prepare(&q.sql)?;
        let rows = stmt.query_map(q.param_refs().as_slice(), R::from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

/// Records accepted by [`Db::import_json`].
#[derive(Debug, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub committees: Vec<Committee>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportCounts {
    pub candidates: usize,
    pub committees: usize,
    pub contributors: usize,
    pub contributions: usize,
}

impl DataStore for Db {
    fn fetch<R: FromRow>(&self, plan: &QueryPlan, window: Window) -> Result<Vec<R>, DbError> {
        self.fetch_rows(plan, Some((window.limit, window.offset)))
    }

    fn count(&self, plan: &QueryPlan) -> Result<u64, DbError> {
        let q = sql::count(plan)?;
        tracing::debug!(sql = %q.sql, params = q.params.len(), "count");
        let n: i64 = self
            .conn
            .query_row(&q.sql, q.param_refs().as_slice(), |row| row.get(0))?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    fn aggregate(
        &self,
        plan: &QueryPlan,
        request: &AggregateRequest,
    ) -> Result<Vec<AggregateRow>, DbError> {
        let q = sql::aggregate(plan, request)?;
        tracing::debug!(sql = %q.sql, params = q.params.len(), "aggregate");
        let width = request.measures.len();
        let mut stmt = self.conn.prepare(&q.sql)?;
        let rows = stmt.query_map(q.param_refs().as_slice(), |row| {
            let key = aggregate_value(row.get_ref(0)?);
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(aggregate_value(row.get_ref(i + 1)?));
            }
            Ok(AggregateRow { key, values })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn get<R: FromRow>(&self, id: i64) -> Result<Option<R>, DbError> {
        let plan = QueryPlan::builder(R::ENTITY)
            .filter(Predicate::Eq(Field::id_of(R::ENTITY), id.into()))
            .build()?;
        Ok(self.fetch_rows(&plan, None)?.into_iter().next())
    }

    fn snapshot<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<DbError>,
        F: FnOnce(&Self) -> Result<T, E>,
    {
        if !self.conn.is_autocommit() {
            return f(self);
        }
        // Read-only: the transaction is rolled back when dropped.
        let _tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| E::from(DbError::from(e)))?;
        f(self)
    }
}

fn aggregate_value(v: ValueRef<'_>) -> AggregateValue {
    match v {
        ValueRef::Null => AggregateValue::Null,
        ValueRef::Integer(n) => AggregateValue::Int(n),
        ValueRef::Real(f) => AggregateValue::Real(f),
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            AggregateValue::Text(String::from_utf8_lossy(t).into_owned())
        }
    }
}

fn date_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl FromRow for Candidate {
    const ENTITY: EntityKind = EntityKind::Candidate;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "office",
        "state",
        "district",
        "party",
        "election_year",
        "is_active",
    ];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Candidate {
            id: row.get(0)?,
            name: row.get(1)?,
            office: row.get(2)?,
            state: row.get(3)?,
            district: row.get(4)?,
            party: row.get(5)?,
            election_year: row.get(6)?,
            is_active: row.get(7)?,
        })
    }
}

impl FromRow for Committee {
    const ENTITY: EntityKind = EntityKind::Committee;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "committee_type",
        "state",
        "city",
        "party",
        "candidate_id",
        "is_active",
    ];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Committee {
            id: row.get(0)?,
            name: row.get(1)?,
            committee_type: row.get(2)?,
            state: row.get(3)?,
            city: row.get(4)?,
            party: row.get(5)?,
            candidate_id: row.get(6)?,
            is_active: row.get(7)?,
        })
    }
}

impl FromRow for Contributor {
    const ENTITY: EntityKind = EntityKind::Contributor;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "entity_type",
        "employer",
        "occupation",
        "city",
        "state",
        "zip",
    ];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Contributor {
            id: row.get(0)?,
            name: row.get(1)?,
            entity_type: row.get(2)?,
            employer: row.get(3)?,
            occupation: row.get(4)?,
            city: row.get(5)?,
            state: row.get(6)?,
            zip: row.get(7)?,
        })
    }
}

impl FromRow for Contribution {
    const ENTITY: EntityKind = EntityKind::Contribution;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "contributor_id",
        "committee_id",
        "amount_cents",
        "date",
        "contribution_type",
        "election_type",
        "election_year",
        "memo_text",
    ];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Contribution {
            id: row.get(0)?,
            contributor_id: row.get(1)?,
            committee_id: row.get(2)?,
            amount: Money::from_cents(row.get(3)?),
            date: date_column(row, 4)?,
            contribution_type: row.get(5)?,
            election_type: row.get(6)?,
            election_year: row.get(7)?,
            memo_text: row.get(8)?,
        })
    }
}
