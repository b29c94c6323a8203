//! The data-store seam between the services and SQLite.

use fundlens_query::query::{AggregateRequest, AggregateRow, QueryPlan};
use fundlens_query::types::EntityKind;

use crate::db::DbError;

/// A slice of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

/// A record type that can be read from a row of its entity's table.
pub trait FromRow: Sized {
    const ENTITY: EntityKind;
    /// Columns selected from the root table, in the order `from_row` reads them.
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}

/// Read access to campaign-finance records through abstract plans.
pub trait DataStore {
    /// Rows of `plan`, in plan order, restricted to `window`.
    fn fetch<R: FromRow>(&self, plan: &QueryPlan, window: Window) -> Result<Vec<R>, DbError>;

    /// Number of rows `plan` selects.
    fn count(&self, plan: &QueryPlan) -> Result<u64, DbError>;

    fn aggregate(
        &self,
        plan: &QueryPlan,
        request: &AggregateRequest,
    ) -> Result<Vec<AggregateRow>, DbError>;

    fn get<R: FromRow>(&self, id: i64) -> Result<Option<R>, DbError>;

    /// Run `f` against one consistent read snapshot. Nested calls join the
    /// outer snapshot.
    fn snapshot<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<DbError>,
        F: FnOnce(&Self) -> Result<T, E>;
}
