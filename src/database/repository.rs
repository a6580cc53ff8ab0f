use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{self, FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::filter::expr::BooleanBuilder;
use crate::filter::page::{order_by_sql, KeyValuePair, Page, PaginationInput};

/// Generic predicate-driven reader over one table. `select` is the
/// column list (including any computed columns) and `alias` the table
/// alias every predicate is built against.
pub struct Repository<T> {
    table: &'static str,
    alias: &'static str,
    select: String,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table: &'static str, alias: &'static str, select: impl Into<String>) -> Self {
        Self { table, alias, select: select.into(), _phantom: std::marker::PhantomData }
    }

    fn base_query(&self) -> String {
        format!("SELECT {} FROM {} {}", self.select, self.table, self.alias)
    }

    pub async fn find_all(
        &self,
        pool: &PgPool,
        filter: &BooleanBuilder,
        sort: &[KeyValuePair],
    ) -> Result<Vec<T>, DatabaseError> {
        let (where_sql, params) = filter.to_sql(0);
        let order = order_by_sql(self.alias, sort)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let mut query = format!("{} WHERE {}", self.base_query(), where_sql);
        if !order.is_empty() {
            query.push(' ');
            query.push_str(&order);
        }
        let mut q = sqlx::query_as::<_, T>(&query);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn find_page(
        &self,
        pool: &PgPool,
        filter: &BooleanBuilder,
        page: &PaginationInput,
    ) -> Result<Page<T>, DatabaseError> {
        let total = self.count(pool, filter).await?;

        let (where_sql, params) = filter.to_sql(0);
        let tail = page
            .to_sql(self.alias)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let query = format!("{} WHERE {} {}", self.base_query(), where_sql, tail);
        let mut q = sqlx::query_as::<_, T>(&query);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        let items = q.fetch_all(pool).await?;
        Ok(Page::new(items, total, page))
    }

    pub async fn find_one(
        &self,
        pool: &PgPool,
        filter: &BooleanBuilder,
    ) -> Result<Option<T>, DatabaseError> {
        let (where_sql, params) = filter.to_sql(0);
        let query = format!("{} WHERE {} LIMIT 1", self.base_query(), where_sql);
        let mut q = sqlx::query_as::<_, T>(&query);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_optional(pool).await?)
    }

    pub async fn find_404(&self, pool: &PgPool, filter: &BooleanBuilder) -> Result<T, DatabaseError> {
        match self.find_one(pool, filter).await? {
            Some(row) => Ok(row),
            None => Err(DatabaseError::NotFound("Record not found".to_string())),
        }
    }

    pub async fn count(&self, pool: &PgPool, filter: &BooleanBuilder) -> Result<i64, DatabaseError> {
        let (where_sql, params) = filter.to_sql(0);
        let query = format!(
            "SELECT COUNT(*) as count FROM {} {} WHERE {}",
            self.table, self.alias, where_sql
        );
        let mut q = sqlx::query(&query);
        for p in params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

pub(crate) fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                // Postgres doesn't have u64; cast down if safe
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        // Composite values travel as text and are cast server-side
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}
