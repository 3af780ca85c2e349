//! MySQL-backed relational executor.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, Row as _, TypeInfo, ValueRef};

use crate::db::repository::RelationalExecutor;
use crate::db::{DbResult, QueryOutcome, Row, SqlValue, WriteAck};

/// SQLx-backed executor bound to a live pool.
#[derive(Debug, Clone)]
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

/// Whether a statement produces a result set rather than a write summary.
pub(crate) fn returns_rows(statement: &str) -> bool {
    let head = statement
        .trim_start()
        .trim_start_matches('(')
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    matches!(
        head.as_str(),
        "SELECT" | "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN" | "WITH"
    )
}

fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Bool(v) => query.bind(*v),
        };
    }
    query
}

/// Convert a result row into a column-keyed map.
fn row_to_map(row: &MySqlRow) -> DbResult<Row> {
    let mut map = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let is_null = row.try_get_raw(idx)?.is_null();
        let value = if is_null {
            Value::Null
        } else {
            decode_column(row, idx, column.type_info().name())?
        };
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}

fn decode_column(row: &MySqlRow, idx: usize, type_name: &str) -> DbResult<Value> {
    let value = match type_name {
        "BOOLEAN" => Value::Bool(row.try_get::<bool, _>(idx)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(row.try_get::<i64, _>(idx)?)
        }
        unsigned if unsigned.ends_with("UNSIGNED") => Value::from(row.try_get::<u64, _>(idx)?),
        "FLOAT" | "DOUBLE" => Value::from(row.try_get::<f64, _>(idx)?),
        "TIMESTAMP" => Value::from(
            row.try_get::<DateTime<Utc>, _>(idx)?
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
        "DATETIME" => Value::from(
            row.try_get::<NaiveDateTime, _>(idx)?
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
        "DATE" => Value::from(row.try_get::<NaiveDate, _>(idx)?.to_string()),
        // VARCHAR, TEXT, CHAR, DECIMAL, ENUM, JSON all arrive as text
        _ => Value::from(row.try_get_unchecked::<String, _>(idx)?),
    };
    Ok(value)
}

impl RelationalExecutor for MySqlExecutor {
    async fn query(&self, statement: &str, params: &[SqlValue]) -> DbResult<QueryOutcome> {
        let query = bind_params(sqlx::query(statement), params);

        if returns_rows(statement) {
            let rows = query.fetch_all(&self.pool).await?;
            let rows = rows.iter().map(row_to_map).collect::<DbResult<Vec<_>>>()?;
            return Ok(QueryOutcome::Rows(rows));
        }

        let result = query.execute(&self.pool).await?;
        Ok(QueryOutcome::Ack(WriteAck {
            insert_id: result.last_insert_id(),
            affected_rows: result.rows_affected(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_like_statements_return_rows() {
        assert!(returns_rows("SELECT * FROM admins WHERE username = ?"));
        assert!(returns_rows("  select id from projects"));
        assert!(returns_rows("(SELECT 1) UNION (SELECT 2)"));
        assert!(returns_rows("SHOW TABLES"));
        assert!(returns_rows("WITH recent AS (SELECT 1) SELECT * FROM recent"));
    }

    #[test]
    fn write_statements_return_acks() {
        assert!(!returns_rows("INSERT INTO projects (title) VALUES (?)"));
        assert!(!returns_rows("UPDATE sectors SET is_active = ? WHERE id = ?"));
        assert!(!returns_rows("DELETE FROM projects WHERE id = ?"));
        assert!(!returns_rows("CREATE TABLE IF NOT EXISTS admins (id INT)"));
        assert!(!returns_rows(""));
    }
}
