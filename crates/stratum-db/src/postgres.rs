//! PostgreSQL database backend using `tokio-postgres`.
//!
//! Provides [`PostgresBackend`], which implements
//! [`DatabaseBackend`](crate::backend::DatabaseBackend) over a single
//! `tokio-postgres` client. The engine runs one statement at a time, so a
//! connection pool would add nothing here.

use stratum_core::{StratumError, StratumResult};

use crate::backend::DatabaseBackend;
use crate::row::Row;
use crate::value::Value;

/// A PostgreSQL database backend.
///
/// Holds one `tokio-postgres` client; the connection task is driven in the
/// background and any connection error surfaces on the next statement.
pub struct PostgresBackend {
    client: tokio_postgres::Client,
}

impl PostgresBackend {
    /// Connects to a PostgreSQL database with the given connection string.
    pub async fn connect(url: &str) -> StratumResult<Self> {
        let (client, connection) = tokio_postgres::connect(url, tokio_postgres::NoTls)
            .await
            .map_err(|e| StratumError::Operational(format!("PostgreSQL connect failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {e}");
            }
        });

        Ok(Self { client })
    }

    /// Converts engine `Value` types to `tokio-postgres` parameters.
    fn to_sql_params(
        params: &[Value],
    ) -> Vec<Box<dyn tokio_postgres::types::ToSql + Sync + Send>> {
        params
            .iter()
            .map(|v| -> Box<dyn tokio_postgres::types::ToSql + Sync + Send> {
                match v {
                    Value::Null => Box::new(Option::<String>::None),
                    Value::Bool(b) => Box::new(*b),
                    Value::Int(i) => Box::new(*i),
                    Value::Float(f) => Box::new(*f),
                    Value::String(s) => Box::new(s.clone()),
                    Value::Bytes(b) => Box::new(b.clone()),
                    Value::Timestamp(ts) => Box::new(*ts),
                }
            })
            .collect()
    }

    /// Converts a `tokio_postgres::Row` to our generic `Row`.
    fn convert_row(pg_row: &tokio_postgres::Row) -> Row {
        use tokio_postgres::types::Type;

        let columns: Vec<String> = pg_row
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let values: Vec<Value> = pg_row
            .columns()
            .iter()
            .enumerate()
            .map(|(i, col)| match *col.type_() {
                Type::BOOL => pg_row
                    .try_get::<_, Option<bool>>(i)
                    .ok()
                    .flatten()
                    .map_or(Value::Null, Value::Bool),
                Type::INT2 => pg_row
                    .try_get::<_, Option<i16>>(i)
                    .ok()
                    .flatten()
                    .map_or(Value::Null, |v| Value::Int(i64::from(v))),
                Type::INT4 => pg_row
                    .try_get::<_, Option<i32>>(i)
                    .ok()
                    .flatten()
                    .map_or(Value::Null, |v| Value::Int(i64::from(v))),
                Type::INT8 => pg_row
                    .try_get::<_, Option<i64>>(i)
                    .ok()
                    .flatten()
                    .map_or(Value::Null, Value::Int),
                Type::FLOAT4 => pg_row
                    .try_get::<_, Option<f32>>(i)
                    .ok()
                    .flatten()
                    .map_or(Value::Null, |v| Value::Float(f64::from(v))),
                Type::FLOAT8 => pg_row
                    .try_get::<_, Option<f64>>(i)
                    .ok()
                    .flatten()
                    .map_or(Value::Null, Value::Float),
                Type::BYTEA => pg_row
                    .try_get::<_, Option<Vec<u8>>>(i)
                    .ok()
                    .flatten()
                    .map_or(Value::Null, Value::Bytes),
                Type::TIMESTAMPTZ => pg_row
                    .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(i)
                    .ok()
                    .flatten()
                    .map_or(Value::Null, Value::Timestamp),
                _ => pg_row
                    .try_get::<_, Option<String>>(i)
                    .ok()
                    .flatten()
                    .map_or(Value::Null, Value::String),
            })
            .collect();

        Row::new(columns, values)
    }
}

#[async_trait::async_trait]
impl DatabaseBackend for PostgresBackend {
    fn vendor(&self) -> &str {
        "postgresql"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> StratumResult<u64> {
        let boxed = Self::to_sql_params(params);
        let refs: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> =
            boxed.iter().map(|b| b.as_ref() as _).collect();
        self.client
            .execute(sql, &refs)
            .await
            .map_err(|e| StratumError::Database(format!("{e}")))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> StratumResult<Vec<Row>> {
        let boxed = Self::to_sql_params(params);
        let refs: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> =
            boxed.iter().map(|b| b.as_ref() as _).collect();
        let rows = self
            .client
            .query(sql, &refs)
            .await
            .map_err(|e| StratumError::Database(format!("{e}")))?;
        Ok(rows.iter().map(Self::convert_row).collect())
    }

    async fn begin(&self) -> StratumResult<()> {
        self.execute("BEGIN", &[]).await.map(|_| ())
    }

    async fn commit(&self) -> StratumResult<()> {
        self.execute("COMMIT", &[]).await.map(|_| ())
    }

    async fn rollback(&self) -> StratumResult<()> {
        self.execute("ROLLBACK", &[]).await.map(|_| ())
    }
}
