//! PostgreSQL store. All entity types share one JSONB table in a schema named from
//! `RESOURCE_SCHEMA` env (default `resource_sdk`).

use crate::entity::{entity_id, Entity, EntityLocator, ID_KEY};
use crate::error::AppError;
use crate::service::{ListQuery, Page, PersistenceRepository, ScopeConstraint};
use crate::sql::{count_page, delete_by_id, insert_placeholder, resources_table, select_by_id, select_page, upsert, QueryBuf};
use crate::store::ListParams;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{ConnectOptions, PgPool, Postgres, Row};
use std::str::FromStr;

/// Schema for the resources table. From env `RESOURCE_SCHEMA`, default `resource_sdk`. Must be a valid PostgreSQL identifier.
pub fn resource_schema() -> String {
    std::env::var("RESOURCE_SCHEMA").unwrap_or_else(|_| "resource_sdk".into())
}

/// Create the schema and resources table if not exists.
pub async fn ensure_resource_tables(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", schema.replace('"', "\"\"")))
        .execute(pool)
        .await?;
    let table = resources_table(schema);
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            locator TEXT NOT NULL,
            id BIGSERIAL NOT NULL,
            payload JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (locator, id)
        )
        "#,
        table
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(AppError::Db)?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn bind_all(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn payload(row: &PgRow) -> Result<Entity, AppError> {
    match row.try_get::<Value, _>("payload")? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::Db(sqlx::Error::Decode("payload is not a JSON object".into()))),
    }
}

pub struct PgRepository {
    pool: PgPool,
    schema: String,
    default_page_size: u32,
}

impl PgRepository {
    pub fn new(pool: PgPool, default_page_size: u32) -> Self {
        Self::with_schema(pool, resource_schema(), default_page_size)
    }

    pub fn with_schema(pool: PgPool, schema: impl Into<String>, default_page_size: u32) -> Self {
        PgRepository {
            pool,
            schema: schema.into(),
            default_page_size,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PersistenceRepository for PgRepository {
    async fn find(&self, locator: &EntityLocator, id: &str) -> Result<Option<Entity>, AppError> {
        let q = select_by_id(&self.schema, locator, id);
        let row = bind_all(&q).fetch_optional(&self.pool).await?;
        row.as_ref().map(payload).transpose()
    }

    async fn persist(&self, locator: &EntityLocator, entity: Entity) -> Result<Entity, AppError> {
        let mut tx = self.pool.begin().await?;
        let (id, entity) = match entity_id(&entity) {
            Some(id) => {
                let id = id
                    .parse::<i64>()
                    .map_err(|_| AppError::BadRequest(format!("id '{}' is not numeric", id)))?;
                (id, entity)
            }
            None => {
                let q = insert_placeholder(&self.schema, locator);
                let row = bind_all(&q).fetch_one(&mut *tx).await?;
                let id: i64 = row.try_get("id")?;
                let mut with_id = Entity::new();
                with_id.insert(ID_KEY.to_string(), Value::Number(id.into()));
                with_id.extend(entity.into_iter().filter(|(k, _)| k != ID_KEY));
                (id, with_id)
            }
        };
        let q = upsert(&self.schema, locator, id, Value::Object(entity.clone()));
        bind_all(&q).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(entity)
    }

    async fn remove(&self, locator: &EntityLocator, id: &str) -> Result<bool, AppError> {
        let q = delete_by_id(&self.schema, locator, id);
        let row = bind_all(&q).fetch_optional(&self.pool).await?;
        Ok(row.is_some())
    }

    async fn query(
        &self,
        locator: &EntityLocator,
        query: &ListQuery,
        scope: Option<&ScopeConstraint>,
    ) -> Result<Page, AppError> {
        let params = ListParams::parse(query, self.default_page_size);
        let count = count_page(&self.schema, locator, &params, scope);
        let total: i64 = bind_all(&count).fetch_one(&self.pool).await?.try_get(0)?;
        let q = select_page(&self.schema, locator, &params, scope);
        let rows = bind_all(&q).fetch_all(&self.pool).await?;
        let items = rows.iter().map(payload).collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total: total.max(0) as u64,
            page: params.page,
            page_size: params.page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/shop?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "shop");
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
    }
}
