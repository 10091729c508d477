use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres, QueryBuilder, Row};

use crate::model::{EntityKind, Filter, Id, Query};
use crate::store::traits::DocumentStore;

/// Document store backed by a single JSONB table, one row per record
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Make sure the document table exists
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                doc JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create documents table")?;

        log::info!("Document table ready");
        Ok(())
    }
}

/// Appends ` AND doc -> field @> value` for each condition. `@>` covers both
/// scalar equality and membership in an array field.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    for condition in &filter.conditions {
        builder
            .push(" AND doc -> ")
            .push_bind(condition.field.clone())
            .push(" @> ")
            .push_bind(Json(condition.value.clone()));
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn find_by_id(&self, kind: EntityKind, id: &Id) -> Result<Option<Value>> {
        let row = sqlx::query("SELECT doc FROM documents WHERE collection = $1 AND id = $2")
            .bind(kind.collection())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to fetch {} {}", kind, id))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Json(document): Json<Value> = row.try_get("doc")?;
        Ok(Some(document))
    }

    async fn find(&self, kind: EntityKind, query: &Query) -> Result<Vec<Value>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT doc FROM documents WHERE collection = ");
        builder.push_bind(kind.collection());
        push_filter(&mut builder, &query.filter);

        match &query.sort {
            Some(sort) => {
                builder
                    .push(" ORDER BY doc ->> ")
                    .push_bind(sort.field.clone())
                    .push(" ASC NULLS FIRST, created_at");
            }
            None => {
                builder.push(" ORDER BY created_at");
            }
        }

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to list {}", kind.collection()))?;

        rows.into_iter()
            .map(|row| -> Result<Value> {
                let Json(document): Json<Value> = row.try_get("doc")?;
                Ok(query.apply_projection(document))
            })
            .collect()
    }

    async fn count(&self, kind: EntityKind, filter: &Filter) -> Result<u64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total FROM documents WHERE collection = ");
        builder.push_bind(kind.collection());
        push_filter(&mut builder, filter);

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {}", kind.collection()))?;

        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }

    async fn save(&self, kind: EntityKind, id: &Id, document: Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, doc)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET
                doc = EXCLUDED.doc,
                updated_at = NOW()
            "#,
        )
        .bind(kind.collection())
        .bind(id)
        .bind(Json(document))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save {} {}", kind, id))?;

        Ok(())
    }

    async fn delete_by_id(&self, kind: EntityKind, id: &Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(kind.collection())
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete {} {}", kind, id))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_one_by_field(
        &self,
        kind: EntityKind,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT doc FROM documents WHERE collection = ");
        builder.push_bind(kind.collection());
        push_filter(&mut builder, &Filter::eq(field, value.clone()));
        builder.push(" ORDER BY created_at LIMIT 1");

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to look up {} by {}", kind, field))?;

        match row {
            Some(row) => {
                let Json(document): Json<Value> = row.try_get("doc")?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }
}
