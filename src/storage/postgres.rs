//! Postgres-backed document store: one JSONB table keyed by
//! (collection, id).

use crate::domain::error::Error;
use crate::infra::config;
use crate::storage::document::{DocumentStore, Mutation};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect() -> Result<Self> {
        dotenv::dotenv().ok();
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config::database_url())
            .await?;
        Ok(Self::new_with_pool(pool))
    }

    pub fn new_with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the backing table if it is missing.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                 collection TEXT NOT NULL,
                 id TEXT NOT NULL,
                 doc JSONB NOT NULL,
                 PRIMARY KEY (collection, id)
             )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn insert(&self, collection: &str, id: &str, doc: JsonValue) -> Result<(), Error> {
        let result = sqlx::query(
            "INSERT INTO documents (collection, id, doc) VALUES ($1, $2, $3)
             ON CONFLICT (collection, id) DO NOTHING",
        )
        .bind(collection)
        .bind(id)
        .bind(&doc)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::conflict(format!(
                "document {} already exists in {}",
                id, collection
            )));
        }
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<JsonValue>, Error> {
        let row = sqlx::query("SELECT doc FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<JsonValue, _>("doc").map_err(anyhow::Error::from)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, collection: &str, id: &str, doc: JsonValue) -> Result<bool, Error> {
        let result =
            sqlx::query("UPDATE documents SET doc = $3 WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .bind(&doc)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mutate(
        &self,
        collection: &str,
        id: &str,
        mutation: Mutation,
    ) -> Result<Option<JsonValue>, Error> {
        // Row lock for the whole read-transform-write, so concurrent
        // appends to embedded lists cannot lose updates.
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "SELECT doc FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(tx.as_mut())
        .await?;
        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let current: JsonValue = row.try_get("doc").map_err(anyhow::Error::from)?;
        let updated = mutation(current)?;
        sqlx::query("UPDATE documents SET doc = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .bind(&updated)
            .execute(tx.as_mut())
            .await?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn scan(&self, collection: &str) -> Result<Vec<JsonValue>, Error> {
        let rows = sqlx::query("SELECT doc FROM documents WHERE collection = $1 ORDER BY id")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;
        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            docs.push(row.try_get::<JsonValue, _>("doc").map_err(anyhow::Error::from)?);
        }
        Ok(docs)
    }
}
