//! services/record_store.rs
//! Almacén clave-valor (kind, id) -> JSON detrás de una interfaz, para poder
//! cambiar la memoria del proceso por SQLite sin tocar los servicios.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tokio::sync::RwLock;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<()>;

    async fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>>;
}

#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn put(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<()> {
        self.records
            .write()
            .await
            .insert((kind.to_string(), id.to_string()), value);
        Ok(())
    }

    async fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(kind.to_string(), id.to_string()))
            .cloned())
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SqliteStore { db_pool }
    }

    /// Abre (o crea) la base indicada por `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("URL de base de datos inválida: {}", database_url))?
            .create_if_missing(true);
        let db_pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("No se pudo conectar a la base de datos SQLite")?;
        Ok(SqliteStore::new(db_pool))
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Failed to run record store migrations")?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn put(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<()> {
        let body = serde_json::to_string(&value)?;
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO records (kind, id, body, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(kind, id) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(kind)
        .bind(id)
        .bind(body)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al guardar registro")?;
        Ok(())
    }

    async fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM records WHERE kind = ?1 AND id = ?2")
                .bind(kind)
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await
                .context("Fallo al leer registro")?;

        row.map(|(body,)| serde_json::from_str(&body).context("Registro con JSON inválido"))
            .transpose()
    }
}

/// Vista tipada de un `kind` dentro del almacén.
pub struct Repository<T> {
    store: Arc<dyn RecordStore>,
    kind: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            store: self.store.clone(),
            kind: self.kind,
            _marker: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> Repository<T> {
    pub fn new(store: Arc<dyn RecordStore>, kind: &'static str) -> Self {
        Repository {
            store,
            kind,
            _marker: PhantomData,
        }
    }

    pub async fn insert(&self, id: &str, record: &T) -> Result<()> {
        let value = serde_json::to_value(record)?;
        self.store.put(self.kind, id, value).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>> {
        match self.store.get(self.kind, id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
