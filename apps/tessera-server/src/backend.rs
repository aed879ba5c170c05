use std::sync::Arc;
use tessera_storage::{Invitation, InvitationStore, StoreError};
use tessera_store_postgres::PostgresStore;
use tessera_store_sqlite::SqliteStore;

/// StoreBackend abstracts over the SQLite and PostgreSQL implementations.
#[derive(Clone)]
pub enum StoreBackend {
    Sqlite(Arc<SqliteStore>),
    Postgres(Arc<PostgresStore>),
}

impl StoreBackend {
    /// Open the backend matching the URL scheme: `postgres:` URLs select
    /// PostgreSQL, everything else is treated as SQLite.
    pub async fn open(db_url: &str) -> Result<Self, StoreError> {
        if db_url.starts_with("postgres:") {
            Ok(StoreBackend::Postgres(Arc::new(
                PostgresStore::open(db_url).await?,
            )))
        } else {
            Ok(StoreBackend::Sqlite(Arc::new(
                SqliteStore::open(db_url).await?,
            )))
        }
    }
}

#[async_trait::async_trait]
impl InvitationStore for StoreBackend {
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.find_by_token(token).await,
            StoreBackend::Postgres(s) => s.find_by_token(token).await,
        }
    }

    async fn find_by_token_and_realm(
        &self,
        token: &str,
        realm: &str,
    ) -> Result<Option<Invitation>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.find_by_token_and_realm(token, realm).await,
            StoreBackend::Postgres(s) => s.find_by_token_and_realm(token, realm).await,
        }
    }

    async fn create(&self, realm: &str, expiration_seconds: i64) -> Result<String, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.create(realm, expiration_seconds).await,
            StoreBackend::Postgres(s) => s.create(realm, expiration_seconds).await,
        }
    }

    async fn mark_used(&self, token: &str, realm: &str) -> Result<bool, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.mark_used(token, realm).await,
            StoreBackend::Postgres(s) => s.mark_used(token, realm).await,
        }
    }

    async fn find_all(&self, offset: i64, limit: i64) -> Result<Vec<Invitation>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.find_all(offset, limit).await,
            StoreBackend::Postgres(s) => s.find_all(offset, limit).await,
        }
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.count_all().await,
            StoreBackend::Postgres(s) => s.count_all().await,
        }
    }
}
