use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tessera_storage::{
    new_invitation_token, Invitation, InvitationId, InvitationStore, StoreError,
};
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

type InvitationRow = (
    Uuid,
    String,
    String,
    bool,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

fn row_to_invitation(row: InvitationRow) -> Invitation {
    let (id, token, realm, used, created_on, expires_on) = row;
    Invitation {
        id: InvitationId(id),
        token,
        realm,
        used,
        created_on,
        expires_on,
    }
}

fn require_filled(name: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidArgument(format!(
            "{name} must not be blank"
        )));
    }
    Ok(())
}

#[async_trait::async_trait]
impl InvitationStore for PostgresStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, StoreError> {
        require_filled("token", token)?;
        let row = sqlx::query_as::<_, InvitationRow>(
            "SELECT id,token,realm,used,created_on,expires_on FROM invitations WHERE token=$1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(row.map(row_to_invitation))
    }

    async fn find_by_token_and_realm(
        &self,
        token: &str,
        realm: &str,
    ) -> Result<Option<Invitation>, StoreError> {
        require_filled("token", token)?;
        require_filled("realm", realm)?;
        let row = sqlx::query_as::<_, InvitationRow>(
            "SELECT id,token,realm,used,created_on,expires_on FROM invitations
             WHERE token=$1 AND realm=$2",
        )
        .bind(token)
        .bind(realm)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(row.map(row_to_invitation))
    }

    async fn create(&self, realm: &str, expiration_seconds: i64) -> Result<String, StoreError> {
        require_filled("realm", realm)?;
        if expiration_seconds <= 0 {
            return Err(StoreError::InvalidArgument(format!(
                "expiration_seconds must be positive, got {expiration_seconds}"
            )));
        }

        let id = Uuid::now_v7();
        let token = new_invitation_token();
        let now = Utc::now();
        let expires_on = now + chrono::Duration::seconds(expiration_seconds);

        sqlx::query(
            "INSERT INTO invitations(id,token,realm,used,created_on,expires_on)
             VALUES($1,$2,$3,FALSE,$4,$5)",
        )
        .bind(id)
        .bind(&token)
        .bind(realm)
        .bind(now)
        .bind(expires_on)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let s = e.to_string();
            if s.contains("duplicate key") {
                StoreError::AlreadyExists
            } else {
                StoreError::Backend(s)
            }
        })?;

        Ok(token)
    }

    async fn mark_used(&self, token: &str, realm: &str) -> Result<bool, StoreError> {
        require_filled("token", token)?;
        require_filled("realm", realm)?;
        // Conditional write: only an unconsumed row flips, so of two racing
        // consumers exactly one sees `true`.
        let result = sqlx::query(
            "UPDATE invitations SET used=TRUE WHERE token=$1 AND realm=$2 AND used=FALSE",
        )
        .bind(token)
        .bind(realm)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_all(&self, offset: i64, limit: i64) -> Result<Vec<Invitation>, StoreError> {
        let rows = sqlx::query_as::<_, InvitationRow>(
            "SELECT id,token,realm,used,created_on,expires_on FROM invitations
             ORDER BY created_on DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(rows.into_iter().map(row_to_invitation).collect())
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM invitations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(count as u64)
    }
}
