use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tessera_storage::{
    new_invitation_token, Invitation, InvitationId, InvitationStore, StoreError,
};
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// `~/.tessera/store.db` (creates dir with 0700 perms on unix)
    pub async fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| StoreError::Backend("no home dir".into()))?
            .join(".tessera");
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.to_string()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let path = dir.join("store.db");
        let url = format!("sqlite://{}?mode=rwc", path.to_string_lossy());
        Self::open(&url).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
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

type InvitationRow = (String, String, String, i64, i64, Option<i64>);

fn row_to_invitation(row: InvitationRow) -> Result<Invitation, StoreError> {
    let (id, token, realm, used, created_on, expires_on) = row;
    let id = Uuid::try_parse(&id).map_err(|e| StoreError::Backend(e.to_string()))?;
    let created_on = DateTime::from_timestamp_millis(created_on)
        .ok_or_else(|| StoreError::Backend(format!("bad created_on: {created_on}")))?;
    let expires_on = expires_on
        .map(|ms| {
            DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| StoreError::Backend(format!("bad expires_on: {ms}")))
        })
        .transpose()?;
    Ok(Invitation {
        id: InvitationId(id),
        token,
        realm,
        used: used != 0,
        created_on,
        expires_on,
    })
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
impl InvitationStore for SqliteStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, StoreError> {
        require_filled("token", token)?;
        let row = sqlx::query_as::<_, InvitationRow>(
            "SELECT id,token,realm,used,created_on,expires_on FROM invitations WHERE token=?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(row_to_invitation).transpose()
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
             WHERE token=? AND realm=?",
        )
        .bind(token)
        .bind(realm)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        row.map(row_to_invitation).transpose()
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
             VALUES(?,?,?,0,?,?)",
        )
        .bind(id.to_string())
        .bind(&token)
        .bind(realm)
        .bind(now.timestamp_millis())
        .bind(expires_on.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let s = e.to_string();
            if s.contains("UNIQUE") {
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
        let result =
            sqlx::query("UPDATE invitations SET used=1 WHERE token=? AND realm=? AND used=0")
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
             ORDER BY created_on DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        rows.into_iter().map(row_to_invitation).collect()
    }

    async fn count_all(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM invitations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(count as u64)
    }
}
