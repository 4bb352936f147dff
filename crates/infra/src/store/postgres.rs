//! Postgres-backed stores.
//!
//! One pool serves all three stores. Uniqueness is enforced by table
//! constraints, and `save_decision` is a single conditional `UPDATE`, so two
//! concurrent decisions on the same request cannot both persist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info};
use uuid::Uuid;

use accessgate_auth::{PasswordDigest, Role, User};
use accessgate_catalog::{AccessLevel, AccessLevels, SoftwareEntry};
use accessgate_core::{ExpectedVersion, RequestId, SoftwareId, UserId};
use accessgate_requests::{AccessRequest, RequestStatus};

use super::traits::{RequestStore, SoftwareStore, StoreError, StoreResult, UserStore};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const REQUEST_COLUMNS: &str = "id, user_id, software_id, access_type, reason, status, \
     created_at, updated_at, updated_by, version";

#[derive(Debug, Clone)]
pub struct PostgresStores {
    pool: PgPool,
}

impl PostgresStores {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        info!("connected to postgres");
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        debug!("schema applied");
        Ok(())
    }

    async fn count_rows(&self, sql: &str) -> StoreResult<u64> {
        let row = sqlx::query(sql).fetch_one(&self.pool).await?;
        let n: i64 = row.try_get(0)?;
        Ok(n.max(0) as u64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row decoding
// ─────────────────────────────────────────────────────────────────────────────

fn corrupt(e: impl core::fmt::Display) -> StoreError {
    StoreError::Corrupt(e.to_string())
}

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
        username: row.try_get("username")?,
        password_digest: PasswordDigest::new(row.try_get::<String, _>("password_digest")?),
        role: role.parse::<Role>().map_err(corrupt)?,
        created_at: row.try_get("created_at")?,
    })
}

fn software_from_row(row: &PgRow) -> StoreResult<SoftwareEntry> {
    let raw_levels: Vec<String> = row.try_get("access_levels")?;
    let levels = raw_levels
        .iter()
        .map(|s| s.parse::<AccessLevel>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(corrupt)?;

    Ok(SoftwareEntry {
        id: SoftwareId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        access_levels: AccessLevels::new(levels).map_err(corrupt)?,
        created_by: UserId::from_uuid(row.try_get::<Uuid, _>("created_by")?),
        created_at: row.try_get("created_at")?,
    })
}

fn request_from_row(row: &PgRow) -> StoreResult<AccessRequest> {
    let access_type: String = row.try_get("access_type")?;
    let status: String = row.try_get("status")?;
    let version: i64 = row.try_get("version")?;

    Ok(AccessRequest {
        id: RequestId::from_uuid(row.try_get::<Uuid, _>("id")?),
        user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
        software_id: SoftwareId::from_uuid(row.try_get::<Uuid, _>("software_id")?),
        access_type: access_type.parse::<AccessLevel>().map_err(corrupt)?,
        reason: row.try_get("reason")?,
        status: status.parse::<RequestStatus>().map_err(corrupt)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        updated_by: row
            .try_get::<Option<Uuid>, _>("updated_by")?
            .map(UserId::from_uuid),
        version: u64::try_from(version).map_err(corrupt)?,
    })
}

fn version_param(version: u64) -> StoreResult<i64> {
    i64::try_from(version).map_err(corrupt)
}

// ─────────────────────────────────────────────────────────────────────────────
// Stores
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl UserStore for PostgresStores {
    async fn insert(&self, user: User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, username, password_digest, role, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(user.password_digest.as_str())
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        sqlx::query("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn count(&self) -> StoreResult<u64> {
        self.count_rows("SELECT COUNT(*) FROM users").await
    }
}

#[async_trait]
impl SoftwareStore for PostgresStores {
    async fn insert(&self, entry: SoftwareEntry) -> StoreResult<()> {
        let levels: Vec<String> = entry.access_levels.iter().map(|l| l.as_str().to_string()).collect();
        sqlx::query(
            "INSERT INTO software (id, name, description, access_levels, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(entry.id.as_uuid())
        .bind(&entry.name)
        .bind(&entry.description)
        .bind(levels)
        .bind(entry.created_by.as_uuid())
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Duplicate(_) => StoreError::Duplicate(format!("software '{}'", entry.name)),
            other => other,
        })?;
        Ok(())
    }

    async fn get(&self, id: SoftwareId) -> StoreResult<Option<SoftwareEntry>> {
        sqlx::query("SELECT * FROM software WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(software_from_row)
            .transpose()
    }

    async fn list(&self) -> StoreResult<Vec<SoftwareEntry>> {
        sqlx::query("SELECT * FROM software ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(software_from_row)
            .collect()
    }

    async fn count(&self) -> StoreResult<u64> {
        self.count_rows("SELECT COUNT(*) FROM software").await
    }
}

#[async_trait]
impl RequestStore for PostgresStores {
    async fn insert(&self, request: AccessRequest) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO access_requests \
             (id, user_id, software_id, access_type, reason, status, created_at, updated_at, updated_by, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(request.id.as_uuid())
        .bind(request.user_id.as_uuid())
        .bind(request.software_id.as_uuid())
        .bind(request.access_type.as_str())
        .bind(&request.reason)
        .bind(request.status.as_str())
        .bind(request.created_at)
        .bind(request.updated_at)
        .bind(request.updated_by.map(Uuid::from))
        .bind(version_param(request.version)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: RequestId) -> StoreResult<Option<AccessRequest>> {
        sqlx::query(&format!("SELECT {REQUEST_COLUMNS} FROM access_requests WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(request_from_row)
            .transpose()
    }

    async fn list_by_user(&self, user_id: UserId) -> StoreResult<Vec<AccessRequest>> {
        sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM access_requests WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(request_from_row)
        .collect()
    }

    async fn list_by_status(&self, status: RequestStatus) -> StoreResult<Vec<AccessRequest>> {
        sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM access_requests WHERE status = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(request_from_row)
        .collect()
    }

    async fn count_by_status(&self, status: RequestStatus) -> StoreResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM access_requests WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get(0)?;
        Ok(n.max(0) as u64)
    }

    async fn save_decision(&self, request: &AccessRequest, expected: ExpectedVersion) -> StoreResult<()> {
        let guard = match expected {
            ExpectedVersion::Any => None,
            ExpectedVersion::Exact(v) => Some(version_param(v)?),
        };

        let result = sqlx::query(
            "UPDATE access_requests \
             SET status = $1, updated_by = $2, updated_at = $3, version = $4 \
             WHERE id = $5 AND status = 'Pending' AND ($6::BIGINT IS NULL OR version = $6)",
        )
        .bind(request.status.as_str())
        .bind(request.updated_by.map(Uuid::from))
        .bind(request.updated_at)
        .bind(version_param(request.version)?)
        .bind(request.id.as_uuid())
        .bind(guard)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::StaleVersion {
                id: request.id.to_string(),
                expected,
            });
        }
        Ok(())
    }
}
