use async_trait::async_trait;
use thiserror::Error;

use accessgate_auth::User;
use accessgate_catalog::SoftwareEntry;
use accessgate_core::{DomainError, ExpectedVersion, RequestId, SoftwareId, UserId};
use accessgate_requests::{AccessRequest, RequestStatus};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique key (username, software name, id) is already taken.
    #[error("duplicate {0}")]
    Duplicate(String),

    /// Conditional write lost against a concurrent writer.
    #[error("stale version for {id}: expected {expected:?}")]
    StaleVersion { id: String, expected: ExpectedVersion },

    #[error("record not found: {0}")]
    Missing(String),

    /// Stored data could not be decoded into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Duplicate(what) => DomainError::conflict(format!("{what} already exists")),
            StoreError::StaleVersion { id, .. } => {
                DomainError::conflict(format!("request {id} was modified concurrently"))
            }
            StoreError::Missing(what) => DomainError::not_found(what),
            StoreError::Corrupt(msg) | StoreError::Backend(msg) => DomainError::internal(msg),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.constraint().unwrap_or("key").to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
                StoreError::Corrupt(value.to_string())
            }
            _ => StoreError::Backend(value.to_string()),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; `Duplicate` if the username is taken.
    async fn insert(&self, user: User) -> StoreResult<()>;
    async fn get(&self, id: UserId) -> StoreResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn count(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait SoftwareStore: Send + Sync {
    /// Insert a new entry; `Duplicate` if the name is taken.
    async fn insert(&self, entry: SoftwareEntry) -> StoreResult<()>;
    async fn get(&self, id: SoftwareId) -> StoreResult<Option<SoftwareEntry>>;
    /// All entries, name ascending.
    async fn list(&self) -> StoreResult<Vec<SoftwareEntry>>;
    async fn count(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert(&self, request: AccessRequest) -> StoreResult<()>;
    async fn get(&self, id: RequestId) -> StoreResult<Option<AccessRequest>>;
    /// Requests filed by `user_id`, newest first.
    async fn list_by_user(&self, user_id: UserId) -> StoreResult<Vec<AccessRequest>>;
    /// Requests in `status`, newest first.
    async fn list_by_status(&self, status: RequestStatus) -> StoreResult<Vec<AccessRequest>>;
    async fn count_by_status(&self, status: RequestStatus) -> StoreResult<u64>;

    /// Persist a decided request, but only if the stored row is still Pending at
    /// `expected`. Otherwise `StaleVersion` and nothing is written.
    async fn save_decision(&self, request: &AccessRequest, expected: ExpectedVersion) -> StoreResult<()>;
}
