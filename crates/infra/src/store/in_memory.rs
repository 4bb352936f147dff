//! In-memory stores for tests/dev.
//!
//! Uniqueness and conditional writes are checked under the write lock, so they
//! hold across concurrent callers within one process.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use accessgate_auth::User;
use accessgate_catalog::SoftwareEntry;
use accessgate_core::{ExpectedVersion, RequestId, SoftwareId, UserId};
use accessgate_requests::{AccessRequest, RequestStatus};

use super::traits::{RequestStore, SoftwareStore, StoreError, StoreResult, UserStore};

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
}

fn newest_first(requests: &mut [AccessRequest]) {
    requests.sort_by_key(|r| Reverse((r.created_at, r.id)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> StoreResult<()> {
        let mut map = write(&self.inner)?;
        if map.values().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(format!("username '{}'", user.username)));
        }
        if map.contains_key(&user.id) {
            return Err(StoreError::Duplicate(format!("user {}", user.id)));
        }
        map.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(read(&self.inner)?.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(read(&self.inner)?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(read(&self.inner)?.len() as u64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Software
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemorySoftwareStore {
    inner: RwLock<HashMap<SoftwareId, SoftwareEntry>>,
}

impl InMemorySoftwareStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SoftwareStore for InMemorySoftwareStore {
    async fn insert(&self, entry: SoftwareEntry) -> StoreResult<()> {
        let mut map = write(&self.inner)?;
        if map.values().any(|s| s.name == entry.name) {
            return Err(StoreError::Duplicate(format!("software '{}'", entry.name)));
        }
        if map.contains_key(&entry.id) {
            return Err(StoreError::Duplicate(format!("software {}", entry.id)));
        }
        map.insert(entry.id, entry);
        Ok(())
    }

    async fn get(&self, id: SoftwareId) -> StoreResult<Option<SoftwareEntry>> {
        Ok(read(&self.inner)?.get(&id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<SoftwareEntry>> {
        let mut all: Vec<_> = read(&self.inner)?.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(read(&self.inner)?.len() as u64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    inner: RwLock<HashMap<RequestId, AccessRequest>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(&self, keep: impl Fn(&AccessRequest) -> bool) -> StoreResult<Vec<AccessRequest>> {
        let mut out: Vec<_> = read(&self.inner)?
            .values()
            .filter(|r| keep(r))
            .cloned()
            .collect();
        newest_first(&mut out);
        Ok(out)
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn insert(&self, request: AccessRequest) -> StoreResult<()> {
        let mut map = write(&self.inner)?;
        if map.contains_key(&request.id) {
            return Err(StoreError::Duplicate(format!("request {}", request.id)));
        }
        map.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: RequestId) -> StoreResult<Option<AccessRequest>> {
        Ok(read(&self.inner)?.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: UserId) -> StoreResult<Vec<AccessRequest>> {
        self.filtered(|r| r.user_id == user_id)
    }

    async fn list_by_status(&self, status: RequestStatus) -> StoreResult<Vec<AccessRequest>> {
        self.filtered(|r| r.status == status)
    }

    async fn count_by_status(&self, status: RequestStatus) -> StoreResult<u64> {
        Ok(read(&self.inner)?
            .values()
            .filter(|r| r.status == status)
            .count() as u64)
    }

    async fn save_decision(&self, request: &AccessRequest, expected: ExpectedVersion) -> StoreResult<()> {
        let mut map = write(&self.inner)?;
        let stored = map
            .get_mut(&request.id)
            .ok_or_else(|| StoreError::Missing("request".to_string()))?;

        if stored.status != RequestStatus::Pending || !expected.matches(stored.version) {
            return Err(StoreError::StaleVersion {
                id: request.id.to_string(),
                expected,
            });
        }

        *stored = request.clone();
        Ok(())
    }
}
