//! Persistence for users, software entries and access requests.
//!
//! Each store exclusively owns its records. Cross-store references (a request's
//! `user_id` / `software_id`) are plain ids, checked for existence only at
//! creation time by the workflow services.

pub mod in_memory;
pub mod postgres;
pub mod traits;

use std::sync::Arc;

pub use in_memory::{InMemoryRequestStore, InMemorySoftwareStore, InMemoryUserStore};
pub use postgres::PostgresStores;
pub use traits::{RequestStore, SoftwareStore, StoreError, StoreResult, UserStore};

/// The three stores a workflow runs against.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub software: Arc<dyn SoftwareStore>,
    pub requests: Arc<dyn RequestStore>,
}

impl Stores {
    /// Process-local stores (dev/test).
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            software: Arc::new(InMemorySoftwareStore::new()),
            requests: Arc::new(InMemoryRequestStore::new()),
        }
    }

    /// Postgres-backed stores sharing one pool; applies the schema first.
    pub async fn postgres(database_url: &str) -> StoreResult<Self> {
        let pg = Arc::new(PostgresStores::connect(database_url).await?);
        pg.migrate().await?;
        Ok(Self {
            users: pg.clone(),
            software: pg.clone(),
            requests: pg,
        })
    }
}
