//! Infrastructure wiring: stores, hasher, token service, policy.

use std::sync::Arc;

use tracing::info;

use accessgate_auth::{Argon2Hasher, Hs256TokenService, SecretHasher};
use accessgate_core::{DomainResult, SystemClock};
use accessgate_infra::{Stores, Workflow, WorkflowDeps};

use crate::config::AppConfig;

/// Pick the store backend from config: Postgres if `DATABASE_URL` is set.
pub async fn build_stores(config: &AppConfig) -> DomainResult<Stores> {
    match &config.database_url {
        Some(url) => {
            let stores = Stores::postgres(url).await?;
            info!(backend = "postgres", "stores ready");
            Ok(stores)
        }
        None => {
            info!(backend = "in-memory", "stores ready");
            Ok(Stores::in_memory())
        }
    }
}

pub fn build_hasher(config: &AppConfig) -> DomainResult<Arc<dyn SecretHasher>> {
    Ok(match config.hash_cost {
        Some(cost) => Arc::new(Argon2Hasher::with_cost(cost.memory_kib, cost.iterations)?),
        None => Arc::new(Argon2Hasher::new()),
    })
}

pub async fn build_workflow(config: &AppConfig) -> DomainResult<Workflow> {
    Workflow::new(WorkflowDeps {
        stores: build_stores(config).await?,
        hasher: build_hasher(config)?,
        tokens: Arc::new(Hs256TokenService::with_ttl(
            config.jwt_secret.as_bytes(),
            config.token_ttl,
        )),
        policy: config.policy,
        clock: Arc::new(SystemClock),
    })
}
