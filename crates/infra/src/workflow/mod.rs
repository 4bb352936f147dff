//! Workflow services: the operations callers actually invoke.
//!
//! ```text
//! token ─▶ AuthGateway::authenticate ─▶ Identity
//!                                         │
//!           AccessPolicy::require ◀───────┤   (role check first, before any store access)
//!                                         ▼
//!      CatalogService / AccessRequestEngine ─▶ stores
//!                                         │
//!                     Reporter ◀──────────┘   (read-only counts)
//! ```
//!
//! Every service takes the caller's [`Identity`](accessgate_auth::Identity)
//! explicitly; nothing here holds per-caller state.

pub mod catalog;
pub mod engine;
pub mod gateway;
pub mod reporter;

use std::sync::Arc;

use accessgate_auth::{AccessPolicy, SecretHasher, TokenService};
use accessgate_core::{Clock, DomainResult};

use crate::store::Stores;

pub use catalog::CatalogService;
pub use engine::AccessRequestEngine;
pub use gateway::AuthGateway;
pub use reporter::{DashboardStats, Reporter};

/// Capabilities the workflow consumes but does not implement.
#[derive(Clone)]
pub struct WorkflowDeps {
    pub stores: Stores,
    pub hasher: Arc<dyn SecretHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub policy: AccessPolicy,
    pub clock: Arc<dyn Clock>,
}

/// All workflow services wired against one set of stores.
#[derive(Clone)]
pub struct Workflow {
    pub gateway: AuthGateway,
    pub catalog: CatalogService,
    pub requests: AccessRequestEngine,
    pub reporter: Reporter,
    /// The policy every service enforces; exposed for boundary pre-checks.
    pub policy: AccessPolicy,
}

impl Workflow {
    pub fn new(deps: WorkflowDeps) -> DomainResult<Self> {
        let WorkflowDeps {
            stores,
            hasher,
            tokens,
            policy,
            clock,
        } = deps;

        Ok(Self {
            gateway: AuthGateway::new(stores.users.clone(), hasher, tokens, clock.clone())?,
            catalog: CatalogService::new(stores.software.clone(), policy, clock.clone()),
            requests: AccessRequestEngine::new(
                stores.requests.clone(),
                stores.software.clone(),
                policy,
                clock,
            ),
            reporter: Reporter::new(stores, policy),
            policy,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support;
