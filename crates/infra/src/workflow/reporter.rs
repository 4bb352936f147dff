use serde::Serialize;

use accessgate_auth::{AccessPolicy, Action, Identity};
use accessgate_core::DomainResult;
use accessgate_requests::RequestStatus;

use crate::store::Stores;

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_software: u64,
    pub pending_requests: u64,
    pub total_users: u64,
}

/// Read-only aggregation over the stores. Nothing is cached.
#[derive(Clone)]
pub struct Reporter {
    stores: Stores,
    policy: AccessPolicy,
}

impl Reporter {
    pub fn new(stores: Stores, policy: AccessPolicy) -> Self {
        Self { stores, policy }
    }

    pub async fn dashboard_stats(&self, caller: &Identity) -> DomainResult<DashboardStats> {
        self.policy.require(caller.role, Action::ViewDashboard)?;

        let (software, pending, users) = tokio::try_join!(
            self.stores.software.count(),
            self.stores.requests.count_by_status(RequestStatus::Pending),
            self.stores.users.count(),
        )?;

        Ok(DashboardStats {
            total_software: software,
            pending_requests: pending,
            total_users: users,
        })
    }
}
