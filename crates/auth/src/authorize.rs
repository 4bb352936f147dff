//! Role → capability table.
//!
//! - No IO
//! - No panics
//! - Consulted before any store access by every mutating operation

use serde::Serialize;
use tracing::warn;

use accessgate_core::{DomainError, DomainResult};

use crate::{Action, Role};

/// Capability table with the one knob deployments disagree on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AccessPolicy {
    /// Lets Manager accounts file access requests for themselves.
    pub managers_may_request: bool,
}

impl AccessPolicy {
    pub fn new(managers_may_request: bool) -> Self {
        Self { managers_may_request }
    }

    pub fn allows(&self, role: Role, action: Action) -> bool {
        use Action::*;
        use Role::*;

        match (action, role) {
            (CreateSoftware, Admin) => true,
            (CreateSoftware, _) => false,

            (ViewSoftware | ListOwnRequests | ViewDashboard, _) => true,

            (CreateRequest, Employee | Admin) => true,
            (CreateRequest, Manager) => self.managers_may_request,

            (ListPendingRequests | DecideRequest, Manager | Admin) => true,
            (ListPendingRequests | DecideRequest, Employee) => false,
        }
    }

    /// Roles granted `action` under this policy, in declaration order.
    pub fn roles_for(&self, action: Action) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.allows(*role, action))
            .collect()
    }

    /// Fail with `Forbidden` unless `role` may perform `action`.
    pub fn require(&self, role: Role, action: Action) -> DomainResult<()> {
        if self.allows(role, action) {
            return Ok(());
        }

        warn!(%role, %action, "authorization denied");

        let required = self
            .roles_for(action)
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" or ");
        Err(DomainError::forbidden(format!(
            "Access denied. Required role: {required}"
        )))
    }
}

/// Reference policy check (Managers may not create requests).
pub fn authorize(role: Role, action: Action) -> bool {
    AccessPolicy::default().allows(role, action)
}
