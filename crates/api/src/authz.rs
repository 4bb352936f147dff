//! API-side authorization guard.
//!
//! Handlers call this before looking at the request body, so a caller without
//! the role learns nothing from validation or existence errors. The workflow
//! services repeat the same check.

use accessgate_auth::{AccessPolicy, Action};

use crate::app::errors;
use crate::context::CallerContext;

pub fn authorize_action(
    policy: &AccessPolicy,
    caller: &CallerContext,
    action: Action,
) -> Result<(), axum::response::Response> {
    policy
        .require(caller.role(), action)
        .map_err(errors::domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessgate_auth::{Identity, Role};
    use accessgate_core::UserId;
    use axum::http::StatusCode;

    fn caller(role: Role) -> CallerContext {
        CallerContext::new(Identity::new(UserId::new(), "someone", role))
    }

    #[test]
    fn denied_actions_become_403() {
        let policy = AccessPolicy::default();
        let res = authorize_action(&policy, &caller(Role::Employee), Action::DecideRequest).unwrap_err();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(authorize_action(&policy, &caller(Role::Manager), Action::DecideRequest).is_ok());
    }
}
