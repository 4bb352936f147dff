//! Shared fixtures for workflow tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use accessgate_auth::{AccessPolicy, Argon2Hasher, Hs256TokenService, Identity, NewUser, Role};
use accessgate_core::Clock;

use super::{Workflow, WorkflowDeps};
use crate::store::Stores;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub struct Harness {
    pub workflow: Workflow,
    pub stores: Stores,
}

impl Harness {
    /// Sign up a user with `role` and return the identity its token would carry.
    pub async fn user(&self, username: &str, role: Role) -> Identity {
        let profile = self
            .workflow
            .gateway
            .signup(NewUser::new(username, "password1").with_role(role))
            .await
            .unwrap();
        Identity::new(profile.id, profile.username, profile.role)
    }
}

pub fn harness() -> Harness {
    harness_with(Arc::new(ManualClock::default()), AccessPolicy::default())
}

pub fn harness_with_clock(clock: Arc<ManualClock>) -> Harness {
    harness_with(clock, AccessPolicy::default())
}

pub fn harness_with(clock: Arc<ManualClock>, policy: AccessPolicy) -> Harness {
    let stores = Stores::in_memory();
    let workflow = Workflow::new(WorkflowDeps {
        stores: stores.clone(),
        hasher: Arc::new(Argon2Hasher::with_cost(1024, 1).unwrap()),
        tokens: Arc::new(Hs256TokenService::new(b"test-secret")),
        policy,
        clock,
    })
    .unwrap();
    Harness { workflow, stores }
}
