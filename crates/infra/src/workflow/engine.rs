//! Access request lifecycle: submit, list, decide.

use std::sync::Arc;

use tracing::{info, warn};

use accessgate_auth::{AccessPolicy, Action, Identity};
use accessgate_catalog::AccessLevel;
use accessgate_core::{Clock, DomainError, DomainResult, ExpectedVersion, RequestId, SoftwareId};
use accessgate_requests::{
    AccessRequest, DecideRequest, Decision, RequestCommand, RequestEvent, RequestStatus,
    SubmitRequest,
};

use crate::store::{RequestStore, SoftwareStore, StoreError};

#[derive(Clone)]
pub struct AccessRequestEngine {
    requests: Arc<dyn RequestStore>,
    software: Arc<dyn SoftwareStore>,
    policy: AccessPolicy,
    clock: Arc<dyn Clock>,
}

impl AccessRequestEngine {
    pub fn new(
        requests: Arc<dyn RequestStore>,
        software: Arc<dyn SoftwareStore>,
        policy: AccessPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            software,
            policy,
            clock,
        }
    }

    /// File a Pending request on behalf of the caller.
    pub async fn create_request(
        &self,
        caller: &Identity,
        software_id: SoftwareId,
        access_type: AccessLevel,
        reason: &str,
    ) -> DomainResult<AccessRequest> {
        self.policy.require(caller.role, Action::CreateRequest)?;

        let software = self
            .software
            .get(software_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Software"))?;

        let id = RequestId::new();
        let mut request = AccessRequest::empty(id);
        let events = request.execute(&RequestCommand::Submit(SubmitRequest {
            request_id: id,
            user_id: caller.user_id,
            software_id,
            offered_levels: software.access_levels,
            access_type,
            reason: reason.to_string(),
            occurred_at: self.clock.now(),
        }))?;

        self.requests.insert(request.clone()).await?;

        info!(
            request_id = %request.id,
            events = ?event_types(&events),
            user_id = %caller.user_id,
            software_id = %software_id,
            access_type = %access_type,
            "access request submitted"
        );
        Ok(request)
    }

    /// The caller's own requests, newest first.
    pub async fn list_mine(&self, caller: &Identity) -> DomainResult<Vec<AccessRequest>> {
        self.policy.require(caller.role, Action::ListOwnRequests)?;
        Ok(self.requests.list_by_user(caller.user_id).await?)
    }

    /// Every Pending request, newest first.
    pub async fn list_pending(&self, caller: &Identity) -> DomainResult<Vec<AccessRequest>> {
        self.policy.require(caller.role, Action::ListPendingRequests)?;
        Ok(self.requests.list_by_status(RequestStatus::Pending).await?)
    }

    /// Approve or reject a Pending request.
    ///
    /// The write is conditional on the version that was loaded, so of two
    /// racing decisions only one is stored; the loser gets `Conflict`.
    pub async fn decide(
        &self,
        caller: &Identity,
        request_id: RequestId,
        decision: Decision,
    ) -> DomainResult<AccessRequest> {
        self.policy.require(caller.role, Action::DecideRequest)?;

        let mut request = self
            .requests
            .get(request_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Request"))?;
        let loaded = request.version;

        let events = request.execute(&RequestCommand::Decide(DecideRequest {
            request_id,
            decided_by: caller.user_id,
            decision,
            occurred_at: self.clock.now(),
        }))?;

        self.requests
            .save_decision(&request, ExpectedVersion::Exact(loaded))
            .await
            .map_err(|e| match e {
                StoreError::StaleVersion { .. } => {
                    warn!(request_id = %request_id, "decision lost to a concurrent update");
                    DomainError::conflict(format!("request {request_id} has already been decided"))
                }
                other => other.into(),
            })?;

        info!(
            request_id = %request_id,
            events = ?event_types(&events),
            decided_by = %caller.user_id,
            status = %request.status,
            "access request decided"
        );
        Ok(request)
    }
}

fn event_types(events: &[RequestEvent]) -> Vec<&'static str> {
    events.iter().map(RequestEvent::event_type).collect()
}
