use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use accessgate_catalog::{AccessLevel, AccessLevels};
use accessgate_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, FieldViolation, RequestId, SoftwareId,
    UserId,
};

pub const MIN_REASON_LEN: usize = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

/// Request lifecycle status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    /// Approved and Rejected have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl core::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RequestStatus::Pending),
            "Approved" => Ok(RequestStatus::Approved),
            "Rejected" => Ok(RequestStatus::Rejected),
            other => Err(DomainError::validation(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

/// Outcome a Manager/Admin may record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for RequestStatus {
    fn from(value: Decision) -> Self {
        match value {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Aggregate root: AccessRequest.
///
/// # Invariants
/// - `access_type` was offered by the software entry at submission time.
/// - `status` moves Pending → Approved | Rejected at most once.
/// - `updated_by` is `Some` exactly when `status` is terminal.
/// - `updated_at == created_at` while Pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub id: RequestId,
    pub user_id: UserId,
    pub software_id: SoftwareId,
    pub access_type: AccessLevel,
    pub reason: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<UserId>,
    /// 0 = not yet submitted, 1 = submitted, 2 = decided.
    #[serde(skip)]
    pub version: u64,
}

impl AccessRequest {
    /// Blank aggregate awaiting a `Submit` command.
    pub fn empty(id: RequestId) -> Self {
        let epoch = DateTime::<Utc>::default();
        Self {
            id,
            user_id: UserId::from_uuid(Default::default()),
            software_id: SoftwareId::from_uuid(Default::default()),
            access_type: AccessLevel::Read,
            reason: String::new(),
            status: RequestStatus::Pending,
            created_at: epoch,
            updated_at: epoch,
            updated_by: None,
            version: 0,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.version > 0
    }

    /// Run a command and apply its events, returning them for logging.
    pub fn execute(&mut self, command: &RequestCommand) -> DomainResult<Vec<RequestEvent>> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}

impl AggregateRoot for AccessRequest {
    type Id = RequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub request_id: RequestId,
    pub user_id: UserId,
    pub software_id: SoftwareId,
    /// Levels the referenced software offers right now.
    pub offered_levels: AccessLevels,
    pub access_type: AccessLevel,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecideRequest {
    pub request_id: RequestId,
    pub decided_by: UserId,
    pub decision: Decision,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestCommand {
    Submit(SubmitRequest),
    Decide(DecideRequest),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSubmitted {
    pub request_id: RequestId,
    pub user_id: UserId,
    pub software_id: SoftwareId,
    pub access_type: AccessLevel,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDecided {
    pub request_id: RequestId,
    pub decided_by: UserId,
    pub status: RequestStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RequestEvent {
    Submitted(RequestSubmitted),
    Decided(RequestDecided),
}

impl RequestEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            RequestEvent::Submitted(_) => "requests.submitted",
            RequestEvent::Decided(_) => "requests.decided",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Reason must carry a real justification (trimmed length).
pub fn validate_reason(reason: &str) -> DomainResult<()> {
    if reason.trim().chars().count() < MIN_REASON_LEN {
        return Err(DomainError::Validation(vec![FieldViolation::new(
            "reason",
            format!(
                "Please provide a detailed justification (at least {MIN_REASON_LEN} characters)"
            ),
        )]));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for AccessRequest {
    type Command = RequestCommand;
    type Event = RequestEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            RequestEvent::Submitted(e) => {
                self.id = e.request_id;
                self.user_id = e.user_id;
                self.software_id = e.software_id;
                self.access_type = e.access_type;
                self.reason = e.reason.clone();
                self.status = RequestStatus::Pending;
                self.created_at = e.occurred_at;
                self.updated_at = e.occurred_at;
                self.updated_by = None;
            }
            RequestEvent::Decided(e) => {
                self.status = e.status;
                self.updated_by = Some(e.decided_by);
                self.updated_at = e.occurred_at;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            RequestCommand::Submit(cmd) => self.handle_submit(cmd),
            RequestCommand::Decide(cmd) => self.handle_decide(cmd),
        }
    }
}

impl AccessRequest {
    fn handle_submit(&self, cmd: &SubmitRequest) -> DomainResult<Vec<RequestEvent>> {
        if self.is_submitted() {
            return Err(DomainError::conflict(format!(
                "request {} already exists",
                self.id
            )));
        }

        if !cmd.offered_levels.contains(cmd.access_type) {
            return Err(DomainError::invalid_argument(format!(
                "Access type \"{}\" is not available for this software",
                cmd.access_type
            )));
        }

        validate_reason(&cmd.reason)?;

        Ok(vec![RequestEvent::Submitted(RequestSubmitted {
            request_id: cmd.request_id,
            user_id: cmd.user_id,
            software_id: cmd.software_id,
            access_type: cmd.access_type,
            reason: cmd.reason.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_decide(&self, cmd: &DecideRequest) -> DomainResult<Vec<RequestEvent>> {
        if !self.is_submitted() {
            return Err(DomainError::not_found("request"));
        }

        if self.status.is_terminal() {
            return Err(DomainError::conflict(format!(
                "request {} was already {}",
                self.id,
                self.status.as_str().to_lowercase()
            )));
        }

        Ok(vec![RequestEvent::Decided(RequestDecided {
            request_id: self.id,
            decided_by: cmd.decided_by,
            status: cmd.decision.into(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn submit_cmd(id: RequestId, access_type: AccessLevel, reason: &str) -> RequestCommand {
        RequestCommand::Submit(SubmitRequest {
            request_id: id,
            user_id: UserId::new(),
            software_id: SoftwareId::new(),
            offered_levels: AccessLevels::new(vec![AccessLevel::Read, AccessLevel::Write]).unwrap(),
            access_type,
            reason: reason.to_string(),
            occurred_at: t0(),
        })
    }

    fn decide_cmd(id: RequestId, by: UserId, decision: Decision, at: DateTime<Utc>) -> RequestCommand {
        RequestCommand::Decide(DecideRequest {
            request_id: id,
            decided_by: by,
            decision,
            occurred_at: at,
        })
    }

    fn submitted() -> AccessRequest {
        let id = RequestId::new();
        let mut request = AccessRequest::empty(id);
        request
            .execute(&submit_cmd(id, AccessLevel::Write, "Need to deploy builds"))
            .unwrap();
        request
    }

    #[test]
    fn execute_returns_the_emitted_events() {
        let id = RequestId::new();
        let mut request = AccessRequest::empty(id);
        let events = request
            .execute(&submit_cmd(id, AccessLevel::Read, "Quarterly reporting access"))
            .unwrap();
        let kinds: Vec<_> = events.iter().map(RequestEvent::event_type).collect();
        assert_eq!(kinds, ["requests.submitted"]);

        let events = request
            .execute(&decide_cmd(id, UserId::new(), Decision::Rejected, t0() + Duration::hours(1)))
            .unwrap();
        let kinds: Vec<_> = events.iter().map(RequestEvent::event_type).collect();
        assert_eq!(kinds, ["requests.decided"]);
    }

    #[test]
    fn submit_starts_pending_with_equal_timestamps() {
        let request = submitted();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.created_at, request.updated_at);
        assert_eq!(request.updated_by, None);
        assert_eq!(request.version, 1);
    }

    #[test]
    fn submit_rejects_unoffered_level() {
        let id = RequestId::new();
        let err = AccessRequest::empty(id)
            .handle(&submit_cmd(id, AccessLevel::Admin, "Need to manage users"))
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::invalid_argument("Access type \"Admin\" is not available for this software")
        );
    }

    #[test]
    fn submit_rejects_short_reason() {
        let id = RequestId::new();
        let err = AccessRequest::empty(id)
            .handle(&submit_cmd(id, AccessLevel::Read, "   too short   "))
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn decide_records_actor_and_time() {
        let mut request = submitted();
        let manager = UserId::new();
        let later = t0() + Duration::minutes(30);

        request
            .execute(&decide_cmd(request.id, manager, Decision::Approved, later))
            .unwrap();

        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.updated_by, Some(manager));
        assert_eq!(request.updated_at, later);
        assert_eq!(request.version, 2);
    }

    #[test]
    fn second_decision_is_a_conflict() {
        let mut request = submitted();
        request
            .execute(&decide_cmd(request.id, UserId::new(), Decision::Rejected, t0()))
            .unwrap();

        let err = request
            .handle(&decide_cmd(request.id, UserId::new(), Decision::Approved, t0()))
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(request.status, RequestStatus::Rejected);
    }

    #[test]
    fn deciding_unsubmitted_request_is_not_found() {
        let request = AccessRequest::empty(RequestId::new());
        let err = request
            .handle(&decide_cmd(request.id, UserId::new(), Decision::Approved, t0()))
            .unwrap_err();
        assert_eq!(err, DomainError::not_found("request"));
    }

    #[test]
    fn serializes_without_version() {
        let json = serde_json::to_value(submitted()).unwrap();
        assert!(json.get("version").is_none());
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["updatedBy"], serde_json::Value::Null);
    }

    fn any_decision() -> impl Strategy<Value = Decision> {
        prop_oneof![Just(Decision::Approved), Just(Decision::Rejected)]
    }

    proptest! {
        /// Only the first decision sticks; every later one is a conflict.
        #[test]
        fn only_first_decision_applies(decisions in prop::collection::vec(any_decision(), 1..8)) {
            let mut request = submitted();
            let first = decisions[0];

            for (i, decision) in decisions.iter().enumerate() {
                let result = request.execute(&decide_cmd(request.id, UserId::new(), *decision, t0()));
                if i == 0 {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert!(matches!(result, Err(DomainError::Conflict(_))));
                }
            }

            prop_assert_eq!(request.status, RequestStatus::from(first));
            prop_assert!(request.updated_by.is_some());
            prop_assert_eq!(request.version, 2);
        }
    }
}
