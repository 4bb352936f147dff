use serde::{Deserialize, Serialize};

use accessgate_auth::{NewUser, Password, Role, UserProfile};
use accessgate_catalog::{AccessLevel, NewSoftware};
use accessgate_core::{DomainError, DomainResult, FieldViolation, SoftwareId};
use accessgate_requests::Decision;

// -------------------------
// Request DTOs
// -------------------------

// Absent fields deserialize to empty values so that they surface as field
// violations rather than as unreadable bodies.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl SignupRequest {
    pub fn into_new_user(self) -> NewUser {
        let mut user = NewUser::new(self.username, self.password).with_role(self.role.unwrap_or_default());
        if let Some(confirm) = self.confirm_password {
            user = user.with_confirmation(confirm);
        }
        user
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn password(&self) -> Password {
        Password::new(self.password.clone())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSoftwareRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub access_levels: Vec<AccessLevel>,
}

impl From<CreateSoftwareRequest> for NewSoftware {
    fn from(body: CreateSoftwareRequest) -> Self {
        NewSoftware {
            name: body.name,
            description: body.description,
            access_levels: body.access_levels,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccessRequest {
    #[serde(default)]
    pub software_id: Option<SoftwareId>,
    #[serde(default)]
    pub access_type: Option<AccessLevel>,
    #[serde(default)]
    pub reason: String,
}

impl CreateAccessRequest {
    /// Presence checks; the engine owns the rest.
    pub fn required(self) -> DomainResult<(SoftwareId, AccessLevel, String)> {
        let mut violations = Vec::new();
        if self.software_id.is_none() {
            violations.push(FieldViolation::new("softwareId", "Software is required"));
        }
        if self.access_type.is_none() {
            violations.push(FieldViolation::new("accessType", "Access type is required"));
        }
        match (self.software_id, self.access_type) {
            (Some(software_id), Some(access_type)) => Ok((software_id, access_type, self.reason)),
            _ => Err(DomainError::Validation(violations)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DecideRequestBody {
    #[serde(default)]
    pub status: Option<Decision>,
}

impl DecideRequestBody {
    pub fn decision(&self) -> DomainResult<Decision> {
        self.status
            .ok_or_else(|| DomainError::validation("status", "Status must be Approved or Rejected"))
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signup_defaults_to_employee() {
        let body: SignupRequest =
            serde_json::from_value(json!({"username": "alice", "password": "secret1"})).unwrap();
        let user = body.into_new_user();
        assert_eq!(user.role, Role::Employee);
        assert!(user.confirm_password.is_none());
    }

    #[test]
    fn signup_carries_confirmation_and_role() {
        let body: SignupRequest = serde_json::from_value(json!({
            "username": "boss",
            "password": "secret1",
            "confirmPassword": "secret2",
            "role": "Manager"
        }))
        .unwrap();
        let user = body.into_new_user();
        assert_eq!(user.role, Role::Manager);
        assert!(user.validate().is_err());
    }

    #[test]
    fn missing_request_fields_are_reported_together() {
        let body: CreateAccessRequest = serde_json::from_value(json!({"reason": "x"})).unwrap();
        let DomainError::Validation(violations) = body.required().unwrap_err() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["softwareId", "accessType"]);
    }

    #[test]
    fn unknown_decision_is_unreadable() {
        assert!(serde_json::from_value::<DecideRequestBody>(json!({"status": "Pending"})).is_err());
        let empty: DecideRequestBody = serde_json::from_value(json!({})).unwrap();
        assert!(empty.decision().is_err());
    }
}
