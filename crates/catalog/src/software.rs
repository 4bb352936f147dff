use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use accessgate_core::{DomainError, DomainResult, FieldViolation, SoftwareId, UserId};

use crate::{AccessLevel, AccessLevels};

/// Registered software that employees may request access to.
///
/// # Invariants
/// - `name` is non-empty (trimmed) and unique across the catalog (enforced by the store).
/// - `description` is non-empty.
/// - `access_levels` is a non-empty set of distinct levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareEntry {
    pub id: SoftwareId,
    pub name: String,
    pub description: String,
    pub access_levels: AccessLevels,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl SoftwareEntry {
    pub fn offers(&self, level: AccessLevel) -> bool {
        self.access_levels.contains(level)
    }
}

/// Registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSoftware {
    pub name: String,
    pub description: String,
    pub access_levels: Vec<AccessLevel>,
}

impl NewSoftware {
    /// Validate every field and build the entry. All violations are reported at once.
    pub fn into_entry(
        self,
        id: SoftwareId,
        created_by: UserId,
        created_at: DateTime<Utc>,
    ) -> DomainResult<SoftwareEntry> {
        let mut violations = Vec::new();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            violations.push(FieldViolation::new("name", "Name is required"));
        }

        let description = self.description.trim().to_string();
        if description.is_empty() {
            violations.push(FieldViolation::new("description", "Description is required"));
        }

        let access_levels = match AccessLevels::new(self.access_levels) {
            Ok(levels) => Some(levels),
            Err(DomainError::Validation(mut v)) => {
                violations.append(&mut v);
                None
            }
            Err(other) => return Err(other),
        };

        DomainError::check(violations)?;
        let Some(access_levels) = access_levels else {
            return Err(DomainError::internal("access levels missing after validation"));
        };

        Ok(SoftwareEntry {
            id,
            name,
            description,
            access_levels,
            created_by,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_software(name: &str, description: &str, levels: Vec<AccessLevel>) -> NewSoftware {
        NewSoftware {
            name: name.to_string(),
            description: description.to_string(),
            access_levels: levels,
        }
    }

    #[test]
    fn builds_trimmed_entry() {
        let entry = new_software("  Tool X ", "Build tooling", vec![AccessLevel::Read, AccessLevel::Write])
            .into_entry(SoftwareId::new(), UserId::new(), Utc::now())
            .unwrap();

        assert_eq!(entry.name, "Tool X");
        assert!(entry.offers(AccessLevel::Write));
        assert!(!entry.offers(AccessLevel::Admin));
    }

    #[test]
    fn reports_every_violation() {
        let err = new_software(" ", "", vec![])
            .into_entry(SoftwareId::new(), UserId::new(), Utc::now())
            .unwrap_err();

        let DomainError::Validation(violations) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["name", "description", "accessLevels"]);
    }

    #[test]
    fn serializes_in_camel_case() {
        let entry = new_software("Tool X", "Build tooling", vec![AccessLevel::Read])
            .into_entry(SoftwareId::new(), UserId::new(), Utc::now())
            .unwrap();

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["accessLevels"], serde_json::json!(["Read"]));
        assert!(json.get("createdBy").is_some());
    }
}
