use core::str::FromStr;

use serde::{Deserialize, Serialize};

use accessgate_core::DomainError;

/// A user's fixed authorization class.
///
/// Closed set: every capability check matches on this enum, never on strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Employee, Role::Manager, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Employee" => Ok(Role::Employee),
            "Manager" => Ok(Role::Manager),
            "Admin" => Ok(Role::Admin),
            other => Err(DomainError::validation(
                "role",
                format!("unknown role '{other}' (expected Employee, Manager or Admin)"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_its_own_display() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn role_names_are_case_sensitive() {
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn defaults_to_employee() {
        assert_eq!(Role::default(), Role::Employee);
    }
}
