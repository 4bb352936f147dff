use core::str::FromStr;

use serde::{Deserialize, Serialize};

use accessgate_core::{DomainError, DomainResult};

/// Level of access a software entry offers and a request seeks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessLevel {
    Read,
    Write,
    Admin,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 3] = [AccessLevel::Read, AccessLevel::Write, AccessLevel::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Read => "Read",
            AccessLevel::Write => "Write",
            AccessLevel::Admin => "Admin",
        }
    }
}

impl core::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Read" => Ok(AccessLevel::Read),
            "Write" => Ok(AccessLevel::Write),
            "Admin" => Ok(AccessLevel::Admin),
            other => Err(DomainError::validation(
                "accessLevel",
                format!("unknown access level '{other}' (expected Read, Write or Admin)"),
            )),
        }
    }
}

/// Non-empty list of distinct access levels, in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessLevels(Vec<AccessLevel>);

impl AccessLevels {
    pub fn new(levels: Vec<AccessLevel>) -> DomainResult<Self> {
        if levels.is_empty() {
            return Err(DomainError::validation(
                "accessLevels",
                "At least one access level is required",
            ));
        }
        for (i, level) in levels.iter().enumerate() {
            if levels[..i].contains(level) {
                return Err(DomainError::validation(
                    "accessLevels",
                    format!("Access level \"{level}\" is listed more than once"),
                ));
            }
        }
        Ok(Self(levels))
    }

    pub fn contains(&self, level: AccessLevel) -> bool {
        self.0.contains(&level)
    }

    pub fn as_slice(&self) -> &[AccessLevel] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessLevel> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for AccessLevels {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let levels = Vec::<AccessLevel>::deserialize(deserializer)?;
        AccessLevels::new(levels).map_err(serde::de::Error::custom)
    }
}
