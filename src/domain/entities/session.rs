use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::entities::resource::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    MinistryOfEducation,
    ServiceProvider,
    Institution,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::MinistryOfEducation => "MINISTRY_OF_EDUCATION",
            Role::ServiceProvider => "SERVICE_PROVIDER",
            Role::Institution => "INSTITUTION",
        }
    }

    pub fn dashboard_title(self) -> &'static str {
        match self {
            Role::MinistryOfEducation => "Ministry of Education",
            Role::ServiceProvider => "Service Provider",
            Role::Institution => "Institution",
        }
    }

    /// Collections visible on this role's dashboard.
    pub fn resources(self) -> &'static [ResourceKind] {
        match self {
            Role::MinistryOfEducation => &ResourceKind::ALL,
            Role::ServiceProvider => &[
                ResourceKind::Institutions,
                ResourceKind::Programs,
                ResourceKind::Students,
            ],
            Role::Institution => &[
                ResourceKind::Programs,
                ResourceKind::Staff,
                ResourceKind::Students,
            ],
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MINISTRY_OF_EDUCATION" | "MOE" => Ok(Role::MinistryOfEducation),
            "SERVICE_PROVIDER" | "SP" => Ok(Role::ServiceProvider),
            "INSTITUTION" => Ok(Role::Institution),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Authenticated user, read-only once hydrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
