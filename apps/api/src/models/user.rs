use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// Account role. Roles are fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Artisan,
    Ngo,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Artisan => "artisan",
            Role::Ngo => "ngo",
            Role::User => "user",
        }
    }

    /// Artisans and NGOs are the two sides of a Connection and can receive donations.
    pub fn is_partner(&self) -> bool {
        matches!(self, Role::Artisan | Role::Ngo)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artisan" => Ok(Role::Artisan),
            "ngo" => Ok(Role::Ngo),
            "user" => Ok(Role::User),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "unknown role '{other}' in storage"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> Result<Role, AppError> {
        self.role.parse()
    }
}
