use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "pending",
            ConnectionStatus::Accepted => "accepted",
            ConnectionStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ConnectionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConnectionStatus::Pending),
            "accepted" => Ok(ConnectionStatus::Accepted),
            "rejected" => Ok(ConnectionStatus::Rejected),
            other => Err(AppError::Validation(format!(
                "unknown connection status '{other}'"
            ))),
        }
    }
}

/// One NGO–artisan relationship. `(ngo_id, artisan_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConnectionRow {
    pub id: Uuid,
    pub ngo_id: Uuid,
    pub artisan_id: Uuid,
    pub requested_by: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl ConnectionRow {
    pub fn status(&self) -> Result<ConnectionStatus, AppError> {
        self.status.parse()
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.ngo_id == user_id || self.artisan_id == user_id
    }

    /// The other party, if `user_id` is one of the two.
    pub fn counterparty(&self, user_id: Uuid) -> Option<Uuid> {
        if self.ngo_id == user_id {
            Some(self.artisan_id)
        } else if self.artisan_id == user_id {
            Some(self.ngo_id)
        } else {
            None
        }
    }
}
