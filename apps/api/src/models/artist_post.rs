use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Portfolio record. Exactly one per artisan (`artisan_id` is unique).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArtistPostRow {
    pub id: Uuid,
    pub artisan_id: Uuid,
    pub title: String,
    pub craft: String,
    pub bio: String,
    pub location: Option<String>,
    pub image_keys: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
