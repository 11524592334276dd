use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub artisan_id: Uuid,
    pub title: String,
    pub description: String,
    pub craft: String,
    pub price_minor: i64,
    pub currency: String,
    pub stock: i32,
    pub image_keys: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
