use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Whether generated content came from the text model or a canned fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Llm,
    Fallback,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentSource::Llm => "llm",
            ContentSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArtStoryRow {
    pub id: Uuid,
    pub requested_by: Uuid,
    pub art_form: String,
    pub region: Option<String>,
    pub title: String,
    pub summary: String,
    pub sections: Json<Vec<StorySection>>,
    pub key_facts: Vec<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}
