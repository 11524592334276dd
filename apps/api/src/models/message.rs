use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
}

impl MessageRow {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// API shape of a message. Soft-deleted messages become tombstones with no content.
#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: Uuid,
    pub connection_id: Uuid,
    pub sender_id: Uuid,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<MessageRow> for MessageView {
    fn from(row: MessageRow) -> Self {
        let is_deleted = row.is_deleted();
        MessageView {
            id: row.id,
            connection_id: row.connection_id,
            sender_id: row.sender_id,
            content: if is_deleted { None } else { Some(row.content) },
            created_at: row.created_at,
            edited_at: if is_deleted { None } else { row.edited_at },
            is_deleted,
            read_at: row.read_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(deleted: bool) -> MessageRow {
        MessageRow {
            id: Uuid::new_v4(),
            connection_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            content: "Can you ship 40 shawls by March?".to_string(),
            created_at: Utc::now(),
            edited_at: Some(Utc::now()),
            deleted_at: deleted.then(Utc::now),
            read_at: None,
        }
    }

    #[test]
    fn test_live_message_keeps_content() {
        let view = MessageView::from(row(false));
        assert!(!view.is_deleted);
        assert_eq!(view.content.as_deref(), Some("Can you ship 40 shawls by March?"));
        assert!(view.edited_at.is_some());
    }

    #[test]
    fn test_deleted_message_is_a_tombstone() {
        let view = MessageView::from(row(true));
        assert!(view.is_deleted);
        assert!(view.content.is_none());
        assert!(view.edited_at.is_none());
    }
}
