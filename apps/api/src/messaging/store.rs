use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::message::MessageRow;

/// One accepted connection with its latest live message and the caller's unread count.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConversationRow {
    pub connection_id: Uuid,
    pub counterparty_id: Uuid,
    pub counterparty_name: String,
    pub counterparty_role: String,
    pub last_message_id: Option<Uuid>,
    pub last_sender_id: Option<Uuid>,
    pub last_content: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
}

/// Loads a message or fails with 404.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<MessageRow, AppError> {
    sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Message {id} not found")))
}

/// Returns up to `limit` messages older than `before`, oldest first.
pub async fn list_page(
    pool: &PgPool,
    connection_id: Uuid,
    before: Option<DateTime<Utc>>,
    limit: i64,
) -> Result<Vec<MessageRow>, AppError> {
    let mut rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT * FROM messages
        WHERE connection_id = $1
          AND ($2::timestamptz IS NULL OR created_at < $2)
        ORDER BY created_at DESC, id DESC
        LIMIT $3
        "#,
    )
    .bind(connection_id)
    .bind(before)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    rows.reverse();
    Ok(rows)
}

pub async fn insert(
    pool: &PgPool,
    connection_id: Uuid,
    sender_id: Uuid,
    content: &str,
) -> Result<MessageRow, AppError> {
    Ok(sqlx::query_as::<_, MessageRow>(
        r#"
        INSERT INTO messages (id, connection_id, sender_id, content)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(connection_id)
    .bind(sender_id)
    .bind(content)
    .fetch_one(pool)
    .await?)
}

/// Replaces the content of a live message and stamps `edited_at`.
pub async fn edit(pool: &PgPool, id: Uuid, content: &str) -> Result<MessageRow, AppError> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        UPDATE messages
        SET content = $2, edited_at = now()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(content)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Message has been deleted".to_string()))
}

pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<MessageRow, AppError> {
    sqlx::query_as::<_, MessageRow>(
        r#"
        UPDATE messages
        SET deleted_at = now()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Message has already been deleted".to_string()))
}

/// Marks every unread live message sent by the other party as read.
pub async fn mark_read(pool: &PgPool, connection_id: Uuid, reader_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET read_at = now()
        WHERE connection_id = $1
          AND sender_id <> $2
          AND read_at IS NULL
          AND deleted_at IS NULL
        "#,
    )
    .bind(connection_id)
    .bind(reader_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn conversations(pool: &PgPool, user_id: Uuid) -> Result<Vec<ConversationRow>, AppError> {
    Ok(sqlx::query_as::<_, ConversationRow>(
        r#"
        SELECT c.id AS connection_id,
               u.id AS counterparty_id,
               u.display_name AS counterparty_name,
               u.role AS counterparty_role,
               lm.id AS last_message_id,
               lm.sender_id AS last_sender_id,
               lm.content AS last_content,
               lm.created_at AS last_message_at,
               (SELECT COUNT(*) FROM messages m
                WHERE m.connection_id = c.id
                  AND m.sender_id <> $1
                  AND m.read_at IS NULL
                  AND m.deleted_at IS NULL) AS unread_count
        FROM connections c
        JOIN users u ON u.id = CASE WHEN c.ngo_id = $1 THEN c.artisan_id ELSE c.ngo_id END
        LEFT JOIN LATERAL (
            SELECT id, sender_id, content, created_at
            FROM messages
            WHERE connection_id = c.id AND deleted_at IS NULL
            ORDER BY created_at DESC
            LIMIT 1
        ) lm ON TRUE
        WHERE c.status = 'accepted' AND (c.ngo_id = $1 OR c.artisan_id = $1)
        ORDER BY COALESCE(lm.created_at, c.responded_at, c.created_at) DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}
