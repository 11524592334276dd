use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::connection::{ConnectionRow, ConnectionStatus};

/// A connection as seen by one of its parties.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ConnectionListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub connection: ConnectionRow,
    pub counterparty_id: Uuid,
    pub counterparty_name: String,
    pub counterparty_role: String,
    pub counterparty_location: Option<String>,
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ConnectionRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ConnectionRow>("SELECT * FROM connections WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Loads a connection or fails with 404.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<ConnectionRow, AppError> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Connection {id} not found")))
}

pub async fn find_pair(
    pool: &PgPool,
    ngo_id: Uuid,
    artisan_id: Uuid,
) -> Result<Option<ConnectionRow>, AppError> {
    Ok(sqlx::query_as::<_, ConnectionRow>(
        "SELECT * FROM connections WHERE ngo_id = $1 AND artisan_id = $2",
    )
    .bind(ngo_id)
    .bind(artisan_id)
    .fetch_optional(pool)
    .await?)
}

pub async fn insert_pending(
    pool: &PgPool,
    ngo_id: Uuid,
    artisan_id: Uuid,
    requested_by: Uuid,
) -> Result<ConnectionRow, AppError> {
    sqlx::query_as::<_, ConnectionRow>(
        r#"
        INSERT INTO connections (id, ngo_id, artisan_id, requested_by, status)
        VALUES ($1, $2, $3, $4, 'pending')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(ngo_id)
    .bind(artisan_id)
    .bind(requested_by)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_insert(e, "A connection between you already exists"))
}

/// Turns a rejected connection back into a pending request from `requested_by`.
pub async fn reopen(
    pool: &PgPool,
    id: Uuid,
    requested_by: Uuid,
) -> Result<ConnectionRow, AppError> {
    sqlx::query_as::<_, ConnectionRow>(
        r#"
        UPDATE connections
        SET status = 'pending', requested_by = $2, created_at = now(), responded_at = NULL
        WHERE id = $1 AND status = 'rejected'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(requested_by)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Connection changed concurrently, retry".to_string()))
}

/// Moves a pending connection to `status`. Guarded so only one response wins.
pub async fn respond(
    pool: &PgPool,
    id: Uuid,
    status: ConnectionStatus,
) -> Result<ConnectionRow, AppError> {
    sqlx::query_as::<_, ConnectionRow>(
        r#"
        UPDATE connections
        SET status = $2, responded_at = now()
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict("Connection is no longer pending".to_string()))
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM connections WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<ConnectionStatus>,
) -> Result<Vec<ConnectionListing>, AppError> {
    Ok(sqlx::query_as::<_, ConnectionListing>(
        r#"
        SELECT c.*,
               u.id AS counterparty_id,
               u.display_name AS counterparty_name,
               u.role AS counterparty_role,
               u.location AS counterparty_location
        FROM connections c
        JOIN users u ON u.id = CASE WHEN c.ngo_id = $1 THEN c.artisan_id ELSE c.ngo_id END
        WHERE (c.ngo_id = $1 OR c.artisan_id = $1)
          AND ($2::text IS NULL OR c.status = $2)
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?)
}

/// Number of accepted connections a user has.
pub async fn count_accepted(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM connections
        WHERE (ngo_id = $1 OR artisan_id = $1) AND status = 'accepted'
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?)
}
