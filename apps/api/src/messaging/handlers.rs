use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::connections::store as connection_store;
use crate::errors::AppError;
use crate::messaging::policy::{authorize_author, authorize_participant, page_size, validate_content};
use crate::messaging::store::{self, ConversationRow};
use crate::models::message::{MessageRow, MessageView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub limit: Option<u32>,
    /// Pass the `created_at` of the oldest message on screen to page backwards.
    pub before: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub marked_read: u64,
}

/// Loads a message and checks the caller may modify it.
async fn load_own_message(state: &AppState, auth: AuthUser, id: Uuid) -> Result<MessageRow, AppError> {
    let message = store::get(&state.db, id).await?;
    let connection = connection_store::get(&state.db, message.connection_id).await?;
    authorize_participant(&connection, auth.id)?;
    authorize_author(&message, auth.id)?;
    Ok(message)
}

/// GET /api/v1/connections/:id/messages
pub async fn handle_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(connection_id): Path<Uuid>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Vec<MessageView>>, AppError> {
    let connection = connection_store::get(&state.db, connection_id).await?;
    authorize_participant(&connection, auth.id)?;

    let rows = store::list_page(&state.db, connection_id, query.before, page_size(query.limit)).await?;
    Ok(Json(rows.into_iter().map(MessageView::from).collect()))
}

/// POST /api/v1/connections/:id/messages
pub async fn handle_send(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(connection_id): Path<Uuid>,
    Json(body): Json<MessageBody>,
) -> Result<(StatusCode, Json<MessageView>), AppError> {
    let connection = connection_store::get(&state.db, connection_id).await?;
    let recipient = authorize_participant(&connection, auth.id)?;
    let content = validate_content(&body.content)?;

    let message = store::insert(&state.db, connection_id, auth.id, &content).await?;
    info!(
        "Message {} sent on connection {} from {} to {}",
        message.id, connection_id, auth.id, recipient
    );
    Ok((StatusCode::CREATED, Json(MessageView::from(message))))
}

/// PATCH /api/v1/messages/:id
pub async fn handle_edit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<MessageBody>,
) -> Result<Json<MessageView>, AppError> {
    let content = validate_content(&body.content)?;
    load_own_message(&state, auth, id).await?;

    let message = store::edit(&state.db, id, &content).await?;
    info!("Message {} edited by {}", id, auth.id);
    Ok(Json(MessageView::from(message)))
}

/// DELETE /api/v1/messages/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageView>, AppError> {
    load_own_message(&state, auth, id).await?;

    let message = store::soft_delete(&state.db, id).await?;
    info!("Message {} deleted by {}", id, auth.id);
    Ok(Json(MessageView::from(message)))
}

/// POST /api/v1/connections/:id/messages/read
pub async fn handle_mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(connection_id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let connection = connection_store::get(&state.db, connection_id).await?;
    authorize_participant(&connection, auth.id)?;

    let marked_read = store::mark_read(&state.db, connection_id, auth.id).await?;
    Ok(Json(MarkReadResponse { marked_read }))
}

/// GET /api/v1/conversations
pub async fn handle_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ConversationRow>>, AppError> {
    Ok(Json(store::conversations(&state.db, auth.id).await?))
}
