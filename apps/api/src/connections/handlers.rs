use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{find_role, AuthUser};
use crate::connections::policy::{
    assign_pair, check_decision, check_removal, plan_request, Decision, RequestPlan,
};
use crate::connections::store::{self, ConnectionListing};
use crate::errors::AppError;
use crate::models::connection::{ConnectionRow, ConnectionStatus};
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub target_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ConnectionFilter {
    pub status: Option<String>,
}

/// POST /api/v1/connections
pub async fn handle_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ConnectRequest>,
) -> Result<(StatusCode, Json<ConnectionRow>), AppError> {
    auth.require_role(&[Role::Ngo, Role::Artisan])?;

    let target_role = find_role(&state.db, req.target_id).await?;
    let (ngo_id, artisan_id) = assign_pair(auth.id, auth.role, req.target_id, target_role)?;

    let existing = store::find_pair(&state.db, ngo_id, artisan_id).await?;
    let existing_status = existing.as_ref().map(ConnectionRow::status).transpose()?;

    let connection = match (plan_request(existing_status)?, existing) {
        (RequestPlan::Reopen, Some(row)) => store::reopen(&state.db, row.id, auth.id).await?,
        _ => store::insert_pending(&state.db, ngo_id, artisan_id, auth.id).await?,
    };

    info!(
        "Connection {} requested by {} (ngo={}, artisan={})",
        connection.id, auth.id, ngo_id, artisan_id
    );
    Ok((StatusCode::CREATED, Json(connection)))
}

/// POST /api/v1/connections/:id/accept
pub async fn handle_accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionRow>, AppError> {
    decide(&state, auth, id, Decision::Accept).await.map(Json)
}

/// POST /api/v1/connections/:id/reject
pub async fn handle_reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ConnectionRow>, AppError> {
    decide(&state, auth, id, Decision::Reject).await.map(Json)
}

async fn decide(
    state: &AppState,
    auth: AuthUser,
    id: Uuid,
    decision: Decision,
) -> Result<ConnectionRow, AppError> {
    let connection = store::get(&state.db, id).await?;
    check_decision(&connection, auth.id)?;
    let updated = store::respond(&state.db, id, decision.target_status()).await?;
    info!("Connection {} is now {} (by {})", id, updated.status, auth.id);
    Ok(updated)
}

/// DELETE /api/v1/connections/:id
pub async fn handle_remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let connection = store::get(&state.db, id).await?;
    check_removal(&connection, auth.id)?;
    store::delete(&state.db, id).await?;
    info!("Connection {} removed by {}", id, auth.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/connections?status=
pub async fn handle_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<ConnectionFilter>,
) -> Result<Json<Vec<ConnectionListing>>, AppError> {
    let status = filter
        .status
        .as_deref()
        .map(str::parse::<ConnectionStatus>)
        .transpose()?;
    let connections = store::list_for_user(&state.db, auth.id, status).await?;
    Ok(Json(connections))
}
