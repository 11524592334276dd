use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{find_role, AuthUser};
use crate::donations::summary::{summarize, DonationSummary};
use crate::donations::validation::{normalize_currency, normalize_note, validate_amount};
use crate::errors::AppError;
use crate::models::donation::{DonationRow, ReceivedDonation};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DonateRequest {
    pub recipient_id: Uuid,
    pub amount_minor: i64,
    pub currency: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
}

/// All donations received by a user, newest first.
pub async fn received_by(pool: &sqlx::PgPool, recipient_id: Uuid) -> Result<Vec<DonationRow>, AppError> {
    Ok(sqlx::query_as::<_, DonationRow>(
        "SELECT * FROM donations WHERE recipient_id = $1 ORDER BY created_at DESC",
    )
    .bind(recipient_id)
    .fetch_all(pool)
    .await?)
}

/// POST /api/v1/donations
pub async fn handle_donate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<DonateRequest>,
) -> Result<(StatusCode, Json<DonationRow>), AppError> {
    if req.recipient_id == auth.id {
        return Err(AppError::Validation("You cannot donate to yourself".to_string()));
    }
    let amount_minor = validate_amount(req.amount_minor)?;
    let currency = normalize_currency(req.currency.as_deref())?;
    let note = normalize_note(req.note.as_deref())?;

    let recipient_role = find_role(&state.db, req.recipient_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", req.recipient_id)))?;
    if !recipient_role.is_partner() {
        return Err(AppError::Validation(
            "Donations can only be made to NGOs and artisans".to_string(),
        ));
    }

    let donation = sqlx::query_as::<_, DonationRow>(
        r#"
        INSERT INTO donations (id, donor_id, recipient_id, amount_minor, currency, note, anonymous)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.id)
    .bind(req.recipient_id)
    .bind(amount_minor)
    .bind(&currency)
    .bind(&note)
    .bind(req.anonymous)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Donation {} of {} {} from {} to {} {}",
        donation.id, amount_minor, currency, auth.id, recipient_role, req.recipient_id
    );
    Ok((StatusCode::CREATED, Json(donation)))
}

/// GET /api/v1/donations/sent
pub async fn handle_sent(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<DonationRow>>, AppError> {
    let donations = sqlx::query_as::<_, DonationRow>(
        "SELECT * FROM donations WHERE donor_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(donations))
}

/// GET /api/v1/donations/received
pub async fn handle_received(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ReceivedDonation>>, AppError> {
    let donations = received_by(&state.db, auth.id).await?;
    Ok(Json(donations.into_iter().map(ReceivedDonation::from).collect()))
}

/// GET /api/v1/donations/summary/:recipient_id
pub async fn handle_summary(
    State(state): State<AppState>,
    Path(recipient_id): Path<Uuid>,
) -> Result<Json<DonationSummary>, AppError> {
    if find_role(&state.db, recipient_id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {recipient_id} not found")));
    }
    let donations = received_by(&state.db, recipient_id).await?;
    Ok(Json(summarize(&donations)))
}
