use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::connections::store::count_accepted;
use crate::donations::handlers::received_by;
use crate::donations::summary::summarize;
use crate::donations::validation::{normalize_currency, validate_amount};
use crate::errors::AppError;
use crate::models::user::Role;
use crate::sponsors::csr::{compose_guidance, CsrGuidance, CsrRequest};
use crate::sponsors::impact::{compose_report, ImpactMetrics, ImpactReport};
use crate::state::AppState;
use crate::validation::{optional_text, required_text};

const MAX_FOCUS_AREA: usize = 120;
const MAX_REGION: usize = 80;
const MAX_ORGANISATION: usize = 120;

#[derive(Debug, Deserialize)]
pub struct CsrApproachInput {
    pub focus_area: String,
    pub region: Option<String>,
    pub funding_need_minor: Option<i64>,
    pub currency: Option<String>,
    pub organisation: Option<String>,
}

/// Validates the input. A missing organisation name defaults to `display_name`.
fn validate_csr_input(input: &CsrApproachInput, display_name: &str) -> Result<CsrRequest, AppError> {
    let focus_area = required_text("focus_area", &input.focus_area, MAX_FOCUS_AREA)?;
    if focus_area.chars().count() < 2 {
        return Err(AppError::Validation(
            "focus_area must be at least 2 characters".to_string(),
        ));
    }
    Ok(CsrRequest {
        focus_area,
        region: optional_text("region", input.region.as_deref(), MAX_REGION)?,
        organisation: optional_text("organisation", input.organisation.as_deref(), MAX_ORGANISATION)?
            .unwrap_or_else(|| display_name.to_string()),
        funding_need_minor: input.funding_need_minor.map(validate_amount).transpose()?,
        currency: normalize_currency(input.currency.as_deref())?,
    })
}

async fn display_name(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    sqlx::query_scalar("SELECT display_name FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Account no longer exists".to_string()))
}

/// POST /api/v1/csr/approach
pub async fn handle_csr_approach(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CsrApproachInput>,
) -> Result<Json<CsrGuidance>, AppError> {
    auth.require_role(&[Role::Ngo, Role::Artisan])?;
    let name = display_name(&state, auth.id).await?;
    let request = validate_csr_input(&input, &name)?;
    state.rate_limiter.check("csr", auth.id).await?;

    let guidance = compose_guidance(state.llm.as_ref(), &request).await;
    Ok(Json(guidance))
}

/// POST /api/v1/reports/impact
pub async fn handle_impact_report(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ImpactReport>, AppError> {
    auth.require_role(&[Role::Ngo])?;
    let name = display_name(&state, auth.id).await?;
    state.rate_limiter.check("impact_report", auth.id).await?;

    let donations = received_by(&state.db, auth.id).await?;
    let connections = count_accepted(&state.db, auth.id).await?;
    let metrics = ImpactMetrics::new(summarize(&donations), connections);

    let report = compose_report(state.llm.as_ref(), &name, metrics).await;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CsrApproachInput {
        CsrApproachInput {
            focus_area: " Bagh block printing ".to_string(),
            region: None,
            funding_need_minor: Some(2_500_000),
            currency: None,
            organisation: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_organisation_defaults_to_display_name() {
        let request = validate_csr_input(&input(), "Bagh Artisans Collective").unwrap();
        assert_eq!(request.organisation, "Bagh Artisans Collective");
        assert_eq!(request.focus_area, "Bagh block printing");
        assert_eq!(request.currency, "INR");
    }

    #[test]
    fn test_rejects_non_positive_funding_need() {
        let mut bad = input();
        bad.funding_need_minor = Some(0);
        assert!(validate_csr_input(&bad, "X").is_err());
    }

    #[test]
    fn test_rejects_short_focus_area() {
        let mut bad = input();
        bad.focus_area = "a".to_string();
        assert!(validate_csr_input(&bad, "X").is_err());
    }
}
