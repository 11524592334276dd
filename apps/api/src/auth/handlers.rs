use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{credentials_match, hash_password, issue_token, AuthUser};
use crate::errors::AppError;
use crate::models::user::{Role, UserRow};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_DISPLAY_NAME_LEN: usize = 80;
const MAX_BIO_LEN: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserRow,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        });
    if !valid {
        return Err(AppError::Validation("email is not valid".to_string()));
    }
    Ok(email)
}

fn validate_display_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(AppError::Validation(format!(
            "display_name must be 1-{MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email)?;
    let display_name = validate_display_name(&req.display_name)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = hash_password(&req.password)?;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, email, display_name, role, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&display_name)
    .bind(req.role.as_str())
    .bind(&password_hash)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::from_insert(e, "An account with this email already exists"))?;

    let token = issue_token(
        &state.config.jwt_secret,
        user.id,
        req.role,
        state.config.jwt_ttl_hours,
    )?;

    info!("Registered {} account {}", req.role, user.id);
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();

    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    let stored_hash = user.as_ref().map(|u| u.password_hash.as_str());
    if !credentials_match(&req.password, stored_hash) {
        return Err(AppError::Unauthorized);
    }
    let user = user.ok_or(AppError::Unauthorized)?;

    let token = issue_token(
        &state.config.jwt_secret,
        user.id,
        user.role()?,
        state.config.jwt_ttl_hours,
    )?;

    Ok(Json(AuthResponse { user, token }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserRow>, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Account no longer exists".to_string()))?;
    Ok(Json(user))
}

/// PATCH /api/v1/auth/me
pub async fn handle_update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserRow>, AppError> {
    let display_name = req
        .display_name
        .as_deref()
        .map(validate_display_name)
        .transpose()?;
    if req
        .bio
        .as_deref()
        .is_some_and(|b| b.chars().count() > MAX_BIO_LEN)
    {
        return Err(AppError::Validation(format!(
            "bio must be at most {MAX_BIO_LEN} characters"
        )));
    }

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET display_name = COALESCE($2, display_name),
            bio = COALESCE($3, bio),
            location = COALESCE($4, location)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(auth.id)
    .bind(display_name)
    .bind(req.bio.map(|b| b.trim().to_string()))
    .bind(req.location.map(|l| l.trim().to_string()))
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Account no longer exists".to_string()))?;

    info!("Profile updated for user {}", user.id);
    Ok(Json(user))
}
