//! Authentication: Argon2id password hashing, HS256 JWTs, and the `AuthUser` extractor.

pub mod handlers;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// The authenticated caller, decoded from `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    /// Rejects callers whose role is not in `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
            Err(AppError::Forbidden(format!(
                "This action requires role: {}",
                names.join(" or ")
            )))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let claims = verify_token(&state.config.jwt_secret, token)?;
        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// Role of an existing account, `None` if no such account.
pub async fn find_role(pool: &PgPool, user_id: Uuid) -> Result<Option<Role>, AppError> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    role.map(|r| r.parse()).transpose()
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

/// False for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {e}");
            false
        }
    }
}

/// Well-formed Argon2id hash with the default cost parameters that no password
/// matches. Verified against when a login names an unknown account.
pub const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHRzYWx0c2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Checks a login attempt. An unknown account still pays for one Argon2
/// verification so response timing does not reveal which emails exist.
pub fn credentials_match(password: &str, stored_hash: Option<&str>) -> bool {
    let verified = verify_password(password, stored_hash.unwrap_or(DUMMY_PASSWORD_HASH));
    verified && stored_hash.is_some()
}

pub fn issue_token(secret: &str, user_id: Uuid, role: Role, ttl_hours: i64) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id,
        role,
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(ttl_hours)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {e}")))
}

pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("kantha-stitch-2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("kantha-stitch-2024", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_unknown_account_runs_full_verification() {
        let reference = hash_password("whatever1").unwrap();
        let reference = PasswordHash::new(&reference).unwrap();
        let parsed = PasswordHash::new(DUMMY_PASSWORD_HASH).unwrap();
        assert_eq!(parsed.algorithm, reference.algorithm);
        assert_eq!(parsed.params.to_string(), reference.params.to_string());
        assert!(!credentials_match("", None));
        assert!(!credentials_match("hunter22", None));
    }

    #[test]
    fn test_credentials_match_known_account() {
        let hash = hash_password("correct horse").unwrap();
        assert!(credentials_match("correct horse", Some(&hash)));
        assert!(!credentials_match("wrong horse", Some(&hash)));
    }

    #[test]
    fn test_token_carries_subject_and_role() {
        let id = Uuid::new_v4();
        let token = issue_token(SECRET, id, Role::Ngo, 1).unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Ngo);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = issue_token("other-secret", Uuid::new_v4(), Role::User, 1).unwrap();
        assert!(matches!(
            verify_token(SECRET, &token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = issue_token(SECRET, Uuid::new_v4(), Role::Artisan, -2).unwrap();
        assert!(verify_token(SECRET, &token).is_err());
    }

    #[test]
    fn test_require_role() {
        let artisan = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Artisan,
        };
        assert!(artisan.require_role(&[Role::Artisan]).is_ok());
        assert!(matches!(
            artisan.require_role(&[Role::Ngo]),
            Err(AppError::Forbidden(_))
        ));
    }
}
