use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::media::{discard_image, read_image_field, upload_image};
use crate::models::artist_post::ArtistPostRow;
use crate::models::user::Role;
use crate::state::AppState;
use crate::validation::{bounded_text, optional_text, page, required_text};

const MAX_TITLE: usize = 120;
const MAX_CRAFT: usize = 60;
const MAX_BIO: usize = 5000;
const MAX_LOCATION: usize = 120;
const MAX_IMAGES: usize = 12;

#[derive(Debug, Deserialize)]
pub struct ArtistPostInput {
    pub title: String,
    pub craft: String,
    #[serde(default)]
    pub bio: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidArtistPost {
    pub title: String,
    pub craft: String,
    pub bio: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistQuery {
    pub craft: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub fn validate_post(input: &ArtistPostInput) -> Result<ValidArtistPost, AppError> {
    Ok(ValidArtistPost {
        title: required_text("title", &input.title, MAX_TITLE)?,
        craft: required_text("craft", &input.craft, MAX_CRAFT)?,
        bio: bounded_text("bio", &input.bio, MAX_BIO)?,
        location: optional_text("location", input.location.as_deref(), MAX_LOCATION)?,
    })
}

/// PUT /api/v1/artists/me
///
/// Creates the caller's portfolio or replaces its text fields. Images are kept.
pub async fn handle_upsert(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ArtistPostInput>,
) -> Result<Json<ArtistPostRow>, AppError> {
    auth.require_role(&[Role::Artisan])?;
    let post = validate_post(&input)?;

    let row = sqlx::query_as::<_, ArtistPostRow>(
        r#"
        INSERT INTO artist_posts (id, artisan_id, title, craft, bio, location)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (artisan_id) DO UPDATE
        SET title = EXCLUDED.title,
            craft = EXCLUDED.craft,
            bio = EXCLUDED.bio,
            location = EXCLUDED.location,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.id)
    .bind(&post.title)
    .bind(&post.craft)
    .bind(&post.bio)
    .bind(&post.location)
    .fetch_one(&state.db)
    .await?;

    info!("Artist post {} saved for artisan {}", row.id, auth.id);
    Ok(Json(row))
}

const LIST_SQL: &str = r#"
    SELECT * FROM artist_posts
    WHERE ($1::text IS NULL OR lower(craft) = $1)
    ORDER BY created_at DESC
    LIMIT $2 OFFSET $3
"#;

/// GET /api/v1/artists
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ArtistQuery>,
) -> Result<Json<Vec<ArtistPostRow>>, AppError> {
    let (limit, offset) = page(query.limit, query.offset, 20, 100);
    let craft = query.craft.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty());

    let rows = sqlx::query_as::<_, ArtistPostRow>(LIST_SQL)
        .bind(craft)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/artists/:artisan_id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(artisan_id): Path<Uuid>,
) -> Result<Json<ArtistPostRow>, AppError> {
    let row = sqlx::query_as::<_, ArtistPostRow>("SELECT * FROM artist_posts WHERE artisan_id = $1")
        .bind(artisan_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No portfolio for artisan {artisan_id}")))?;
    Ok(Json(row))
}

/// DELETE /api/v1/artists/me
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    auth.require_role(&[Role::Artisan])?;
    let result = sqlx::query("DELETE FROM artist_posts WHERE artisan_id = $1")
        .bind(auth.id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("You have no portfolio".to_string()));
    }
    info!("Artist post deleted for artisan {}", auth.id);
    Ok(StatusCode::NO_CONTENT)
}

/// Appends `$2` only while the portfolio holds fewer than `$3` images, so
/// concurrent uploads cannot push it past the cap.
const APPEND_IMAGE_SQL: &str = r#"
    UPDATE artist_posts
    SET image_keys = array_append(image_keys, $2), updated_at = now()
    WHERE artisan_id = $1 AND cardinality(image_keys) < $3
    RETURNING *
"#;

/// POST /api/v1/artists/me/images
pub async fn handle_upload_image(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ArtistPostRow>, AppError> {
    auth.require_role(&[Role::Artisan])?;

    let image_count: Option<i32> = sqlx::query_scalar(
        "SELECT cardinality(image_keys) FROM artist_posts WHERE artisan_id = $1",
    )
    .bind(auth.id)
    .fetch_optional(&state.db)
    .await?;
    let image_count = image_count
        .ok_or_else(|| AppError::NotFound("Create your portfolio before adding images".to_string()))?;
    if image_count as usize >= MAX_IMAGES {
        return Err(AppError::Validation(format!(
            "A portfolio holds at most {MAX_IMAGES} images"
        )));
    }

    let upload = read_image_field(&mut multipart).await?;
    let key = upload_image(&state.s3, &state.config.s3_bucket, "artists", auth.id, upload).await?;

    let row = sqlx::query_as::<_, ArtistPostRow>(APPEND_IMAGE_SQL)
        .bind(auth.id)
        .bind(&key)
        .bind(MAX_IMAGES as i32)
        .fetch_optional(&state.db)
        .await;

    match row {
        Ok(Some(row)) => Ok(Json(row)),
        Ok(None) => {
            discard_image(&state.s3, &state.config.s3_bucket, &key).await;
            Err(AppError::Validation(format!(
                "A portfolio holds at most {MAX_IMAGES} images"
            )))
        }
        Err(e) => {
            discard_image(&state.s3, &state.config.s3_bucket, &key).await;
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, craft: &str) -> ArtistPostInput {
        ArtistPostInput {
            title: title.to_string(),
            craft: craft.to_string(),
            bio: "  Third-generation block printer from Bagru.  ".to_string(),
            location: Some("   ".to_string()),
        }
    }

    #[test]
    fn test_validate_post_trims_fields() {
        let post = validate_post(&input(" Indigo Hands ", " Block printing ")).unwrap();
        assert_eq!(post.title, "Indigo Hands");
        assert_eq!(post.craft, "Block printing");
        assert_eq!(post.bio, "Third-generation block printer from Bagru.");
        assert_eq!(post.location, None);
    }

    #[test]
    fn test_validate_post_requires_title_and_craft() {
        assert!(validate_post(&input("", "Pottery")).is_err());
        assert!(validate_post(&input("Studio", " ")).is_err());
        assert!(validate_post(&input(&"t".repeat(MAX_TITLE + 1), "Pottery")).is_err());
    }

    #[test]
    fn test_list_is_newest_first() {
        assert!(LIST_SQL.contains("ORDER BY created_at DESC"));
    }

    #[test]
    fn test_append_is_guarded_by_image_cap() {
        assert!(APPEND_IMAGE_SQL.contains("WHERE artisan_id = $1 AND cardinality(image_keys) < $3"));
    }

    #[test]
    fn test_bio_defaults_to_empty() {
        let parsed: ArtistPostInput =
            serde_json::from_str(r#"{"title": "Clay Works", "craft": "Pottery"}"#).unwrap();
        assert_eq!(validate_post(&parsed).unwrap().bio, "");
    }
}
