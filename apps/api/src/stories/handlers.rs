use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::art_story::ArtStoryRow;
use crate::state::AppState;
use crate::stories::generator::{compose_story, StoryRequest};
use crate::validation::{optional_text, page};

const MIN_ART_FORM: usize = 2;
const MAX_ART_FORM: usize = 80;
const MAX_REGION: usize = 80;
const MAX_AUDIENCE: usize = 120;

#[derive(Debug, Deserialize)]
pub struct GenerateStoryInput {
    pub art_form: String,
    pub region: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StoryQuery {
    pub art_form: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn validate_input(input: &GenerateStoryInput) -> Result<StoryRequest, AppError> {
    let art_form = input.art_form.trim();
    let len = art_form.chars().count();
    if !(MIN_ART_FORM..=MAX_ART_FORM).contains(&len) {
        return Err(AppError::Validation(format!(
            "art_form must be {MIN_ART_FORM}-{MAX_ART_FORM} characters"
        )));
    }
    Ok(StoryRequest {
        art_form: art_form.to_string(),
        region: optional_text("region", input.region.as_deref(), MAX_REGION)?,
        audience: optional_text("audience", input.audience.as_deref(), MAX_AUDIENCE)?,
    })
}

/// POST /api/v1/stories/generate
///
/// Always persists a story: model output when usable, the canned story otherwise.
pub async fn handle_generate(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<GenerateStoryInput>,
) -> Result<(StatusCode, Json<ArtStoryRow>), AppError> {
    let request = validate_input(&input)?;
    state.rate_limiter.check("stories", auth.id).await?;

    let story = compose_story(state.llm.as_ref(), &request).await;

    let row = sqlx::query_as::<_, ArtStoryRow>(
        r#"
        INSERT INTO art_stories
            (id, requested_by, art_form, region, title, summary, sections, key_facts, source)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.id)
    .bind(&request.art_form)
    .bind(&request.region)
    .bind(&story.title)
    .bind(&story.summary)
    .bind(sqlx::types::Json(&story.sections))
    .bind(&story.key_facts)
    .bind(story.source.as_str())
    .fetch_one(&state.db)
    .await?;

    info!(
        "Story {} ({}) saved for user {}",
        row.id,
        story.source.as_str(),
        auth.id
    );
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/stories
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<StoryQuery>,
) -> Result<Json<Vec<ArtStoryRow>>, AppError> {
    let (limit, offset) = page(query.limit, query.offset, 20, 100);
    let art_form = query
        .art_form
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty());

    let rows = sqlx::query_as::<_, ArtStoryRow>(
        r#"
        SELECT * FROM art_stories
        WHERE ($1::text IS NULL OR lower(art_form) = $1)
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(art_form)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/stories/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> Result<Json<ArtStoryRow>, AppError> {
    let row = find_story(&state, story_id).await?;
    Ok(Json(row))
}

/// DELETE /api/v1/stories/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(story_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let row = find_story(&state, story_id).await?;
    if row.requested_by != auth.id {
        return Err(AppError::Forbidden(
            "Only the requester can delete a story".to_string(),
        ));
    }

    sqlx::query("DELETE FROM art_stories WHERE id = $1")
        .bind(story_id)
        .execute(&state.db)
        .await?;
    info!("Story {story_id} deleted by {}", auth.id);
    Ok(StatusCode::NO_CONTENT)
}

async fn find_story(state: &AppState, story_id: Uuid) -> Result<ArtStoryRow, AppError> {
    sqlx::query_as::<_, ArtStoryRow>("SELECT * FROM art_stories WHERE id = $1")
        .bind(story_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Story {story_id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(art_form: &str) -> GenerateStoryInput {
        GenerateStoryInput {
            art_form: art_form.to_string(),
            region: Some("  ".to_string()),
            audience: Some(" school students ".to_string()),
        }
    }

    #[test]
    fn test_art_form_length_bounds() {
        assert!(validate_input(&input(" x ")).is_err());
        assert!(validate_input(&input(&"a".repeat(81))).is_err());
        assert!(validate_input(&input("Gond")).is_ok());
    }

    #[test]
    fn test_optional_fields_are_trimmed() {
        let request = validate_input(&input(" Phulkari ")).unwrap();
        assert_eq!(request.art_form, "Phulkari");
        assert_eq!(request.region, None);
        assert_eq!(request.audience.as_deref(), Some("school students"));
    }
}
