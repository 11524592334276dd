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
use crate::models::product::ProductRow;
use crate::models::user::Role;
use crate::products::validation::{search_pattern, validate_changes, validate_new};
use crate::state::AppState;
use crate::validation::page;

const MAX_IMAGES: usize = 8;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub craft: String,
    pub price_minor: i64,
    pub currency: Option<String>,
    pub stock: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub craft: Option<String>,
    pub price_minor: Option<i64>,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub craft: Option<String>,
    pub artisan_id: Option<Uuid>,
    pub max_price: Option<i64>,
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Loads a product the caller owns. Other artisans' products are 403.
async fn load_owned(state: &AppState, auth: AuthUser, id: Uuid) -> Result<ProductRow, AppError> {
    let product = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;
    if product.artisan_id != auth.id {
        return Err(AppError::Forbidden(
            "Only the artisan who listed this product can change it".to_string(),
        ));
    }
    Ok(product)
}

/// POST /api/v1/products
pub async fn handle_create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductRow>), AppError> {
    auth.require_role(&[Role::Artisan])?;
    let product = validate_new(
        &req.title,
        &req.description,
        &req.craft,
        req.price_minor,
        req.currency.as_deref(),
        req.stock,
    )?;

    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        INSERT INTO products (id, artisan_id, title, description, craft, price_minor, currency, stock)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth.id)
    .bind(&product.title)
    .bind(&product.description)
    .bind(&product.craft)
    .bind(product.price_minor)
    .bind(&product.currency)
    .bind(product.stock)
    .fetch_one(&state.db)
    .await?;

    info!("Product {} listed by artisan {}", row.id, auth.id);
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/v1/products/:id
pub async fn handle_update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductRow>, AppError> {
    let changes = validate_changes(
        req.title.as_deref(),
        req.description.as_deref(),
        req.craft.as_deref(),
        req.price_minor,
        req.currency.as_deref(),
        req.stock,
        req.is_active,
    )?;
    let existing = load_owned(&state, auth, id).await?;
    if changes.is_empty() {
        return Ok(Json(existing));
    }

    let row = sqlx::query_as::<_, ProductRow>(
        r#"
        UPDATE products
        SET title = COALESCE($2, title),
            description = COALESCE($3, description),
            craft = COALESCE($4, craft),
            price_minor = COALESCE($5, price_minor),
            currency = COALESCE($6, currency),
            stock = COALESCE($7, stock),
            is_active = COALESCE($8, is_active),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.title)
    .bind(changes.description)
    .bind(changes.craft)
    .bind(changes.price_minor)
    .bind(changes.currency)
    .bind(changes.stock)
    .bind(changes.is_active)
    .fetch_one(&state.db)
    .await?;

    info!("Product {} updated by artisan {}", id, auth.id);
    Ok(Json(row))
}

/// DELETE /api/v1/products/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    load_owned(&state, auth, id).await?;
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    info!("Product {} deleted by artisan {}", id, auth.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/products
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductRow>>, AppError> {
    let (limit, offset) = page(query.limit, query.offset, 24, 100);
    let craft = query.craft.map(|c| c.trim().to_lowercase()).filter(|c| !c.is_empty());
    let pattern = search_pattern(query.q.as_deref())?;

    let rows = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT * FROM products
        WHERE is_active
          AND ($1::text IS NULL OR lower(craft) = $1)
          AND ($2::uuid IS NULL OR artisan_id = $2)
          AND ($3::bigint IS NULL OR price_minor <= $3)
          AND ($4::text IS NULL OR title ILIKE $4 OR description ILIKE $4)
        ORDER BY created_at DESC
        LIMIT $5 OFFSET $6
        "#,
    )
    .bind(craft)
    .bind(query.artisan_id)
    .bind(query.max_price)
    .bind(pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/products/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductRow>, AppError> {
    let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id} not found")))?;
    Ok(Json(row))
}

/// Appends `$2` only while the product holds fewer than `$3` images.
const APPEND_IMAGE_SQL: &str = r#"
    UPDATE products
    SET image_keys = array_append(image_keys, $2), updated_at = now()
    WHERE id = $1 AND cardinality(image_keys) < $3
    RETURNING *
"#;

/// POST /api/v1/products/:id/images
pub async fn handle_upload_image(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ProductRow>, AppError> {
    let product = load_owned(&state, auth, id).await?;
    if product.image_keys.len() >= MAX_IMAGES {
        return Err(AppError::Validation(format!(
            "A product holds at most {MAX_IMAGES} images"
        )));
    }

    let upload = read_image_field(&mut multipart).await?;
    let key = upload_image(&state.s3, &state.config.s3_bucket, "products", id, upload).await?;

    let row = sqlx::query_as::<_, ProductRow>(APPEND_IMAGE_SQL)
        .bind(id)
        .bind(&key)
        .bind(MAX_IMAGES as i32)
        .fetch_optional(&state.db)
        .await;

    match row {
        Ok(Some(row)) => {
            info!("Image {key} attached to product {id}");
            Ok(Json(row))
        }
        Ok(None) => {
            discard_image(&state.s3, &state.config.s3_bucket, &key).await;
            Err(AppError::Validation(format!(
                "A product holds at most {MAX_IMAGES} images"
            )))
        }
        Err(e) => {
            discard_image(&state.s3, &state.config.s3_bucket, &key).await;
            Err(e.into())
        }
    }
}
