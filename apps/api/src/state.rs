use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::ratelimit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// Anthropic client when an API key is configured, `DisabledGenerator` otherwise.
    pub llm: Arc<dyn TextGenerator>,
    /// Redis-backed limiter guarding the AI endpoints.
    pub rate_limiter: RateLimiter,
    pub config: Config,
}
