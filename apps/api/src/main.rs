mod artists;
mod auth;
mod config;
mod connections;
mod db;
mod donations;
mod errors;
mod llm_client;
mod media;
mod messaging;
mod models;
mod products;
mod ratelimit;
mod routes;
mod sponsors;
mod state;
mod stories;
mod validation;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{DisabledGenerator, LlmClient, TextGenerator};
use crate::ratelimit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first; missing required env vars abort startup
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CraftConnect API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (runs pending migrations)
    let db = create_pool(&config.database_url).await?;

    // Redis, used only by the rate limiter
    let redis = redis::Client::open(config.redis_url.clone())?;
    let rate_limiter = RateLimiter::new(redis, config.ai_rate_limit_per_hour);
    info!(
        "Rate limiter initialized ({} AI requests/hour per user)",
        config.ai_rate_limit_per_hour
    );

    // S3 / MinIO for product and portfolio images
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    let llm: Arc<dyn TextGenerator> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), config.llm_model.clone())?;
            info!("LLM client initialized (model: {})", client.model());
            Arc::new(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; AI endpoints will serve fallback content");
            Arc::new(DisabledGenerator)
        }
    };

    let state = AppState {
        db,
        s3,
        llm,
        rate_limiter,
        config: config.clone(),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "craftconnect-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by virtual host
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
