use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness only; does not touch Postgres, Redis or S3.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "craftconnect-api"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_service() {
        let Json(body) = health_handler().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "craftconnect-api");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
