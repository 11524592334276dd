pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::state::AppState;
use crate::{artists, auth, connections, donations, messaging, products, sponsors, stories};

/// Image uploads need more than axum's 2 MB default; the per-image cap is enforced in `media`.
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/auth/register", post(auth::handlers::handle_register))
        .route("/api/v1/auth/login", post(auth::handlers::handle_login))
        .route(
            "/api/v1/auth/me",
            get(auth::handlers::handle_me).patch(auth::handlers::handle_update_me),
        )
        // Connections
        .route(
            "/api/v1/connections",
            get(connections::handlers::handle_list).post(connections::handlers::handle_request),
        )
        .route(
            "/api/v1/connections/:id",
            delete(connections::handlers::handle_remove),
        )
        .route(
            "/api/v1/connections/:id/accept",
            post(connections::handlers::handle_accept),
        )
        .route(
            "/api/v1/connections/:id/reject",
            post(connections::handlers::handle_reject),
        )
        // Messaging
        .route(
            "/api/v1/connections/:id/messages",
            get(messaging::handlers::handle_list).post(messaging::handlers::handle_send),
        )
        .route(
            "/api/v1/connections/:id/messages/read",
            post(messaging::handlers::handle_mark_read),
        )
        .route(
            "/api/v1/messages/:id",
            patch(messaging::handlers::handle_edit).delete(messaging::handlers::handle_delete),
        )
        .route(
            "/api/v1/conversations",
            get(messaging::handlers::handle_conversations),
        )
        // Donations
        .route("/api/v1/donations", post(donations::handlers::handle_donate))
        .route("/api/v1/donations/sent", get(donations::handlers::handle_sent))
        .route(
            "/api/v1/donations/received",
            get(donations::handlers::handle_received),
        )
        .route(
            "/api/v1/donations/summary/:recipient_id",
            get(donations::handlers::handle_summary),
        )
        // Artist portfolios
        .route(
            "/api/v1/artists/me",
            put(artists::handlers::handle_upsert).delete(artists::handlers::handle_delete),
        )
        .route(
            "/api/v1/artists/me/images",
            post(artists::handlers::handle_upload_image)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/v1/artists", get(artists::handlers::handle_list))
        .route(
            "/api/v1/artists/:artisan_id",
            get(artists::handlers::handle_get),
        )
        // Products
        .route(
            "/api/v1/products",
            get(products::handlers::handle_list).post(products::handlers::handle_create),
        )
        .route(
            "/api/v1/products/:id",
            get(products::handlers::handle_get)
                .patch(products::handlers::handle_update)
                .delete(products::handlers::handle_delete),
        )
        .route(
            "/api/v1/products/:id/images",
            post(products::handlers::handle_upload_image)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Art stories
        .route(
            "/api/v1/stories/generate",
            post(stories::handlers::handle_generate),
        )
        .route("/api/v1/stories", get(stories::handlers::handle_list))
        .route(
            "/api/v1/stories/:id",
            get(stories::handlers::handle_get).delete(stories::handlers::handle_delete),
        )
        // Sponsors
        .route(
            "/api/v1/csr/approach",
            post(sponsors::handlers::handle_csr_approach),
        )
        .route(
            "/api/v1/reports/impact",
            post(sponsors::handlers::handle_impact_report),
        )
        .with_state(state)
}
