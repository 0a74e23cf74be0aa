//! Rotas HTTP
//!
//! Cada área tem seu `create_*_router`; `create_router` monta tudo sob `/api`
//! com os layers comuns.

pub mod admin_routes;
pub mod auth_routes;
pub mod booking_routes;
pub mod coin_routes;
pub mod contract_routes;
pub mod document_routes;
pub mod vehicle_routes;
pub mod webhook_routes;

use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
    BoxError, Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{cors_middleware, cors_middleware_with_origins, rate_limit_middleware};
use crate::state::AppState;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub fn create_router(state: AppState) -> Router {
    let rate_limited = Router::new()
        .nest("/auth", auth_routes::create_auth_router())
        .nest("/webhooks", webhook_routes::create_webhook_router())
        .layer(from_fn_with_state(state.rate_limit.clone(), rate_limit_middleware));

    let api = Router::new()
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/bookings", booking_routes::create_booking_router())
        .nest("/contracts", contract_routes::create_contract_router())
        .nest("/documents", document_routes::create_document_router())
        .nest("/coins", coin_routes::create_coin_router())
        .nest("/admin", admin_routes::create_admin_router())
        .merge(rate_limited);

    let cors = if state.config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(&state.config.cors_origins)
    };

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(REQUEST_TIMEOUT),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "alugae-backend",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn handle_timeout(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("⏱️ Request excedeu {}s", REQUEST_TIMEOUT.as_secs());
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Tempo limite da requisição excedido" })),
        )
            .into_response()
    } else {
        tracing::error!("❌ Erro no middleware: {}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Erro interno do servidor" })),
        )
            .into_response()
    }
}
