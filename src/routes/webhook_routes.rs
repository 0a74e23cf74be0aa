use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};

use crate::controllers::webhook_controller::WebhookController;
use crate::services::payment_service::WebhookAck;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";
pub const D4SIGN_SIGNATURE_HEADER: &str = "content-hmac";

/// Corpo cru: a assinatura é calculada sobre os bytes recebidos
pub fn create_webhook_router() -> Router<AppState> {
    Router::new()
        .route("/stripe", post(stripe_webhook))
        .route("/d4sign", post(d4sign_webhook))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let controller = WebhookController::new(&state);
    let ack = controller
        .stripe(&body, header_value(&headers, STRIPE_SIGNATURE_HEADER))
        .await?;
    Ok(Json(ack))
}

async fn d4sign_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, AppError> {
    let controller = WebhookController::new(&state);
    let ack = controller
        .d4sign(&body, header_value(&headers, D4SIGN_SIGNATURE_HEADER))
        .await?;
    Ok(Json(ack))
}
