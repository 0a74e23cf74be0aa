use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use alugae_backend::config::database::DatabaseConfig;
use alugae_backend::config::{D4SignConfig, EnvironmentConfig, StripeConfig};
use alugae_backend::models::user::UserRole;
use alugae_backend::routes::create_router;
use alugae_backend::state::{AppState, Providers};
use alugae_backend::utils::jwt::{generate_token, JwtConfig};

// Pool lazy: as rotas testadas aqui falham antes de tocar no banco
fn create_test_app(config: EnvironmentConfig) -> Router {
    let pool = DatabaseConfig::new(&config.database_url)
        .create_lazy_pool()
        .unwrap();
    let providers = Providers::development();
    let state = AppState::new(pool, config, providers).unwrap();
    create_router(state)
}

fn config_with_webhook_secrets() -> EnvironmentConfig {
    let mut config = EnvironmentConfig::for_tests();
    config.stripe = Some(StripeConfig {
        secret_key: "sk_test_123".to_string(),
        webhook_secret: Some("whsec_test".to_string()),
        base_url: "http://localhost:12111".to_string(),
    });
    config.d4sign = Some(D4SignConfig {
        token: "token".to_string(),
        crypt_key: "crypt".to_string(),
        safe_id: "safe".to_string(),
        webhook_secret: Some("d4-secret".to_string()),
        base_url: "http://localhost:12112".to_string(),
    });
    config
}

fn bearer(role: UserRole) -> String {
    let config = EnvironmentConfig::for_tests();
    let token = generate_token(Uuid::new_v4(), role, &JwtConfig::from(&config)).unwrap();
    format!("Bearer {}", token)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(EnvironmentConfig::for_tests());
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_coin_packages_are_public() {
    let app = create_test_app(EnvironmentConfig::for_tests());
    let response = app
        .oneshot(Request::get("/api/coins/packages").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = create_test_app(EnvironmentConfig::for_tests());
    let response = app
        .oneshot(Request::get("/api/bookings").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = create_test_app(EnvironmentConfig::for_tests());
    let response = app
        .oneshot(
            Request::get("/api/auth/me")
                .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_renters() {
    let app = create_test_app(EnvironmentConfig::for_tests());
    let response = app
        .oneshot(
            Request::get("/api/admin/settings")
                .header(header::AUTHORIZATION, bearer(UserRole::Renter))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_validates_before_touching_database() {
    let app = create_test_app(EnvironmentConfig::for_tests());
    let payload = json!({
        "name": "Ana",
        "email": "nao-e-email",
        "password": "curta"
    });
    let response = app
        .oneshot(
            Request::post("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_stripe_webhook_rejects_bad_signature() {
    let app = create_test_app(config_with_webhook_secrets());
    let payload = json!({
        "id": "evt_1",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": "pi_1" } }
    });
    let response = app
        .oneshot(
            Request::post("/api/webhooks/stripe")
                .header("stripe-signature", "t=1700000000,v1=deadbeef")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stripe_webhook_requires_secret_outside_development() {
    let app = create_test_app(EnvironmentConfig::for_tests());
    let response = app
        .oneshot(
            Request::post("/api/webhooks/stripe")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_d4sign_webhook_requires_hmac() {
    let app = create_test_app(config_with_webhook_secrets());
    let payload = json!({ "uuid": "doc-123", "type_post": "1" });
    let response = app
        .oneshot(
            Request::post("/api/webhooks/d4sign")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_d4sign_webhook_rejects_malformed_payload() {
    let app = create_test_app(config_with_webhook_secrets());
    let response = app
        .oneshot(
            Request::post("/api/webhooks/d4sign")
                .header("content-hmac", "sha256=00")
                .body(Body::from("nao e json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_auth_routes_are_rate_limited() {
    let mut config = EnvironmentConfig::for_tests();
    config.rate_limit_requests = 2;
    let app = create_test_app(config);

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("x-forwarded-for", "203.0.113.7")
                    .body(Body::from(json!({ "email": "x", "password": "" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_ne!(statuses[0], StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(statuses[2], StatusCode::TOO_MANY_REQUESTS);
}
