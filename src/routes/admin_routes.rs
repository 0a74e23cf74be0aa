use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::admin_controller::AdminController;
use crate::dto::admin_dto::{CreateCouponRequest, SetCouponActiveRequest, UpdateSettingsRequest};
use crate::dto::document_dto::RejectDocumentRequest;
use crate::dto::vehicle_dto::ReviewVehicleRequest;
use crate::dto::ApiResponse;
use crate::middleware::AdminUser;
use crate::models::coupon::Coupon;
use crate::models::document::UserDocument;
use crate::models::settings::AdminSettings;
use crate::models::vehicle::Vehicle;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Todas as rotas exigem `AdminUser`
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings).put(update_settings))
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route("/coupons/:id/active", put(set_coupon_active))
        .route("/vehicles/pending", get(pending_vehicles))
        .route("/vehicles/:id/approve", post(approve_vehicle))
        .route("/vehicles/:id/reject", post(reject_vehicle))
        .route("/documents/pending", get(pending_documents))
        .route("/documents/:id/approve", post(approve_document))
        .route("/documents/:id/reject", post(reject_document))
}

async fn get_settings(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<AdminSettings>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.settings().await?))
}

async fn update_settings(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<AdminSettings>>, AppError> {
    tracing::info!("⚙️ Configurações alteradas por {}", admin.user_id);
    let controller = AdminController::new(&state);
    Ok(Json(controller.update_settings(request).await?))
}

async fn list_coupons(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<Coupon>>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.coupons().await?))
}

async fn create_coupon(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Coupon>>), AppError> {
    let controller = AdminController::new(&state);
    let response = controller.create_coupon(admin, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn set_coupon_active(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SetCouponActiveRequest>,
) -> Result<Json<ApiResponse<Coupon>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.set_coupon_active(id, request.is_active).await?))
}

async fn pending_vehicles(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<Vehicle>>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.pending_vehicles().await?))
}

async fn approve_vehicle(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.approve_vehicle(admin, id).await?))
}

async fn reject_vehicle(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.reject_vehicle(admin, id, request).await?))
}

async fn pending_documents(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<UserDocument>>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.pending_documents().await?))
}

async fn approve_document(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserDocument>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.approve_document(admin, id).await?))
}

async fn reject_document(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectDocumentRequest>,
) -> Result<Json<ApiResponse<UserDocument>>, AppError> {
    let controller = AdminController::new(&state);
    Ok(Json(controller.reject_document(admin, id, request).await?))
}
