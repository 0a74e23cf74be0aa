use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::availability_controller::AvailabilityController;
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::availability_dto::{
    AvailabilityCheckResponse, AvailabilityQuery, PeriodRequest, VehicleCalendarResponse,
};
use crate::dto::vehicle_dto::{
    ContactUnlockResponse, CreateVehicleRequest, SetAvailabilityRequest, UpdateVehicleRequest,
    VehicleListResponse,
};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::availability::AvailabilityPeriod;
use crate::models::vehicle::{Vehicle, VehicleFilters};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/mine", get(list_my_vehicles))
        .route("/:id", get(get_vehicle).put(update_vehicle))
        .route("/:id/availability", put(set_availability))
        .route("/:id/availability/check", get(check_availability))
        .route("/:id/calendar", get(calendar))
        .route("/:id/periods", post(create_period))
        .route("/:id/periods/:period_id", put(update_period).delete(delete_period))
        .route("/:id/unlock-contact", post(unlock_contact))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<ApiResponse<VehicleListResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    Ok(Json(controller.list(filters).await?))
}

async fn list_my_vehicles(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<VehicleListResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    Ok(Json(controller.list_mine(user).await?))
}

async fn create_vehicle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.create(user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    viewer: Option<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(&state);
    Ok(Json(controller.get(viewer, id).await?))
}

async fn update_vehicle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(&state);
    Ok(Json(controller.update(user, id, request).await?))
}

async fn set_availability(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = VehicleController::new(&state);
    Ok(Json(controller.set_available(user, id, request.is_available).await?))
}

async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<AvailabilityCheckResponse>>, AppError> {
    let controller = AvailabilityController::new(&state);
    Ok(Json(controller.check(id, query).await?))
}

async fn calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VehicleCalendarResponse>>, AppError> {
    let controller = AvailabilityController::new(&state);
    Ok(Json(controller.calendar(id).await?))
}

async fn create_period(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<PeriodRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AvailabilityPeriod>>), AppError> {
    let controller = AvailabilityController::new(&state);
    let response = controller.create_period(user, id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_period(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, period_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<PeriodRequest>,
) -> Result<Json<ApiResponse<AvailabilityPeriod>>, AppError> {
    let controller = AvailabilityController::new(&state);
    Ok(Json(controller.update_period(user, id, period_id, request).await?))
}

async fn delete_period(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, period_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = AvailabilityController::new(&state);
    Ok(Json(controller.delete_period(user, id, period_id).await?))
}

async fn unlock_contact(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ContactUnlockResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    Ok(Json(controller.unlock_contact(user, id).await?))
}
