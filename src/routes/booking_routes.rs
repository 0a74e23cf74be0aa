use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::domain::pricing::BookingQuote;
use crate::dto::booking_dto::{BookingRequest, CancelBookingRequest, CheckoutResponse};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::booking::Booking;
use crate::models::contract::Contract;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/quote", post(quote))
        .route("/:id", get(get_booking))
        .route("/:id/checkout", post(checkout))
        .route("/:id/confirm-payment", post(confirm_payment))
        .route("/:id/cancel", post(cancel_booking))
        .route("/:id/complete", post(complete_booking))
        .route("/:id/contract", post(generate_contract))
}

async fn quote(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<ApiResponse<BookingQuote>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.quote(request).await?))
}

async fn create_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), AppError> {
    let controller = BookingController::new(&state);
    let response = controller.create(user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.list_mine(user).await?))
}

async fn get_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.get(user, id).await?))
}

async fn checkout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.checkout(user, id).await?))
}

async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.confirm_payment(user, id).await?))
}

async fn cancel_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.cancel(user, id, request).await?))
}

async fn complete_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let controller = BookingController::new(&state);
    Ok(Json(controller.complete(user, id).await?))
}

async fn generate_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<Contract>>), AppError> {
    let controller = BookingController::new(&state);
    let response = controller.generate_contract(user, id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
