use axum::{extract::State, routing::{get, post}, Json, Router};

use crate::controllers::coin_controller::CoinController;
use crate::dto::booking_dto::CheckoutResponse;
use crate::dto::coin_dto::{ConfirmPurchaseRequest, PackageResponse, PurchaseCoinsRequest};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::coins::{CoinTransaction, CoinWallet, ContactUnlock};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_coin_router() -> Router<AppState> {
    Router::new()
        .route("/packages", get(packages))
        .route("/wallet", get(wallet))
        .route("/transactions", get(transactions))
        .route("/unlocks", get(unlocks))
        .route("/purchase", post(purchase))
        .route("/purchase/confirm", post(confirm_purchase))
}

async fn packages() -> Json<ApiResponse<Vec<PackageResponse>>> {
    Json(CoinController::packages())
}

async fn wallet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<CoinWallet>>, AppError> {
    let controller = CoinController::new(&state);
    Ok(Json(controller.wallet(user).await?))
}

async fn transactions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<CoinTransaction>>>, AppError> {
    let controller = CoinController::new(&state);
    Ok(Json(controller.transactions(user).await?))
}

async fn unlocks(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<ContactUnlock>>>, AppError> {
    let controller = CoinController::new(&state);
    Ok(Json(controller.unlocks(user).await?))
}

async fn purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<PurchaseCoinsRequest>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, AppError> {
    let controller = CoinController::new(&state);
    Ok(Json(controller.purchase(user, request).await?))
}

async fn confirm_purchase(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ConfirmPurchaseRequest>,
) -> Result<Json<ApiResponse<CoinWallet>>, AppError> {
    let controller = CoinController::new(&state);
    Ok(Json(controller.confirm_purchase(user, request).await?))
}
