use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::contract_controller::ContractController;
use crate::dto::contract_dto::CancelContractRequest;
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::contract::{Contract, ContractEvent, ContractFile};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_contract_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contracts))
        .route("/booking/:booking_id", get(get_contract_by_booking))
        .route("/:id", get(get_contract))
        .route("/:id/send", post(send_contract))
        .route("/:id/cancel", post(cancel_contract))
        .route("/:id/reconcile", post(reconcile_contract))
        .route("/:id/events", get(contract_events))
        .route("/:id/pdf", get(contract_pdf))
        .route("/:id/signed-pdf", get(signed_pdf))
}

async fn list_contracts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<Contract>>>, AppError> {
    let controller = ContractController::new(&state);
    Ok(Json(controller.list_mine(user).await?))
}

async fn get_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Contract>>, AppError> {
    let controller = ContractController::new(&state);
    Ok(Json(controller.get(user, id).await?))
}

async fn get_contract_by_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Contract>>, AppError> {
    let controller = ContractController::new(&state);
    Ok(Json(controller.get_by_booking(user, booking_id).await?))
}

async fn send_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Contract>>, AppError> {
    let controller = ContractController::new(&state);
    Ok(Json(controller.send(user, id).await?))
}

async fn cancel_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelContractRequest>,
) -> Result<Json<ApiResponse<Contract>>, AppError> {
    let controller = ContractController::new(&state);
    Ok(Json(controller.cancel(user, id, request).await?))
}

async fn reconcile_contract(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Contract>>, AppError> {
    let controller = ContractController::new(&state);
    Ok(Json(controller.reconcile(user, id).await?))
}

async fn contract_events(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ContractEvent>>>, AppError> {
    let controller = ContractController::new(&state);
    Ok(Json(controller.events(user, id).await?))
}

fn pdf_response(file: ContractFile, filename: String) -> Response {
    let disposition = format!("inline; filename=\"{}\"", filename);
    (
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    )
        .into_response()
}

async fn contract_pdf(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let controller = ContractController::new(&state);
    let file = controller.pdf(user, id).await?;
    let filename = format!("contrato-{}.pdf", file.contract_id);
    Ok(pdf_response(file, filename))
}

async fn signed_pdf(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let controller = ContractController::new(&state);
    let file = controller.signed_pdf(user, id).await?;
    let filename = format!("contrato-{}-assinado.pdf", file.contract_id);
    Ok(pdf_response(file, filename))
}
