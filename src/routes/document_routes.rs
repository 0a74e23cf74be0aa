use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::controllers::document_controller::DocumentController;
use crate::dto::document_dto::{SubmitDocumentRequest, VerificationSummary};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::document::UserDocument;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_document_router() -> Router<AppState> {
    Router::new().route("/", get(verification_summary).post(submit_document))
}

async fn submit_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<SubmitDocumentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDocument>>), AppError> {
    let controller = DocumentController::new(&state);
    let response = controller.submit(user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn verification_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<VerificationSummary>>, AppError> {
    let controller = DocumentController::new(&state);
    Ok(Json(controller.summary(user).await?))
}
