use validator::Validate;

use crate::dto::document_dto::{SubmitDocumentRequest, VerificationSummary};
use crate::dto::ApiResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::document::UserDocument;
use crate::services::DocumentService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct DocumentController {
    service: DocumentService,
}

impl DocumentController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: DocumentService::new(state),
        }
    }

    pub async fn submit(
        &self,
        user: AuthenticatedUser,
        request: SubmitDocumentRequest,
    ) -> Result<ApiResponse<UserDocument>, AppError> {
        request.validate()?;
        let document = self.service.submit(user, request).await?;
        Ok(ApiResponse::success_with_message(document, "Documento enviado para análise"))
    }

    pub async fn summary(&self, user: AuthenticatedUser) -> Result<ApiResponse<VerificationSummary>, AppError> {
        Ok(ApiResponse::success(self.service.summary(user).await?))
    }
}
