//! Verificação de documentos (CNH e comprovante de residência)
//!
//! O status de verificação do usuário é um cache em `users` recalculado na
//! mesma transação de cada envio ou revisão.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::verification::{derive_status, ensure_can_submit, review, ReviewDecision};
use crate::dto::document_dto::{SubmitDocumentRequest, VerificationSummary};
use crate::middleware::AuthenticatedUser;
use crate::models::document::{DocumentStatus, UserDocument, VerificationStatus};
use crate::repositories::{DocumentRepository, UserRepository};
use crate::services::notification_service::NotificationService;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

pub struct DocumentService {
    pool: PgPool,
    documents: DocumentRepository,
    notifications: NotificationService,
}

impl DocumentService {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            documents: DocumentRepository::new(state.pool.clone()),
            notifications: NotificationService::new(state.providers.notifier.clone()),
        }
    }

    pub async fn submit(
        &self,
        user: AuthenticatedUser,
        request: SubmitDocumentRequest,
    ) -> Result<UserDocument, AppError> {
        let mut tx = self.pool.begin().await?;
        let current =
            DocumentRepository::find_for_user_tx(&mut *tx, user.user_id, request.document_type).await?;
        ensure_can_submit(current.map(|d| d.status))?;

        let document = DocumentRepository::upsert_tx(
            &mut *tx,
            user.user_id,
            request.document_type,
            request.document_url.trim(),
            request.document_number.as_deref().map(str::trim),
        )
        .await?;
        let status = refresh_verification_status(&mut *tx, user.user_id).await?;
        tx.commit().await?;

        tracing::info!(
            "📄 Documento {} enviado por {} (verificação: {})",
            document.document_type.label(),
            user.user_id,
            status.as_str()
        );
        Ok(document)
    }

    pub async fn summary(&self, user: AuthenticatedUser) -> Result<VerificationSummary, AppError> {
        let documents = self.documents.list_for_user(user.user_id).await?;
        let statuses: Vec<_> = documents.iter().map(|d| (d.document_type, d.status)).collect();
        Ok(VerificationSummary {
            status: derive_status(&statuses),
            documents,
        })
    }

    pub async fn list_pending(&self) -> Result<Vec<UserDocument>, AppError> {
        self.documents.list_pending().await
    }

    pub async fn review(
        &self,
        admin: AuthenticatedUser,
        id: Uuid,
        decision: ReviewDecision,
    ) -> Result<UserDocument, AppError> {
        let mut tx = self.pool.begin().await?;
        let document = DocumentRepository::find_by_id_for_update_tx(&mut *tx, id)
            .await?
            .ok_or_else(|| not_found_error("Document", id))?;
        let next = review(document.status, &decision)?;
        let reason = match &decision {
            ReviewDecision::Reject { reason } => Some(reason.trim()),
            ReviewDecision::Approve => None,
        };

        let reviewed = DocumentRepository::review_tx(&mut *tx, id, next, reason, admin.user_id).await?;
        let status = refresh_verification_status(&mut *tx, reviewed.user_id).await?;
        let owner = UserRepository::find_by_id_tx(&mut *tx, reviewed.user_id)
            .await?
            .ok_or_else(|| not_found_error("User", reviewed.user_id))?;
        tx.commit().await?;

        tracing::info!(
            "{} Documento {} de {} revisado por {} (verificação: {})",
            if next == DocumentStatus::Approved { "✅" } else { "🚫" },
            id,
            reviewed.user_id,
            admin.user_id,
            status.as_str()
        );
        self.notifications.document_reviewed(&owner, &reviewed).await;
        Ok(reviewed)
    }
}

async fn refresh_verification_status(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<VerificationStatus, AppError> {
    let statuses = DocumentRepository::statuses_for_user_tx(&mut *conn, user_id).await?;
    let status = derive_status(&statuses);
    UserRepository::update_verification_status_tx(&mut *conn, user_id, status).await?;
    Ok(status)
}
