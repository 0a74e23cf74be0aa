use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::document::{DocumentStatus, DocumentType, UserDocument};
use crate::utils::errors::AppError;

pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_for_user_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        document_type: DocumentType,
    ) -> Result<Option<UserDocument>, AppError> {
        let document = sqlx::query_as::<_, UserDocument>(
            "SELECT * FROM user_documents WHERE user_id = $1 AND document_type = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(document_type)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(document)
    }

    /// Um documento por tipo: reenvio substitui o anterior e volta a `pending`
    pub async fn upsert_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        document_type: DocumentType,
        document_url: &str,
        document_number: Option<&str>,
    ) -> Result<UserDocument, AppError> {
        let document = sqlx::query_as::<_, UserDocument>(
            r#"
            INSERT INTO user_documents (id, user_id, document_type, document_url, document_number, status)
            VALUES ($1, $2, $3, $4, $5, 'pending')
            ON CONFLICT (user_id, document_type) DO UPDATE SET
                document_url = EXCLUDED.document_url,
                document_number = EXCLUDED.document_number,
                status = 'pending',
                rejection_reason = NULL,
                uploaded_at = NOW(),
                reviewed_at = NULL,
                reviewed_by = NULL
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(document_type)
        .bind(document_url)
        .bind(document_number)
        .fetch_one(&mut *conn)
        .await?;
        Ok(document)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserDocument>, AppError> {
        let documents = sqlx::query_as::<_, UserDocument>(
            "SELECT * FROM user_documents WHERE user_id = $1 ORDER BY document_type",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }

    pub async fn statuses_for_user_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<(DocumentType, DocumentStatus)>, AppError> {
        let rows: Vec<(DocumentType, DocumentStatus)> = sqlx::query_as(
            "SELECT document_type, status FROM user_documents WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id_for_update_tx(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<UserDocument>, AppError> {
        let document =
            sqlx::query_as::<_, UserDocument>("SELECT * FROM user_documents WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(document)
    }

    pub async fn review_tx(
        conn: &mut PgConnection,
        id: Uuid,
        status: DocumentStatus,
        rejection_reason: Option<&str>,
        reviewer: Uuid,
    ) -> Result<UserDocument, AppError> {
        let document = sqlx::query_as::<_, UserDocument>(
            r#"
            UPDATE user_documents SET
                status = $2,
                rejection_reason = $3,
                reviewed_by = $4,
                reviewed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(rejection_reason)
        .bind(reviewer)
        .fetch_one(&mut *conn)
        .await?;
        Ok(document)
    }

    /// Fila de revisão, mais antigos primeiro
    pub async fn list_pending(&self) -> Result<Vec<UserDocument>, AppError> {
        let documents = sqlx::query_as::<_, UserDocument>(
            "SELECT * FROM user_documents WHERE status = 'pending' ORDER BY uploaded_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(documents)
    }
}
