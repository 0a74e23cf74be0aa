use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::contract_lifecycle::{ContractData, ContractState};
use crate::models::contract::{Contract, ContractEvent, ContractFile, NewContractEvent};
use crate::utils::errors::AppError;

pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_tx(
        conn: &mut PgConnection,
        booking_id: Uuid,
        data: &ContractData,
        created_by: Option<Uuid>,
    ) -> Result<Contract, AppError> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (id, booking_id, contract_number, status, contract_data, created_by)
            VALUES ($1, $2, $3, 'draft', $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking_id)
        .bind(&data.contract_number)
        .bind(Json(data))
        .bind(created_by)
        .fetch_one(&mut *conn)
        .await?;
        Ok(contract)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Contract>, AppError> {
        let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contract)
    }

    pub async fn find_by_id_for_update_tx(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Contract>, AppError> {
        let contract =
            sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(contract)
    }

    pub async fn find_by_external_id_for_update_tx(
        conn: &mut PgConnection,
        external_document_id: &str,
    ) -> Result<Option<Contract>, AppError> {
        let contract = sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts WHERE external_document_id = $1 FOR UPDATE",
        )
        .bind(external_document_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(contract)
    }

    /// Contrato não cancelado da reserva, se houver
    pub async fn find_active_by_booking(&self, booking_id: Uuid) -> Result<Option<Contract>, AppError> {
        let contract = sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts WHERE booking_id = $1 AND status <> 'cancelled'",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contract)
    }

    pub async fn find_active_by_booking_tx(
        conn: &mut PgConnection,
        booking_id: Uuid,
    ) -> Result<Option<Contract>, AppError> {
        let contract = sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts WHERE booking_id = $1 AND status <> 'cancelled' FOR UPDATE",
        )
        .bind(booking_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(contract)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Contract>, AppError> {
        let contracts = sqlx::query_as::<_, Contract>(
            r#"
            SELECT c.* FROM contracts c
            JOIN bookings b ON b.id = c.booking_id
            WHERE b.renter_id = $1 OR b.owner_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(contracts)
    }

    /// Persiste o estado calculado pela máquina de estados
    pub async fn update_state_tx(
        conn: &mut PgConnection,
        id: Uuid,
        state: &ContractState,
        last_event_key: Option<&str>,
    ) -> Result<Contract, AppError> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts SET
                status = $2,
                renter_signed = $3 IS NOT NULL,
                renter_signed_at = $3,
                owner_signed = $4 IS NOT NULL,
                owner_signed_at = $4,
                signed_pdf_url = $5,
                cancellation_reason = $6,
                cancelled_at = CASE WHEN $2 = 'cancelled'::contract_status
                    THEN COALESCE(cancelled_at, NOW()) ELSE cancelled_at END,
                last_event_key = COALESCE($7, last_event_key),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(state.status)
        .bind(state.renter_signed_at)
        .bind(state.owner_signed_at)
        .bind(state.signed_pdf_url.as_deref())
        .bind(state.cancellation_reason.as_deref())
        .bind(last_event_key)
        .fetch_one(&mut *conn)
        .await?;
        Ok(contract)
    }

    pub async fn set_external_document_tx(
        conn: &mut PgConnection,
        id: Uuid,
        external_document_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE contracts SET external_document_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(external_document_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Insere na trilha de auditoria; `false` quando a chave já foi processada
    pub async fn insert_event_tx(
        conn: &mut PgConnection,
        event: &NewContractEvent,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contract_events (
                id, contract_id, event_key, action, previous_status, new_status, performed_by, details
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (contract_id, event_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.contract_id)
        .bind(&event.event_key)
        .bind(&event.action)
        .bind(event.previous_status)
        .bind(event.new_status)
        .bind(event.performed_by)
        .bind(event.details.clone())
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn list_events(&self, contract_id: Uuid) -> Result<Vec<ContractEvent>, AppError> {
        let events = sqlx::query_as::<_, ContractEvent>(
            "SELECT * FROM contract_events WHERE contract_id = $1 ORDER BY created_at, id",
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn store_file_tx(
        conn: &mut PgConnection,
        contract_id: Uuid,
        content_type: &str,
        content: &[u8],
        pdf_url: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO contract_files (contract_id, content_type, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (contract_id) DO UPDATE
            SET content_type = EXCLUDED.content_type, content = EXCLUDED.content, created_at = NOW()
            "#,
        )
        .bind(contract_id)
        .bind(content_type)
        .bind(content)
        .execute(&mut *conn)
        .await?;

        sqlx::query("UPDATE contracts SET pdf_url = $2, updated_at = NOW() WHERE id = $1")
            .bind(contract_id)
            .bind(pdf_url)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn find_file(&self, contract_id: Uuid) -> Result<Option<ContractFile>, AppError> {
        let file = sqlx::query_as::<_, ContractFile>(
            "SELECT * FROM contract_files WHERE contract_id = $1",
        )
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }

    /// Guarda o PDF assinado e publica a URL de download do contrato
    pub async fn store_signed_file_tx(
        conn: &mut PgConnection,
        contract_id: Uuid,
        content_type: &str,
        content: &[u8],
        signed_pdf_url: &str,
    ) -> Result<ContractFile, AppError> {
        let file = sqlx::query_as::<_, ContractFile>(
            r#"
            INSERT INTO contract_signed_files (contract_id, content_type, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (contract_id) DO UPDATE
            SET content_type = EXCLUDED.content_type, content = EXCLUDED.content, created_at = NOW()
            RETURNING *
            "#,
        )
        .bind(contract_id)
        .bind(content_type)
        .bind(content)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query("UPDATE contracts SET signed_pdf_url = $2, updated_at = NOW() WHERE id = $1")
            .bind(contract_id)
            .bind(signed_pdf_url)
            .execute(&mut *conn)
            .await?;
        Ok(file)
    }

    pub async fn find_signed_file(&self, contract_id: Uuid) -> Result<Option<ContractFile>, AppError> {
        let file = sqlx::query_as::<_, ContractFile>(
            "SELECT * FROM contract_signed_files WHERE contract_id = $1",
        )
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(file)
    }
}
