use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::vehicle::{ApprovalStatus, DepositType, Vehicle, VehicleFilters};
use crate::utils::errors::AppError;

/// Campos de um novo anúncio
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub location: String,
    pub price_per_day: Decimal,
    pub deposit_type: DepositType,
    pub deposit_value: Decimal,
}

/// Alterações parciais: `None` mantém o valor atual
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub location: Option<String>,
    pub price_per_day: Option<Decimal>,
    pub deposit_type: Option<DepositType>,
    pub deposit_value: Option<Decimal>,
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: Uuid, vehicle: NewVehicle) -> Result<Vehicle, AppError> {
        let created = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, owner_id, brand, model, year, license_plate, location,
                price_per_day, deposit_type, deposit_value, approval_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(vehicle.brand)
        .bind(vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.license_plate)
        .bind(vehicle.location)
        .bind(vehicle.price_per_day)
        .bind(vehicle.deposit_type)
        .bind(vehicle.deposit_value)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    pub async fn find_by_id_tx(conn: &mut PgConnection, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(vehicle)
    }

    pub async fn license_plate_exists(&self, license_plate: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1)")
                .bind(license_plate)
                .fetch_one(&self.pool)
                .await?;
        Ok(result.0)
    }

    /// Busca pública: apenas veículos aprovados e disponíveis
    pub async fn list_public(&self, filters: &VehicleFilters) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE approval_status = 'approved'
              AND is_available = TRUE
              AND ($1::TEXT IS NULL OR location ILIKE '%' || $1 || '%')
              AND ($2::TEXT IS NULL OR brand ILIKE $2)
              AND ($3::NUMERIC IS NULL OR price_per_day <= $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filters.location.as_deref())
        .bind(filters.brand.as_deref())
        .bind(filters.max_price)
        .bind(filters.limit.unwrap_or(20).clamp(1, 100))
        .bind(filters.offset.unwrap_or(0).max(0))
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    pub async fn list_by_approval(&self, status: ApprovalStatus) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE approval_status = $1 ORDER BY created_at ASC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    pub async fn update(&self, id: Uuid, changes: VehicleChanges) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles SET
                brand = COALESCE($2, brand),
                model = COALESCE($3, model),
                year = COALESCE($4, year),
                location = COALESCE($5, location),
                price_per_day = COALESCE($6, price_per_day),
                deposit_type = COALESCE($7, deposit_type),
                deposit_value = COALESCE($8, deposit_value),
                updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.brand)
        .bind(changes.model)
        .bind(changes.year)
        .bind(changes.location)
        .bind(changes.price_per_day)
        .bind(changes.deposit_type)
        .bind(changes.deposit_value)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(vehicle)
    }

    pub async fn set_available(&self, id: Uuid, is_available: bool) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET is_available = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_available)
        .fetch_one(&self.pool)
        .await?;
        Ok(vehicle)
    }

    pub async fn review(
        &self,
        id: Uuid,
        status: ApprovalStatus,
        reason: Option<&str>,
        reviewer: Uuid,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles SET
                approval_status = $2,
                status_reason = $3,
                reviewed_by = $4,
                reviewed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reason)
        .bind(reviewer)
        .fetch_one(&self.pool)
        .await?;
        Ok(vehicle)
    }
}
