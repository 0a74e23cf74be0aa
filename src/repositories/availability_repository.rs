use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::DateRange;
use crate::models::availability::AvailabilityPeriod;
use crate::utils::errors::AppError;

pub struct AvailabilityRepository {
    pool: PgPool,
}

impl AvailabilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<AvailabilityPeriod>, AppError> {
        let periods = sqlx::query_as::<_, AvailabilityPeriod>(
            "SELECT * FROM availability_periods WHERE vehicle_id = $1 ORDER BY start_date",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(periods)
    }

    pub async fn list_for_vehicle_tx(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
    ) -> Result<Vec<AvailabilityPeriod>, AppError> {
        let periods = sqlx::query_as::<_, AvailabilityPeriod>(
            "SELECT * FROM availability_periods WHERE vehicle_id = $1 ORDER BY start_date",
        )
        .bind(vehicle_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(periods)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AvailabilityPeriod>, AppError> {
        let period = sqlx::query_as::<_, AvailabilityPeriod>(
            "SELECT * FROM availability_periods WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(period)
    }

    pub async fn create(
        &self,
        vehicle_id: Uuid,
        range: DateRange,
        is_available: bool,
        reason: Option<&str>,
    ) -> Result<AvailabilityPeriod, AppError> {
        let period = sqlx::query_as::<_, AvailabilityPeriod>(
            r#"
            INSERT INTO availability_periods (id, vehicle_id, start_date, end_date, is_available, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle_id)
        .bind(range.start())
        .bind(range.end())
        .bind(is_available)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(period)
    }

    pub async fn update(
        &self,
        id: Uuid,
        range: DateRange,
        is_available: bool,
        reason: Option<&str>,
    ) -> Result<AvailabilityPeriod, AppError> {
        let period = sqlx::query_as::<_, AvailabilityPeriod>(
            r#"
            UPDATE availability_periods
            SET start_date = $2, end_date = $3, is_available = $4, reason = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(range.start())
        .bind(range.end())
        .bind(is_available)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(period)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM availability_periods WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
