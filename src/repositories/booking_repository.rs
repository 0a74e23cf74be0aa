use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::booking::{Booking, InspectionStatus, NewBooking, PaymentStatus};
use crate::utils::errors::AppError;

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, booking: NewBooking) -> Result<Booking, AppError> {
        let price = &booking.breakdown;
        let day_count = i32::try_from(price.day_count)
            .map_err(|_| AppError::BadRequest("Período de reserva muito longo".to_string()))?;

        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, vehicle_id, renter_id, owner_id, start_date, end_date,
                day_count, daily_rate, base_price, service_fee, insurance_fee,
                discount, total_price, security_deposit, coupon_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking.vehicle_id)
        .bind(booking.renter_id)
        .bind(booking.owner_id)
        .bind(booking.range.start())
        .bind(booking.range.end())
        .bind(day_count)
        .bind(price.daily_rate)
        .bind(price.base)
        .bind(price.service_fee)
        .bind(price.insurance_fee)
        .bind(price.discount)
        .bind(price.total)
        .bind(booking.security_deposit)
        .bind(booking.coupon_code.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    pub async fn find_by_id_for_update_tx(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(booking)
    }

    pub async fn find_by_payment_intent(&self, payment_intent_id: &str) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE payment_intent_id = $1")
            .bind(payment_intent_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    /// Reservas em que o usuário é locatário ou proprietário
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE renter_id = $1 OR owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Intervalos `[start, end)` das reservas confirmadas do veículo
    pub async fn confirmed_ranges(
        &self,
        vehicle_id: Uuid,
    ) -> Result<Vec<(NaiveDate, NaiveDate)>, AppError> {
        let rows: Vec<(NaiveDate, NaiveDate)> = sqlx::query_as(
            "SELECT start_date, end_date FROM bookings WHERE vehicle_id = $1 AND status = 'confirmed'",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn confirmed_ranges_tx(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        exclude_booking: Uuid,
    ) -> Result<Vec<(NaiveDate, NaiveDate)>, AppError> {
        let rows: Vec<(NaiveDate, NaiveDate)> = sqlx::query_as(
            r#"
            SELECT start_date, end_date FROM bookings
            WHERE vehicle_id = $1 AND status = 'confirmed' AND id <> $2
            "#,
        )
        .bind(vehicle_id)
        .bind(exclude_booking)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn set_payment_intent(&self, id: Uuid, payment_intent_id: &str) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET payment_intent_id = $2, payment_status = 'pending', updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_intent_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(booking)
    }

    /// Confirma com o intent que de fato pagou, que pode não ser o último criado
    pub async fn mark_confirmed_tx(
        conn: &mut PgConnection,
        id: Uuid,
        payment_intent_id: &str,
    ) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET
                status = 'confirmed',
                payment_status = 'paid',
                payment_intent_id = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_intent_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(booking)
    }

    pub async fn mark_payment_failed(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE bookings SET payment_status = 'failed', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn cancel_tx(conn: &mut PgConnection, id: Uuid, reason: &str) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = 'cancelled', cancellation_reason = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_one(&mut *conn)
        .await?;
        Ok(booking)
    }

    pub async fn mark_refunded(&self, id: Uuid) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET payment_status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(PaymentStatus::Refunded)
        .fetch_one(&self.pool)
        .await?;
        Ok(booking)
    }

    pub async fn mark_completed(&self, id: Uuid) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'completed', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(booking)
    }

    pub async fn set_inspection_status_tx(
        conn: &mut PgConnection,
        id: Uuid,
        status: InspectionStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET inspection_status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
