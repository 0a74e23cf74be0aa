use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::coupon::{Coupon, DiscountType};
use crate::utils::errors::AppError;

#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub code: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Decimal,
    pub max_uses: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, coupon: NewCoupon, created_by: Uuid) -> Result<Coupon, AppError> {
        let created = sqlx::query_as::<_, Coupon>(
            r#"
            INSERT INTO coupons (
                id, code, description, discount_type, discount_value,
                min_order_value, max_uses, valid_from, valid_until, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(coupon.code)
        .bind(coupon.description)
        .bind(coupon.discount_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_order_value)
        .bind(coupon.max_uses)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, AppError> {
        let coupon = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(coupon)
    }

    pub async fn list(&self) -> Result<Vec<Coupon>, AppError> {
        let coupons = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(coupons)
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Option<Coupon>, AppError> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "UPDATE coupons SET is_active = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(coupon)
    }

    /// Consome um uso; `false` quando o cupom esgotou entre a cotação e o pagamento
    pub async fn increment_usage_tx(conn: &mut PgConnection, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE coupons SET used_count = used_count + 1
            WHERE code = $1 AND used_count < max_uses
            "#,
        )
        .bind(code)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
