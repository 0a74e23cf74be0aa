//! Cupons de desconto (gestão pelo admin)

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::dto::admin_dto::CreateCouponRequest;
use crate::middleware::AuthenticatedUser;
use crate::models::coupon::{Coupon, DiscountType};
use crate::repositories::coupon_repository::NewCoupon;
use crate::repositories::CouponRepository;
use crate::utils::errors::{not_found_error, AppError};

pub struct CouponService {
    repository: CouponRepository,
}

impl CouponService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CouponRepository::new(pool),
        }
    }

    pub async fn create(&self, admin: AuthenticatedUser, request: CreateCouponRequest) -> Result<Coupon, AppError> {
        let coupon = new_coupon(request)?;
        if self.repository.find_by_code(&coupon.code).await?.is_some() {
            return Err(AppError::Conflict(format!("Cupom {} já existe", coupon.code)));
        }
        let created = self.repository.create(coupon, admin.user_id).await?;
        tracing::info!("🎟️ Cupom {} criado por {}", created.code, admin.user_id);
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<Coupon>, AppError> {
        self.repository.list().await
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Coupon, AppError> {
        self.repository
            .set_active(id, is_active)
            .await?
            .ok_or_else(|| not_found_error("Coupon", id))
    }
}

fn new_coupon(request: CreateCouponRequest) -> Result<NewCoupon, DomainError> {
    if request.discount_value <= Decimal::ZERO {
        return Err(DomainError::InvalidInput("o desconto deve ser positivo".to_string()));
    }
    if request.discount_type == DiscountType::Percentage && request.discount_value > Decimal::ONE_HUNDRED {
        return Err(DomainError::InvalidInput(
            "desconto percentual não pode passar de 100%".to_string(),
        ));
    }
    let min_order_value = request.min_order_value.unwrap_or(Decimal::ZERO);
    if min_order_value < Decimal::ZERO {
        return Err(DomainError::InvalidInput("valor mínimo não pode ser negativo".to_string()));
    }
    let valid_from = request.valid_from.unwrap_or_else(Utc::now);
    if request.valid_until <= valid_from {
        return Err(DomainError::InvalidRange(
            "o fim da validade deve ser posterior ao início".to_string(),
        ));
    }

    Ok(NewCoupon {
        code: request.code.trim().to_uppercase(),
        description: request.description.trim().to_string(),
        discount_type: request.discount_type,
        discount_value: request.discount_value,
        min_order_value,
        max_uses: request.max_uses.unwrap_or(1),
        valid_from,
        valid_until: request.valid_until,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(discount_type: DiscountType, value: i64) -> CreateCouponRequest {
        CreateCouponRequest {
            code: "verao25".to_string(),
            description: "Promoção de verão".to_string(),
            discount_type,
            discount_value: Decimal::from(value),
            min_order_value: None,
            max_uses: Some(50),
            valid_from: None,
            valid_until: Utc::now() + Duration::days(30),
        }
    }

    #[test]
    fn test_new_coupon_normalizes_code() {
        let coupon = new_coupon(request(DiscountType::Percentage, 10)).unwrap();
        assert_eq!(coupon.code, "VERAO25");
        assert_eq!(coupon.max_uses, 50);
        assert_eq!(coupon.min_order_value, Decimal::ZERO);
    }

    #[test]
    fn test_invalid_coupons_are_rejected() {
        assert!(new_coupon(request(DiscountType::Percentage, 150)).is_err());
        assert!(new_coupon(request(DiscountType::Fixed, 0)).is_err());

        let mut expired = request(DiscountType::Fixed, 20);
        expired.valid_until = Utc::now() - Duration::days(1);
        assert!(matches!(new_coupon(expired), Err(DomainError::InvalidRange(_))));
    }
}
