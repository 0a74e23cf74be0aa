use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::coupon::DiscountType;
use crate::repositories::settings_repository::SettingsChanges;
use crate::utils::validation::validate_coupon_code;

// Atualização parcial das configurações
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub service_fee_percentage: Option<Decimal>,
    pub insurance_fee_percentage: Option<Decimal>,

    #[validate(range(min = 1, max = 365))]
    pub minimum_booking_days: Option<i32>,

    #[validate(range(min = 1, max = 365))]
    pub maximum_booking_days: Option<i32>,

    #[validate(range(min = 0, max = 90))]
    pub cancellation_policy_days: Option<i32>,

    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}

impl From<UpdateSettingsRequest> for SettingsChanges {
    fn from(request: UpdateSettingsRequest) -> Self {
        Self {
            service_fee_percentage: request.service_fee_percentage,
            insurance_fee_percentage: request.insurance_fee_percentage,
            minimum_booking_days: request.minimum_booking_days,
            maximum_booking_days: request.maximum_booking_days,
            cancellation_policy_days: request.cancellation_policy_days,
            currency: request.currency.map(|c| c.to_uppercase()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCouponRequest {
    #[validate(custom = "validate_coupon_code")]
    pub code: String,

    #[validate(length(min = 1, max = 255))]
    pub description: String,

    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Option<Decimal>,

    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,

    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SetCouponActiveRequest {
    pub is_active: bool,
}
