//! Configurações administrativas (linha única)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::domain::pricing::FeePolicy;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminSettings {
    pub service_fee_percentage: Decimal,
    pub insurance_fee_percentage: Decimal,
    pub minimum_booking_days: i32,
    pub maximum_booking_days: i32,
    pub cancellation_policy_days: i32,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}

impl AdminSettings {
    pub fn fee_policy(&self) -> FeePolicy {
        FeePolicy {
            service_fee_pct: self.service_fee_percentage,
            insurance_fee_pct: self.insurance_fee_percentage,
        }
    }
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            service_fee_percentage: Decimal::new(10, 0),
            insurance_fee_percentage: Decimal::new(15, 0),
            minimum_booking_days: 1,
            maximum_booking_days: 30,
            cancellation_policy_days: 2,
            currency: "BRL".to_string(),
            updated_at: Utc::now(),
        }
    }
}
