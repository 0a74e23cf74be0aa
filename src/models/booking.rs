//! Modelo de Booking (reserva)

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::domain::pricing::PriceBreakdown;
use crate::domain::DateRange;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "inspection_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    NotRequired,
    Pending,
    Completed,
}

/// Booking - mapeia a tabela bookings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub day_count: i32,
    pub daily_rate: Decimal,
    pub base_price: Decimal,
    pub service_fee: Decimal,
    pub insurance_fee: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
    pub security_deposit: Decimal,
    pub coupon_code: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
    pub inspection_status: InspectionStatus,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> Option<DateRange> {
        DateRange::new(self.start_date, self.end_date).ok()
    }

    pub fn breakdown(&self) -> PriceBreakdown {
        PriceBreakdown {
            day_count: i64::from(self.day_count),
            daily_rate: self.daily_rate,
            base: self.base_price,
            service_fee: self.service_fee,
            insurance_fee: self.insurance_fee,
            discount: self.discount,
            total: self.total_price,
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.renter_id == user_id || self.owner_id == user_id
    }
}

/// Dados para inserir uma nova reserva
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub vehicle_id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid,
    pub range: DateRange,
    pub breakdown: PriceBreakdown,
    pub security_deposit: Decimal,
    pub coupon_code: Option<String>,
}
