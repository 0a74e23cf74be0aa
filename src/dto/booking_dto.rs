use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_coupon_code;

// Criação de reserva e orçamento usam o mesmo corpo
#[derive(Debug, Deserialize, Validate)]
pub struct BookingRequest {
    pub vehicle_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(custom = "validate_coupon_code")]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelBookingRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: Option<String>,
}

// Dados para o front concluir o pagamento com o Stripe.js
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub payment_intent_id: String,
    pub client_secret: Option<String>,
    pub amount: Decimal,
    pub currency: String,
}
