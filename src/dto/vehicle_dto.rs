use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::coins::ContactInfo;
use crate::models::vehicle::{DepositType, Vehicle};
use crate::utils::validation::validate_license_plate;

// Request para cadastrar um veículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 50))]
    pub brand: String,

    #[validate(length(min = 1, max = 50))]
    pub model: String,

    #[validate(range(min = 1980, max = 2100))]
    pub year: i32,

    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,

    #[validate(length(min = 2, max = 200))]
    pub location: String,

    pub price_per_day: Decimal,
    pub deposit_type: Option<DepositType>,
    pub deposit_value: Option<Decimal>,
}

// Request para atualizar um veículo (placa não muda)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 50))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub model: Option<String>,

    #[validate(range(min = 1980, max = 2100))]
    pub year: Option<i32>,

    #[validate(length(min = 2, max = 200))]
    pub location: Option<String>,

    pub price_per_day: Option<Decimal>,
    pub deposit_type: Option<DepositType>,
    pub deposit_value: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub is_available: bool,
}

// Decisão do administrador
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewVehicleRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

// Contato liberado após o desbloqueio
#[derive(Debug, Serialize)]
pub struct ContactUnlockResponse {
    pub vehicle_id: uuid::Uuid,
    pub contact: ContactInfo,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub coins_charged: i64,
    pub available_coins: i64,
}

// Listagem pública
#[derive(Debug, Serialize)]
pub struct VehicleListResponse {
    pub vehicles: Vec<Vehicle>,
    pub count: usize,
}
