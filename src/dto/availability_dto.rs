use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::availability::AvailabilityPeriod;

// Período de disponibilidade declarado pelo proprietário
#[derive(Debug, Deserialize, Validate)]
pub struct PeriodRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_available: bool,

    #[validate(length(max = 255))]
    pub reason: Option<String>,
}

// Consulta de disponibilidade: `?start_date=2025-07-01&end_date=2025-07-04`
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityCheckResponse {
    pub vehicle_id: uuid::Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub available: bool,
    pub reason: Option<String>,
}

// Calendário do veículo: períodos do proprietário e reservas confirmadas
#[derive(Debug, Serialize)]
pub struct VehicleCalendarResponse {
    pub periods: Vec<AvailabilityPeriod>,
    pub booked: Vec<BookedRange>,
}

#[derive(Debug, Serialize)]
pub struct BookedRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
