//! Modelo de Vehicle
//!
//! Este módulo contém o struct Vehicle e suas variantes de resposta.
//! Mapeia a tabela `vehicles` com primary key `id`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de aprovação do anúncio - mapeia o ENUM vehicle_approval_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_approval_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Tipo de caução
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "deposit_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DepositType {
    Percentage,
    Fixed,
}

/// Vehicle principal - mapeia a tabela vehicles
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub location: String,
    pub price_per_day: Decimal,
    pub deposit_type: DepositType,
    pub deposit_value: Decimal,
    pub is_available: bool,
    pub approval_status: ApprovalStatus,
    pub status_reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Aparece nas buscas públicas e aceita reservas
    pub fn is_bookable(&self) -> bool {
        self.is_available && self.approval_status == ApprovalStatus::Approved
    }

    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.brand, self.model, self.year)
    }
}

/// Filtros para busca pública de veículos
#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub location: Option<String>,
    pub brand: Option<String>,
    pub max_price: Option<Decimal>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
