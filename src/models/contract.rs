//! Modelo de Contract
//!
//! Contratos de locação gerados a partir de reservas confirmadas, com trilha
//! de auditoria em `contract_events`. O PDF não assinado fica em
//! `contract_files` e o assinado em `contract_signed_files`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::domain::contract_lifecycle::{ContractData, ContractState};

/// Status do contrato - mapeia o ENUM contract_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Sent,
    RenterSigned,
    OwnerSigned,
    Completed,
    Cancelled,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Sent => "sent",
            ContractStatus::RenterSigned => "renter_signed",
            ContractStatus::OwnerSigned => "owner_signed",
            ContractStatus::Completed => "completed",
            ContractStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contract {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub contract_number: String,
    pub status: ContractStatus,
    pub contract_data: Json<ContractData>,
    pub external_document_id: Option<String>,
    pub renter_signed: bool,
    pub renter_signed_at: Option<DateTime<Utc>>,
    pub owner_signed: bool,
    pub owner_signed_at: Option<DateTime<Utc>>,
    pub pdf_url: Option<String>,
    pub signed_pdf_url: Option<String>,
    pub last_event_key: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn state(&self) -> ContractState {
        ContractState {
            status: self.status,
            renter_signed_at: self.renter_signed_at,
            owner_signed_at: self.owner_signed_at,
            signed_pdf_url: self.signed_pdf_url.clone(),
            cancellation_reason: self.cancellation_reason.clone(),
        }
    }

    pub fn data(&self) -> &ContractData {
        &self.contract_data.0
    }
}

/// Registro da trilha de auditoria
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContractEvent {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub event_key: String,
    pub action: String,
    pub previous_status: Option<ContractStatus>,
    pub new_status: Option<ContractStatus>,
    pub performed_by: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContractEvent {
    pub contract_id: Uuid,
    pub event_key: String,
    pub action: String,
    pub previous_status: Option<ContractStatus>,
    pub new_status: Option<ContractStatus>,
    pub performed_by: Option<Uuid>,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ContractFile {
    pub contract_id: Uuid,
    pub content_type: String,
    pub content: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
