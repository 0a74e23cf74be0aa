//! Carteira de moedas e desbloqueios de contato

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "coin_transaction_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CoinTransactionKind {
    Purchase,
    Spend,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CoinWallet {
    pub user_id: Uuid,
    pub available_coins: i64,
    pub used_coins: i64,
    pub total_coins: i64,
    pub updated_at: DateTime<Utc>,
}

impl CoinWallet {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            available_coins: 0,
            used_coins: 0,
            total_coins: 0,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CoinTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: CoinTransactionKind,
    pub coins: i64,
    pub amount_paid: Option<Decimal>,
    pub payment_intent_id: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Snapshot do contato do proprietário no momento do desbloqueio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactUnlock {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub owner_id: Uuid,
    pub coins_spent: i64,
    pub contact_info: Json<ContactInfo>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
