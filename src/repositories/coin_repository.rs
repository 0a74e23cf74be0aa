use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::coins::{
    CoinTransaction, CoinTransactionKind, CoinWallet, ContactInfo, ContactUnlock,
};
use crate::utils::errors::AppError;

pub struct CoinRepository {
    pool: PgPool,
}

impl CoinRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn wallet(&self, user_id: Uuid) -> Result<CoinWallet, AppError> {
        let wallet = sqlx::query_as::<_, CoinWallet>("SELECT * FROM coin_wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(wallet.unwrap_or_else(|| CoinWallet::empty(user_id)))
    }

    pub async fn wallet_for_update_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<CoinWallet, AppError> {
        let wallet = sqlx::query_as::<_, CoinWallet>(
            "SELECT * FROM coin_wallets WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(wallet.unwrap_or_else(|| CoinWallet::empty(user_id)))
    }

    pub async fn credit_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        coins: i64,
    ) -> Result<CoinWallet, AppError> {
        let wallet = sqlx::query_as::<_, CoinWallet>(
            r#"
            INSERT INTO coin_wallets (user_id, available_coins, used_coins, total_coins)
            VALUES ($1, $2, 0, $2)
            ON CONFLICT (user_id) DO UPDATE SET
                available_coins = coin_wallets.available_coins + EXCLUDED.available_coins,
                total_coins = coin_wallets.total_coins + EXCLUDED.total_coins,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(coins)
        .fetch_one(&mut *conn)
        .await?;
        Ok(wallet)
    }

    /// Débito condicional: `None` quando o saldo não cobre o valor
    pub async fn debit_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        coins: i64,
    ) -> Result<Option<CoinWallet>, AppError> {
        let wallet = sqlx::query_as::<_, CoinWallet>(
            r#"
            UPDATE coin_wallets SET
                available_coins = available_coins - $2,
                used_coins = used_coins + $2,
                updated_at = NOW()
            WHERE user_id = $1 AND available_coins >= $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(coins)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(wallet)
    }

    /// `None` quando o payment intent já foi creditado antes
    pub async fn insert_transaction_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        kind: CoinTransactionKind,
        coins: i64,
        amount_paid: Option<Decimal>,
        payment_intent_id: Option<&str>,
        description: &str,
    ) -> Result<Option<CoinTransaction>, AppError> {
        let transaction = sqlx::query_as::<_, CoinTransaction>(
            r#"
            INSERT INTO coin_transactions (
                id, user_id, kind, coins, amount_paid, payment_intent_id, description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (payment_intent_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(kind)
        .bind(coins)
        .bind(amount_paid)
        .bind(payment_intent_id)
        .bind(description)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(transaction)
    }

    pub async fn transactions(&self, user_id: Uuid) -> Result<Vec<CoinTransaction>, AppError> {
        let transactions = sqlx::query_as::<_, CoinTransaction>(
            "SELECT * FROM coin_transactions WHERE user_id = $1 ORDER BY created_at DESC LIMIT 100",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    pub async fn active_unlock(
        &self,
        user_id: Uuid,
        vehicle_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ContactUnlock>, AppError> {
        let unlock = sqlx::query_as::<_, ContactUnlock>(
            r#"
            SELECT * FROM contact_unlocks
            WHERE user_id = $1 AND vehicle_id = $2 AND expires_at > $3
            ORDER BY expires_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(vehicle_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(unlock)
    }

    pub async fn active_unlock_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        vehicle_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ContactUnlock>, AppError> {
        let unlock = sqlx::query_as::<_, ContactUnlock>(
            r#"
            SELECT * FROM contact_unlocks
            WHERE user_id = $1 AND vehicle_id = $2 AND expires_at > $3
            ORDER BY expires_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(vehicle_id)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(unlock)
    }

    pub async fn create_unlock_tx(
        conn: &mut PgConnection,
        user_id: Uuid,
        vehicle_id: Uuid,
        owner_id: Uuid,
        coins_spent: i64,
        contact: &ContactInfo,
        expires_at: DateTime<Utc>,
    ) -> Result<ContactUnlock, AppError> {
        let unlock = sqlx::query_as::<_, ContactUnlock>(
            r#"
            INSERT INTO contact_unlocks (id, user_id, vehicle_id, owner_id, coins_spent, contact_info, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(vehicle_id)
        .bind(owner_id)
        .bind(coins_spent)
        .bind(Json(contact))
        .bind(expires_at)
        .fetch_one(&mut *conn)
        .await?;
        Ok(unlock)
    }

    pub async fn active_unlocks(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<ContactUnlock>, AppError> {
        let unlocks = sqlx::query_as::<_, ContactUnlock>(
            "SELECT * FROM contact_unlocks WHERE user_id = $1 AND expires_at > $2 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(unlocks)
    }
}
