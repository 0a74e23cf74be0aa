//! Carteira de moedas e desbloqueio de contato do proprietário

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::clients::{NewPaymentIntent, PaymentIntent, PaymentIntentStatus, PaymentProvider};
use crate::domain::contact_unlock::{
    ensure_affordable, expires_at, find_package, COIN_PACKAGES, UNLOCK_COST_COINS,
};
use crate::domain::DomainError;
use crate::dto::booking_dto::CheckoutResponse;
use crate::dto::vehicle_dto::ContactUnlockResponse;
use crate::middleware::AuthenticatedUser;
use crate::models::coins::{CoinTransaction, CoinTransactionKind, CoinWallet, ContactInfo, ContactUnlock};
use crate::models::vehicle::ApprovalStatus;
use crate::repositories::{CoinRepository, UserRepository, VehicleRepository};
use crate::utils::errors::{not_found_error, AppError};

pub const PAYMENT_KIND_COINS: &str = "coins";

pub struct CoinService {
    pool: PgPool,
    coins: CoinRepository,
    vehicles: VehicleRepository,
    users: UserRepository,
    payments: Arc<dyn PaymentProvider>,
}

impl CoinService {
    pub fn new(pool: PgPool, payments: Arc<dyn PaymentProvider>) -> Self {
        Self {
            coins: CoinRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            payments,
            pool,
        }
    }

    pub async fn wallet(&self, user: AuthenticatedUser) -> Result<CoinWallet, AppError> {
        self.coins.wallet(user.user_id).await
    }

    pub async fn transactions(&self, user: AuthenticatedUser) -> Result<Vec<CoinTransaction>, AppError> {
        self.coins.transactions(user.user_id).await
    }

    pub async fn unlocks(&self, user: AuthenticatedUser) -> Result<Vec<ContactUnlock>, AppError> {
        self.coins.active_unlocks(user.user_id, Utc::now()).await
    }

    pub async fn purchase(&self, user: AuthenticatedUser, package_id: &str) -> Result<CheckoutResponse, AppError> {
        let package = find_package(package_id).ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "pacote '{}' inexistente (opções: {})",
                package_id,
                COIN_PACKAGES.iter().map(|p| p.id).collect::<Vec<_>>().join(", ")
            ))
        })?;

        let intent = self
            .payments
            .create_payment_intent(NewPaymentIntent {
                amount_cents: package.price_cents,
                currency: "brl".to_string(),
                description: format!("{} moedas alugae.mobi", package.coins),
                metadata: HashMap::from([
                    ("kind".to_string(), PAYMENT_KIND_COINS.to_string()),
                    ("package_id".to_string(), package.id.to_string()),
                    ("user_id".to_string(), user.user_id.to_string()),
                ]),
            })
            .await?;

        tracing::info!("🪙 Compra de {} moedas iniciada por {} ({})", package.coins, user.user_id, intent.id);
        Ok(CheckoutResponse {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            amount: package.price(),
            currency: "BRL".to_string(),
        })
    }

    /// Confirmação pedida pelo front; consulta o provedor
    pub async fn confirm_purchase(&self, user: AuthenticatedUser, payment_intent_id: &str) -> Result<CoinWallet, AppError> {
        let intent = self.payments.retrieve_payment_intent(payment_intent_id).await?;
        let owner = intent.metadata.get("user_id").and_then(|id| Uuid::parse_str(id).ok());
        if owner != Some(user.user_id) {
            return Err(AppError::Forbidden("pagamento pertence a outro usuário".to_string()));
        }
        match intent.status {
            PaymentIntentStatus::Succeeded => {}
            PaymentIntentStatus::Canceled | PaymentIntentStatus::RequiresPaymentMethod => {
                return Err(DomainError::PaymentDeclined(format!("pagamento {} não aprovado", intent.id)).into())
            }
            _ => {
                return Err(DomainError::Conflict(
                    "pagamento em processamento, tente novamente em instantes".to_string(),
                )
                .into())
            }
        }
        self.credit_from_intent(&intent).await
    }

    /// Credita uma única vez por payment intent
    pub async fn credit_from_intent(&self, intent: &PaymentIntent) -> Result<CoinWallet, AppError> {
        let user_id = intent
            .metadata
            .get("user_id")
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| AppError::BadRequest(format!("payment intent {} sem user_id", intent.id)))?;
        let package = intent
            .metadata
            .get("package_id")
            .and_then(|id| find_package(id))
            .ok_or_else(|| AppError::BadRequest(format!("payment intent {} sem pacote válido", intent.id)))?;
        if intent.amount != package.price_cents {
            return Err(AppError::Conflict(format!(
                "valor pago ({} centavos) difere do pacote {}",
                intent.amount, package.id
            )));
        }

        let mut tx = self.pool.begin().await?;
        let recorded = CoinRepository::insert_transaction_tx(
            &mut *tx,
            user_id,
            CoinTransactionKind::Purchase,
            package.coins,
            Some(package.price()),
            Some(&intent.id),
            &format!("Compra do pacote {}", package.id),
        )
        .await?;
        let wallet = match recorded {
            Some(_) => CoinRepository::credit_tx(&mut *tx, user_id, package.coins).await?,
            None => {
                tracing::info!("🔁 Payment intent {} já creditado", intent.id);
                CoinRepository::wallet_for_update_tx(&mut *tx, user_id).await?
            }
        };
        tx.commit().await?;

        tracing::info!("🪙 {} moedas creditadas para {}", package.coins, user_id);
        Ok(wallet)
    }

    pub async fn unlock_contact(&self, user: AuthenticatedUser, vehicle_id: Uuid) -> Result<ContactUnlockResponse, AppError> {
        let vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .filter(|v| v.approval_status == ApprovalStatus::Approved)
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;
        if vehicle.owner_id == user.user_id {
            return Err(DomainError::Conflict(
                "o proprietário não pode desbloquear o próprio contato".to_string(),
            )
            .into());
        }

        let now = Utc::now();
        if let Some(unlock) = self.coins.active_unlock(user.user_id, vehicle_id, now).await? {
            let wallet = self.coins.wallet(user.user_id).await?;
            return Ok(unlock_response(unlock, 0, wallet.available_coins));
        }

        let owner = self
            .users
            .find_by_id(vehicle.owner_id)
            .await?
            .ok_or_else(|| not_found_error("User", vehicle.owner_id))?;
        let contact = ContactInfo {
            name: owner.name,
            phone: owner.phone,
            email: owner.email,
        };

        let mut tx = self.pool.begin().await?;
        let wallet = CoinRepository::wallet_for_update_tx(&mut *tx, user.user_id).await?;
        if let Some(unlock) = CoinRepository::active_unlock_tx(&mut *tx, user.user_id, vehicle_id, now).await? {
            tx.commit().await?;
            return Ok(unlock_response(unlock, 0, wallet.available_coins));
        }
        ensure_affordable(wallet.available_coins)?;

        let debited = CoinRepository::debit_tx(&mut *tx, user.user_id, UNLOCK_COST_COINS)
            .await?
            .ok_or(DomainError::InsufficientCoins {
                required: UNLOCK_COST_COINS,
                available: wallet.available_coins,
            })?;
        CoinRepository::insert_transaction_tx(
            &mut *tx,
            user.user_id,
            CoinTransactionKind::Spend,
            UNLOCK_COST_COINS,
            None,
            None,
            &format!("Contato do veículo {}", vehicle.display_name()),
        )
        .await?;
        let unlock = CoinRepository::create_unlock_tx(
            &mut *tx,
            user.user_id,
            vehicle_id,
            vehicle.owner_id,
            UNLOCK_COST_COINS,
            &contact,
            expires_at(now),
        )
        .await?;
        tx.commit().await?;

        tracing::info!("🔓 Contato do veículo {} desbloqueado por {}", vehicle_id, user.user_id);
        Ok(unlock_response(unlock, UNLOCK_COST_COINS, debited.available_coins))
    }
}

fn unlock_response(unlock: ContactUnlock, charged: i64, available: i64) -> ContactUnlockResponse {
    ContactUnlockResponse {
        vehicle_id: unlock.vehicle_id,
        contact: unlock.contact_info.0,
        expires_at: unlock.expires_at,
        coins_charged: charged,
        available_coins: available,
    }
}
