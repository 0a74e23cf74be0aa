//! Webhooks de pagamento e assinatura
//!
//! A assinatura do corpo é verificada antes de qualquer parsing. Erros de
//! regra de negócio são logados e respondidos com 200 para o provedor não
//! reenviar indefinidamente; falhas de banco ou de rede voltam como 5xx.

use chrono::Utc;

use crate::config::EnvironmentConfig;
use crate::dto::webhook_dto::{D4SignWebhook, PaymentEvent, SignatureNotification, StripeEvent};
use crate::services::booking_service::{BookingService, PAYMENT_KIND_BOOKING};
use crate::services::coin_service::{CoinService, PAYMENT_KIND_COINS};
use crate::services::contract_service::{ContractService, SignatureOutcome};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::signature::{verify_d4sign_signature, verify_stripe_signature};

pub struct PaymentWebhookService {
    bookings: BookingService,
    coins: CoinService,
    contracts: ContractService,
}

/// Resumo devolvido ao provedor
#[derive(Debug, serde::Serialize)]
pub struct WebhookAck {
    pub received: bool,
    pub result: String,
}

impl WebhookAck {
    fn new(result: impl Into<String>) -> Self {
        Self {
            received: true,
            result: result.into(),
        }
    }
}

impl PaymentWebhookService {
    pub fn new(state: &AppState) -> Self {
        Self {
            bookings: BookingService::new(state),
            coins: CoinService::new(state.pool.clone(), state.providers.payments.clone()),
            contracts: ContractService::new(state),
        }
    }

    pub async fn handle_stripe(
        &self,
        config: &EnvironmentConfig,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookAck, AppError> {
        let secret = config.stripe.as_ref().and_then(|s| s.webhook_secret.as_deref());
        match secret {
            Some(secret) => {
                let header = signature
                    .ok_or_else(|| AppError::Unauthorized("Stripe-Signature ausente".to_string()))?;
                verify_stripe_signature(payload, header, secret, Utc::now().timestamp())?;
            }
            None if config.is_development() => {
                tracing::warn!("⚠️ STRIPE_WEBHOOK_SECRET ausente, assinatura não verificada (desenvolvimento)");
            }
            None => {
                return Err(AppError::Unauthorized(
                    "webhook do Stripe não configurado".to_string(),
                ))
            }
        }

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::BadRequest(format!("evento do Stripe inválido: {}", e)))?;
        let event_id = event.id.clone();
        tracing::info!("📨 Webhook Stripe {} ({})", event_id, event.event_type);

        let result = match PaymentEvent::try_from(event)? {
            PaymentEvent::Succeeded(intent) => {
                let kind = intent.metadata.get("kind").map(String::as_str);
                match kind {
                    Some(PAYMENT_KIND_COINS) => self.coins.credit_from_intent(&intent).await.map(|w| {
                        format!("carteira com {} moedas", w.available_coins)
                    }),
                    Some(PAYMENT_KIND_BOOKING) | None => {
                        self.bookings.confirm_from_webhook(intent).await.map(|b| match b {
                            Some(booking) => format!("reserva {} {}", booking.id, booking.status.as_str()),
                            None => "reserva não encontrada".to_string(),
                        })
                    }
                    Some(other) => Ok(format!("tipo {} ignorado", other)),
                }
            }
            PaymentEvent::Failed(intent) => self
                .bookings
                .payment_failed(&intent)
                .await
                .map(|_| "falha registrada".to_string()),
            PaymentEvent::Ignored(event_type) => Ok(format!("evento {} ignorado", event_type)),
        };

        acknowledge(&event_id, result)
    }

    pub async fn handle_d4sign(
        &self,
        config: &EnvironmentConfig,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookAck, AppError> {
        let webhook: D4SignWebhook = serde_json::from_slice(payload)
            .map_err(|e| AppError::BadRequest(format!("webhook da D4Sign inválido: {}", e)))?;

        let secret = config.d4sign.as_ref().and_then(|d| d.webhook_secret.as_deref());
        match secret {
            Some(secret) => {
                let header =
                    signature.ok_or_else(|| AppError::Unauthorized("Content-Hmac ausente".to_string()))?;
                verify_d4sign_signature(&webhook.uuid, header, secret)?;
            }
            None if config.is_development() => {
                tracing::warn!("⚠️ D4SIGN_WEBHOOK_SECRET ausente, assinatura não verificada (desenvolvimento)");
            }
            None => {
                return Err(AppError::Unauthorized(
                    "webhook da D4Sign não configurado".to_string(),
                ))
            }
        }

        let notification = SignatureNotification::try_from(webhook)?;
        let key = notification.event_key.clone();
        tracing::info!("📨 Webhook D4Sign {}", key);

        let result = self.contracts.handle_signature(notification).await.map(|outcome| match outcome {
            SignatureOutcome::Applied(contract) => format!("contrato {}", contract.status.as_str()),
            SignatureOutcome::Unchanged(reason) => reason.to_string(),
            SignatureOutcome::Duplicate => "evento duplicado".to_string(),
            SignatureOutcome::Ignored(reason) => reason,
        });

        acknowledge(&key, result)
    }
}

/// Regra de negócio violada vira 200 com o motivo; o resto propaga
fn acknowledge(event: &str, result: Result<String, AppError>) -> Result<WebhookAck, AppError> {
    match result {
        Ok(result) => Ok(WebhookAck::new(result)),
        Err(AppError::Domain(e)) => {
            tracing::warn!("⚠️ Webhook {} recusado pela regra de negócio: {}", event, e);
            Ok(WebhookAck::new(e.to_string()))
        }
        Err(e) => {
            tracing::error!("❌ Webhook {} falhou: {}", event, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::utils::errors::test_support::database_error;

    #[test]
    fn test_domain_errors_are_acknowledged() {
        let ack = acknowledge(
            "evt_1",
            Err(DomainError::VerificationRequired(crate::models::document::VerificationStatus::Pending).into()),
        )
        .unwrap();
        assert!(ack.received);
        assert!(ack.result.contains("Verificação"));
    }

    #[test]
    fn test_infrastructure_errors_propagate() {
        let result = acknowledge("evt_1", Err(AppError::ExternalApi("timeout".to_string())));
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[test]
    fn test_serialization_race_is_not_acknowledged() {
        // o provedor precisa reenviar o evento para a confirmação ser refeita
        let race = AppError::from(database_error("40001"));
        let result = acknowledge("evt_race", Err(race));
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_overlap_conflict_is_acknowledged() {
        let overlap = AppError::from(database_error("23P01"));
        let ack = acknowledge("evt_overlap", Err(overlap)).unwrap();
        assert!(ack.received);
    }
}
