//! Cliente HTTP para a API do Stripe (payment intents)

use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

use super::retry::with_retry;
use super::{ensure_success, ClientResult, NewPaymentIntent, PaymentIntent, PaymentProvider, Refund};
use crate::config::StripeConfig;

const PROVIDER: &str = "stripe";
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Mesmo estorno para o mesmo intent, mesmo que o cancelamento seja refeito
fn refund_idempotency_key(payment_intent_id: &str, amount_cents: i64) -> String {
    format!("refund-{}-{}", payment_intent_id, amount_cents)
}

pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Corpo `application/x-www-form-urlencoded` no formato do Stripe
    fn intent_form(request: &NewPaymentIntent) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), request.amount_cents.to_string()),
            ("currency".to_string(), request.currency.to_lowercase()),
            ("description".to_string(), request.description.clone()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];
        let mut metadata: Vec<_> = request.metadata.iter().collect();
        metadata.sort();
        for (key, value) in metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }
        form
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_payment_intent(&self, request: NewPaymentIntent) -> ClientResult<PaymentIntent> {
        let url = format!("{}/payment_intents", self.base_url);
        let form = Self::intent_form(&request);

        log::info!(
            "💳 Criando payment intent de {} centavos ({})",
            request.amount_cents,
            request.description
        );

        // uma chave por chamada: as retentativas abaixo não criam outro intent
        let idempotency_key = Uuid::new_v4().to_string();
        let (url, form, idempotency_key) = (&url, &form, &idempotency_key);
        let intent = with_retry("stripe.create_payment_intent", || async move {
            let response = self
                .client
                .post(url)
                .bearer_auth(&self.secret_key)
                .header(IDEMPOTENCY_HEADER, idempotency_key)
                .form(form)
                .send()
                .await?;
            let response = ensure_success(PROVIDER, response).await?;
            Ok(response.json::<PaymentIntent>().await?)
        })
        .await?;

        log::info!("✅ Payment intent {} criado ({:?})", intent.id, intent.status);
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, id: &str) -> ClientResult<PaymentIntent> {
        let url = format!("{}/payment_intents/{}", self.base_url, id);

        let url = &url;
        with_retry("stripe.retrieve_payment_intent", || async move {
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.secret_key)
                .send()
                .await?;
            let response = ensure_success(PROVIDER, response).await?;
            Ok(response.json::<PaymentIntent>().await?)
        })
        .await
    }

    async fn refund(&self, payment_intent_id: &str, amount_cents: i64) -> ClientResult<Refund> {
        let url = format!("{}/refunds", self.base_url);
        let form = [
            ("payment_intent", payment_intent_id.to_string()),
            ("amount", amount_cents.to_string()),
        ];
        let idempotency_key = refund_idempotency_key(payment_intent_id, amount_cents);

        log::info!("↩️ Estornando {} centavos do intent {}", amount_cents, payment_intent_id);

        let (url, form, idempotency_key) = (&url, &form, &idempotency_key);
        let refund = with_retry("stripe.refund", || async move {
            let response = self
                .client
                .post(url)
                .bearer_auth(&self.secret_key)
                .header(IDEMPOTENCY_HEADER, idempotency_key)
                .form(form)
                .send()
                .await?;
            let response = ensure_success(PROVIDER, response).await?;
            Ok(response.json::<Refund>().await?)
        })
        .await?;

        log::info!("✅ Estorno {} registrado ({})", refund.id, refund.status);
        Ok(refund)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_intent_form_encodes_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("kind".to_string(), "booking".to_string());
        metadata.insert("booking_id".to_string(), "b-1".to_string());

        let form = StripeClient::intent_form(&NewPaymentIntent {
            amount_cents: 37500,
            currency: "BRL".to_string(),
            description: "Reserva".to_string(),
            metadata,
        });

        assert!(form.contains(&("amount".to_string(), "37500".to_string())));
        assert!(form.contains(&("currency".to_string(), "brl".to_string())));
        assert!(form.contains(&("metadata[kind]".to_string(), "booking".to_string())));
        assert!(form.contains(&("metadata[booking_id]".to_string(), "b-1".to_string())));
    }

    #[test]
    fn test_refund_key_is_stable_per_intent_and_amount() {
        assert_eq!(
            refund_idempotency_key("pi_1", 37500),
            refund_idempotency_key("pi_1", 37500)
        );
        assert_ne!(
            refund_idempotency_key("pi_1", 37500),
            refund_idempotency_key("pi_2", 37500)
        );
    }
}
