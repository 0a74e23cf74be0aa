//! Payloads de webhook
//!
//! Os corpos dos provedores são desserializados em structs estritas e
//! convertidos em eventos internos na borda; nada além daqui conhece os
//! códigos numéricos ou nomes de evento dos provedores.

use serde::Deserialize;

use crate::clients::PaymentIntent;
use crate::utils::errors::AppError;

// ---------------------------------------------------------------------------
// Stripe

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// Eventos do Stripe que o sistema trata
#[derive(Debug)]
pub enum PaymentEvent {
    Succeeded(PaymentIntent),
    Failed(PaymentIntent),
    Ignored(String),
}

impl TryFrom<StripeEvent> for PaymentEvent {
    type Error = AppError;

    fn try_from(event: StripeEvent) -> Result<Self, Self::Error> {
        let intent = |object: serde_json::Value| {
            serde_json::from_value::<PaymentIntent>(object)
                .map_err(|e| AppError::BadRequest(format!("payment intent inválido: {}", e)))
        };
        match event.event_type.as_str() {
            "payment_intent.succeeded" => Ok(PaymentEvent::Succeeded(intent(event.data.object)?)),
            "payment_intent.payment_failed" => Ok(PaymentEvent::Failed(intent(event.data.object)?)),
            _ => Ok(PaymentEvent::Ignored(event.event_type)),
        }
    }
}

// ---------------------------------------------------------------------------
// D4Sign

const D4SIGN_FINISHED: &str = "1";
const D4SIGN_CANCELLED: &str = "3";
const D4SIGN_SIGNED: &str = "4";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct D4SignWebhook {
    pub uuid: String,
    pub type_post: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Evento de assinatura já traduzido
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureEvent {
    Finished,
    Cancelled { reason: Option<String> },
    Signed { email: String },
    /// Notificações sem efeito no contrato (ex.: e-mail não entregue)
    Other { type_post: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignatureNotification {
    pub document_id: String,
    pub event: SignatureEvent,
    /// Chave de idempotência `{uuid}:{type_post}:{email}`
    pub event_key: String,
}

pub fn signature_event_key(document_id: &str, type_post: &str, email: Option<&str>) -> String {
    format!(
        "{}:{}:{}",
        document_id,
        type_post,
        email.map(|e| e.trim().to_lowercase()).unwrap_or_default()
    )
}

impl SignatureNotification {
    pub fn signed(document_id: &str, email: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            event: SignatureEvent::Signed { email: email.to_string() },
            event_key: signature_event_key(document_id, D4SIGN_SIGNED, Some(email)),
        }
    }

    pub fn finished(document_id: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            event: SignatureEvent::Finished,
            event_key: signature_event_key(document_id, D4SIGN_FINISHED, None),
        }
    }

    pub fn cancelled(document_id: &str, reason: Option<String>) -> Self {
        Self {
            document_id: document_id.to_string(),
            event: SignatureEvent::Cancelled { reason },
            event_key: signature_event_key(document_id, D4SIGN_CANCELLED, None),
        }
    }
}

impl TryFrom<D4SignWebhook> for SignatureNotification {
    type Error = AppError;

    fn try_from(payload: D4SignWebhook) -> Result<Self, Self::Error> {
        let document_id = payload.uuid.trim();
        if document_id.is_empty() {
            return Err(AppError::BadRequest("uuid do documento ausente".to_string()));
        }

        let notification = match payload.type_post.trim() {
            D4SIGN_FINISHED => SignatureNotification::finished(document_id),
            D4SIGN_CANCELLED => SignatureNotification::cancelled(document_id, payload.message),
            D4SIGN_SIGNED => {
                let email = payload
                    .email
                    .as_deref()
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .ok_or_else(|| {
                        AppError::BadRequest("evento de assinatura sem e-mail do signatário".to_string())
                    })?;
                SignatureNotification::signed(document_id, email)
            }
            other => SignatureNotification {
                document_id: document_id.to_string(),
                event: SignatureEvent::Other { type_post: other.to_string() },
                event_key: signature_event_key(document_id, other, payload.email.as_deref()),
            },
        };
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<SignatureNotification, AppError> {
        let payload: D4SignWebhook = serde_json::from_str(json).unwrap();
        SignatureNotification::try_from(payload)
    }

    #[test]
    fn test_signer_event_key_is_case_insensitive() {
        let a = parse(r#"{"uuid":"doc-1","type_post":"4","email":"Ana@Example.com"}"#).unwrap();
        let b = parse(r#"{"uuid":"doc-1","type_post":"4","email":"ana@example.com "}"#).unwrap();
        assert_eq!(a.event_key, b.event_key);
        assert_eq!(a.event_key, "doc-1:4:ana@example.com");
        assert!(matches!(a.event, SignatureEvent::Signed { .. }));
    }

    #[test]
    fn test_finished_and_cancelled_mapping() {
        let finished = parse(r#"{"uuid":"doc-1","type_post":"1"}"#).unwrap();
        assert_eq!(finished.event, SignatureEvent::Finished);
        assert_eq!(finished.event_key, "doc-1:1:");

        let cancelled = parse(r#"{"uuid":"doc-1","type_post":"3","message":"expirado"}"#).unwrap();
        assert_eq!(
            cancelled.event,
            SignatureEvent::Cancelled { reason: Some("expirado".into()) }
        );
    }

    #[test]
    fn test_strict_parsing() {
        assert!(parse(r#"{"uuid":"doc-1","type_post":"4"}"#).is_err());
        assert!(parse(r#"{"uuid":" ","type_post":"1"}"#).is_err());
        assert!(serde_json::from_str::<D4SignWebhook>(r#"{"uuid":"d","type_post":"1","extra":1}"#).is_err());

        let other = parse(r#"{"uuid":"doc-1","type_post":"2","email":"x@y.com"}"#).unwrap();
        assert!(matches!(other.event, SignatureEvent::Other { .. }));
    }

    #[test]
    fn test_stripe_event_dispatch() {
        let raw = r#"{
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "data": {"object": {
                "id": "pi_1", "amount": 37500, "currency": "brl", "status": "succeeded",
                "client_secret": null, "metadata": {"kind": "booking"}
            }}
        }"#;
        let event: StripeEvent = serde_json::from_str(raw).unwrap();
        match PaymentEvent::try_from(event).unwrap() {
            PaymentEvent::Succeeded(intent) => {
                assert_eq!(intent.id, "pi_1");
                assert_eq!(intent.amount, 37500);
            }
            other => panic!("evento inesperado: {:?}", other),
        }

        let raw = r#"{"id":"evt_2","type":"charge.refunded","data":{"object":{}}}"#;
        let event: StripeEvent = serde_json::from_str(raw).unwrap();
        assert!(matches!(PaymentEvent::try_from(event).unwrap(), PaymentEvent::Ignored(_)));
    }
}
