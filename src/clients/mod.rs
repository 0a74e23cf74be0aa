//! Clients - integrações HTTP externas
//!
//! Cada provedor fica atrás de um trait para que os services não conheçam o
//! formato das APIs (Stripe, D4Sign, Resend, Gotenberg). Sem credenciais, o
//! servidor usa os stand-ins de `dev`, que apenas registram em log.

pub mod d4sign;
pub mod dev;
pub mod gotenberg;
pub mod resend;
pub mod retry;
pub mod stripe;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use d4sign::D4SignClient;
pub use dev::{DevNotifier, DevPaymentProvider, DevPdfRenderer, DevSignatureProvider};
pub use gotenberg::GotenbergClient;
pub use resend::ResendClient;
pub use stripe::StripeClient;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} respondeu {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Resposta inesperada de {provider}: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

impl ClientError {
    /// Falhas que valem nova tentativa: conexão, timeout, 429 e 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout(),
            ClientError::Status { status, .. } => *status == 429 || *status >= 500,
            ClientError::Decode { .. } => false,
        }
    }

    /// Falhas em que o provedor certamente não processou o pedido: sem
    /// conexão ou 429. Timeout e 5xx podem ter chegado a executar
    pub fn is_unsent(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect(),
            ClientError::Status { status, .. } => *status == 429,
            ClientError::Decode { .. } => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Lê o corpo de uma resposta não-2xx e transforma em `ClientError::Status`
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        provider,
        status: status.as_u16(),
        body,
    })
}

// ---------------------------------------------------------------------------
// Pagamentos

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Refund {
    pub id: String,
    pub amount: i64,
    pub status: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_payment_intent(&self, request: NewPaymentIntent) -> ClientResult<PaymentIntent>;

    async fn retrieve_payment_intent(&self, id: &str) -> ClientResult<PaymentIntent>;

    /// Estorna `amount_cents` do intent; repetir a chamada não duplica o estorno
    async fn refund(&self, payment_intent_id: &str, amount_cents: i64) -> ClientResult<Refund>;
}

// ---------------------------------------------------------------------------
// Assinatura eletrônica

#[derive(Debug, Clone)]
pub struct Signer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteDocumentState {
    Pending,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct RemoteSignerStatus {
    pub email: String,
    pub signed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct RemoteDocumentStatus {
    pub state: RemoteDocumentState,
    pub signers: Vec<RemoteSignerStatus>,
}

#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Sobe o PDF e devolve o identificador externo do documento
    async fn upload_document(&self, name: &str, pdf: &[u8]) -> ClientResult<String>;

    async fn add_signers(&self, document_id: &str, signers: &[Signer]) -> ClientResult<()>;

    async fn send_to_signers(&self, document_id: &str, message: &str) -> ClientResult<()>;

    async fn document_status(&self, document_id: &str) -> ClientResult<RemoteDocumentStatus>;

    async fn cancel_document(&self, document_id: &str, reason: &str) -> ClientResult<()>;

    /// Conteúdo do PDF assinado
    async fn download_signed(&self, document_id: &str) -> ClientResult<RenderedDocument>;
}

// ---------------------------------------------------------------------------
// E-mail

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> ClientResult<()>;
}

// ---------------------------------------------------------------------------
// HTML -> PDF

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render_html(&self, html: &str) -> ClientResult<RenderedDocument>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let server = ClientError::Status { provider: "stripe", status: 503, body: String::new() };
        let throttled = ClientError::Status { provider: "stripe", status: 429, body: String::new() };
        let declined = ClientError::Status { provider: "stripe", status: 402, body: String::new() };
        assert!(server.is_transient());
        assert!(throttled.is_transient());
        assert!(!declined.is_transient());

        assert!(throttled.is_unsent());
        assert!(!server.is_unsent());
    }

    #[test]
    fn test_unknown_intent_status_is_tolerated() {
        let intent: PaymentIntent = serde_json::from_str(
            r#"{"id":"pi_1","amount":37500,"currency":"brl","status":"brand_new","client_secret":null}"#,
        )
        .unwrap();
        assert_eq!(intent.status, PaymentIntentStatus::Unknown);
        assert!(intent.metadata.is_empty());
    }
}
