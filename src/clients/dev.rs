//! Stand-ins de desenvolvimento
//!
//! Usados quando as credenciais do provedor não estão configuradas. Não
//! fazem chamadas externas, apenas registram o que seria feito.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ClientResult, EmailMessage, NewPaymentIntent, Notifier, PaymentIntent, PaymentIntentStatus,
    PaymentProvider, PdfRenderer, Refund, RemoteDocumentState, RemoteDocumentStatus,
    RenderedDocument, SignatureProvider, Signer,
};

/// Intents criados localmente são considerados pagos na consulta
#[derive(Default)]
pub struct DevPaymentProvider {
    intents: RwLock<HashMap<String, PaymentIntent>>,
}

#[async_trait]
impl PaymentProvider for DevPaymentProvider {
    async fn create_payment_intent(&self, request: NewPaymentIntent) -> ClientResult<PaymentIntent> {
        let id = format!("pi_dev_{}", Uuid::new_v4().simple());
        log::info!(
            "🔧 [dev] Payment intent {} de {} centavos ({})",
            id,
            request.amount_cents,
            request.description
        );
        let intent = PaymentIntent {
            client_secret: Some(format!("{}_secret_dev", id)),
            id: id.clone(),
            amount: request.amount_cents,
            currency: request.currency.to_lowercase(),
            status: PaymentIntentStatus::RequiresPaymentMethod,
            metadata: request.metadata,
        };
        self.intents.write().await.insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, id: &str) -> ClientResult<PaymentIntent> {
        let known = self.intents.read().await.get(id).cloned();
        let mut intent = known.unwrap_or_else(|| PaymentIntent {
            id: id.to_string(),
            amount: 0,
            currency: "brl".to_string(),
            status: PaymentIntentStatus::Succeeded,
            client_secret: None,
            metadata: HashMap::new(),
        });
        intent.status = PaymentIntentStatus::Succeeded;
        Ok(intent)
    }

    async fn refund(&self, payment_intent_id: &str, amount_cents: i64) -> ClientResult<Refund> {
        log::info!("🔧 [dev] Estorno de {} centavos do intent {}", amount_cents, payment_intent_id);
        Ok(Refund {
            id: format!("re_dev_{}", payment_intent_id),
            amount: amount_cents,
            status: "succeeded".to_string(),
        })
    }
}

/// Documentos ficam pendentes; o PDF assinado é um arquivo mínimo
#[derive(Default)]
pub struct DevSignatureProvider;

#[async_trait]
impl SignatureProvider for DevSignatureProvider {
    async fn upload_document(&self, name: &str, pdf: &[u8]) -> ClientResult<String> {
        let id = format!("dev_{}", Uuid::new_v4());
        log::info!("🔧 [dev] Documento '{}' ({} bytes) -> {}", name, pdf.len(), id);
        Ok(id)
    }

    async fn add_signers(&self, document_id: &str, signers: &[Signer]) -> ClientResult<()> {
        for signer in signers {
            log::info!("🔧 [dev] Signatário {} <{}> em {}", signer.name, signer.email, document_id);
        }
        Ok(())
    }

    async fn send_to_signers(&self, document_id: &str, _message: &str) -> ClientResult<()> {
        log::info!("🔧 [dev] Documento {} enviado para assinatura", document_id);
        Ok(())
    }

    async fn document_status(&self, _document_id: &str) -> ClientResult<RemoteDocumentStatus> {
        Ok(RemoteDocumentStatus {
            state: RemoteDocumentState::Pending,
            signers: Vec::new(),
        })
    }

    async fn cancel_document(&self, document_id: &str, reason: &str) -> ClientResult<()> {
        log::info!("🔧 [dev] Documento {} cancelado: {}", document_id, reason);
        Ok(())
    }

    async fn download_signed(&self, document_id: &str) -> ClientResult<RenderedDocument> {
        log::info!("🔧 [dev] PDF assinado de {}", document_id);
        Ok(RenderedDocument {
            content_type: "application/pdf".to_string(),
            bytes: format!("%PDF-1.4\n% documento {} assinado\n%%EOF\n", document_id).into_bytes(),
        })
    }
}

#[derive(Default)]
pub struct DevNotifier;

#[async_trait]
impl Notifier for DevNotifier {
    async fn send_email(&self, message: EmailMessage) -> ClientResult<()> {
        log::info!("🔧 [dev] E-mail para {}: {}", message.to, message.subject);
        Ok(())
    }
}

/// Devolve o próprio HTML; o download é servido como `text/html`
#[derive(Default)]
pub struct DevPdfRenderer;

#[async_trait]
impl PdfRenderer for DevPdfRenderer {
    async fn render_html(&self, html: &str) -> ClientResult<RenderedDocument> {
        Ok(RenderedDocument {
            content_type: "text/html; charset=utf-8".to_string(),
            bytes: html.as_bytes().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dev_payment_intent_succeeds_on_retrieve() {
        let provider = DevPaymentProvider::default();
        let created = provider
            .create_payment_intent(NewPaymentIntent {
                amount_cents: 2000,
                currency: "BRL".to_string(),
                description: "Pacote de moedas".to_string(),
                metadata: HashMap::from([("kind".to_string(), "coins".to_string())]),
            })
            .await
            .unwrap();
        assert_eq!(created.status, PaymentIntentStatus::RequiresPaymentMethod);

        let fetched = provider.retrieve_payment_intent(&created.id).await.unwrap();
        assert_eq!(fetched.status, PaymentIntentStatus::Succeeded);
        assert_eq!(fetched.amount, 2000);
        assert_eq!(fetched.metadata.get("kind").map(String::as_str), Some("coins"));
    }

    #[tokio::test]
    async fn test_dev_refund_echoes_amount() {
        let refund = DevPaymentProvider::default().refund("pi_dev_1", 37500).await.unwrap();
        assert_eq!(refund.amount, 37500);
        assert_eq!(refund.status, "succeeded");
    }

    #[tokio::test]
    async fn test_dev_signed_download_is_a_pdf() {
        let provider = DevSignatureProvider;
        let signed = provider.download_signed("dev_1").await.unwrap();
        assert_eq!(signed.content_type, "application/pdf");
        assert!(signed.bytes.starts_with(b"%PDF"));
    }
}
