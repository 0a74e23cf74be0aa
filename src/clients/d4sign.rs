//! Cliente HTTP para a API da D4Sign (assinatura eletrônica)
//!
//! Autenticação por `tokenAPI` + `cryptKey` na query string. O documento é
//! enviado em base64 para o cofre configurado (`safe_id`).

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::retry::{with_retry, with_retry_policy, RetryPolicy};
use super::{
    ensure_success, ClientError, ClientResult, RemoteDocumentState, RemoteDocumentStatus,
    RemoteSignerStatus, RenderedDocument, SignatureProvider, Signer,
};
use crate::config::D4SignConfig;

const PROVIDER: &str = "d4sign";

pub struct D4SignClient {
    client: Client,
    base_url: String,
    token: String,
    crypt_key: String,
    safe_id: String,
    webhook_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct DocumentInfo {
    #[serde(rename = "statusId")]
    status_id: String,
}

#[derive(Debug, Deserialize)]
struct SignerListEntry {
    #[serde(default)]
    list: Vec<SignerInfo>,
}

#[derive(Debug, Deserialize)]
struct SignerInfo {
    email: String,
    #[serde(default)]
    signed: Option<String>,
    #[serde(default)]
    date_signed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadResponse {
    url: String,
}

/// statusId da D4Sign: 4 finalizado, 5 arquivado, 6 cancelado, demais em andamento
fn map_status(status_id: &str) -> RemoteDocumentState {
    match status_id.trim() {
        "4" | "5" => RemoteDocumentState::Finished,
        "6" => RemoteDocumentState::Cancelled,
        _ => RemoteDocumentState::Pending,
    }
}

fn parse_signed_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

impl D4SignClient {
    pub fn new(config: &D4SignConfig, public_base_url: &str) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            crypt_key: config.crypt_key.clone(),
            safe_id: config.safe_id.clone(),
            webhook_url: format!(
                "{}/api/webhooks/d4sign",
                public_base_url.trim_end_matches('/')
            ),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self) -> [(&'static str, &str); 2] {
        [("tokenAPI", self.token.as_str()), ("cryptKey", self.crypt_key.as_str())]
    }

    async fn post_json(
        &self,
        label: &str,
        policy: RetryPolicy,
        path: &str,
        body: serde_json::Value,
    ) -> ClientResult<reqwest::Response> {
        let url = &self.url(path);
        let body = &body;
        with_retry_policy(label, policy, || async move {
            let response = self
                .client
                .post(url)
                .query(&self.auth())
                .json(body)
                .send()
                .await?;
            ensure_success(PROVIDER, response).await
        })
        .await
    }

    async fn get(&self, label: &str, path: &str) -> ClientResult<reqwest::Response> {
        let url = &self.url(path);
        with_retry(label, || async move {
            let response = self.client.get(url).query(&self.auth()).send().await?;
            ensure_success(PROVIDER, response).await
        })
        .await
    }

    /// URL temporária do PDF assinado
    async fn download_url(&self, document_id: &str) -> ClientResult<String> {
        let download: DownloadResponse = self
            .post_json(
                "d4sign.download",
                RetryPolicy::Idempotent,
                &format!("/documents/{}/download", document_id),
                json!({ "type": "PDF", "language": "pt" }),
            )
            .await?
            .json()
            .await?;
        Ok(download.url)
    }
}

#[async_trait]
impl SignatureProvider for D4SignClient {
    async fn upload_document(&self, name: &str, pdf: &[u8]) -> ClientResult<String> {
        log::info!("📄 Enviando documento '{}' para a D4Sign ({} bytes)", name, pdf.len());

        let response = self
            .post_json(
                "d4sign.upload",
                RetryPolicy::Unsent,
                &format!("/documents/{}/uploadbinary", self.safe_id),
                json!({
                    "base64_binary_file": STANDARD.encode(pdf),
                    "mime_type": "application/pdf",
                    "name": name,
                }),
            )
            .await?;
        let uploaded: UploadResponse = response.json().await?;

        // Webhook por documento: eventos de assinatura chegam em /api/webhooks/d4sign
        self.post_json(
            "d4sign.webhook",
            RetryPolicy::Idempotent,
            &format!("/documents/{}/webhooks", uploaded.uuid),
            json!({ "url": self.webhook_url }),
        )
        .await?;

        log::info!("✅ Documento D4Sign criado: {}", uploaded.uuid);
        Ok(uploaded.uuid)
    }

    async fn add_signers(&self, document_id: &str, signers: &[Signer]) -> ClientResult<()> {
        let list: Vec<serde_json::Value> = signers
            .iter()
            .map(|s| {
                json!({
                    "email": s.email,
                    "act": "1",
                    "foreign": "0",
                    "certificadoicpbr": "0",
                    "assinatura_presencial": "0",
                    "certificatename": s.name,
                })
            })
            .collect();

        self.post_json(
            "d4sign.createlist",
            RetryPolicy::Unsent,
            &format!("/documents/{}/createlist", document_id),
            json!({ "signers": list }),
        )
        .await?;
        Ok(())
    }

    async fn send_to_signers(&self, document_id: &str, message: &str) -> ClientResult<()> {
        self.post_json(
            "d4sign.sendtosigner",
            RetryPolicy::Unsent,
            &format!("/documents/{}/sendtosigner", document_id),
            json!({
                "message": message,
                "workflow": "0",
                "skip_email": "0",
            }),
        )
        .await?;
        log::info!("📨 Documento {} enviado para assinatura", document_id);
        Ok(())
    }

    async fn document_status(&self, document_id: &str) -> ClientResult<RemoteDocumentStatus> {
        let info: Vec<DocumentInfo> = self
            .get("d4sign.status", &format!("/documents/{}", document_id))
            .await?
            .json()
            .await?;
        let state = info
            .first()
            .map(|doc| map_status(&doc.status_id))
            .ok_or_else(|| ClientError::Decode {
                provider: PROVIDER,
                message: format!("documento {} sem status", document_id),
            })?;

        let lists: Vec<SignerListEntry> = self
            .get("d4sign.list", &format!("/documents/{}/list", document_id))
            .await?
            .json()
            .await?;
        let signers = lists
            .into_iter()
            .flat_map(|entry| entry.list)
            .map(|s| RemoteSignerStatus {
                signed_at: if s.signed.as_deref() == Some("1") {
                    parse_signed_at(s.date_signed.as_deref()).or_else(|| Some(Utc::now()))
                } else {
                    None
                },
                email: s.email,
            })
            .collect();

        Ok(RemoteDocumentStatus { state, signers })
    }

    async fn cancel_document(&self, document_id: &str, reason: &str) -> ClientResult<()> {
        self.post_json(
            "d4sign.cancel",
            RetryPolicy::Idempotent,
            &format!("/documents/{}/cancel", document_id),
            json!({ "comment": reason }),
        )
        .await?;
        log::info!("🚫 Documento {} cancelado na D4Sign", document_id);
        Ok(())
    }

    async fn download_signed(&self, document_id: &str) -> ClientResult<RenderedDocument> {
        let url = self.download_url(document_id).await?;
        let url = &url;
        let bytes = with_retry("d4sign.download_file", || async move {
            let response = self.client.get(url).send().await?;
            let response = ensure_success(PROVIDER, response).await?;
            Ok(response.bytes().await?)
        })
        .await?;

        log::info!("📥 PDF assinado de {} baixado ({} bytes)", document_id, bytes.len());
        Ok(RenderedDocument {
            content_type: "application/pdf".to_string(),
            bytes: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status("3"), RemoteDocumentState::Pending);
        assert_eq!(map_status("4"), RemoteDocumentState::Finished);
        assert_eq!(map_status("6"), RemoteDocumentState::Cancelled);
    }

    #[test]
    fn test_signed_at_formats() {
        assert!(parse_signed_at(Some("2025-07-01 10:20:30")).is_some());
        assert!(parse_signed_at(Some("2025-07-01T10:20:30Z")).is_some());
        assert!(parse_signed_at(Some("")).is_none());
        assert!(parse_signed_at(None).is_none());
    }
}
