//! Cliente HTTP para envio de e-mails via Resend

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::retry::with_retry;
use super::{ensure_success, ClientResult, EmailMessage, Notifier};
use crate::config::ResendConfig;

pub struct ResendClient {
    client: Client,
    api_key: String,
    from: String,
    base_url: String,
}

impl ResendClient {
    pub fn new(config: &ResendConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Notifier for ResendClient {
    async fn send_email(&self, message: EmailMessage) -> ClientResult<()> {
        let url = format!("{}/emails", self.base_url);
        let body = json!({
            "from": self.from,
            "to": [&message.to],
            "subject": &message.subject,
            "html": &message.html,
        });

        let (url, body) = (&url, &body);
        with_retry("resend.send_email", || async move {
            let response = self
                .client
                .post(url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await?;
            ensure_success("resend", response).await?;
            Ok(())
        })
        .await?;

        log::info!("📧 E-mail '{}' enviado para {}", message.subject, message.to);
        Ok(())
    }
}
