//! Cliente HTTP para o Gotenberg (conversão HTML -> PDF via Chromium)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use super::retry::with_retry;
use super::{ensure_success, ClientResult, PdfRenderer, RenderedDocument};

pub struct GotenbergClient {
    client: Client,
    base_url: String,
}

impl GotenbergClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PdfRenderer for GotenbergClient {
    async fn render_html(&self, html: &str) -> ClientResult<RenderedDocument> {
        let url = format!("{}/forms/chromium/convert/html", self.base_url);

        let url = &url;
        let bytes = with_retry("gotenberg.render_html", || async move {
            // multipart::Form não é Clone: monta a cada tentativa
            let part = Part::text(html.to_string())
                .file_name("index.html")
                .mime_str("text/html")?;
            let form = Form::new()
                .part("files", part)
                .text("printBackground", "true");

            let response = self.client.post(url).multipart(form).send().await?;
            let response = ensure_success("gotenberg", response).await?;
            Ok(response.bytes().await?.to_vec())
        })
        .await?;

        log::info!("🖨️ PDF renderizado ({} bytes)", bytes.len());
        Ok(RenderedDocument {
            content_type: "application/pdf".to_string(),
            bytes,
        })
    }
}
