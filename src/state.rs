//! Estado compartilhado da aplicação
//!
//! Passado pelo router do Axum para todos os handlers. As integrações externas
//! ficam atrás de traits; sem credenciais configuradas o estado usa os
//! stand-ins de desenvolvimento.

use std::sync::Arc;

use sqlx::PgPool;
use tera::Tera;

use crate::clients::{
    D4SignClient, DevNotifier, DevPaymentProvider, DevPdfRenderer, DevSignatureProvider,
    GotenbergClient, Notifier, PaymentProvider, PdfRenderer, ResendClient, SignatureProvider,
    StripeClient,
};
use crate::config::EnvironmentConfig;
use crate::middleware::RateLimitState;

pub const CONTRACT_TEMPLATE: &str = "contract.html";

/// Providers externos usados pelos services
#[derive(Clone)]
pub struct Providers {
    pub payments: Arc<dyn PaymentProvider>,
    pub signatures: Arc<dyn SignatureProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub pdf: Arc<dyn PdfRenderer>,
}

impl Providers {
    /// Clientes reais para cada provedor configurado, stand-ins para o resto
    pub fn from_config(config: &EnvironmentConfig) -> anyhow::Result<Self> {
        let payments: Arc<dyn PaymentProvider> = match &config.stripe {
            Some(stripe) => {
                tracing::info!("💳 Pagamentos via Stripe");
                Arc::new(StripeClient::new(stripe)?)
            }
            None => {
                tracing::warn!("⚠️ STRIPE_SECRET_KEY ausente, usando provedor de pagamento de desenvolvimento");
                Arc::new(DevPaymentProvider::default())
            }
        };

        let signatures: Arc<dyn SignatureProvider> = match &config.d4sign {
            Some(d4sign) => {
                tracing::info!("✍️ Assinatura eletrônica via D4Sign");
                Arc::new(D4SignClient::new(d4sign, &config.public_base_url)?)
            }
            None => {
                tracing::warn!("⚠️ D4Sign não configurado, usando assinatura de desenvolvimento");
                Arc::new(DevSignatureProvider)
            }
        };

        let notifier: Arc<dyn Notifier> = match &config.resend {
            Some(resend) => {
                tracing::info!("📧 E-mails via Resend");
                Arc::new(ResendClient::new(resend)?)
            }
            None => {
                tracing::warn!("⚠️ RESEND_API_KEY ausente, e-mails apenas no log");
                Arc::new(DevNotifier)
            }
        };

        let pdf: Arc<dyn PdfRenderer> = match &config.gotenberg_url {
            Some(url) => {
                tracing::info!("📄 PDFs via Gotenberg em {}", url);
                Arc::new(GotenbergClient::new(url)?)
            }
            None => {
                tracing::warn!("⚠️ GOTENBERG_URL ausente, contratos servidos como HTML");
                Arc::new(DevPdfRenderer)
            }
        };

        Ok(Self { payments, signatures, notifier, pdf })
    }

    pub fn development() -> Self {
        Self {
            payments: Arc::new(DevPaymentProvider::default()),
            signatures: Arc::new(DevSignatureProvider),
            notifier: Arc::new(DevNotifier),
            pdf: Arc::new(DevPdfRenderer),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<EnvironmentConfig>,
    pub providers: Providers,
    pub templates: Arc<Tera>,
    pub rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig, providers: Providers) -> anyhow::Result<Self> {
        let rate_limit = RateLimitState::new(&config);
        Ok(Self {
            pool,
            config: Arc::new(config),
            providers,
            templates: Arc::new(load_templates()?),
            rate_limit,
        })
    }
}

/// Templates embutidos no binário
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_template(
        CONTRACT_TEMPLATE,
        include_str!("../templates/contract.html"),
    )?;
    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_template_parses() {
        let tera = load_templates().unwrap();
        assert!(tera.get_template_names().any(|name| name == CONTRACT_TEMPLATE));
    }
}
