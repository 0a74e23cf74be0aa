//! Configuração de variáveis de ambiente
//!
//! Este módulo lê a configuração do servidor e das integrações externas.
//! Integrações sem credenciais rodam em modo de desenvolvimento (stand-ins).

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct D4SignConfig {
    pub token: String,
    pub crypt_key: String,
    pub safe_id: String,
    pub webhook_secret: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from: String,
    pub base_url: String,
}

/// Configuração do ambiente
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    pub public_base_url: String,
    pub stripe: Option<StripeConfig>,
    pub d4sign: Option<D4SignConfig>,
    pub resend: Option<ResendConfig>,
    pub gotenberg_url: Option<String>,
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} must be set", name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{} must be a valid value: {}", name, e)),
        None => Ok(default),
    }
}

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self> {
        let stripe = optional("STRIPE_SECRET_KEY").map(|secret_key| StripeConfig {
            secret_key,
            webhook_secret: optional("STRIPE_WEBHOOK_SECRET"),
            base_url: optional("STRIPE_BASE_URL")
                .unwrap_or_else(|| "https://api.stripe.com/v1".to_string()),
        });

        let d4sign = match (optional("D4SIGN_TOKEN"), optional("D4SIGN_CRYPT_KEY")) {
            (Some(token), Some(crypt_key)) => Some(D4SignConfig {
                token,
                crypt_key,
                safe_id: required("D4SIGN_SAFE_ID")?,
                webhook_secret: optional("D4SIGN_WEBHOOK_SECRET"),
                base_url: optional("D4SIGN_BASE_URL")
                    .unwrap_or_else(|| "https://secure.d4sign.com.br/api/v1".to_string()),
            }),
            _ => None,
        };

        let resend = optional("RESEND_API_KEY").map(|api_key| ResendConfig {
            api_key,
            from: optional("RESEND_FROM")
                .unwrap_or_else(|| "alugae.mobi <noreply@alugae.mobi>".to_string()),
            base_url: optional("RESEND_BASE_URL")
                .unwrap_or_else(|| "https://api.resend.com".to_string()),
        });

        Ok(Self {
            environment: optional("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parsed_or("PORT", 3000)?,
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration: parsed_or("JWT_EXPIRATION", 86_400)?,
            cors_origins: optional("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit_requests: parsed_or("RATE_LIMIT_REQUESTS", 60)?,
            rate_limit_window: parsed_or("RATE_LIMIT_WINDOW", 60)?,
            public_base_url: optional("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            stripe,
            d4sign,
            resend,
            gotenberg_url: optional("GOTENBERG_URL"),
        })
    }

    /// Verificar se estamos em modo desenvolvimento
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configuração mínima para testes, sem integrações externas
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            database_url: "postgres://localhost/alugae_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expiration: 3600,
            cors_origins: Vec::new(),
            rate_limit_requests: 1000,
            rate_limit_window: 60,
            public_base_url: "http://localhost:3000".to_string(),
            stripe: None,
            d4sign: None,
            resend: None,
            gotenberg_url: None,
        }
    }
}
