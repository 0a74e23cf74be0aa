use std::net::SocketAddr;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use alugae_backend::config::database::DatabaseConfig;
use alugae_backend::config::EnvironmentConfig;
use alugae_backend::database::connect_and_migrate;
use alugae_backend::routes::create_router;
use alugae_backend::state::{AppState, Providers};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("alugae_backend=debug,tower_http=info,info")),
        )
        .init();

    info!("🚗 alugae.mobi - API de aluguel de carros");
    info!("==========================================");

    let config = match EnvironmentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuração inválida: {:#}", e);
            return Err(e);
        }
    };
    info!("🌍 Ambiente: {}", config.environment);

    let pool = match connect_and_migrate(&DatabaseConfig::new(&config.database_url)).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Erro conectando ao banco de dados: {:#}", e);
            return Err(e);
        }
    };

    let providers = Providers::from_config(&config)?;
    let addr: SocketAddr = config.server_url().parse()?;
    let state = AppState::new(pool, config, providers)?;
    let app = create_router(state);

    info!("🌐 Servidor iniciando em http://{}", addr);
    info!("🔍 Endpoints disponíveis:");
    info!("   GET  /health");
    info!("🔐 /api/auth: register, login, me");
    info!("🚙 /api/vehicles: anúncios, calendário, períodos, desbloqueio de contato");
    info!("📅 /api/bookings: cotação, reserva, checkout, cancelamento, conclusão");
    info!("✍️ /api/contracts: envio, cancelamento, reconciliação, PDFs");
    info!("🪪 /api/documents: envio e resumo da verificação");
    info!("🪙 /api/coins: pacotes, carteira, compra");
    info!("🛠️ /api/admin: configurações, cupons, aprovações");
    info!("🔔 /api/webhooks: stripe, d4sign");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Erro do servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor encerrado");
    Ok(())
}

/// Sinal de desligamento gracioso
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Falha ao escutar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ Falha ao instalar handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C recebido, desligando servidor...");
        },
        _ = terminate => {
            info!("🛑 Sinal de término recebido, desligando servidor...");
        },
    }
}
