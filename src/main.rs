// oai2claude - OpenAI Chat Completions gateway for Anthropic and OpenAI-compatible providers

use anyhow::Result;
use clap::Parser;
use oai2claude::cli::Args;
use oai2claude::config::{AppConfig, ConfigStore, FileConfigStore};
use oai2claude::proxy::ProxyDispatcher;
use oai2claude::server::create_router;
use oai2claude::upstream::UpstreamClient;
use oai2claude::utils::{logging, SystemClock};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, flags last
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting oai2claude v{}", env!("CARGO_PKG_VERSION"));

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.workers.max(1))
        .enable_all()
        .build()?
        .block_on(serve(config))
}

async fn serve(config: AppConfig) -> Result<()> {
    // Phase 3: Open the provider list
    info!("Loading providers from {}", config.routing.providers_path);
    let store = FileConfigStore::open(&config.routing.providers_path)?;
    info!("{} provider(s) configured", store.get_config().providers.len());

    // Phase 4: Build the dispatcher
    let upstream = UpstreamClient::new(&config.upstream)?;
    let dispatcher = ProxyDispatcher::new(Arc::new(store), upstream, Arc::new(SystemClock))
        .with_payload_logging(config.logging.log_payloads);

    // Phase 5: Build and start HTTP server
    let app = create_router(dispatcher);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
