mod api;
mod middleware;

use bftmap_resolver::{AnyFetcher, FacilityRegistry, NearbySession, SourceOptions, TieredDataSource};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState, SearchDefaults};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = bftmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let fetcher = AnyFetcher::from_config(&config)?;
    tracing::info!(
        env = %config.env,
        data_source = %fetcher.describe(),
        "starting bftmap-server"
    );

    let source = TieredDataSource::new(fetcher, SourceOptions::from_config(&config));
    let registry = FacilityRegistry::new(config.duplicate_tolerance_deg);
    let state = AppState::new(
        NearbySession::new(source, registry),
        SearchDefaults::from_config(&config),
    );
    let session = std::sync::Arc::clone(&state.session);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session.lock().await.source().shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
