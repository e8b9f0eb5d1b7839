use lead_tracker::{router, AppState, BotPoller, Config};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let state = AppState::new(config.clone());
    state
        .store
        .init()
        .await
        .map_err(|err| format!("failed to initialise {}: {}", config.data_dir.display(), err.message))?;

    if state.notifier.telegram().is_enabled() {
        let poller = BotPoller::new(state.notifier.clone(), state.store.clone(), config.poll_timeout).await;
        tokio::spawn(poller.run());
    } else {
        warn!("TELEGRAM_BOT_TOKEN not set, bot polling and notifications are disabled");
    }

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}, data in {}", config.data_dir.display());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
