use anyhow::{Context, Result};
use nexa_wallet_rs::{AppState, api, blockchain::rostrum::RostrumFactory, config};
use std::{io, net::SocketAddr, sync::Arc, sync::Once};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "nexa_wallet_rs=debug,tower_http=debug".into());

        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

        let result = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();

        if result.is_err() {
            eprintln!("Failed to initialize tracing subscriber");
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Load .env file
    dotenvy::dotenv().ok();
    let app_config = config::AppConfig::from_env()?;

    let providers = Arc::new(RostrumFactory::new(
        app_config.rostrum_endpoints(),
        app_config.rostrum_timeout(),
    ));
    let state = AppState {
        config: app_config.clone(),
        providers,
    };
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.port));
    tracing::info!(
        "HTTP Server listening on {} (default network {})",
        addr,
        app_config.default_network
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
