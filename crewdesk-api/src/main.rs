//! # CrewDesk API Server
//!
//! REST surface over the CrewDesk records store: companies, people, tasks
//! with an audit trail, leave requests, and the time clock.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p crewdesk-api
//! ```

use std::sync::Arc;

use crewdesk_api::app::{build_router, AppState};
use crewdesk_api::config::Config;
use crewdesk_shared::persist;
use crewdesk_shared::store::RecordsStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "CrewDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let store = Arc::new(RecordsStore::new());
    if let Some(snapshot) = persist::load(&config.snapshot.path) {
        store.restore(snapshot);
        tracing::info!(path = %config.snapshot.path.display(), "Store snapshot loaded");
    }

    // Best-effort periodic flush; failures are logged inside persist
    if config.snapshot.flush_seconds > 0 {
        let flush_store = store.clone();
        let flush_path = config.snapshot.path.clone();
        let interval = std::time::Duration::from_secs(config.snapshot.flush_seconds);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately, skip it
            loop {
                ticker.tick().await;
                persist::flush(&flush_store, &flush_path);
            }
        });
    }

    let state = AppState::new(store.clone(), config.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Shutdown signal received, flushing store...");
    persist::flush(&store, &config.snapshot.path);

    Ok(())
}
