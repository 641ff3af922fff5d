mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use planner_api::password::Argon2Hasher;
use planner_api::token::TokenSigner;
use planner_api::{AppState, AppStateInner};
use planner_db::{CredentialStore, Database, MemoryStore, MissionStore};

use crate::config::{Config, StoreBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planner=debug,planner_api=debug,planner_db=info,tower_http=debug".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            return Err(e);
        }
    };

    let (users, missions): (Arc<dyn CredentialStore>, Arc<dyn MissionStore>) = match &config.store {
        StoreBackend::Sqlite(path) => {
            let db = Arc::new(Database::open(path)?);
            let users: Arc<dyn CredentialStore> = db.clone();
            (users, db as Arc<dyn MissionStore>)
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            let users: Arc<dyn CredentialStore> = store.clone();
            (users, store as Arc<dyn MissionStore>)
        }
    };

    let tokens = TokenSigner::new(config.jwt_secret.as_bytes(), config.token_ttl);
    info!("Session tokens expire after {}h", tokens.ttl().num_hours());

    let state: AppState = Arc::new(AppStateInner::new(
        users,
        missions,
        Arc::new(Argon2Hasher::default()),
        tokens,
    ));

    let app = planner_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Platoon planner listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Platoon planner stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
