//! HTTP API for Glowform feedback forms.
//!
//! # Responsibility
//! - Expose form, submission and account use-cases over JSON.
//! - Own the database handle for the lifetime of the process.
//!
//! # Invariants
//! - Protected routes resolve the caller through a server-side session.
//! - Error bodies are `{"error": <message>}`; internal details stay in logs.

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    Router,
};
use glowform_core::db::DbError;
use log::{info, warn};
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use config::{Config, ConfigError};
use state::{AppState, SharedState, Storage};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Router with CORS applied; used by the binary and by tests.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config);
    routes::routes().layer(cors).with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    // Credentialed requests cannot use a wildcard origin, so "any" mirrors
    // the caller's origin.
    let origin = if config.allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(config.allowed_origins.clone())
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// Opens storage, serves until a shutdown signal, then closes storage.
pub async fn start_server(config: Config) -> Result<(), ServerError> {
    info!("event=server_init module=server status=start");
    let storage = Storage::open(&config.database_path)?;
    let state = AppState::new(config, storage);
    match state
        .storage
        .auth(|service| Ok(service.purge_expired_sessions()?))
    {
        Ok(purged) => info!("event=session_purge module=server status=ok purged={purged}"),
        Err(err) => warn!("event=session_purge module=server status=error error={err}"),
    }
    let app = build_router(state.clone());

    let address = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = TcpListener::bind(address).await?;
    info!(
        "event=server_listen module=server status=ok address={}",
        address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_shutdown module=server status=start");
    match std::sync::Arc::try_unwrap(state) {
        Ok(state) => state.storage.close()?,
        Err(_) => warn!("event=db_close module=server status=skipped reason=state_still_shared"),
    }
    info!("event=server_shutdown module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
        info!("event=signal_received module=server status=ok signal=ctrl_c");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=signal_received module=server status=ok signal=terminate");
            }
            Err(err) => {
                warn!("event=signal_install module=server status=error signal=terminate error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
