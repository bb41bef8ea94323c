mod app;
mod config;
mod handlers;
mod recognition;
mod state;
mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use listenfd::ListenFd;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    app::create_app,
    config::Config,
    recognition::{DisabledRecognizer, HttpRecognizer, Recognizer},
    state::AppState,
    storage::{ConnectionProvider, SubmissionService},
};

/// Invoice Review - Human-in-the-loop review of handwritten invoices
#[derive(Parser, Debug)]
#[command(name = "invoice_review")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "8000", env = "PORT")]
    port: u16,

    /// Apply the primary database schema before serving
    #[arg(long, env = "MIGRATE")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; variables may come from the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoice_review=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let provider = Arc::new(ConnectionProvider::new(&config)?);

    if cli.migrate {
        provider
            .migrate_primary()
            .await
            .context("Failed to apply database schema")?;
    }

    let submissions = SubmissionService::new(provider);
    match submissions.health().await {
        Ok(backend) => tracing::info!(
            location = %config.store.redacted(),
            backend_root = %config.backend_root.display(),
            backend = ?backend.backend,
            mode = ?backend.mode,
            detail = backend.detail.as_deref().unwrap_or_default(),
            "Storage ready"
        ),
        // Keep serving: the next request may reach a store again.
        Err(e) => tracing::error!(
            location = %config.store.redacted(),
            error = %e,
            "No store reachable at startup"
        ),
    }

    let recognizer = init_recognizer(&config)?;
    let state = AppState::new(submissions, recognizer);
    let app = create_app(state, &config.cors_allowed_origins);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_recognizer(config: &Config) -> Result<Arc<dyn Recognizer>> {
    match &config.recognizer_url {
        Some(url) => {
            tracing::info!(url = %url, "Handwriting recognition enabled");
            Ok(Arc::new(HttpRecognizer::new(url.clone())?))
        }
        None => {
            tracing::warn!("RECOGNIZER_URL not set, uploads will fail");
            Ok(Arc::new(DisabledRecognizer))
        }
    }
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
