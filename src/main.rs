use std::env;
use std::path::PathBuf;

use anyhow::Context;
use gradesd::{db, http};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => return,
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(_) => return,
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Loopback only: the WebView shell is the sole client.
    let bind_addr = env::var("GRADESD_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_string());
    let data_dir = PathBuf::from(
        env::var("GRADESD_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
    );

    let conn = db::open_db(&data_dir)
        .with_context(|| format!("failed to open database in {}", data_dir.to_string_lossy()))?;
    let state = http::AppState::new(data_dir, conn);
    let app = http::build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("gradesd listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;
    Ok(())
}
