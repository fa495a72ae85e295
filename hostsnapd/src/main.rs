use anyhow::{Context, Result};
use clap::Parser;
use hostsnapd::{AppState, Config, router};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(version, about = "Serve a live snapshot of `ps -ef` and `df -h`")]
struct Args {
    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override server.listen_addr
    #[arg(long)]
    listen: Option<String>,

    /// Print the effective config and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let path = Config::resolve_path(args.config.as_deref());
    let mut config = Config::load(&path)?;
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();
    info!("[config] using {}", path.display());

    if args.print_config {
        println!(
            "{}",
            toml::to_string_pretty(&config).context("failed to serialize config")?
        );
        return Ok(());
    }

    let addr = config.listen_addr()?;
    let state = Arc::new(AppState::from_config(&config));
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "[hostsnapd] listening on {} (timeout {} ms)",
        addr, config.capture.timeout_ms
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("[hostsnapd] shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("[hostsnapd] failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("[hostsnapd] failed to listen for SIGTERM: {e}");
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
    info!("[hostsnapd] shutdown signal received");
}
