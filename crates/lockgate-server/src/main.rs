//! Lockgate controller binary.
//!
//! Serves the challenge-response lock over HTTP. See `lockgate-server --help`.

use clap::Parser;
use lockgate_core::Lock;
use lockgate_server::{Args, Controller, ServerError, SystemEnv, TracingIndicator, router};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "lockgate_core=info,lockgate_server=info";

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();
    let result = run(&args).await;
    if let Err(error) = &result {
        error!(%error, "lockgate-server exiting");
    }
    result
}

async fn run(args: &Args) -> Result<(), ServerError> {
    let lock = Lock::new(args.lock_config()?)?;
    let (handle, controller) = Controller::spawn(lock, SystemEnv, TracingIndicator::new());

    let listener = TcpListener::bind(args.listen)
        .await
        .map_err(|source| ServerError::Bind { addr: args.listen, source })?;
    info!(addr = %args.listen, "HTTP server listening");

    axum::serve(listener, router(handle))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    // The router held the last handle; the controller drains and stops.
    if let Err(error) = controller.await {
        error!(%error, "lock controller task failed");
    }
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
