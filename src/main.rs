use std::sync::Arc;

use op_engine::Controller;
use op_engine::ControllerRegistry;
use op_engine::DeploymentBackupHandler;
use op_engine::DeploymentBackups;
use op_engine::Error;
use op_engine::FanOutHandler;
use op_engine::MemoryStore;
use op_engine::Result;
use op_engine::Settings;
use op_engine::BACKUP_KIND;
use op_engine::BACKUP_PREFIX;
use op_engine::DEPLOYMENT_BACKUP_PREFIX;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let settings = Settings::load(None)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let store = Arc::new(MemoryStore::new(settings.store.clone()));

    let mut registry = ControllerRegistry::new();
    let shutdown = registry.shutdown_token();

    let backup = Controller::new(
        BACKUP_PREFIX,
        Arc::clone(&store),
        Arc::new(FanOutHandler::new(
            BACKUP_KIND,
            BACKUP_PREFIX,
            Arc::clone(&store),
            DeploymentBackups,
        )),
        shutdown.clone(),
        settings.controller.clone(),
    );
    registry.spawn(backup);

    let deployment_backup = Controller::new(
        DEPLOYMENT_BACKUP_PREFIX,
        Arc::clone(&store),
        Arc::new(DeploymentBackupHandler),
        shutdown.clone(),
        settings.controller.clone(),
    );
    registry.spawn(deployment_backup);

    info!("control loops are running");

    tokio::spawn(async move {
        if let Err(e) = wait_for_termination(shutdown).await {
            error!("failed to wait for termination signal: {:?}", e);
        }
    });

    registry.join().await;
    println!("Exiting program.");
    Ok(())
}

/// Blocks until SIGINT, SIGTERM or Ctrl+C, then cancels the shared
/// shutdown token so every control loop exits.
async fn wait_for_termination(shutdown: CancellationToken) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| Error::Fatal(format!("failed to install SIGINT handler: {e}")))?;
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| Error::Fatal(format!("failed to install SIGTERM handler: {e}")))?;

    tokio::select! {
        _ = sigint.recv() => info!("SIGINT detected."),
        _ = sigterm.recv() => info!("SIGTERM detected."),
        _ = tokio::signal::ctrl_c() => info!("Ctrl+C detected."),
    }

    shutdown.cancel();
    info!("Shutdown signal propagated");
    Ok(())
}
