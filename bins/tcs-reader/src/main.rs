use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tcs_core::{AppConfig, FileReadingStore};
use tcs_sensor::{rpi, start_session, StdinConfirm};
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Resolves with the signal's name on Ctrl+C or SIGTERM (`systemctl stop`).
///
/// The SIGTERM handler is installed before this returns.
fn shutdown_signal() -> std::io::Result<impl Future<Output = &'static str>> {
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => "Ctrl+C",
            _ = terminate.recv() => "SIGTERM",
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tcs_sensor=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("TCS3200 reader starting...");

    let config = AppConfig::load(std::env::args_os().nth(1).map(PathBuf::from))
        .context("Failed to load configuration")?;
    let store = FileReadingStore::new(config.store.path.clone());
    tracing::info!("Publishing readings to {}", store.path().display());

    let shutdown = shutdown_signal().context("Failed to install signal handlers")?;
    let stop = Arc::new(AtomicBool::new(false));

    // The sensor loop blocks, so it gets its own thread. GPIO is opened there
    // and dropped there, which releases the pins on the way out.
    let loop_stop = stop.clone();
    let mut sensor_handle = tokio::task::spawn_blocking(move || -> anyhow::Result<u64> {
        let device = rpi::open(&config.sensor).context("GPIO initialization failed")?;
        let mut reader = start_session(device, &mut StdinConfirm, &store, config.classifier)
            .context("Calibration failed")?;
        let cycles = reader.run(&store, config.sensor.poll_interval(), &loop_stop)?;

        let device = reader.finish(&store);
        if let Err(e) = device.release() {
            tracing::warn!("Failed to power down sensor: {}", e);
        }
        Ok(cycles)
    });

    // Wait for shutdown signal
    let finished = tokio::select! {
        name = shutdown => {
            tracing::info!("Received {}, shutting down...", name);
            None
        }
        result = &mut sensor_handle => Some(result),
    };

    let result = match finished {
        Some(result) => result,
        None => {
            stop.store(true, Ordering::Relaxed);
            // A pending calibration prompt keeps stdin blocked; don't wait on it forever.
            match tokio::time::timeout(SHUTDOWN_GRACE, sensor_handle).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("Sensor task did not stop within {:?}, exiting", SHUTDOWN_GRACE);
                    std::process::exit(130);
                }
            }
        }
    };

    let cycles = result.context("Sensor task panicked")??;
    tracing::info!("Shutdown complete after {} readings", cycles);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sigterm_triggers_shutdown() {
        let shutdown = shutdown_signal().unwrap();

        let status = std::process::Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        let name = tokio::time::timeout(Duration::from_secs(5), shutdown)
            .await
            .expect("SIGTERM should resolve the shutdown future");
        assert_eq!(name, "SIGTERM");
    }
}
