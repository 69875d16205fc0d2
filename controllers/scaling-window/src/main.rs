//! ScalingWindow Controller
//!
//! Scales Deployments to a fixed replica count while the current UTC hour
//! falls inside a daily window.
//!
//! This controller reconciles `ScalingWindow` CRDs every 30 seconds. Leaving
//! the window, or deleting the ScalingWindow, does not scale Deployments back.

mod clock;
mod cluster;
mod config;
mod controller;
mod mutator;
mod reconciler;
mod watcher;
mod error;
mod backoff;
#[cfg(test)]
mod test_utils;

use controller::Controller;
use crate::config::Settings;
use crate::error::ControllerError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Configure rustls crypto provider (use ring for compatibility)
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("rustls crypto provider already installed");
    }

    info!("Starting ScalingWindow Controller");

    let settings = Settings::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", settings.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Concurrency: {}", settings.concurrency);
    info!("  Debounce: {:?}", settings.debounce);
    info!("  Error backoff: {:?} - {:?}", settings.error_backoff_min, settings.error_backoff_max);

    // Initialize and run controller
    let controller = Controller::new(settings).await?;
    controller.run().await?;

    Ok(())
}
