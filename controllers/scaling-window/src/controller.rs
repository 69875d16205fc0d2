//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, the reconciler and the ScalingWindow watcher together.

use crate::clock::SystemClock;
use crate::cluster::KubeClusterClient;
use crate::config::Settings;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::{self, Context};
use crds::ScalingWindow;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, info_span};

/// Main controller for ScalingWindow management.
pub struct Controller {
    scaling_window_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts watching.
    pub async fn new(settings: Settings) -> Result<Self, ControllerError> {
        info!("Initializing ScalingWindow Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        let scaling_window_api: Api<ScalingWindow> = match settings.namespace.as_deref() {
            Some(ns) => Api::namespaced(kube_client.clone(), ns),
            None => Api::all(kube_client.clone()),
        };

        let reconciler = Reconciler::new(
            Arc::new(KubeClusterClient::new(kube_client)),
            Arc::new(SystemClock),
            info_span!("scaling_window_controller"),
        );

        let context = Arc::new(Context::new(
            Arc::new(reconciler),
            settings.error_backoff_min,
            settings.error_backoff_max,
        ));

        let scaling_window_watcher = tokio::spawn(async move {
            watcher::watch_scaling_windows(scaling_window_api, context, &settings).await
        });

        Ok(Self { scaling_window_watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("ScalingWindow Controller running");

        self.scaling_window_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("ScalingWindow watcher panicked: {}", e)))??;

        info!("ScalingWindow Controller stopped");
        Ok(())
    }
}
