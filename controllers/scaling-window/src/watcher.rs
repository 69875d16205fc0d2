//! Kubernetes resource watcher.
//!
//! Drives a `Reconcile` implementation from `kube_runtime::Controller`.
//! The runtime serializes reconciliations per ScalingWindow, runs different
//! ScalingWindows concurrently, owns the requeue timers, and applies the
//! error policy below when a reconciliation fails.

use crate::backoff::FibonacciBackoff;
use crate::config::Settings;
use crate::error::ControllerError;
use crate::reconciler::{ObjectKey, Reconcile, ReconcileOutcome};
use crds::ScalingWindow;
use futures::StreamExt;
use kube::Api;
use kube_runtime::{Controller, watcher, controller::{Action, Config as ControllerConfig}};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shared state handed to every reconcile and error policy invocation.
pub struct Context {
    reconciler: Arc<dyn Reconcile>,
    error_backoff_min: Duration,
    error_backoff_max: Duration,
    /// Retry backoff per ScalingWindow (namespace/name)
    backoff_states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl Context {
    /// Creates a new context.
    pub fn new(reconciler: Arc<dyn Reconcile>, error_backoff_min: Duration, error_backoff_max: Duration) -> Self {
        Self {
            reconciler,
            error_backoff_min,
            error_backoff_max,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Next retry delay for a failing ScalingWindow.
    fn next_backoff(&self, key: &str) -> Duration {
        let mut states = self.backoff_states.lock().unwrap_or_else(PoisonError::into_inner);
        states
            .entry(key.to_string())
            .or_insert_with(|| FibonacciBackoff::new(self.error_backoff_min, self.error_backoff_max))
            .next_backoff()
    }

    /// Restart the backoff sequence of a ScalingWindow after a success.
    fn reset_backoff(&self, key: &str) {
        let mut states = self.backoff_states.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(backoff) = states.get_mut(key) {
            backoff.reset();
        }
    }
}

impl From<ReconcileOutcome> for Action {
    fn from(outcome: ReconcileOutcome) -> Self {
        match outcome {
            ReconcileOutcome::Deleted => Action::await_change(),
            ReconcileOutcome::RequeueAfter(delay) => Action::requeue(delay),
        }
    }
}

/// Key used for backoff bookkeeping; falls back to the bare name.
fn backoff_key(window: &ScalingWindow) -> String {
    ObjectKey::from_resource(window)
        .map(|key| key.to_string())
        .unwrap_or_else(|_| window.metadata.name.clone().unwrap_or_default())
}

async fn reconcile(window: Arc<ScalingWindow>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let key = ObjectKey::from_resource(&window)?;
    let outcome = ctx.reconciler.reconcile(&key).await?;
    ctx.reset_backoff(&key.to_string());
    Ok(outcome.into())
}

fn error_policy(window: Arc<ScalingWindow>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = backoff_key(&window);
    let delay = ctx.next_backoff(&key);
    warn!("Reconciliation of ScalingWindow {} failed: {}; retrying in {:?}", key, error, delay);
    Action::requeue(delay)
}

/// Watches ScalingWindow resources and reconciles them until shutdown.
pub async fn watch_scaling_windows(
    api: Api<ScalingWindow>,
    ctx: Arc<Context>,
    settings: &Settings,
) -> Result<(), ControllerError> {
    info!("Starting ScalingWindow watcher");

    let controller_config = ControllerConfig::default()
        .debounce(settings.debounce)
        .concurrency(settings.concurrency);

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((object, action)) => debug!("Reconciled ScalingWindow {}: {:?}", object, action),
                Err(e) => warn!("ScalingWindow controller error: {}", e),
            }
        })
        .await;

    info!("ScalingWindow watcher stopped");
    Ok(())
}
