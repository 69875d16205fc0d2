//! Reconciliation logic for ScalingWindow CRDs.
//!
//! This module handles the reconciliation of `ScalingWindow` resources:
//! it loads the resource, checks whether the current UTC hour falls inside
//! the window, scales the referenced Deployments when it does, and asks to
//! be invoked again after a fixed interval.

use crate::clock::Clock;
use crate::cluster::ClusterClient;
use crate::error::ControllerError;
use crate::mutator::{MutationOutcome, WorkloadMutator};
use async_trait::async_trait;
use crds::{ScalingWindow, ScalingWindowSpec};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

/// Delay before a ScalingWindow is reconciled again after a successful pass.
pub const REQUEUE_INTERVAL: Duration = Duration::from_secs(30);

/// Namespace and name of a ScalingWindow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    /// Namespace of the ScalingWindow
    pub namespace: String,
    /// Name of the ScalingWindow
    pub name: String,
}

impl ObjectKey {
    /// Creates a new key.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Builds the key of a ScalingWindow from its metadata.
    pub fn from_resource(window: &ScalingWindow) -> Result<Self, ControllerError> {
        let name = window.metadata.name.as_ref()
            .ok_or_else(|| ControllerError::InvalidResource("ScalingWindow missing name".to_string()))?;
        let namespace = window.metadata.namespace.as_ref()
            .ok_or_else(|| ControllerError::InvalidResource(format!("ScalingWindow {} missing namespace", name)))?;
        Ok(Self::new(namespace.clone(), name.clone()))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Successful result of one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The resource no longer exists; nothing to do until it changes again
    Deleted,
    /// Reconcile again after the given delay
    RequeueAfter(Duration),
}

/// Reconcile entry point invoked by the dispatcher, one resource at a time.
#[async_trait]
pub trait Reconcile: Send + Sync {
    /// Reconciles the ScalingWindow identified by `key`.
    async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ControllerError>;
}

/// Reconciles ScalingWindow resources.
pub struct Reconciler {
    cluster: Arc<dyn ClusterClient>,
    clock: Arc<dyn Clock>,
    mutator: WorkloadMutator,
    span: Span,
}

impl Reconciler {
    /// Creates a new reconciler instance.
    ///
    /// Every reconciliation is recorded under a child of `span`.
    pub fn new(cluster: Arc<dyn ClusterClient>, clock: Arc<dyn Clock>, span: Span) -> Self {
        let mutator = WorkloadMutator::new(cluster.clone(), clock.clone());
        Self {
            cluster,
            clock,
            mutator,
            span,
        }
    }

    async fn reconcile_scaling_window(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ControllerError> {
        info!("Reconciling ScalingWindow");

        let window = match self.cluster.get_scaling_window(&key.namespace, &key.name).await {
            Ok(window) => window,
            Err(e) if e.is_not_found() => {
                info!("ScalingWindow not found, ignoring since it must have been deleted");
                return Ok(ReconcileOutcome::Deleted);
            }
            Err(e) => {
                error!("Failed to get ScalingWindow: {}", e);
                return Err(ControllerError::Cluster(e));
            }
        };

        warn_on_suspicious_spec(&window.spec);

        let current_hour = self.clock.current_hour();
        info!("Current UTC hour: {}", current_hour);

        if window.spec.contains_hour(current_hour) {
            info!(
                "Window {}-{} active, ensuring {} replicas on {} deployment(s)",
                window.spec.start,
                window.spec.end,
                window.spec.replicas,
                window.spec.deployments.len()
            );
            for workload in &window.spec.deployments {
                let outcome = self.mutator.ensure_replicas(&window, workload, window.spec.replicas).await?;
                if let MutationOutcome::Scaled { previous } = outcome {
                    debug!("Deployment {} scaled (previously {:?} replicas)", workload, previous);
                }
            }
        } else {
            info!("Window {}-{} inactive, nothing to do", window.spec.start, window.spec.end);
        }

        Ok(ReconcileOutcome::RequeueAfter(REQUEUE_INTERVAL))
    }
}

#[async_trait]
impl Reconcile for Reconciler {
    async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileOutcome, ControllerError> {
        let span = info_span!(parent: &self.span, "reconcile", namespace = %key.namespace, name = %key.name);
        self.reconcile_scaling_window(key).instrument(span).await
    }
}

/// Logs spec values that make the window behave unexpectedly.
///
/// Values are never rejected or corrected.
fn warn_on_suspicious_spec(spec: &ScalingWindowSpec) {
    for (field, hour) in [("start", spec.start), ("end", spec.end)] {
        if !(0..=23).contains(&hour) {
            warn!("{} hour {} is outside 0-23", field, hour);
        }
    }
    if spec.start > spec.end {
        warn!(
            "start hour {} is after end hour {}; windows do not wrap past midnight, so this window is never active",
            spec.start, spec.end
        );
    }
    if spec.replicas < 0 {
        warn!("replicas {} is negative", spec.replicas);
    }
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod reconciler_test;
