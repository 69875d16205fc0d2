//! Workload mutator.
//!
//! Brings one referenced Deployment to the desired replica count and
//! records the change on the owning ScalingWindow's status.

use crate::clock::Clock;
use crate::cluster::ClusterClient;
use crate::error::ControllerError;
use crds::{ScalingWindow, ScalingWindowStatus, WorkloadReference};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of a single `ensure_replicas` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Deployment already had the desired replica count
    Unchanged,
    /// Deployment was scaled; holds the replica count observed before the update
    Scaled {
        /// Replicas before the update (`None` if the field was unset)
        previous: Option<i32>,
    },
}

/// Applies replica changes to referenced Deployments.
pub struct WorkloadMutator {
    cluster: Arc<dyn ClusterClient>,
    clock: Arc<dyn Clock>,
}

impl WorkloadMutator {
    /// Creates a new mutator.
    pub fn new(cluster: Arc<dyn ClusterClient>, clock: Arc<dyn Clock>) -> Self {
        Self { cluster, clock }
    }

    /// Ensures `workload` runs with `replicas` replicas.
    ///
    /// Replica counts are compared by value. When they differ the Deployment
    /// is updated and then the ScalingWindow status is written; a failure of
    /// either write is returned. When they match nothing is written.
    pub async fn ensure_replicas(
        &self,
        window: &ScalingWindow,
        workload: &WorkloadReference,
        replicas: i32,
    ) -> Result<MutationOutcome, ControllerError> {
        let mut deployment = self.cluster.get_deployment(workload).await.map_err(|e| {
            error!("Failed to get Deployment {}: {}", workload, e);
            ControllerError::Cluster(e)
        })?;

        let current = deployment.spec.as_ref().and_then(|spec| spec.replicas);
        if current == Some(replicas) {
            debug!("Deployment {} already at {} replicas", workload, replicas);
            return Ok(MutationOutcome::Unchanged);
        }

        deployment.spec.get_or_insert_with(Default::default).replicas = Some(replicas);
        self.cluster.update_deployment(&deployment).await.map_err(|e| {
            error!("Failed to update Deployment {}: {}", workload, e);
            ControllerError::Cluster(e)
        })?;
        info!(
            "Scaled Deployment {} from {} to {} replicas",
            workload,
            current.map_or_else(|| "<unset>".to_string(), |r| r.to_string()),
            replicas
        );

        let mut updated = window.clone();
        updated.status = Some(ScalingWindowStatus {
            last_scaled_time: Some(self.clock.now()),
            last_scaled_workload: Some(workload.to_string()),
        });
        self.cluster.update_scaling_window_status(&updated).await.map_err(|e| {
            error!("Failed to update ScalingWindow status after scaling {}: {}", workload, e);
            ControllerError::Cluster(e)
        })?;

        Ok(MutationOutcome::Scaled { previous: current })
    }
}

#[cfg(test)]
#[path = "mutator_test.rs"]
mod mutator_test;
