//! Cluster state client.
//!
//! The reconciler and the workload mutator only talk to the cluster through
//! the `ClusterClient` trait. `KubeClusterClient` is the kube-rs backed
//! implementation; tests use an in-memory mock.

use async_trait::async_trait;
use crds::{ScalingWindow, WorkloadReference};
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::Client;
use thiserror::Error;
use tracing::debug;

/// Errors returned by cluster state operations.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The requested object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Kubernetes API error (includes update conflicts)
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Object is missing metadata required to address it
    #[error("Invalid object: {0}")]
    InvalidObject(String),
}

impl ClusterError {
    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound(_))
    }
}

/// Operations the controller needs against cluster state.
///
/// All methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Get a ScalingWindow by namespace and name.
    async fn get_scaling_window(&self, namespace: &str, name: &str) -> Result<ScalingWindow, ClusterError>;

    /// Get the Deployment a workload reference points at.
    async fn get_deployment(&self, workload: &WorkloadReference) -> Result<Deployment, ClusterError>;

    /// Replace a Deployment with the given object.
    ///
    /// The object's resourceVersion is sent along, so a concurrent writer
    /// surfaces as a conflict error.
    async fn update_deployment(&self, deployment: &Deployment) -> Result<Deployment, ClusterError>;

    /// Write the status subresource of a ScalingWindow.
    async fn update_scaling_window_status(&self, window: &ScalingWindow) -> Result<ScalingWindow, ClusterError>;
}

/// `ClusterClient` backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl std::fmt::Debug for KubeClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterClient").finish_non_exhaustive()
    }
}

impl KubeClusterClient {
    /// Creates a new cluster client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Name and namespace of an object, or `InvalidObject`.
fn object_address<'a>(
    kind: &str,
    name: Option<&'a str>,
    namespace: Option<&'a str>,
) -> Result<(&'a str, &'a str), ClusterError> {
    let name = name.ok_or_else(|| ClusterError::InvalidObject(format!("{} missing name", kind)))?;
    let namespace = namespace
        .ok_or_else(|| ClusterError::InvalidObject(format!("{} {} missing namespace", kind, name)))?;
    Ok((name, namespace))
}

/// Merge patch body for the status subresource; an unset status is sent as `{}`.
fn status_patch(window: &ScalingWindow) -> serde_json::Value {
    serde_json::json!({
        "status": window.status.clone().unwrap_or_default()
    })
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn get_scaling_window(&self, namespace: &str, name: &str) -> Result<ScalingWindow, ClusterError> {
        let api: Api<ScalingWindow> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name)
            .await?
            .ok_or_else(|| ClusterError::NotFound(format!("ScalingWindow {}/{}", namespace, name)))
    }

    async fn get_deployment(&self, workload: &WorkloadReference) -> Result<Deployment, ClusterError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), &workload.namespace);
        api.get_opt(&workload.name)
            .await?
            .ok_or_else(|| ClusterError::NotFound(format!("Deployment {}", workload)))
    }

    async fn update_deployment(&self, deployment: &Deployment) -> Result<Deployment, ClusterError> {
        let (name, namespace) = object_address(
            "Deployment",
            deployment.metadata.name.as_deref(),
            deployment.metadata.namespace.as_deref(),
        )?;
        debug!("Replacing Deployment {}/{}", namespace, name);

        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.replace(name, &PostParams::default(), deployment).await?)
    }

    async fn update_scaling_window_status(&self, window: &ScalingWindow) -> Result<ScalingWindow, ClusterError> {
        let (name, namespace) = object_address(
            "ScalingWindow",
            window.metadata.name.as_deref(),
            window.metadata.namespace.as_deref(),
        )?;
        debug!("Writing ScalingWindow {}/{} status", namespace, name);

        let api: Api<ScalingWindow> = Api::namespaced(self.client.clone(), namespace);
        Ok(api
            .patch_status(name, &PatchParams::default(), &Patch::Merge(&status_patch(window)))
            .await?)
    }
}
